use std::sync::Arc;

use composer_core::{
    Artifact, Destination, Notice, PreconditionError, SubmissionContext, TemplateRef,
    TemplateResolution,
};
use composer_logging::{composer_error, composer_info, composer_warn};
use futures_util::future::{join, join_all};
use thiserror::Error;

use crate::{ApiError, ProjectRequest, SessionStore, SharedSession, StudioApi, CURRENT_PROJECT_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Failed to load template {}: {}", .template.id, .source)]
    TemplateLookup {
        template: TemplateRef,
        source: ApiError,
    },
    #[error("Project creation failed: {}", .0.user_message())]
    Creation(ApiError),
    #[error("Project creation failed")]
    MissingProjectId,
}

/// Outcome of the best-effort association step. Failures are recorded here
/// and logged; they never stop navigation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssociationReport {
    pub files_associated: usize,
    pub file_failures: Vec<(String, ApiError)>,
    pub material_urls: Vec<String>,
    pub material_failure: Option<ApiError>,
}

impl AssociationReport {
    pub fn is_clean(&self) -> bool {
        self.file_failures.is_empty() && self.material_failure.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Blocked(PreconditionError),
    Failed(SubmitError),
    Navigate {
        destination: Destination,
        associations: AssociationReport,
    },
}

/// Creates the project from the current session and decides where to go next.
#[derive(Clone)]
pub struct SubmissionPipeline {
    api: Arc<dyn StudioApi>,
    store: Arc<dyn SessionStore>,
    session: SharedSession,
}

impl SubmissionPipeline {
    pub fn new(api: Arc<dyn StudioApi>, store: Arc<dyn SessionStore>, session: SharedSession) -> Self {
        Self {
            api,
            store,
            session,
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let context = match self.session.with(|session| session.submission_context()) {
            Ok(context) => context,
            Err(precondition) => {
                let notice = match precondition {
                    PreconditionError::EmptyContent => Notice::error(precondition.to_string()),
                    PreconditionError::StillParsing { .. } => Notice::info(precondition.to_string()),
                };
                self.session.notify(notice);
                return SubmitOutcome::Blocked(precondition);
            }
        };

        let template_file = match self.resolve_template(context.template.clone()).await {
            Ok(file) => file,
            Err(err) => return self.fail(err),
        };

        let request = ProjectRequest {
            mode: context.mode.project_type(),
            content: context.content.clone(),
            template_file,
            style_description: context.style_description.clone(),
        };
        composer_info!(
            "Creating {} project from {} mode ({} bytes of content)",
            request.mode,
            context.mode,
            request.content.len()
        );

        // A leftover id from an earlier project must not be mistaken for this one.
        self.store.remove(CURRENT_PROJECT_KEY);
        if let Err(err) = self.api.initialize_project(&request).await {
            return self.fail(SubmitError::Creation(err));
        }
        let Some(project_id) = self.store.get(CURRENT_PROJECT_KEY) else {
            return self.fail(SubmitError::MissingProjectId);
        };

        let associations = self.associate(&project_id, &context).await;
        let destination = Destination {
            project_id,
            view: context.mode.review_view(),
        };
        composer_info!("Project created, opening {}", destination.path());
        SubmitOutcome::Navigate {
            destination,
            associations,
        }
    }

    async fn resolve_template(
        &self,
        resolution: TemplateResolution,
    ) -> Result<Option<Artifact>, SubmitError> {
        match resolution {
            TemplateResolution::None => Ok(None),
            TemplateResolution::Ready(file) => Ok(Some(file)),
            TemplateResolution::Lookup(template) => {
                let known = self
                    .session
                    .with(|session| session.user_templates().to_vec());
                let file = self
                    .api
                    .resolve_template_file(&template, &known)
                    .await
                    .map_err(|source| SubmitError::TemplateLookup {
                        template: template.clone(),
                        source,
                    })?;
                self.session
                    .with(|session| session.cache_template_file(&template, file.clone()));
                Ok(Some(file))
            }
        }
    }

    /// File associations run concurrently with each other and with the
    /// batched material association; all are awaited.
    async fn associate(&self, project_id: &str, context: &SubmissionContext) -> AssociationReport {
        let files = join_all(context.reference_file_ids.iter().map(|file_id| async move {
            let result = self.api.associate_file_to_project(file_id, project_id).await;
            (file_id.clone(), result)
        }));
        let materials = self
            .api
            .associate_materials_to_project(project_id, &context.material_urls);
        let (file_results, material_result) = join(files, materials).await;

        let mut report = AssociationReport {
            material_urls: context.material_urls.clone(),
            ..AssociationReport::default()
        };
        for (file_id, result) in file_results {
            match result {
                Ok(()) => report.files_associated += 1,
                Err(err) => {
                    composer_warn!("Associating file {} to {} failed: {}", file_id, project_id, err);
                    report.file_failures.push((file_id, err));
                }
            }
        }
        if let Err(err) = material_result {
            composer_warn!(
                "Associating {} material(s) to {} failed: {}",
                context.material_urls.len(),
                project_id,
                err
            );
            report.material_failure = Some(err);
        }
        report
    }

    fn fail(&self, err: SubmitError) -> SubmitOutcome {
        composer_error!("Submission failed: {}", err);
        self.session.notify(Notice::error(err.to_string()));
        SubmitOutcome::Failed(err)
    }
}
