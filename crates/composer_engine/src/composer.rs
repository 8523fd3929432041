use std::sync::Arc;

use composer_core::policy::validate_image;
use composer_core::{Artifact, ComposerSession, Msg, Notice, UserTemplate};
use composer_logging::{composer_error, composer_info, composer_warn};

use crate::{
    failure_message, ComposerSettings, NoticeSink, ParseStatusWatcher, SessionStore, SharedSession, StudioApi,
    SubmissionPipeline, UploadOrchestrator, VideoAnalysisFlow,
};

/// One composition screen: the shared session and the orchestrators that
/// act on it.
#[derive(Clone)]
pub struct Composer {
    pub session: SharedSession,
    pub uploads: UploadOrchestrator,
    pub video: VideoAnalysisFlow,
    pub submission: SubmissionPipeline,
    pub watcher: ParseStatusWatcher,
    api: Arc<dyn StudioApi>,
}

impl Composer {
    pub fn new(
        api: Arc<dyn StudioApi>,
        store: Arc<dyn SessionStore>,
        notices: Arc<dyn NoticeSink>,
        settings: &ComposerSettings,
    ) -> Self {
        let session = SharedSession::new(ComposerSession::new(), notices);
        Self {
            uploads: UploadOrchestrator::new(api.clone(), session.clone()),
            video: VideoAnalysisFlow::new(api.clone(), session.clone(), settings.video_prompt.clone()),
            submission: SubmissionPipeline::new(api.clone(), store, session.clone()),
            watcher: ParseStatusWatcher::new(
                api.clone(),
                session.clone(),
                settings.parse_poll_interval,
            ),
            session,
            api,
        }
    }

    /// Loads the user's templates so template ids can be resolved at submit.
    /// Returns how many are known afterwards.
    pub async fn load_user_templates(&self) -> usize {
        match self.api.list_user_templates().await {
            Ok(templates) => {
                let count = templates.len();
                self.session.dispatch(Msg::UserTemplatesLoaded(templates));
                count
            }
            Err(err) => {
                composer_warn!("Loading user templates failed: {}", err);
                0
            }
        }
    }

    /// Uploads an image to the user's template library and selects it.
    pub async fn upload_user_template(&self, file: Artifact) -> Option<UserTemplate> {
        if let Err(rejection) = validate_image(&file) {
            self.session.notify(Notice::error(rejection.to_string()));
            return None;
        }
        composer_info!("Uploading user template {} ({} bytes)", file.name, file.size);
        match self.api.upload_user_template(&file).await {
            Ok(template) => {
                self.session.dispatch(Msg::UserTemplateUploaded(template.clone()));
                Some(template)
            }
            Err(err) => {
                composer_error!("Template upload failed: {}", err);
                self.session.notify(Notice::error(failure_message(
                    &err,
                    file.size,
                    "Template upload failed",
                )));
                None
            }
        }
    }
}
