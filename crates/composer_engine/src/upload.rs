use std::sync::Arc;

use composer_core::policy::{oversize_message, validate_document, validate_image};
use composer_core::{Artifact, Notice, ParseStatus, PastePlan, ReferenceFile, Rejection};
use composer_logging::{composer_debug, composer_error, composer_info, composer_warn};

use crate::{ApiError, BusyFlag, FailureKind, SharedSession, StudioApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Another upload held the busy flag; nothing was done.
    Busy,
    Rejected(Rejection),
    Failed(ApiError),
    Document(ReferenceFile),
    Image { url: String, caret: usize },
}

/// Uploads reference documents and inline images, one at a time.
///
/// Both entry points share one busy flag: a call made while another is in
/// flight returns [`UploadOutcome::Busy`] without side effects. Failures are
/// reported as notices and returned, never raised.
#[derive(Clone)]
pub struct UploadOrchestrator {
    api: Arc<dyn StudioApi>,
    session: SharedSession,
    busy: BusyFlag,
}

impl UploadOrchestrator {
    pub fn new(api: Arc<dyn StudioApi>, session: SharedSession) -> Self {
        Self {
            api,
            session,
            busy: BusyFlag::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub async fn upload_document(&self, file: Artifact) -> UploadOutcome {
        let Some(_guard) = self.busy.try_acquire() else {
            composer_debug!("Upload of {} ignored: another upload is in flight", file.name);
            return UploadOutcome::Busy;
        };

        let check = match validate_document(&file) {
            Ok(check) => check,
            Err(rejection) => return self.reject(rejection),
        };
        if let Some(advisory) = check.advisory() {
            self.session.notify(Notice::info(advisory));
        }

        composer_info!("Uploading reference file {} ({} bytes)", file.name, file.size);
        let uploaded = match self.api.upload_reference_file(&file, None).await {
            Ok(uploaded) => uploaded,
            Err(err) => return self.fail(err, file.size, "File upload failed"),
        };

        let file_id = uploaded.id.clone();
        let needs_parse = uploaded.parse_status == ParseStatus::Pending;
        self.session
            .with(|session| session.add_reference_file(uploaded.clone()));
        self.session.notify(Notice::success("File uploaded"));

        if needs_parse {
            self.trigger_parse(&file_id).await;
        }

        let current = self
            .session
            .with(|session| session.registry().get(&file_id).cloned());
        UploadOutcome::Document(current.unwrap_or(uploaded))
    }

    /// Uploads documents in order; each upload finishes before the next starts.
    pub async fn upload_documents(&self, files: Vec<Artifact>) -> Vec<UploadOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(self.upload_document(file).await);
        }
        outcomes
    }

    /// Uploads an image and inserts its reference at `caret`.
    ///
    /// `caret` is the offset captured when the user acted; the insertion is
    /// applied to the buffer as it stands once the upload returns.
    pub async fn upload_image(&self, file: Artifact, caret: usize) -> UploadOutcome {
        let Some(_guard) = self.busy.try_acquire() else {
            composer_debug!("Image {} ignored: another upload is in flight", file.name);
            return UploadOutcome::Busy;
        };

        if let Err(rejection) = validate_image(&file) {
            return self.reject(rejection);
        }

        self.session.notify(Notice::info("Uploading image..."));
        composer_info!("Uploading image {} ({} bytes)", file.name, file.size);
        let url = match self.api.upload_material(&file, None).await {
            Ok(url) => url,
            Err(err) => return self.fail(err, file.size, "Image upload failed"),
        };

        let caret = self
            .session
            .with(|session| session.insert_image(caret, &url));
        self.session
            .notify(Notice::success("Image uploaded and inserted at the cursor"));
        UploadOutcome::Image { url, caret }
    }

    /// Executes a paste plan: unsupported items are reported, then the
    /// documents are uploaded in order, then the image.
    pub async fn run_paste(&self, plan: PastePlan, caret: usize) -> Vec<UploadOutcome> {
        for extension in plan.rejected {
            let rejection = Rejection::UnsupportedExtension { extension };
            self.session.notify(Notice::info(rejection.to_string()));
        }
        let mut outcomes = self.upload_documents(plan.documents).await;
        if let Some(image) = plan.image {
            outcomes.push(self.upload_image(image, caret).await);
        }
        outcomes
    }

    async fn trigger_parse(&self, file_id: &str) {
        match self.api.trigger_file_parse(file_id).await {
            Ok(parsed) => {
                if !self
                    .session
                    .with(|session| session.update_reference_file(parsed))
                {
                    composer_debug!("File {} removed before parse started", file_id);
                }
            }
            Err(err) => {
                // The status channel is expected to report progress later.
                composer_warn!("Triggering parse for {} failed: {}", file_id, err);
                self.session
                    .with(|session| session.set_parse_status(file_id, ParseStatus::Parsing));
            }
        }
    }

    fn reject(&self, rejection: Rejection) -> UploadOutcome {
        composer_debug!("Upload rejected before sending: {}", rejection);
        self.session.notify(Notice::error(rejection.to_string()));
        UploadOutcome::Rejected(rejection)
    }

    fn fail(&self, err: ApiError, size: u64, prefix: &str) -> UploadOutcome {
        composer_error!("{}: {}", prefix, err);
        self.session
            .notify(Notice::error(failure_message(&err, size, prefix)));
        UploadOutcome::Failed(err)
    }
}

/// A server-side size refusal reads the same as the client-side pre-check.
pub fn failure_message(err: &ApiError, size: u64, prefix: &str) -> String {
    match err.kind {
        FailureKind::PayloadTooLarge => oversize_message(size),
        _ => format!("{prefix}: {}", err.user_message()),
    }
}
