use std::sync::{mpsc, Arc};
use std::thread;

use composer_core::{plan_paste, Artifact, ComposerView, Msg, PastePlan};
use composer_logging::{composer_debug, composer_error};
use tokio_util::sync::CancellationToken;

use crate::{
    ChannelNoticeSink, Composer, ComposerEvent, ComposerSettings, SessionStore, StudioApi,
    SubmitOutcome,
};

enum ComposerCommand {
    Paste { plan: PastePlan, caret: usize },
    PickDocuments(Vec<Artifact>),
    AttachImage { file: Artifact, caret: usize },
    AnalyzeVideo,
    Submit,
    LoadUserTemplates,
    UploadUserTemplate(Artifact),
}

/// Runs a [`Composer`] on a background runtime thread.
///
/// Commands are spawned as independent tasks, so a second upload issued
/// while one is running meets the busy flag rather than a queue. Events are
/// drained with [`ComposerHandle::try_recv`].
pub struct ComposerHandle {
    cmd_tx: mpsc::Sender<ComposerCommand>,
    event_rx: mpsc::Receiver<ComposerEvent>,
    composer: Composer,
    cancel: CancellationToken,
}

impl ComposerHandle {
    pub fn new(
        api: Arc<dyn StudioApi>,
        store: Arc<dyn SessionStore>,
        settings: ComposerSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let notices = Arc::new(ChannelNoticeSink::new(event_tx.clone()));
        let composer = Composer::new(api, store, notices, &settings);
        let cancel = CancellationToken::new();

        let worker = composer.clone();
        let watch_cancel = cancel.clone();
        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    composer_error!("Could not start the composer runtime: {}", err);
                    return;
                }
            };
            let watcher = worker.watcher.clone();
            runtime.spawn(async move { watcher.run(watch_cancel).await });

            while let Ok(command) = cmd_rx.recv() {
                let composer = worker.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&composer, command, event_tx).await;
                });
            }
            composer_debug!("Composer command channel closed");
        });

        Self {
            cmd_tx,
            event_rx,
            composer,
            cancel,
        }
    }

    /// Applies a synchronous user event on the caller's thread, so it is
    /// visible to every command sent afterwards.
    pub fn dispatch(&self, msg: Msg) {
        self.composer.session.dispatch(msg);
    }

    /// Plans a paste synchronously and starts the uploads it needs.
    ///
    /// Returns whether the host should suppress its default paste behaviour.
    pub fn paste(&self, items: Vec<Artifact>, caret: usize) -> bool {
        let plan = plan_paste(items);
        let suppress = plan.suppress_default;
        if !plan.is_empty() {
            self.send(ComposerCommand::Paste { plan, caret });
        }
        suppress
    }

    pub fn pick_documents(&self, files: Vec<Artifact>) {
        self.send(ComposerCommand::PickDocuments(files));
    }

    pub fn attach_image(&self, file: Artifact, caret: usize) {
        self.send(ComposerCommand::AttachImage { file, caret });
    }

    pub fn analyze_video(&self) {
        self.send(ComposerCommand::AnalyzeVideo);
    }

    pub fn submit(&self) {
        self.send(ComposerCommand::Submit);
    }

    pub fn load_user_templates(&self) {
        self.send(ComposerCommand::LoadUserTemplates);
    }

    pub fn upload_user_template(&self, file: Artifact) {
        self.send(ComposerCommand::UploadUserTemplate(file));
    }

    pub fn is_uploading(&self) -> bool {
        self.composer.uploads.is_busy()
    }

    pub fn is_analyzing(&self) -> bool {
        self.composer.video.is_busy()
    }

    pub fn view(&self) -> ComposerView {
        self.composer.session.view()
    }

    /// Returns a view only when the session changed since the previous
    /// call; hosts redraw from it.
    pub fn changed_view(&self) -> Option<ComposerView> {
        self.composer.session.changed_view()
    }

    pub fn try_recv(&self) -> Option<ComposerEvent> {
        self.event_rx.try_recv().ok()
    }

    fn send(&self, command: ComposerCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

impl Drop for ComposerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn handle_command(
    composer: &Composer,
    command: ComposerCommand,
    event_tx: mpsc::Sender<ComposerEvent>,
) {
    let event = match command {
        ComposerCommand::Paste { plan, caret } => {
            ComposerEvent::UploadFinished(composer.uploads.run_paste(plan, caret).await)
        }
        ComposerCommand::PickDocuments(files) => {
            ComposerEvent::UploadFinished(composer.uploads.upload_documents(files).await)
        }
        ComposerCommand::AttachImage { file, caret } => {
            ComposerEvent::UploadFinished(vec![composer.uploads.upload_image(file, caret).await])
        }
        ComposerCommand::AnalyzeVideo => ComposerEvent::AnalysisFinished(composer.video.analyze().await),
        ComposerCommand::Submit => match composer.submission.submit().await {
            SubmitOutcome::Navigate { destination, .. } => ComposerEvent::Navigate(destination),
            SubmitOutcome::Blocked(precondition) => ComposerEvent::SubmitBlocked(precondition),
            SubmitOutcome::Failed(err) => ComposerEvent::SubmitFailed(err.to_string()),
        },
        ComposerCommand::LoadUserTemplates => {
            ComposerEvent::UserTemplatesLoaded(composer.load_user_templates().await)
        }
        ComposerCommand::UploadUserTemplate(file) => {
            ComposerEvent::UserTemplateUploaded(composer.upload_user_template(file).await)
        }
    };
    let _ = event_tx.send(event);
}
