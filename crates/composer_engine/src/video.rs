use std::sync::Arc;

use composer_core::{Artifact, Msg, Notice};
use composer_logging::{composer_debug, composer_error, composer_info};

use crate::{ApiError, BusyFlag, FailureKind, SharedSession, StudioApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Busy,
    NoVideo,
    Done,
    /// The video was replaced or removed while the analysis ran.
    Stale,
    Failed(ApiError),
}

/// Single-flight video analysis feeding the shared content buffer.
#[derive(Clone)]
pub struct VideoAnalysisFlow {
    api: Arc<dyn StudioApi>,
    session: SharedSession,
    busy: BusyFlag,
    prompt: String,
}

impl VideoAnalysisFlow {
    pub fn new(api: Arc<dyn StudioApi>, session: SharedSession, prompt: impl Into<String>) -> Self {
        Self {
            api,
            session,
            busy: BusyFlag::new(),
            prompt: prompt.into(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn select(&self, file: Artifact) {
        self.session.dispatch(Msg::VideoSelected(file));
    }

    pub fn remove(&self) {
        self.session.dispatch(Msg::VideoRemoved);
    }

    pub async fn analyze(&self) -> AnalysisOutcome {
        let Some(_guard) = self.busy.try_acquire() else {
            composer_debug!("Video analysis already running");
            return AnalysisOutcome::Busy;
        };

        let Some((file, generation)) = self
            .session
            .with(|session| session.begin_video_analysis())
        else {
            self.session
                .notify(Notice::error("Please select a video file first"));
            return AnalysisOutcome::NoVideo;
        };

        self.session.notify(Notice::info("Analyzing video..."));
        composer_info!("Analyzing video {} ({} bytes)", file.name, file.size);
        let result = self
            .api
            .analyze_video(&file, &self.prompt)
            .await
            .and_then(|analysis| {
                if analysis.trim().is_empty() {
                    Err(ApiError::new(
                        FailureKind::InvalidResponse,
                        "no analysis returned",
                    ))
                } else {
                    Ok(analysis)
                }
            });

        match result {
            Ok(analysis) => {
                let applied = self
                    .session
                    .with(|session| session.complete_video_analysis(generation, analysis));
                if applied {
                    self.session.notify(Notice::success("Video analysis complete"));
                    AnalysisOutcome::Done
                } else {
                    composer_debug!("Discarding analysis for a video that is no longer selected");
                    AnalysisOutcome::Stale
                }
            }
            Err(err) => {
                composer_error!("Video analysis failed: {}", err);
                self.session
                    .with(|session| session.fail_video_analysis(generation));
                self.session.notify(Notice::error(format!(
                    "Video analysis failed: {}",
                    err.user_message()
                )));
                AnalysisOutcome::Failed(err)
            }
        }
    }
}
