//! Composer engine: remote collaborators, orchestration and the threaded handle.
mod api;
mod busy;
mod composer;
mod engine;
mod http;
mod notice;
mod persist;
mod session;
mod settings;
mod submit;
mod types;
mod upload;
mod video;
mod watch;

pub use api::{MemorySessionStore, SessionStore, StudioApi, CURRENT_PROJECT_KEY};
pub use busy::{BusyFlag, BusyGuard};
pub use composer::Composer;
pub use engine::ComposerHandle;
pub use http::{ApiSettings, ReqwestStudioApi};
pub use notice::{ChannelNoticeSink, NoticeSink};
pub use persist::{PersistError, StateDir};
pub use session::SharedSession;
pub use settings::{ComposerSettings, DEFAULT_VIDEO_PROMPT};
pub use submit::{AssociationReport, SubmissionPipeline, SubmitError, SubmitOutcome};
pub use types::{ApiError, ComposerEvent, FailureKind, ProjectRequest};
pub use upload::{failure_message, UploadOrchestrator, UploadOutcome};
pub use video::{AnalysisOutcome, VideoAnalysisFlow};
pub use watch::ParseStatusWatcher;
