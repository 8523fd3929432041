//! Composer core: pure composition state, validation and the message reducer.
mod artifact;
mod buffer;
mod classify;
mod effect;
mod mode;
mod msg;
mod paste;
pub mod policy;
mod registry;
mod state;
mod template;
mod update;
mod video;
mod view_model;

pub use artifact::Artifact;
pub use buffer::{image_markdown, ContentBuffer};
pub use classify::{classify, classify_video, ArtifactKind};
pub use effect::{Effect, Notice, NoticeLevel};
pub use mode::{CreationMode, Destination, ReviewView};
pub use msg::Msg;
pub use paste::{plan_paste, PastePlan};
pub use policy::{DocumentCheck, Rejection};
pub use registry::{ParseStatus, ReferenceFile, ReferenceRegistry};
pub use state::{ComposerSession, PreconditionError, SubmissionContext};
pub use template::{
    TemplateNamespace, TemplateRef, TemplateResolution, TemplateSelection, TemplateSelector,
    UserTemplate,
};
pub use update::update;
pub use video::{VideoJob, VideoStatus};
pub use view_model::{ComposerView, FileRowView, TemplateView};
