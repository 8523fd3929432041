use std::fmt;

use composer_core::{Artifact, CreationMode, Destination, Notice, PreconditionError, UserTemplate};
use thiserror::Error;

use crate::{AnalysisOutcome, UploadOutcome};

/// Failure reported by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Server-provided text, or a generic fallback when there is none.
    pub fn user_message(&self) -> &str {
        if self.message.trim().is_empty() {
            "unknown error"
        } else {
            &self.message
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidRequest,
    /// The server refused the body size (HTTP 413).
    PayloadTooLarge,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::PayloadTooLarge => write!(f, "payload too large"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

/// Arguments of project creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    pub mode: CreationMode,
    pub content: String,
    pub template_file: Option<Artifact>,
    pub style_description: Option<String>,
}

/// Events surfaced to the host of a `ComposerHandle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerEvent {
    Notice(Notice),
    /// A paste or picker command ran to completion.
    UploadFinished(Vec<UploadOutcome>),
    AnalysisFinished(AnalysisOutcome),
    /// Number of user templates now known; zero when loading failed.
    UserTemplatesLoaded(usize),
    /// The uploaded template, now selected; `None` when the upload failed.
    UserTemplateUploaded(Option<UserTemplate>),
    Navigate(Destination),
    SubmitBlocked(PreconditionError),
    SubmitFailed(String),
}
