use crate::policy::is_document_extension;
use crate::Artifact;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    Image,
    Document,
    Video,
    Rejected { extension: Option<String> },
}

impl ArtifactKind {
    /// Whether the host's default paste behaviour should be suppressed.
    pub fn intercepts_paste(&self) -> bool {
        matches!(self, ArtifactKind::Image | ArtifactKind::Document)
    }
}

/// Classifies a clipboard item or a file picked for the reference-file slot.
///
/// Images win over documents; anything else is rejected with its extension.
pub fn classify(file: &Artifact) -> ArtifactKind {
    if file.is_image() {
        return ArtifactKind::Image;
    }
    match file.extension() {
        Some(ext) if is_document_extension(&ext) => ArtifactKind::Document,
        extension => ArtifactKind::Rejected { extension },
    }
}

/// Classifies a file picked in video mode.
pub fn classify_video(file: &Artifact) -> ArtifactKind {
    if file.is_video() {
        ArtifactKind::Video
    } else {
        ArtifactKind::Rejected {
            extension: file.extension(),
        }
    }
}
