use crate::{CreationMode, ParseStatus, TemplateSelection, VideoStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    pub mode: CreationMode,
    pub content: String,
    pub caret: usize,
    pub files: Vec<FileRowView>,
    pub image_urls: Vec<String>,
    pub template: TemplateView,
    pub descriptive_style: bool,
    pub style_description: String,
    pub video_status: VideoStatus,
    pub video_analysis: Option<String>,
    /// Reference files still pending or parsing.
    pub blocking_files: usize,
}

impl ComposerView {
    pub fn can_submit(&self) -> bool {
        !self.content.trim().is_empty() && self.blocking_files == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub file_id: String,
    pub name: String,
    pub status: ParseStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateView {
    None,
    File { name: String },
    User { id: String },
    Preset { id: String },
}

impl From<&TemplateSelection> for TemplateView {
    fn from(selection: &TemplateSelection) -> Self {
        match selection {
            TemplateSelection::None => TemplateView::None,
            TemplateSelection::AdHocFile(file) => TemplateView::File {
                name: file.name.clone(),
            },
            TemplateSelection::UserTemplate { id, .. } => TemplateView::User { id: id.clone() },
            TemplateSelection::PresetTemplate { id, .. } => TemplateView::Preset { id: id.clone() },
        }
    }
}
