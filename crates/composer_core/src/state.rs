use thiserror::Error;

use crate::buffer::image_markdown;
use crate::policy::Rejection;
use crate::view_model::{ComposerView, FileRowView};
use crate::{
    Artifact, ContentBuffer, CreationMode, ParseStatus, ReferenceFile, ReferenceRegistry,
    TemplateRef, TemplateResolution, TemplateSelector, UserTemplate, VideoJob,
};

/// Why a submission was refused before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Please enter some content")]
    EmptyContent,
    #[error("{count} reference file(s) are still being parsed, please wait for parsing to finish")]
    StillParsing { count: usize },
}

/// Everything submission needs, captured at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionContext {
    pub mode: CreationMode,
    pub content: String,
    pub template: TemplateResolution,
    pub style_description: Option<String>,
    pub reference_file_ids: Vec<String>,
    pub material_urls: Vec<String>,
}

/// State of one composition screen. All mutation goes through `update` or
/// the operations below.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerSession {
    mode: CreationMode,
    buffer: ContentBuffer,
    caret: usize,
    registry: ReferenceRegistry,
    template: TemplateSelector,
    user_templates: Vec<UserTemplate>,
    video: VideoJob,
    dirty: bool,
}

impl ComposerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> CreationMode {
        self.mode
    }

    pub fn buffer(&self) -> &ContentBuffer {
        &self.buffer
    }

    pub fn content(&self) -> &str {
        self.buffer.as_str()
    }

    /// Last known caret offset reported by the host.
    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn registry(&self) -> &ReferenceRegistry {
        &self.registry
    }

    pub fn template(&self) -> &TemplateSelector {
        &self.template
    }

    pub fn user_templates(&self) -> &[UserTemplate] {
        &self.user_templates
    }

    pub fn video(&self) -> &VideoJob {
        &self.video
    }

    pub fn view(&self) -> ComposerView {
        ComposerView {
            mode: self.mode,
            content: self.buffer.as_str().to_string(),
            caret: self.caret,
            files: self
                .registry
                .files()
                .iter()
                .map(|file| FileRowView {
                    file_id: file.id.clone(),
                    name: file.name.clone(),
                    status: file.parse_status,
                })
                .collect(),
            image_urls: self.buffer.image_urls(),
            template: self.template.selection().into(),
            descriptive_style: self.template.descriptive_style(),
            style_description: self.template.style_description().to_string(),
            video_status: self.video.status(),
            video_analysis: self.video.analysis().map(ToOwned::to_owned),
            blocking_files: self.registry.blocking_count(),
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn edit_content(&mut self, text: String, caret: usize) {
        self.buffer.set(text);
        self.caret = self.buffer.clamp_offset(caret);
        self.mark_dirty();
    }

    pub(crate) fn move_caret(&mut self, caret: usize) {
        let caret = self.buffer.clamp_offset(caret);
        if caret != self.caret {
            self.caret = caret;
            self.mark_dirty();
        }
    }

    /// Switching away from video mode discards the video job, and the
    /// content too when it came from the analysis.
    pub(crate) fn switch_mode(&mut self, mode: CreationMode) {
        if mode == self.mode {
            return;
        }
        if self.mode == CreationMode::Video && self.video.clear() {
            self.buffer.clear();
            self.caret = 0;
        }
        self.mode = mode;
        self.mark_dirty();
    }

    pub(crate) fn merge_reference_files(&mut self, selected: Vec<ReferenceFile>) {
        self.registry.merge(selected);
        self.mark_dirty();
    }

    pub(crate) fn remove_reference_file(&mut self, file_id: &str) -> bool {
        let removed = self.registry.remove(file_id).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    pub(crate) fn remove_image(&mut self, url: &str) {
        self.buffer.remove_by_url(url);
        self.caret = self.buffer.clamp_offset(self.caret);
        self.mark_dirty();
    }

    pub(crate) fn template_mut(&mut self) -> &mut TemplateSelector {
        self.mark_dirty();
        &mut self.template
    }

    pub(crate) fn set_user_templates(&mut self, templates: Vec<UserTemplate>) {
        self.user_templates = templates;
    }

    pub(crate) fn add_user_template(&mut self, template: UserTemplate) {
        self.user_templates
            .retain(|known| known.template_id != template.template_id);
        let selected = TemplateRef::user(template.template_id.clone());
        self.user_templates.insert(0, template);
        self.template.select(selected, None);
        self.mark_dirty();
    }

    pub(crate) fn select_video(&mut self, file: Artifact) -> Result<(), Rejection> {
        self.video.select(file)?;
        self.mark_dirty();
        Ok(())
    }

    /// Drops the video; the content is cleared only while video mode is active.
    pub(crate) fn remove_video(&mut self) {
        self.video.clear();
        if self.mode == CreationMode::Video {
            self.buffer.clear();
            self.caret = 0;
        }
        self.mark_dirty();
    }

    /// Inserts an image reference at `caret` as the buffer stands now and
    /// moves the caret past it.
    pub fn insert_image(&mut self, caret: usize, url: &str) -> usize {
        self.caret = self.buffer.insert_at(caret, &image_markdown(url));
        self.mark_dirty();
        self.caret
    }

    pub fn add_reference_file(&mut self, file: ReferenceFile) {
        self.registry.push(file);
        self.mark_dirty();
    }

    /// Applies a fresh record for a known file; unknown ids are ignored.
    pub fn update_reference_file(&mut self, file: ReferenceFile) -> bool {
        let applied = self.registry.replace(file);
        if applied {
            self.mark_dirty();
        }
        applied
    }

    pub fn set_parse_status(&mut self, file_id: &str, status: ParseStatus) -> bool {
        let applied = self.registry.set_status(file_id, status);
        if applied {
            self.mark_dirty();
        }
        applied
    }

    pub fn begin_video_analysis(&mut self) -> Option<(Artifact, u64)> {
        let started = self.video.begin_analysis();
        if started.is_some() {
            self.mark_dirty();
        }
        started
    }

    /// Stores the analysis in the job and in the content buffer. Stale
    /// results are dropped.
    pub fn complete_video_analysis(&mut self, generation: u64, analysis: String) -> bool {
        if !self.video.complete(generation, analysis.clone()) {
            return false;
        }
        self.caret = analysis.len();
        self.buffer.set(analysis);
        self.mark_dirty();
        true
    }

    pub fn fail_video_analysis(&mut self, generation: u64) -> bool {
        let applied = self.video.fail(generation);
        if applied {
            self.mark_dirty();
        }
        applied
    }

    pub fn cache_template_file(&mut self, template: &TemplateRef, file: Artifact) -> bool {
        self.template.cache_resolved(template, file)
    }

    /// Checks submission preconditions in order and captures the context.
    pub fn submission_context(&self) -> Result<SubmissionContext, PreconditionError> {
        if self.buffer.is_blank() {
            return Err(PreconditionError::EmptyContent);
        }
        let blocking = self.registry.blocking_count();
        if blocking > 0 {
            return Err(PreconditionError::StillParsing { count: blocking });
        }
        Ok(SubmissionContext {
            mode: self.mode,
            content: self.buffer.as_str().to_string(),
            template: self.template.resolution(),
            style_description: self.template.resolved_style_description(),
            reference_file_ids: self.registry.ids(),
            material_urls: self.buffer.image_urls(),
        })
    }
}
