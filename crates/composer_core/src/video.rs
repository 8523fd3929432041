use crate::policy::{validate_video, Rejection};
use crate::Artifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoStatus {
    #[default]
    Idle,
    Selected,
    Analyzing,
    Done,
    Failed,
}

/// The video picked in video mode and its analysis.
///
/// `generation` changes on every select/remove so a late analysis result for
/// a video that is no longer selected can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoJob {
    file: Option<Artifact>,
    analysis: Option<String>,
    status: VideoStatus,
    generation: u64,
    wrote_buffer: bool,
}

impl VideoJob {
    pub fn file(&self) -> Option<&Artifact> {
        self.file.as_ref()
    }

    pub fn analysis(&self) -> Option<&str> {
        self.analysis.as_deref()
    }

    pub fn status(&self) -> VideoStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the analysis text was copied into the content buffer.
    pub fn wrote_buffer(&self) -> bool {
        self.wrote_buffer
    }

    pub fn select(&mut self, file: Artifact) -> Result<(), Rejection> {
        validate_video(&file)?;
        self.generation += 1;
        self.file = Some(file);
        self.analysis = None;
        self.status = VideoStatus::Selected;
        self.wrote_buffer = false;
        Ok(())
    }

    /// Moves to `Analyzing` and hands out the file plus its generation.
    pub fn begin_analysis(&mut self) -> Option<(Artifact, u64)> {
        let file = self.file.clone()?;
        self.status = VideoStatus::Analyzing;
        Some((file, self.generation))
    }

    /// Records a finished analysis. Returns false for a stale generation.
    pub fn complete(&mut self, generation: u64, analysis: String) -> bool {
        if generation != self.generation || self.file.is_none() {
            return false;
        }
        self.analysis = Some(analysis);
        self.status = VideoStatus::Done;
        self.wrote_buffer = true;
        true
    }

    pub fn fail(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.file.is_none() {
            return false;
        }
        self.status = VideoStatus::Failed;
        true
    }

    /// Drops the file and any result. Returns whether the result had been
    /// written into the content buffer.
    pub fn clear(&mut self) -> bool {
        let wrote_buffer = self.wrote_buffer;
        self.generation += 1;
        self.file = None;
        self.analysis = None;
        self.status = VideoStatus::Idle;
        self.wrote_buffer = false;
        wrote_buffer
    }
}
