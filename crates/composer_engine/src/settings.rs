use std::time::Duration;

pub const DEFAULT_VIDEO_PROMPT: &str =
    "Analyze this video in detail and extract its key information and structure";

#[derive(Debug, Clone)]
pub struct ComposerSettings {
    pub video_prompt: String,
    pub parse_poll_interval: Duration,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            video_prompt: DEFAULT_VIDEO_PROMPT.to_string(),
            parse_poll_interval: Duration::from_secs(3),
        }
    }
}
