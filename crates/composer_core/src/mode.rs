use std::fmt;

/// High-level intent of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CreationMode {
    #[default]
    Idea,
    Outline,
    Description,
    Video,
}

impl CreationMode {
    pub const ALL: [CreationMode; 4] = [
        CreationMode::Idea,
        CreationMode::Outline,
        CreationMode::Description,
        CreationMode::Video,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CreationMode::Idea => "idea",
            CreationMode::Outline => "outline",
            CreationMode::Description => "description",
            CreationMode::Video => "video",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    /// Mode sent to project creation. A video submission already carries the
    /// analysed text, so it is created as a description project.
    pub fn project_type(self) -> CreationMode {
        match self {
            CreationMode::Video => CreationMode::Description,
            other => other,
        }
    }

    /// Review screen opened after creation.
    pub fn review_view(self) -> ReviewView {
        match self {
            CreationMode::Idea | CreationMode::Outline => ReviewView::Outline,
            CreationMode::Description | CreationMode::Video => ReviewView::Detail,
        }
    }
}

impl fmt::Display for CreationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewView {
    Outline,
    Detail,
}

/// Where the user goes once the project exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub project_id: String,
    pub view: ReviewView,
}

impl Destination {
    pub fn path(&self) -> String {
        let view = match self.view {
            ReviewView::Outline => "outline",
            ReviewView::Detail => "detail",
        };
        format!("/project/{}/{view}", self.project_id)
    }
}
