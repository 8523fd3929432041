use serde::{Deserialize, Serialize};

use crate::Artifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateNamespace {
    /// Built-in styles with short numeric ids.
    Preset,
    /// Templates uploaded by the user.
    User,
}

/// A template id tagged with the namespace it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub namespace: TemplateNamespace,
    pub id: String,
}

impl TemplateRef {
    pub fn preset(id: impl Into<String>) -> Self {
        Self {
            namespace: TemplateNamespace::Preset,
            id: id.into(),
        }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            namespace: TemplateNamespace::User,
            id: id.into(),
        }
    }

    /// Infers the namespace of an untagged id: one to three ASCII digits is
    /// a preset, anything else a user template.
    ///
    /// A numeric user-template id of three digits or fewer is misread as a
    /// preset; callers that know the namespace should build the ref directly.
    pub fn classify(id: &str) -> Self {
        let is_preset = (1..=3).contains(&id.len()) && id.bytes().all(|b| b.is_ascii_digit());
        if is_preset {
            Self::preset(id)
        } else {
            Self::user(id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTemplate {
    pub template_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template_image_url: Option<String>,
}

/// Exactly one template source is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateSelection {
    #[default]
    None,
    AdHocFile(Artifact),
    UserTemplate {
        id: String,
        cached: Option<Artifact>,
    },
    PresetTemplate {
        id: String,
        cached: Option<Artifact>,
    },
}

impl TemplateSelection {
    fn from_ref(template: TemplateRef, cached: Option<Artifact>) -> Self {
        match template.namespace {
            TemplateNamespace::Preset => TemplateSelection::PresetTemplate {
                id: template.id,
                cached,
            },
            TemplateNamespace::User => TemplateSelection::UserTemplate {
                id: template.id,
                cached,
            },
        }
    }

    pub fn template_ref(&self) -> Option<TemplateRef> {
        match self {
            TemplateSelection::UserTemplate { id, .. } => Some(TemplateRef::user(id.clone())),
            TemplateSelection::PresetTemplate { id, .. } => Some(TemplateRef::preset(id.clone())),
            TemplateSelection::None | TemplateSelection::AdHocFile(_) => None,
        }
    }
}

/// What submission needs to do to obtain the template blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateResolution {
    None,
    Ready(Artifact),
    Lookup(TemplateRef),
}

/// Template choice plus the free-text style alternative.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateSelector {
    selection: TemplateSelection,
    descriptive_style: bool,
    style_description: String,
}

impl TemplateSelector {
    pub fn selection(&self) -> &TemplateSelection {
        &self.selection
    }

    pub fn descriptive_style(&self) -> bool {
        self.descriptive_style
    }

    pub fn style_description(&self) -> &str {
        &self.style_description
    }

    pub fn select_ad_hoc_file(&mut self, file: Artifact) {
        self.descriptive_style = false;
        self.selection = TemplateSelection::AdHocFile(file);
    }

    pub fn select(&mut self, template: TemplateRef, cached: Option<Artifact>) {
        self.descriptive_style = false;
        self.selection = TemplateSelection::from_ref(template, cached);
    }

    pub fn select_by_id(&mut self, id: &str, cached: Option<Artifact>) {
        self.select(TemplateRef::classify(id), cached);
    }

    /// Descriptive style and template files exclude each other; the
    /// description text survives toggling.
    pub fn toggle_descriptive_style(&mut self, on: bool) {
        self.descriptive_style = on;
        if on {
            self.selection = TemplateSelection::None;
        }
    }

    pub fn set_style_description(&mut self, text: impl Into<String>) {
        self.style_description = text.into();
    }

    /// Trimmed description, or `None` when blank. Sent whatever the toggle.
    pub fn resolved_style_description(&self) -> Option<String> {
        let trimmed = self.style_description.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn resolution(&self) -> TemplateResolution {
        match &self.selection {
            TemplateSelection::None => TemplateResolution::None,
            TemplateSelection::AdHocFile(file) => TemplateResolution::Ready(file.clone()),
            TemplateSelection::UserTemplate {
                cached: Some(file), ..
            }
            | TemplateSelection::PresetTemplate {
                cached: Some(file), ..
            } => TemplateResolution::Ready(file.clone()),
            TemplateSelection::UserTemplate { id, cached: None } => {
                TemplateResolution::Lookup(TemplateRef::user(id.clone()))
            }
            TemplateSelection::PresetTemplate { id, cached: None } => {
                TemplateResolution::Lookup(TemplateRef::preset(id.clone()))
            }
        }
    }

    /// Stores a looked-up blob, provided the same template is still selected.
    pub fn cache_resolved(&mut self, template: &TemplateRef, file: Artifact) -> bool {
        if self.selection.template_ref().as_ref() != Some(template) {
            return false;
        }
        match &mut self.selection {
            TemplateSelection::UserTemplate { cached, .. }
            | TemplateSelection::PresetTemplate { cached, .. } => {
                *cached = Some(file);
                true
            }
            TemplateSelection::None | TemplateSelection::AdHocFile(_) => false,
        }
    }
}
