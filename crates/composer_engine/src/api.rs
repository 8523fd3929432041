use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use composer_core::{Artifact, ReferenceFile, TemplateRef, UserTemplate};

use crate::{ApiError, ProjectRequest};

/// Session-storage key under which project creation leaves the new id.
pub const CURRENT_PROJECT_KEY: &str = "currentProjectId";

/// Remote procedures the composer depends on. `project_id == None` stores
/// an artifact globally, unassociated with any project.
#[async_trait::async_trait]
pub trait StudioApi: Send + Sync {
    async fn upload_reference_file(
        &self,
        file: &Artifact,
        project_id: Option<&str>,
    ) -> Result<ReferenceFile, ApiError>;

    async fn trigger_file_parse(&self, file_id: &str) -> Result<ReferenceFile, ApiError>;

    async fn get_reference_file(&self, file_id: &str) -> Result<ReferenceFile, ApiError>;

    /// Uploads an image to the material library and returns its public URL.
    async fn upload_material(
        &self,
        file: &Artifact,
        project_id: Option<&str>,
    ) -> Result<String, ApiError>;

    async fn associate_file_to_project(
        &self,
        file_id: &str,
        project_id: &str,
    ) -> Result<(), ApiError>;

    async fn associate_materials_to_project(
        &self,
        project_id: &str,
        urls: &[String],
    ) -> Result<(), ApiError>;

    async fn analyze_video(&self, file: &Artifact, prompt: &str) -> Result<String, ApiError>;

    /// Creates the project; the new id is then readable from the session
    /// store under [`CURRENT_PROJECT_KEY`].
    async fn initialize_project(&self, request: &ProjectRequest) -> Result<(), ApiError>;

    async fn list_user_templates(&self) -> Result<Vec<UserTemplate>, ApiError>;

    /// Adds an image to the user's template library.
    async fn upload_user_template(&self, file: &Artifact) -> Result<UserTemplate, ApiError>;

    async fn resolve_template_file(
        &self,
        template: &TemplateRef,
        known_user_templates: &[UserTemplate],
    ) -> Result<Artifact, ApiError>;
}

/// Session-scoped key/value storage shared with the project-creation collaborator.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
