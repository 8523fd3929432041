use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use composer_core::{
    Artifact, CreationMode, ReferenceFile, TemplateNamespace, TemplateRef, UserTemplate,
};
use composer_logging::{composer_debug, composer_info, composer_warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    ApiError, FailureKind, ProjectRequest, SessionStore, StudioApi, CURRENT_PROJECT_KEY,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Video analysis runs far longer than any other call.
    pub video_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            video_timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    data: Option<T>,
    error: Option<ErrorBody>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct FileData {
    file: ReferenceFile,
}

#[derive(Debug, Deserialize)]
struct UrlData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisData {
    analysis: String,
}

#[derive(Debug, Deserialize)]
struct ProjectData {
    project_id: String,
}

#[derive(Debug, Deserialize)]
struct TemplatesData {
    #[serde(default)]
    templates: Vec<UserTemplate>,
}

#[derive(Debug, Serialize)]
struct CreateProjectBody<'a> {
    creation_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    idea_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outline_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_style: Option<&'a str>,
}

impl<'a> CreateProjectBody<'a> {
    fn new(request: &'a ProjectRequest) -> Self {
        let content = Some(request.content.as_str());
        let mut body = Self {
            creation_type: request.mode.as_str(),
            idea_prompt: None,
            outline_text: None,
            description_text: None,
            template_style: request.style_description.as_deref(),
        };
        match request.mode {
            CreationMode::Idea => body.idea_prompt = content,
            CreationMode::Outline => body.outline_text = content,
            CreationMode::Description | CreationMode::Video => body.description_text = content,
        }
        body
    }
}

#[derive(Debug, Serialize)]
struct AssociateFileBody<'a> {
    project_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AssociateMaterialsBody<'a> {
    project_id: &'a str,
    material_urls: &'a [String],
}

/// [`StudioApi`] over the studio's REST endpoints.
///
/// Project creation writes the new id into the [`SessionStore`] it was
/// built with.
pub struct ReqwestStudioApi {
    base: Url,
    client: reqwest::Client,
    settings: ApiSettings,
    store: Arc<dyn SessionStore>,
}

impl ReqwestStudioApi {
    pub fn new(settings: ApiSettings, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            base,
            client,
            settings,
            store,
        })
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Bytes, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        composer_debug!("{} answered {} ({} bytes)", url, status, body.len());

        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return Err(ApiError::new(
                FailureKind::PayloadTooLarge,
                server_message(&body).unwrap_or_else(|| status.to_string()),
            ));
        }
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                server_message(&body).unwrap_or_else(|| status.to_string()),
            ));
        }
        Ok(body)
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        let envelope = parse_envelope::<T>(&body)?;
        envelope
            .data
            .ok_or_else(|| ApiError::new(FailureKind::InvalidResponse, "response carried no data"))
    }

    /// For calls whose envelope carries no data.
    async fn acknowledge(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let body = self.send(request).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        parse_envelope::<serde_json::Value>(&body).map(|_| ())
    }

    async fn fetch_blob(&self, url: Url, name: String) -> Result<Artifact, ApiError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{url}: {status}"),
            ));
        }
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| "image/png".to_string());
        let data = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(Artifact::new(name, mime_type, data))
    }

    fn user_template_url(
        &self,
        id: &str,
        known: &[UserTemplate],
    ) -> Result<Url, ApiError> {
        let template = known
            .iter()
            .find(|template| template.template_id == id)
            .ok_or_else(|| {
                ApiError::new(
                    FailureKind::InvalidRequest,
                    format!("user template {id} is not known"),
                )
            })?;
        let raw = template.template_image_url.as_deref().ok_or_else(|| {
            ApiError::new(
                FailureKind::InvalidResponse,
                format!("user template {id} has no image"),
            )
        })?;
        self.base
            .join(raw)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn upload_project_template(
        &self,
        project_id: &str,
        template: &Artifact,
    ) -> Result<(), ApiError> {
        let form = Form::new().part("template_image", file_part(template)?);
        let request = self
            .client
            .post(self.endpoint(&["api", "projects", project_id, "template"]))
            .multipart(form);
        self.acknowledge(request).await
    }
}

#[async_trait::async_trait]
impl StudioApi for ReqwestStudioApi {
    async fn upload_reference_file(
        &self,
        file: &Artifact,
        project_id: Option<&str>,
    ) -> Result<ReferenceFile, ApiError> {
        let mut form = Form::new().part("file", file_part(file)?);
        if let Some(project_id) = project_id {
            form = form.text("project_id", project_id.to_string());
        }
        let request = self
            .client
            .post(self.endpoint(&["api", "reference-files", "upload"]))
            .multipart(form);
        let data: FileData = self.call(request).await?;
        Ok(data.file)
    }

    async fn trigger_file_parse(&self, file_id: &str) -> Result<ReferenceFile, ApiError> {
        let request = self
            .client
            .post(self.endpoint(&["api", "reference-files", file_id, "parse"]));
        let data: FileData = self.call(request).await?;
        Ok(data.file)
    }

    async fn get_reference_file(&self, file_id: &str) -> Result<ReferenceFile, ApiError> {
        let request = self
            .client
            .get(self.endpoint(&["api", "reference-files", file_id]));
        let data: FileData = self.call(request).await?;
        Ok(data.file)
    }

    async fn upload_material(
        &self,
        file: &Artifact,
        project_id: Option<&str>,
    ) -> Result<String, ApiError> {
        let mut form = Form::new().part("file", file_part(file)?);
        if let Some(project_id) = project_id {
            form = form.text("project_id", project_id.to_string());
        }
        let request = self
            .client
            .post(self.endpoint(&["api", "materials", "upload"]))
            .multipart(form);
        let data: UrlData = self.call(request).await?;
        Ok(data.url)
    }

    async fn associate_file_to_project(
        &self,
        file_id: &str,
        project_id: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.endpoint(&["api", "reference-files", file_id, "associate"]))
            .json(&AssociateFileBody { project_id });
        self.acknowledge(request).await
    }

    async fn associate_materials_to_project(
        &self,
        project_id: &str,
        urls: &[String],
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.endpoint(&["api", "materials", "associate"]))
            .json(&AssociateMaterialsBody {
                project_id,
                material_urls: urls,
            });
        self.acknowledge(request).await
    }

    async fn analyze_video(&self, file: &Artifact, prompt: &str) -> Result<String, ApiError> {
        let form = Form::new()
            .part("file", file_part(file)?)
            .text("prompt", prompt.to_string());
        let request = self
            .client
            .post(self.endpoint(&["api", "video-analysis"]))
            .timeout(self.settings.video_timeout)
            .multipart(form);
        let data: AnalysisData = self.call(request).await?;
        Ok(data.analysis)
    }

    async fn initialize_project(&self, request: &ProjectRequest) -> Result<(), ApiError> {
        let body = CreateProjectBody::new(request);
        let call = self
            .client
            .post(self.endpoint(&["api", "projects"]))
            .json(&body);
        let data: ProjectData = self.call(call).await?;
        composer_info!("Project {} created ({})", data.project_id, request.mode);

        if let Some(template) = &request.template_file {
            // The project exists at this point; a missing template is not fatal.
            if let Err(err) = self.upload_project_template(&data.project_id, template).await {
                composer_warn!(
                    "Uploading template {} for project {} failed: {}",
                    template.name,
                    data.project_id,
                    err
                );
            }
        }

        self.store.set(CURRENT_PROJECT_KEY, &data.project_id);
        Ok(())
    }

    async fn list_user_templates(&self) -> Result<Vec<UserTemplate>, ApiError> {
        let request = self.client.get(self.endpoint(&["api", "user-templates"]));
        let data: TemplatesData = self.call(request).await?;
        Ok(data.templates)
    }

    async fn upload_user_template(&self, file: &Artifact) -> Result<UserTemplate, ApiError> {
        let form = Form::new().part("template_image", file_part(file)?);
        let request = self
            .client
            .post(self.endpoint(&["api", "user-templates"]))
            .multipart(form);
        self.call(request).await
    }

    async fn resolve_template_file(
        &self,
        template: &TemplateRef,
        known_user_templates: &[UserTemplate],
    ) -> Result<Artifact, ApiError> {
        let (url, name) = match template.namespace {
            TemplateNamespace::Preset => {
                let filename = format!("template_{}.png", template.id);
                (self.endpoint(&["templates", &filename]), filename)
            }
            TemplateNamespace::User => (
                self.user_template_url(&template.id, known_user_templates)?,
                format!("user_template_{}.png", template.id),
            ),
        };
        composer_debug!("Fetching template {} from {}", template.id, url);
        self.fetch_blob(url, name).await
    }
}

fn file_part(file: &Artifact) -> Result<Part, ApiError> {
    Part::bytes(file.data.to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)
        .map_err(|err| ApiError::new(FailureKind::InvalidRequest, err.to_string()))
}

fn parse_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Envelope<T>, ApiError> {
    let envelope: Envelope<T> = serde_json::from_slice(body)
        .map_err(|err| ApiError::new(FailureKind::InvalidResponse, err.to_string()))?;
    if !envelope.success {
        let message = envelope
            .error
            .as_ref()
            .map(|error| error.message.clone())
            .unwrap_or_default();
        return Err(ApiError::new(FailureKind::InvalidResponse, message));
    }
    Ok(envelope)
}

/// Error text from an error envelope, with its code when one is given.
fn server_message(body: &[u8]) -> Option<String> {
    let envelope: Envelope<serde_json::Value> = serde_json::from_slice(body).ok()?;
    let error = envelope.error?;
    if error.message.trim().is_empty() {
        return error.code;
    }
    Some(error.message)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidRequest, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
