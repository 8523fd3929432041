#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Once};

use composer_core::{
    Artifact, Notice, ParseStatus, ReferenceFile, TemplateNamespace, TemplateRef, UserTemplate,
};
use composer_engine::{
    ApiError, Composer, ComposerSettings, FailureKind, MemorySessionStore, NoticeSink,
    ProjectRequest, SessionStore, StudioApi, CURRENT_PROJECT_KEY,
};
use tokio::sync::Notify;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(composer_logging::initialize_for_tests);
}

pub fn pdf(name: &str) -> Artifact {
    Artifact::new(name, "application/pdf", vec![1u8; 32])
}

pub fn png(name: &str) -> Artifact {
    Artifact::new(name, "image/png", vec![2u8; 32])
}

pub fn mp4(name: &str) -> Artifact {
    Artifact::new(name, "video/mp4", vec![3u8; 64])
}

/// What the fake answers; tests adjust it through [`FakeStudioApi::configure`].
pub struct FakeBehaviour {
    pub upload_status: ParseStatus,
    pub upload_error: Option<ApiError>,
    pub parse_result: Result<ParseStatus, ApiError>,
    pub statuses: HashMap<String, ParseStatus>,
    pub material_error: Option<ApiError>,
    pub video_result: Result<String, ApiError>,
    pub project_id: Option<String>,
    pub create_error: Option<ApiError>,
    pub failing_file_associations: HashSet<String>,
    pub material_association_error: Option<ApiError>,
    pub user_templates: Vec<UserTemplate>,
    pub template_error: Option<ApiError>,
    pub template_upload_error: Option<ApiError>,
}

impl Default for FakeBehaviour {
    fn default() -> Self {
        Self {
            upload_status: ParseStatus::Pending,
            upload_error: None,
            parse_result: Ok(ParseStatus::Parsing),
            statuses: HashMap::new(),
            material_error: None,
            video_result: Ok("Scene 1: a river at dawn".to_string()),
            project_id: Some("p-1".to_string()),
            create_error: None,
            failing_file_associations: HashSet::new(),
            material_association_error: None,
            user_templates: Vec::new(),
            template_error: None,
            template_upload_error: None,
        }
    }
}

/// In-memory studio that records every call it receives.
pub struct FakeStudioApi {
    store: Arc<dyn SessionStore>,
    behaviour: Mutex<FakeBehaviour>,
    calls: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProjectRequest>>,
    material_batches: Mutex<Vec<(String, Vec<String>)>>,
    next_id: Mutex<u32>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeStudioApi {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            behaviour: Mutex::new(FakeBehaviour::default()),
            calls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            material_batches: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
            gate: Mutex::new(None),
        }
    }

    pub fn configure(&self, f: impl FnOnce(&mut FakeBehaviour)) {
        f(&mut self.behaviour.lock().unwrap());
    }

    /// Uploads and video analysis wait on the returned gate until released.
    pub fn hold_transfers(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_named(&self, name: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.split(':').next() == Some(name))
            .collect()
    }

    pub fn project_requests(&self) -> Vec<ProjectRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn material_batches(&self) -> Vec<(String, Vec<String>)> {
        self.material_batches.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn wait_for_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn next_file_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("file-{next}")
    }
}

#[async_trait::async_trait]
impl StudioApi for FakeStudioApi {
    async fn upload_reference_file(
        &self,
        file: &Artifact,
        _project_id: Option<&str>,
    ) -> Result<ReferenceFile, ApiError> {
        self.record(format!("upload_reference_file:{}", file.name));
        self.wait_for_gate().await;
        let (status, error) = {
            let behaviour = self.behaviour.lock().unwrap();
            (behaviour.upload_status, behaviour.upload_error.clone())
        };
        if let Some(error) = error {
            return Err(error);
        }
        Ok(ReferenceFile::new(self.next_file_id(), file.name.clone(), status))
    }

    async fn trigger_file_parse(&self, file_id: &str) -> Result<ReferenceFile, ApiError> {
        self.record(format!("trigger_file_parse:{file_id}"));
        let result = self.behaviour.lock().unwrap().parse_result.clone();
        result.map(|status| ReferenceFile::new(file_id, "parsed", status))
    }

    async fn get_reference_file(&self, file_id: &str) -> Result<ReferenceFile, ApiError> {
        self.record(format!("get_reference_file:{file_id}"));
        let status = self.behaviour.lock().unwrap().statuses.get(file_id).copied();
        status
            .map(|status| ReferenceFile::new(file_id, "polled", status))
            .ok_or_else(|| ApiError::new(FailureKind::HttpStatus(404), "not found"))
    }

    async fn upload_material(
        &self,
        file: &Artifact,
        _project_id: Option<&str>,
    ) -> Result<String, ApiError> {
        self.record(format!("upload_material:{}", file.name));
        self.wait_for_gate().await;
        if let Some(error) = self.behaviour.lock().unwrap().material_error.clone() {
            return Err(error);
        }
        Ok(format!("https://cdn.test/{}", file.name))
    }

    async fn associate_file_to_project(
        &self,
        file_id: &str,
        project_id: &str,
    ) -> Result<(), ApiError> {
        self.record(format!("associate_file_to_project:{file_id}:{project_id}"));
        if self
            .behaviour
            .lock()
            .unwrap()
            .failing_file_associations
            .contains(file_id)
        {
            return Err(ApiError::new(FailureKind::HttpStatus(500), "association failed"));
        }
        Ok(())
    }

    async fn associate_materials_to_project(
        &self,
        project_id: &str,
        urls: &[String],
    ) -> Result<(), ApiError> {
        self.record(format!("associate_materials_to_project:{project_id}"));
        self.material_batches
            .lock()
            .unwrap()
            .push((project_id.to_string(), urls.to_vec()));
        match self.behaviour.lock().unwrap().material_association_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn analyze_video(&self, file: &Artifact, _prompt: &str) -> Result<String, ApiError> {
        self.record(format!("analyze_video:{}", file.name));
        self.wait_for_gate().await;
        self.behaviour.lock().unwrap().video_result.clone()
    }

    async fn initialize_project(&self, request: &ProjectRequest) -> Result<(), ApiError> {
        self.record(format!("initialize_project:{}", request.mode));
        self.requests.lock().unwrap().push(request.clone());
        let (project_id, error) = {
            let behaviour = self.behaviour.lock().unwrap();
            (behaviour.project_id.clone(), behaviour.create_error.clone())
        };
        if let Some(error) = error {
            return Err(error);
        }
        if let Some(project_id) = project_id {
            self.store.set(CURRENT_PROJECT_KEY, &project_id);
        }
        Ok(())
    }

    async fn list_user_templates(&self) -> Result<Vec<UserTemplate>, ApiError> {
        self.record("list_user_templates".to_string());
        Ok(self.behaviour.lock().unwrap().user_templates.clone())
    }

    async fn upload_user_template(&self, file: &Artifact) -> Result<UserTemplate, ApiError> {
        self.record(format!("upload_user_template:{}", file.name));
        if let Some(error) = self.behaviour.lock().unwrap().template_upload_error.clone() {
            return Err(error);
        }
        Ok(UserTemplate {
            template_id: format!("u-{}", self.next_file_id()),
            name: Some(file.name.clone()),
            template_image_url: Some(format!("/files/{}", file.name)),
        })
    }

    async fn resolve_template_file(
        &self,
        template: &TemplateRef,
        _known_user_templates: &[UserTemplate],
    ) -> Result<Artifact, ApiError> {
        let namespace = match template.namespace {
            TemplateNamespace::Preset => "preset",
            TemplateNamespace::User => "user",
        };
        self.record(format!("resolve_template_file:{namespace}:{}", template.id));
        if let Some(error) = self.behaviour.lock().unwrap().template_error.clone() {
            return Err(error);
        }
        Ok(Artifact::new(
            format!("template_{}.png", template.id),
            "image/png",
            vec![9u8; 8],
        ))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|notice| notice.message.clone())
            .collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl NoticeSink for RecordingSink {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub struct Fixture {
    pub api: Arc<FakeStudioApi>,
    pub store: Arc<MemorySessionStore>,
    pub sink: Arc<RecordingSink>,
    pub composer: Composer,
}

pub fn fixture() -> Fixture {
    init_logging();
    let store = Arc::new(MemorySessionStore::new());
    let api = Arc::new(FakeStudioApi::new(store.clone()));
    let sink = Arc::new(RecordingSink::default());
    let composer = Composer::new(
        api.clone(),
        store.clone(),
        sink.clone(),
        &ComposerSettings::default(),
    );
    Fixture {
        api,
        store,
        sink,
        composer,
    }
}

/// Yields until `condition` holds; panics after a generous number of rounds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    panic!("condition not reached");
}
