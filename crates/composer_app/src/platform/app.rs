use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use composer_core::{classify, ArtifactKind, CreationMode, Msg, NoticeLevel};
use composer_engine::{AnalysisOutcome, ComposerEvent, ComposerHandle, ReqwestStudioApi};
use composer_logging::{composer_info, composer_warn};

use super::cli::Cli;
use super::config::{self, AppConfig, ConfigSource};
use super::files::{load_artifact, read_brief};
use super::persistence::FileSessionStore;

const EVENT_POLL: Duration = Duration::from_millis(20);

pub fn run(cli: Cli) -> Result<()> {
    let (mut config, source) = config::load(&cli.config);
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    composer_logging::initialize(config.log_to.into(), config.level(), &config.log_file);
    match &source {
        ConfigSource::File(path) => composer_info!("Loaded configuration from {:?}", path),
        ConfigSource::Missing(path) => {
            composer_info!("No configuration at {:?}, using defaults", path)
        }
        ConfigSource::Invalid { path, reason } => {
            composer_warn!("Ignoring configuration at {:?}: {}", path, reason)
        }
    }

    let store = Arc::new(
        FileSessionStore::open(&config.state_dir).context("Could not open the state directory")?,
    );
    let api = ReqwestStudioApi::new(config.api_settings(), store.clone())
        .context("Could not set up the studio client")?;
    let handle = ComposerHandle::new(Arc::new(api), store, config.composer_settings());
    let pump = EventPump {
        handle: &handle,
        limit: config.event_wait_limit(),
    };

    handle.load_user_templates();
    pump.wait_for(|event| matches!(event, ComposerEvent::UserTemplatesLoaded(_)))?;

    handle.dispatch(Msg::ModeSelected(cli.mode));
    compose_content(&cli, &handle, &pump)?;
    choose_template(&cli, &handle, &pump)?;
    attach_files(&cli, &handle, &pump)?;
    wait_for_parsing(&handle, &pump, &config)?;

    handle.submit();
    let event = pump.wait_for(|event| {
        matches!(
            event,
            ComposerEvent::Navigate(_)
                | ComposerEvent::SubmitBlocked(_)
                | ComposerEvent::SubmitFailed(_)
        )
    })?;
    match event {
        ComposerEvent::Navigate(destination) => {
            composer_info!("Opening {}", destination.path());
            println!("{}", destination.path());
            Ok(())
        }
        ComposerEvent::SubmitBlocked(precondition) => bail!("{precondition}"),
        ComposerEvent::SubmitFailed(message) => bail!("{message}"),
        other => Err(anyhow!("unexpected event {other:?}")),
    }
}

/// In video mode the analysis becomes the content and the brief, if any,
/// is appended to it.
fn compose_content(cli: &Cli, handle: &ComposerHandle, pump: &EventPump<'_>) -> Result<()> {
    let brief = cli.brief.as_deref().map(read_brief).transpose()?;

    if cli.mode == CreationMode::Video {
        let path = cli
            .video
            .as_deref()
            .context("Video mode needs a video file (--video <FILE>)")?;
        handle.dispatch(Msg::VideoSelected(load_artifact(path)?));
        handle.analyze_video();
        let event = pump.wait_for(|event| matches!(event, ComposerEvent::AnalysisFinished(_)))?;
        if !matches!(event, ComposerEvent::AnalysisFinished(AnalysisOutcome::Done)) {
            bail!("Video analysis did not complete");
        }
        if let Some(brief) = brief {
            let text = format!("{}\n\n{}", handle.view().content, brief.trim());
            let caret = text.len();
            handle.dispatch(Msg::ContentEdited { text, caret });
        }
        return Ok(());
    }

    let text = brief.context("A brief file is required outside video mode")?;
    let caret = text.len();
    handle.dispatch(Msg::ContentEdited { text, caret });
    Ok(())
}

/// A style description is kept even when a template is chosen afterwards.
fn choose_template(cli: &Cli, handle: &ComposerHandle, pump: &EventPump<'_>) -> Result<()> {
    if let Some(style) = &cli.style {
        handle.dispatch(Msg::DescriptiveStyleToggled(true));
        handle.dispatch(Msg::StyleDescriptionChanged(style.clone()));
    }
    if let Some(path) = &cli.upload_template {
        handle.upload_user_template(load_artifact(path)?);
        let event = pump.wait_for(|event| matches!(event, ComposerEvent::UserTemplateUploaded(_)))?;
        if !matches!(event, ComposerEvent::UserTemplateUploaded(Some(_))) {
            bail!("Could not upload template {}", path.display());
        }
    } else if let Some(path) = &cli.template_file {
        handle.dispatch(Msg::AdHocTemplateChosen(load_artifact(path)?));
    } else if let Some(id) = &cli.template {
        handle.dispatch(Msg::TemplateIdChosen {
            id: id.clone(),
            file: None,
        });
    }
    Ok(())
}

/// Images are inserted at the end of the content one at a time; documents
/// go up together as one sequential batch.
fn attach_files(cli: &Cli, handle: &ComposerHandle, pump: &EventPump<'_>) -> Result<()> {
    let mut documents = Vec::new();
    for path in &cli.attachments {
        let file = load_artifact(path)?;
        match classify(&file) {
            ArtifactKind::Image => {
                let caret = handle.view().content.len();
                handle.attach_image(file, caret);
                pump.wait_for(|event| matches!(event, ComposerEvent::UploadFinished(_)))?;
            }
            ArtifactKind::Document => documents.push(file),
            ArtifactKind::Video | ArtifactKind::Rejected { .. } => {
                composer_warn!("Skipping {}: not a document or image", path.display());
                eprintln!("Skipping {}: not a document or image", path.display());
            }
        }
    }
    if !documents.is_empty() {
        handle.pick_documents(documents);
        pump.wait_for(|event| matches!(event, ComposerEvent::UploadFinished(_)))?;
    }
    Ok(())
}

/// Echoes file status whenever the session changes, until nothing blocks
/// submission.
fn wait_for_parsing(handle: &ComposerHandle, pump: &EventPump<'_>, config: &AppConfig) -> Result<()> {
    let deadline = Instant::now() + config.parse_wait_limit();
    let mut blocking = handle.view().blocking_files;
    while blocking > 0 {
        if Instant::now() >= deadline {
            bail!("{blocking} reference file(s) were still parsing after {:?}", config.parse_wait_limit());
        }
        pump.drain();
        if let Some(view) = handle.changed_view() {
            for row in &view.files {
                eprintln!("[file] {}: {:?}", row.name, row.status);
            }
            blocking = view.blocking_files;
        }
        thread::sleep(EVENT_POLL);
    }
    Ok(())
}

/// Drains handle events, echoing notices to the terminal.
struct EventPump<'a> {
    handle: &'a ComposerHandle,
    limit: Duration,
}

impl EventPump<'_> {
    fn drain(&self) {
        while let Some(event) = self.handle.try_recv() {
            self.show(&event);
        }
    }

    fn wait_for(&self, mut done: impl FnMut(&ComposerEvent) -> bool) -> Result<ComposerEvent> {
        let deadline = Instant::now() + self.limit;
        loop {
            while let Some(event) = self.handle.try_recv() {
                self.show(&event);
                if done(&event) {
                    return Ok(event);
                }
            }
            if Instant::now() >= deadline {
                bail!("Gave up waiting after {:?}", self.limit);
            }
            thread::sleep(EVENT_POLL);
        }
    }

    fn show(&self, event: &ComposerEvent) {
        if let ComposerEvent::Notice(notice) = event {
            let label = match notice.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Success => "ok",
                NoticeLevel::Error => "error",
            };
            eprintln!("[{label}] {}", notice.message);
        }
    }
}
