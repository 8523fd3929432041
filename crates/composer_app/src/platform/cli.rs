use std::path::PathBuf;

use clap::Parser;
use composer_core::CreationMode;

/// Compose a presentation brief and create a studio project from it.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Text file holding the brief. Optional in video mode, where the
    /// analysis becomes the brief and this text is appended to it.
    #[arg(value_name = "BRIEF")]
    pub brief: Option<PathBuf>,

    /// Creation mode: idea, outline, description or video.
    #[arg(long, short = 'm', default_value = "idea", value_parser = parse_mode)]
    pub mode: CreationMode,

    /// Reference documents or images to attach, in order.
    #[arg(long = "attach", short = 'a', value_name = "FILE")]
    pub attachments: Vec<PathBuf>,

    /// Video to analyse in video mode.
    #[arg(long, value_name = "FILE")]
    pub video: Option<PathBuf>,

    /// Preset or user template id.
    #[arg(long, value_name = "ID", conflicts_with_all = ["template_file", "upload_template"])]
    pub template: Option<String>,

    /// Image file used as the template for this project only.
    #[arg(long, value_name = "FILE", conflicts_with = "upload_template")]
    pub template_file: Option<PathBuf>,

    /// Image added to your template library and used for this project.
    #[arg(long, value_name = "FILE")]
    pub upload_template: Option<PathBuf>,

    /// Free-text style description.
    #[arg(long, value_name = "TEXT")]
    pub style: Option<String>,

    /// RON configuration file.
    #[arg(long, default_value = "composer.ron")]
    pub config: PathBuf,

    /// Overrides the studio base url from the configuration.
    #[arg(long)]
    pub base_url: Option<String>,
}

fn parse_mode(raw: &str) -> Result<CreationMode, String> {
    CreationMode::parse(raw).ok_or_else(|| {
        format!("unknown mode '{raw}', expected idea, outline, description or video")
    })
}
