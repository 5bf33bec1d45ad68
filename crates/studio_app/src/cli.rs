use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use studio_core::{SubmitOptions, DEFAULT_TONE_TEMPLATE, DEFAULT_VISUAL_TEMPLATE};
use studio_engine::ServiceSettings;

use crate::platform::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "studio", version, about = "Turn markdown into slide decks and polish them")]
pub struct Cli {
    /// Base URL of the generation service.
    #[arg(long, env = "STUDIO_BASE_URL", default_value = "http://127.0.0.1:8000", global = true)]
    pub base_url: String,

    /// Status polling interval in milliseconds.
    #[arg(long, env = "STUDIO_POLL_MS", default_value_t = 2000, global = true)]
    pub poll_ms: u64,

    /// Follow progress by polling only.
    #[arg(long, global = true)]
    pub no_push: bool,

    #[arg(long, env = "STUDIO_LOG", value_enum, default_value = "file", global = true)]
    pub log: LogDestination,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a markdown file, then edit the generated story.
    Convert(ConvertArgs),
    /// List the visual and tone templates the service offers.
    Templates,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Markdown file to convert.
    pub file: PathBuf,

    /// LLM API key; falls back to the service's own key.
    #[arg(long, env = "STUDIO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "STUDIO_LLM_BASE_URL")]
    pub llm_base_url: Option<String>,

    #[arg(long, env = "STUDIO_MODEL")]
    pub model: Option<String>,

    #[arg(long, default_value = DEFAULT_VISUAL_TEMPLATE)]
    pub visual: String,

    #[arg(long, default_value = DEFAULT_TONE_TEMPLATE)]
    pub tone: String,

    /// Let the generator review its own renders.
    #[arg(long)]
    pub visual_feedback: bool,

    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub max_iterations: u8,

    /// Re-render as soon as the story is loaded.
    #[arg(long)]
    pub apply_on_complete: bool,
}

impl Cli {
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            base_url: self.base_url.clone(),
            poll_interval: Duration::from_millis(self.poll_ms.max(100)),
            push_enabled: !self.no_push,
            ..ServiceSettings::default()
        }
    }
}

impl ConvertArgs {
    pub fn submit_options(&self) -> SubmitOptions {
        SubmitOptions {
            api_key: self.api_key.clone(),
            base_url: self.llm_base_url.clone(),
            model: self.model.clone(),
            visual_template: self.visual.clone(),
            tone_template: self.tone.clone(),
            use_visual_feedback: self.visual_feedback,
            max_iterations: self.max_iterations,
        }
    }
}
