//! reelfeed - Entry Point

use clap::{Parser, ValueEnum};
use reelfeed::state::NavTab;
use std::path::PathBuf;
use tracing::info;

/// Screen shown after the splash.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StartTab {
    Home,
    Friends,
    Inbox,
    Profile,
}

impl From<StartTab> for NavTab {
    fn from(tab: StartTab) -> Self {
        match tab {
            StartTab::Home => NavTab::Home,
            StartTab::Friends => NavTab::Friends,
            StartTab::Inbox => NavTab::Inbox,
            StartTab::Profile => NavTab::Profile,
        }
    }
}

/// reelfeed - short-video feed for the terminal with AI creation
#[derive(Parser, Debug)]
#[command(name = "reelfeed")]
#[command(version)]
#[command(about = "Terminal short-video feed with AI-assisted creation")]
pub struct Args {
    /// API key for the generation service (overrides REELFEED_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Video file served as the camera stream in the create flow
    #[arg(long)]
    pub capture_clip: Option<PathBuf>,

    /// Tab to open after the splash screen
    #[arg(long, value_enum)]
    pub start_tab: Option<StartTab>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = reelfeed::config::load_config_with_precedence(args.config.clone())?;
        let merged = reelfeed::config::merge_config(config_file)?;
        let with_env = reelfeed::config::apply_env_overrides(merged);
        reelfeed::config::apply_cli_overrides(
            with_env,
            args.api_key.clone(),
            args.capture_clip.clone(),
            args.start_tab.map(NavTab::from),
        )
    };

    let _log_guard = reelfeed::logging::init(&config.log_file_path)?;

    info!(
        api_key = config.api_key.is_some(),
        start_tab = ?config.start_tab,
        capture_clip = ?config.capture_clip,
        "Configuration loaded and resolved"
    );

    reelfeed::view::run(&config)?;

    Ok(())
}
