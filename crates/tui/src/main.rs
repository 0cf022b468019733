use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use color_eyre::{Report, Section};
use directories::ProjectDirs;
use keygate::app::mask_key;
use keygate::{logging, Config, TerminalPresenter};
use keygate_dialog::{ConfigOrchestrator, DialogOptions};
use keygate_provider::{CredentialError, FileStore, HttpProbe, ResolvedConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Acquire and validate credentials for an OpenAI-compatible API.
#[derive(Debug, Parser)]
#[command(name = "keygate", version)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(long, env = "KEYGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Show the dialog even when a stored credential exists.
    #[arg(long, env = "KEYGATE_FORCE")]
    force: bool,

    /// Storage key of the credential slot.
    #[arg(long, env = "KEYGATE_STORAGE_KEY")]
    key: Option<String>,

    /// Print the resolved configuration as JSON.
    #[arg(long)]
    json: bool,

    /// Remove the stored credential and exit.
    #[arg(long, conflicts_with = "force")]
    forget: bool,
}

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "keygate", "keygate") {
        proj_dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config/default.toml")
    }
}

fn open_store(config: &Config) -> Result<FileStore> {
    match &config.store.path {
        Some(path) => Ok(FileStore::new(path)),
        None => FileStore::open_default().map_err(|e| eyre!("{e:#}")),
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let config = Config::load_or_default(&config_path);
    let log_path = logging::init(&config.logging).wrap_err("Failed to open log file")?;
    tracing::info!("keygate starting with config {}", config_path.display());

    let store = open_store(&config)?;
    tracing::debug!("Credential store at {}", store.path().display());

    let mut options = DialogOptions::new(Arc::new(store)).apply(config.dialog.clone());
    if let Some(key) = cli.key {
        options = options.with_storage_key(key);
    }
    if cli.force {
        options = options.with_force_show(true);
    }

    let presenter = Arc::new(TerminalPresenter::new());
    let orchestrator = ConfigOrchestrator::new(Arc::new(HttpProbe::new()), presenter.clone());

    if cli.forget {
        orchestrator.forget(&options)?;
        println!("Removed stored credential '{}'", options.storage_key);
        return Ok(ExitCode::SUCCESS);
    }

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(orchestrator.acquire(&options));
    presenter.finish().wrap_err("Terminal UI failed")?;

    match result {
        Ok(resolved) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                print_summary(&resolved);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(CredentialError::Cancelled) => {
            tracing::info!("Cancelled by user");
            eprintln!("Cancelled.");
            Ok(ExitCode::from(130))
        }
        Err(e) => {
            tracing::error!("Credential acquisition failed: {}", e);
            let hint = e.user_message();
            Err(Report::new(e)
                .wrap_err("Could not acquire API credentials")
                .suggestion(hint)
                .with_note(|| format!("Logs: {}", log_path.display())))
        }
    }
}

fn print_summary(resolved: &ResolvedConfig) {
    println!("Base URL: {}", resolved.base_url());
    println!("API key:  {}", mask_key(resolved.api_key()));
    println!("Models ({}):", resolved.models.len());
    for model in &resolved.models {
        println!("  {model}");
    }
}
