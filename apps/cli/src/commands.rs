//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use pagelens_core::{Analysis, AnalysisEngine, ProgressReporter};
use pagelens_shared::{AppConfig, Credentials, load_config, validate_llm_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// PageLens — analyze a web page against external knowledge services.
#[derive(Parser)]
#[command(
    name = "pagelens",
    version,
    about = "Analyze a web page and aggregate what three knowledge services know about it.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyze one page and write the HTML report.
    Analyze {
        /// Page URL to analyze.
        url: String,

        /// Write the report to this file instead of stdout.
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Start the HTTP server.
    Serve {
        /// Bind address (overrides the config file).
        #[arg(long)]
        bind: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default config file to ~/.pagelens/pagelens.toml.
    Init,
    /// Print the effective configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pagelens=info",
        1 => "pagelens=debug",
        _ => "pagelens=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze { url, out } => cmd_analyze(&url, out.as_deref()).await,
        Command::Serve { bind } => cmd_serve(bind.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_analyze(url: &str, out: Option<&str>) -> Result<()> {
    // Validate the LLM key before doing anything
    let config = load_config()?;
    validate_llm_key(&config)?;

    let parsed_url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let credentials = Credentials::resolve(&config);
    let engine = AnalysisEngine::new(&config, &credentials)?;

    info!(url, "analyzing page");

    let reporter = CliProgress::new();
    let analysis = pagelens_core::analyze(&engine, &parsed_url, &reporter).await?;

    match out {
        Some(path) => {
            let path = PathBuf::from(path);
            std::fs::write(&path, &analysis.html)
                .map_err(|e| eyre!("cannot write {}: {e}", path.display()))?;

            println!();
            println!("  Report written to {}", path.display());
            println!("  Sections: {}", analysis.sections);
            println!("  Time:     {:.1}s", analysis.elapsed.as_secs_f64());
            println!();
        }
        None => {
            print!("{}", analysis.html);
        }
    }

    Ok(())
}

async fn cmd_serve(bind: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let credentials = Credentials::resolve(&config);
    let engine = AnalysisEngine::new(&config, &credentials)?;

    let state = pagelens_server::AppState {
        engine: Arc::new(engine),
        llm_api_key_env: config.llm.api_key_env.clone(),
    };

    let addr = bind.unwrap_or(config.server.bind.as_str());
    info!(%addr, "starting server");

    pagelens_server::serve(state, addr).await?;
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = pagelens_shared::init_config()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _analysis: &Analysis) {
        self.spinner.finish_and_clear();
    }
}
