//!
//! nexus CLI binary
//! ----------------
//! Terminal client for the online polling service. Starts an interactive shell, or runs a
//! single shell command with `-c` and exits.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use nexus::app::App;
use nexus::cli::Shell;
use nexus::config::{ClientConfig, OutputMode, DEFAULT_API_BASE};

/// Nexus - terminal client for online polls
#[derive(Parser, Debug)]
#[command(name = "nexus")]
#[command(version)]
#[command(about = "Vote on polls, manage them and review audit logs from the terminal", long_about = None)]
struct Cli {
    /// API base URL including any path prefix (e.g. http://localhost:8000/api)
    #[arg(short = 'u', long = "url", env = "NEXUS_API_BASE_URL")]
    url: Option<String>,

    /// Refresh endpoint path, relative to the base URL
    #[arg(long = "refresh-path", env = "NEXUS_API_AUTH_REFRESH")]
    refresh_path: Option<String>,

    /// Where tokens are persisted between runs
    #[arg(long = "token-file", env = "NEXUS_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Output format
    #[arg(long = "output", value_enum, env = "NEXUS_OUTPUT")]
    output: Option<OutputMode>,

    /// Shorthand for --output json
    #[arg(long = "json", conflicts_with = "output")]
    json: bool,

    /// Keep tokens in memory only
    #[arg(long = "ephemeral")]
    ephemeral: bool,

    /// Run one shell command and exit (e.g. -c "polls active")
    #[arg(short = 'c', long = "command")]
    command: Option<String>,
}

impl Cli {
    /// clap has already folded the `NEXUS_*` variables into the flags, so the environment is not read again.
    fn config(&self) -> Result<ClientConfig> {
        let base = self.url.as_deref().unwrap_or(DEFAULT_API_BASE);
        let mut cfg = ClientConfig::new(base).with_context(|| format!("invalid API base URL '{}'", base))?;
        if let Some(p) = &self.refresh_path {
            cfg = cfg.with_refresh_path(p);
        }
        if let Some(f) = &self.token_file {
            cfg = cfg.with_token_file(f.clone());
        }
        if let Some(o) = self.output {
            cfg = cfg.with_output(o);
        }
        if self.json {
            cfg = cfg.with_output(OutputMode::Json);
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise stay quiet so log lines don't interleave with the prompt
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();

    let cfg = cli.config()?;
    tracing::debug!(api = %cfg.api_base, tokens = %cfg.token_file.display(), "configuration resolved");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    rt.block_on(async move {
        let app = App::from_config(cfg, cli.ephemeral).context("failed to initialize client")?;
        let mut shell = Shell::new(app);
        shell.start().await;

        if let Some(line) = cli.command.as_deref() {
            let reply = shell.execute(line).await;
            shell.render(&reply);
            return Ok(());
        }
        shell.run().await
    })
}
