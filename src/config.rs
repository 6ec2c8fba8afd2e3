//! Client configuration resolved from the environment, with CLI overrides applied on top.

use std::path::PathBuf;

use reqwest::Url;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_API_BASE: &str = "https://project-nexus-online-polling-system.onrender.com/api";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

pub const ENV_API_BASE: &str = "NEXUS_API_BASE_URL";
pub const ENV_REFRESH_PATH: &str = "NEXUS_API_AUTH_REFRESH";
pub const ENV_TOKEN_FILE: &str = "NEXUS_TOKEN_FILE";
pub const ENV_OUTPUT: &str = "NEXUS_OUTPUT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    #[default]
    Table,
    Json,
}

impl OutputMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Some(OutputMode::Table),
            "json" => Some(OutputMode::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without trailing slash; endpoint paths are appended verbatim.
    pub api_base: String,
    pub refresh_path: String,
    pub token_file: PathBuf,
    pub output: OutputMode,
}

impl ClientConfig {
    /// Default token file: `<config dir>/nexus/tokens.json`.
    pub fn default_token_file() -> PathBuf {
        if let Some(dir) = dirs::config_dir() {
            dir.join("nexus").join("tokens.json")
        } else if let Some(home) = dirs::home_dir() {
            home.join(".nexus").join("tokens.json")
        } else {
            PathBuf::from(".nexus").join("tokens.json")
        }
    }

    pub fn new(api_base: &str) -> ClientResult<Self> {
        Ok(Self {
            api_base: normalize_base(api_base)?,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            token_file: Self::default_token_file(),
            output: OutputMode::Table,
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        let base = std::env::var(ENV_API_BASE).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let mut cfg = Self::new(&base)?;
        if let Ok(p) = std::env::var(ENV_REFRESH_PATH) {
            cfg.refresh_path = normalize_path(&p);
        }
        if let Ok(f) = std::env::var(ENV_TOKEN_FILE) {
            if !f.trim().is_empty() { cfg.token_file = PathBuf::from(f); }
        }
        if let Ok(o) = std::env::var(ENV_OUTPUT) {
            match OutputMode::parse(&o) {
                Some(mode) => cfg.output = mode,
                None => tracing::warn!("ignoring unknown {}='{}'", ENV_OUTPUT, o),
            }
        }
        Ok(cfg)
    }

    pub fn with_api_base(mut self, base: &str) -> ClientResult<Self> {
        self.api_base = normalize_base(base)?;
        Ok(self)
    }

    pub fn with_token_file(mut self, path: PathBuf) -> Self {
        self.token_file = path;
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn with_refresh_path(mut self, path: &str) -> Self {
        self.refresh_path = normalize_path(path);
        self
    }

    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        join_endpoint(&self.api_base, path)
    }
}

pub(crate) fn join_endpoint(base: &str, path: &str) -> ClientResult<Url> {
    let full = format!("{}{}", base, normalize_path(path));
    Url::parse(&full).map_err(|e| ClientError::Config(format!("invalid endpoint URL '{}': {}", full, e)))
}

fn normalize_base(base: &str) -> ClientResult<String> {
    let trimmed = base.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ClientError::Config(format!("invalid API base URL '{}': {}", base, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ClientError::Config(format!("unsupported API base scheme '{}'", other))),
    }
}

fn normalize_path(path: &str) -> String {
    let p = path.trim();
    if p.starts_with('/') { p.to_string() } else { format!("/{}", p) }
}
