/// Server configuration
///
/// Command line flags with environment variable fallbacks, resolved once at
/// startup into an immutable `ServerConfig`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Tokens shorter than this are accepted but flagged at startup
const RECOMMENDED_TOKEN_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("AUTH_TOKEN is required for HTTP mode (generate one with: openssl rand -base64 32)")]
    MissingAuthToken,

    #[error("Invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("Invalid CORS origin '{0}'")]
    InvalidCorsOrigin(String),

    #[error("No usable data directory: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Command line arguments for the n8n documentation MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared secret clients must present as a bearer token
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Value of Access-Control-Allow-Origin
    #[arg(long, env = "CORS_ORIGIN", default_value = "*")]
    pub cors_origin: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Mount the legacy SSE transport under /mcp/sse; only "true" enables it
    #[arg(
        long,
        env = "SSE_ENABLED",
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_enabled
    )]
    pub sse_enabled: bool,

    /// Deployment mode; "development" exposes error details to clients
    #[arg(long, env = "NODE_ENV", default_value = "production")]
    pub mode: String,

    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's data directory
    #[arg(long, env = "NODE_DB_PATH")]
    pub database: Option<PathBuf>,

    /// Commit reported by /version
    #[arg(long, env = "GIT_COMMIT", default_value = "unknown")]
    pub git_commit: String,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, env = "SHUTDOWN_GRACE_SECS", default_value_t = 10)]
    pub shutdown_grace_secs: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Log filter level selected by the flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "trace"
        } else if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

fn parse_enabled(value: &str) -> Result<bool, std::convert::Infallible> {
    Ok(value == "true")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Production,
    Development,
}

impl DeploymentMode {
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("development") {
            DeploymentMode::Development
        } else {
            DeploymentMode::Production
        }
    }

    pub fn is_development(self) -> bool {
        self == DeploymentMode::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentMode::Production => "production",
            DeploymentMode::Development => "development",
        }
    }
}

/// Resolved, immutable server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub auth_token: String,
    pub cors_origin: String,
    pub host: String,
    pub port: u16,
    pub sse_enabled: bool,
    pub mode: DeploymentMode,
    /// `None` selects the default location
    pub database: Option<PathBuf>,
    pub git_commit: String,
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Settings with every optional value at its default
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            cors_origin: "*".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            sse_enabled: false,
            mode: DeploymentMode::Production,
            database: None,
            git_commit: "unknown".to_string(),
            shutdown_grace: Duration::from_secs(10),
        }
    }

    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        // Compared byte for byte against client credentials, so no trimming
        let auth_token = cli
            .auth_token
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingAuthToken)?;

        if auth_token.len() < RECOMMENDED_TOKEN_LEN {
            tracing::warn!(
                length = auth_token.len(),
                "AUTH_TOKEN should be at least {} characters for security",
                RECOMMENDED_TOKEN_LEN
            );
        }

        let host = cli.host.trim().to_string();
        if host.is_empty() || host.contains('/') {
            return Err(ConfigError::InvalidBindAddress(cli.host));
        }

        Ok(Self {
            auth_token,
            cors_origin: cli.cors_origin,
            host,
            port: cli.port,
            sse_enabled: cli.sse_enabled,
            mode: DeploymentMode::from_name(&cli.mode),
            database: cli.database,
            git_commit: cli.git_commit,
            shutdown_grace: Duration::from_secs(cli.shutdown_grace_secs),
        })
    }

    /// The database file, creating its parent directory when needed
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Ok(path.clone())
            }
            None => default_database_path(),
        }
    }
}

/// Get the default database path with robust fallback strategy
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    // Try various locations in order of preference
    let candidates = [
        dirs::data_dir().map(|p| p.join("n8n-docs-mcp")),
        dirs::home_dir().map(|p| p.join(".n8n-docs-mcp")),
        std::env::current_dir().ok().map(|p| p.join("data")),
    ];

    for dir in candidates.iter().flatten() {
        if std::fs::create_dir_all(dir).is_err() {
            continue;
        }
        let probe = dir.join(".write_test");
        if std::fs::write(&probe, b"ok").is_ok() {
            let _ = std::fs::remove_file(&probe);
            return Ok(dir.join("nodes.db"));
        }
    }

    // Ultimate fallback: use a temporary directory
    let dir = std::env::temp_dir().join("n8n-docs-mcp");
    std::fs::create_dir_all(&dir)?;
    tracing::warn!("Using temporary directory for database: {}", dir.display());
    Ok(dir.join("nodes.db"))
}
