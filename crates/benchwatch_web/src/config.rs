//! Server configuration from flags and environment.

use benchwatch_core::{default_log_level, DEFAULT_DB_FILE_NAME};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line arguments for `benchwatch-web`.
#[derive(Parser, Debug, Clone)]
#[command(name = "benchwatch-web", version, about = "Serve the bench map")]
pub struct ServerArgs {
    /// Bind address
    #[arg(long, env = "BENCHWATCH_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on
    #[arg(short, long, env = "BENCHWATCH_PORT", default_value_t = 5000)]
    pub port: u16,

    /// SQLite database file
    #[arg(long, env = "BENCHWATCH_DB", default_value = DEFAULT_DB_FILE_NAME)]
    pub db: PathBuf,

    /// trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, env = "BENCHWATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rotated log files (default: ./logs)
    #[arg(long, env = "BENCHWATCH_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl ServerArgs {
    /// Parses `bind:port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|err| format!("invalid bind address `{}:{}`: {err}", self.bind, self.port))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Log directory made absolute against the working directory.
    pub fn log_dir(&self) -> Result<PathBuf, String> {
        let dir = self
            .log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("logs"));
        if dir.is_absolute() {
            return Ok(dir);
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(dir))
            .map_err(|err| format!("cannot resolve working directory: {err}"))
    }
}
