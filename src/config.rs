use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Default config file picked up from the working directory.
const CWD_CONFIG: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Path of the JSON slot file; empty keeps slots in memory
    #[arg(long)]
    pub storage_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub timing: TimingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub login_latency_ms: u64,
    pub reply_delay_ms: u64,
}

impl StorageConfig {
    /// `None` selects the in-memory store.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        let path = self.path.trim();
        (!path.is_empty()).then(|| Path::new(path))
    }
}

impl TimingConfig {
    #[must_use]
    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login_latency_ms)
    }

    #[must_use]
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Priority: CLI flag > `CAMPUS_` environment > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.path", "campus-storage.json")?
            .set_default("timing.login_latency_ms", 1500)?
            .set_default("timing.reply_delay_ms", 1500)?;

        match &cli.config {
            Some(path) => {
                builder = builder.add_source(File::from(PathBuf::from(path)).required(true));
            }
            None if Path::new(CWD_CONFIG).exists() => {
                builder = builder.add_source(File::from(PathBuf::from(CWD_CONFIG)));
            }
            None => {}
        }

        // E.g. CAMPUS_SERVER__PORT=8000, CAMPUS_TIMING__REPLY_DELAY_MS=0
        builder = builder.add_source(
            Environment::with_prefix("CAMPUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(path) = cli.storage_path {
            builder = builder.set_override("storage.path", path)?;
        }

        builder.build()?.try_deserialize()
    }
}
