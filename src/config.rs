use clap::Parser;
use envconfig::Envconfig;
use humantime_serde::re::humantime;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::admission::AdmissionConfig;
use crate::error::{Error, Result};

pub const DEFAULT_BOOTSTRAP_URL: &str =
    "https://api.nobelprize.org/2.1/laureates?offset=0&limit=1025";

#[derive(Debug, Envconfig, Clone)]
pub struct Config {
    /// Server bind address
    #[envconfig(from = "BIND_ADDR", default = "127.0.0.1:8000")]
    pub bind_addr: SocketAddr,

    /// JSON file holding the laureate collection
    #[envconfig(from = "DATA_FILE", default = "data/laureates.json")]
    pub data_file: PathBuf,

    /// Upstream source used when the data file does not exist yet
    #[envconfig(
        from = "BOOTSTRAP_URL",
        default = "https://api.nobelprize.org/2.1/laureates?offset=0&limit=1025"
    )]
    pub bootstrap_url: String,

    #[envconfig(from = "BOOTSTRAP_ENABLED", default = "true")]
    pub bootstrap_enabled: bool,

    #[envconfig(from = "BOOTSTRAP_TIMEOUT", default = "30s")]
    pub bootstrap_timeout: humantime::Duration,

    /// Credentials accepted for create/update/delete
    #[envconfig(from = "ADMIN_USER", default = "admin")]
    pub admin_user: String,

    #[envconfig(from = "ADMIN_PASSWORD", default = "nobel2025")]
    pub admin_password: String,

    /// Mutations admitted per client within one window
    #[envconfig(from = "RATE_LIMIT_MAX", default = "5")]
    pub rate_limit_max: usize,

    #[envconfig(from = "RATE_LIMIT_WINDOW", default = "1s")]
    pub rate_limit_window: humantime::Duration,

    /// Admission state cleanup interval in seconds
    #[envconfig(from = "CLEANUP_INTERVAL", default = "300")]
    pub cleanup_interval_secs: u64,

    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            data_file: PathBuf::from("data/laureates.json"),
            bootstrap_url: DEFAULT_BOOTSTRAP_URL.to_string(),
            bootstrap_enabled: true,
            bootstrap_timeout: Duration::from_secs(30).into(),
            admin_user: "admin".to_string(),
            admin_password: "nobel2025".to_string(),
            rate_limit_max: 5,
            rate_limit_window: Duration::from_secs(1).into(),
            cleanup_interval_secs: 300,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> std::result::Result<Self, envconfig::Error> {
        Config::init_from_env()
    }

    pub fn admission(&self) -> AdmissionConfig {
        AdmissionConfig {
            max_events: self.rate_limit_max,
            window: *self.rate_limit_window,
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_max == 0 {
            return Err(Error::Configuration(
                "RATE_LIMIT_MAX must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_window.is_zero() {
            return Err(Error::Configuration(
                "RATE_LIMIT_WINDOW must be greater than 0".to_string(),
            ));
        }

        if self.cleanup_interval_secs == 0 {
            return Err(Error::Configuration(
                "CLEANUP_INTERVAL must be greater than 0".to_string(),
            ));
        }

        if self.admin_user.trim().is_empty() {
            return Err(Error::Configuration(
                "ADMIN_USER cannot be empty".to_string(),
            ));
        }

        if self.bootstrap_enabled && self.bootstrap_url.trim().is_empty() {
            return Err(Error::Configuration(
                "BOOTSTRAP_URL cannot be empty while bootstrapping is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

/// Command-line overrides applied on top of the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "laureates", version, about = "Prize laureate dataset service")]
pub struct Cli {
    /// Address to listen on
    #[arg(long)]
    pub bind_addr: Option<SocketAddr>,

    /// Data file path
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Never download the dataset; start empty when the data file is missing
    #[arg(long)]
    pub no_bootstrap: bool,

    /// Log level for the service's own events
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn apply(self, config: &mut Config) {
        if let Some(bind_addr) = self.bind_addr {
            config.bind_addr = bind_addr;
        }
        if let Some(data_file) = self.data_file {
            config.data_file = data_file;
        }
        if self.no_bootstrap {
            config.bootstrap_enabled = false;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_environment_defaults() {
        let from_env = Config::init_from_hashmap(&HashMap::new()).unwrap();
        let default = Config::default();

        assert_eq!(from_env.bind_addr, default.bind_addr);
        assert_eq!(from_env.data_file, default.data_file);
        assert_eq!(from_env.bootstrap_url, default.bootstrap_url);
        assert_eq!(from_env.rate_limit_max, 5);
        assert_eq!(*from_env.rate_limit_window, Duration::from_secs(1));
        assert_eq!(*from_env.bootstrap_timeout, Duration::from_secs(30));
        assert_eq!(from_env.cleanup_interval_secs, default.cleanup_interval_secs);
        assert!(default.validate().is_ok());
    }

    #[test]
    fn test_humantime_window() {
        let vars = HashMap::from([
            ("RATE_LIMIT_WINDOW".to_string(), "250ms".to_string()),
            ("RATE_LIMIT_MAX".to_string(), "2".to_string()),
        ]);
        let config = Config::init_from_hashmap(&vars).unwrap();
        assert_eq!(
            config.admission(),
            AdmissionConfig {
                max_events: 2,
                window: Duration::from_millis(250)
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.rate_limit_max = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit_window = Duration::ZERO.into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.admin_user = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.bootstrap_url = String::new();
        assert!(config.validate().is_err());
        config.bootstrap_enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "laureates",
            "--data-file",
            "/tmp/l.json",
            "--no-bootstrap",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.data_file, PathBuf::from("/tmp/l.json"));
        assert!(!config.bootstrap_enabled);
        assert_eq!(config.bind_addr, Config::default().bind_addr);
    }
}
