//! Layered settings: config file, then `BROKERWATCH_*` environment, then flags.
//!
//! # Configuration file
//!
//! ```toml
//! endpoint = "https://mozart.mycluster.example.org:15673"
//! username = "guest"
//! password = "guest"
//! vhost = "/"
//! interval_secs = 10
//! timeout_secs = 10
//! insecure = false
//! exclude_prefix = "celery"
//! ```
//!
//! Every key can also be set through the environment, e.g.
//! `BROKERWATCH_ENDPOINT` or `BROKERWATCH_INTERVAL_SECS`.

use std::path::Path;
use std::time::Duration;

use brokerwatch_adapters::rabbitmq::RabbitMqAdapter;
use brokerwatch_adapters::{AdapterError, QueueProjector, DEFAULT_EXCLUDE_PREFIX};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "BROKERWATCH";

/// Errors raised while assembling settings, before any request is made.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No management API endpoint was given anywhere.
    #[error("an --endpoint is required")]
    MissingEndpoint,

    /// A zero poll interval would spin against the broker.
    #[error("--interval must be at least 1 second")]
    ZeroInterval,

    /// The config file or environment could not be read.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl SettingsError {
    /// Whether this is a usage problem (print usage, exit 2).
    pub fn is_usage(&self) -> bool {
        matches!(self, SettingsError::MissingEndpoint | SettingsError::ZeroInterval)
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub vhost: Option<String>,
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub insecure: bool,
    pub exclude_prefix: Option<String>,
    pub no_exclude: bool,
}

/// Fully merged settings for one run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub vhost: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
    pub insecure: bool,
    /// Empty disables queue name filtering.
    pub exclude_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: "guest".to_string(),
            password: "guest".to_string(),
            vhost: "/".to_string(),
            interval_secs: 10,
            timeout_secs: 10,
            insecure: false,
            exclude_prefix: DEFAULT_EXCLUDE_PREFIX.to_string(),
        }
    }
}

impl Settings {
    /// Merge the optional config file, the process environment and `overrides`.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, SettingsError> {
        Self::load_with_env(path, overrides, Environment::with_prefix(ENV_PREFIX))
    }

    /// Like [`Settings::load`] with an explicit environment source.
    pub fn load_with_env(
        path: Option<&Path>,
        overrides: &Overrides,
        env: Environment,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let exclude_prefix = if overrides.no_exclude {
            Some(String::new())
        } else {
            overrides.exclude_prefix.clone()
        };

        let config = builder
            .add_source(env.try_parsing(true))
            .set_override_option("endpoint", overrides.endpoint.clone())?
            .set_override_option("username", overrides.username.clone())?
            .set_override_option("password", overrides.password.clone())?
            .set_override_option("vhost", overrides.vhost.clone())?
            .set_override_option("interval_secs", overrides.interval_secs)?
            .set_override_option("timeout_secs", overrides.timeout_secs)?
            .set_override_option("insecure", overrides.insecure.then_some(true))?
            .set_override_option("exclude_prefix", exclude_prefix)?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()
    }

    fn validate(mut self) -> Result<Self, SettingsError> {
        self.endpoint = self.endpoint.trim().to_string();
        if self.endpoint.is_empty() {
            return Err(SettingsError::MissingEndpoint);
        }
        if self.interval_secs == 0 {
            return Err(SettingsError::ZeroInterval);
        }
        Ok(self)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The queue projector implied by `exclude_prefix`.
    pub fn queue_projector(&self) -> QueueProjector {
        if self.exclude_prefix.is_empty() {
            QueueProjector::unfiltered()
        } else {
            QueueProjector::with_exclude_prefix(self.exclude_prefix.as_str())
        }
    }

    /// Build a management API client from these settings.
    pub fn adapter(&self) -> Result<RabbitMqAdapter, AdapterError> {
        RabbitMqAdapter::builder()
            .endpoint(self.endpoint.as_str())
            .credentials(self.username.as_str(), self.password.as_str())
            .vhost(self.vhost.as_str())
            .timeout(self.timeout())
            .accept_invalid_certs(self.insecure)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn with_endpoint() -> Overrides {
        Overrides {
            endpoint: Some("http://localhost:15672".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with_env(None, &with_endpoint(), env(&[])).unwrap();

        assert_eq!(settings.endpoint, "http://localhost:15672");
        assert_eq!(settings.username, "guest");
        assert_eq!(settings.vhost, "/");
        assert_eq!(settings.interval(), Duration::from_secs(10));
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert!(!settings.insecure);
        assert_eq!(settings.queue_projector().exclude_prefix(), Some("celery"));
    }

    #[test]
    fn test_missing_endpoint_is_usage_error() {
        let err = Settings::load_with_env(None, &Overrides::default(), env(&[])).unwrap_err();
        assert!(matches!(err, SettingsError::MissingEndpoint));
        assert!(err.is_usage());
    }

    #[test]
    fn test_blank_endpoint_is_missing() {
        let overrides = Overrides {
            endpoint: Some("   ".to_string()),
            ..Default::default()
        };
        let err = Settings::load_with_env(None, &overrides, env(&[])).unwrap_err();
        assert!(matches!(err, SettingsError::MissingEndpoint));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let overrides = Overrides {
            interval_secs: Some(0),
            ..with_endpoint()
        };
        let err = Settings::load_with_env(None, &overrides, env(&[])).unwrap_err();
        assert!(matches!(err, SettingsError::ZeroInterval));
    }

    #[test]
    fn test_environment_layer() {
        let settings = Settings::load_with_env(
            None,
            &Overrides::default(),
            env(&[
                ("BROKERWATCH_ENDPOINT", "http://env:15672"),
                ("BROKERWATCH_INTERVAL_SECS", "30"),
                ("BROKERWATCH_INSECURE", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.endpoint, "http://env:15672");
        assert_eq!(settings.interval_secs, 30);
        assert!(settings.insecure);
    }

    #[test]
    fn test_file_then_env_then_flags() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
endpoint = "http://file:15672"
username = "file-user"
interval_secs = 60
exclude_prefix = "amq."
"#
        )
        .unwrap();

        let overrides = Overrides {
            interval_secs: Some(5),
            ..Default::default()
        };
        let settings = Settings::load_with_env(
            Some(file.path()),
            &overrides,
            env(&[("BROKERWATCH_USERNAME", "env-user")]),
        )
        .unwrap();

        assert_eq!(settings.endpoint, "http://file:15672");
        assert_eq!(settings.username, "env-user");
        assert_eq!(settings.interval_secs, 5);
        assert_eq!(settings.queue_projector().exclude_prefix(), Some("amq."));
    }

    #[test]
    fn test_no_exclude_disables_filter() {
        let overrides = Overrides {
            no_exclude: true,
            ..with_endpoint()
        };
        let settings = Settings::load_with_env(None, &overrides, env(&[])).unwrap();
        assert_eq!(settings.queue_projector().exclude_prefix(), None);
    }

    #[test]
    fn test_adapter_from_settings() {
        let overrides = Overrides {
            endpoint: Some("https://rabbit.local:15673/".to_string()),
            insecure: true,
            ..Default::default()
        };
        let settings = Settings::load_with_env(None, &overrides, env(&[])).unwrap();
        let adapter = settings.adapter().unwrap();
        assert_eq!(adapter.endpoint(), "https://rabbit.local:15673");
    }
}
