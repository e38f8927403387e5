//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `telemetry.collector_url`.
pub const ENV_COLLECTOR_URL: &str = "OTEL_COLLECTOR_URL";
/// Environment variable overriding `telemetry.service_name`.
pub const ENV_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";
/// Environment variable overriding `telemetry.environment`.
pub const ENV_ENVIRONMENT: &str = "APP_ENV";
/// Environment variable overriding `observability.log_level`.
pub const ENV_LOG_LEVEL: &str = "APP_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process environment
/// overrides, then validate.
///
/// Without a file the defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(url) = read(ENV_COLLECTOR_URL) {
        config.telemetry.collector_url = url;
    }
    if let Some(name) = read(ENV_SERVICE_NAME) {
        config.telemetry.service_name = name;
    }
    if let Some(env) = read(ENV_ENVIRONMENT) {
        config.telemetry.environment = env;
    }
    if let Some(level) = read(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[listener]
bind_address = "127.0.0.1:4000"

[telemetry]
service_name = "billing"
excluded_paths = ["/metrics"]
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.telemetry.excluded_paths, vec!["/metrics".to_string()]);
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(config.telemetry.skip_static_files);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[telemetry]\nexcluded_paths = [\"health\"]").unwrap();

        match load_config(Some(file.path())) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nbind_address = 1").unwrap();
        assert!(matches!(load_config(Some(file.path())), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_COLLECTOR_URL, "http://collector:4318"),
            (ENV_SERVICE_NAME, "  "),
            (ENV_ENVIRONMENT, "production"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.telemetry.collector_url, "http://collector:4318");
        assert_eq!(config.telemetry.service_name, "tracegate");
        assert_eq!(config.telemetry.environment, "production");
        assert_eq!(config.observability.log_level, "info");
    }
}
