//! Configuration loading from the process environment.

use std::env;

use crate::config::schema::{BasicCredentials, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Coerce { key: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Coerce { key, value } => {
                write!(f, "could not parse {}={:?}", key, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn parse_var<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Coerce { key, value: raw }),
        _ => Ok(None),
    }
}

/// Build and validate a [`ProxyConfig`] from the environment.
///
/// Recognized variables: `PORT`, `DOMAIN` (comma-separated allow-list),
/// `USER`/`PASS` (origin basic auth), `LOGIN`/`PASSWORD` (gate auth),
/// `MIN_COMPRESS_LENGTH`, `DEFAULT_QUALITY`. Anything absent keeps its
/// default.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    let mut config = ProxyConfig::default();

    if let Some(port) = parse_var::<u16>("PORT")? {
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }

    if let Ok(domains) = env::var("DOMAIN") {
        config.origin.allowed_domains = domains
            .split(',')
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
    }

    if let (Ok(username), Ok(password)) = (env::var("USER"), env::var("PASS")) {
        if !username.is_empty() {
            config.origin.credentials = Some(BasicCredentials { username, password });
        }
    }

    if let Ok(login) = env::var("LOGIN") {
        if !login.is_empty() {
            config.gate.login = Some(login);
            config.gate.password = env::var("PASSWORD").ok();
        }
    }

    if let Some(len) = parse_var::<usize>("MIN_COMPRESS_LENGTH")? {
        config.transcode.min_compress_length = len;
    }
    if let Some(quality) = parse_var::<u8>("DEFAULT_QUALITY")? {
        config.transcode.default_quality = quality;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
