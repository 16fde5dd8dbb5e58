//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (the loader handles coercion)
//! - Validate value ranges (quality 1-100, timeouts > 0)
//! - Catch credential pairs that are half-configured
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.origin.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "origin.timeout_secs",
            message: "must be greater than zero".into(),
        });
    }

    if config.listener.request_timeout_secs <= config.origin.timeout_secs {
        errors.push(ValidationError {
            field: "listener.request_timeout_secs",
            message: format!(
                "must exceed origin.timeout_secs ({}) so failures redirect instead of timing out",
                config.origin.timeout_secs
            ),
        });
    }

    let quality = config.transcode.default_quality;
    if quality == 0 || quality > 100 {
        errors.push(ValidationError {
            field: "transcode.default_quality",
            message: format!("{} is outside 1-100", quality),
        });
    }

    if config.gate.login.is_some() && config.gate.password.is_none() {
        errors.push(ValidationError {
            field: "gate.password",
            message: "LOGIN is set but PASSWORD is missing".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.transcode.default_quality = 0;
        config.gate.login = Some("admin".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = ProxyConfig::default();
        config.origin.timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "origin.timeout_secs"));
    }
}
