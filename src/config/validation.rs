use super::Config;
use crate::error::{Error, Result};
use tracing::warn;

/// Validation errors for configuration.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate a configuration object.
pub fn validate_config(config: &Config) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    if config.input_file.as_os_str().is_empty() {
        errors.push(ConfigValidationError {
            path: "inputFile".to_string(),
            message: "Input file must not be empty".to_string(),
        });
    }

    if config.output_file.as_os_str().is_empty() {
        errors.push(ConfigValidationError {
            path: "outputFile".to_string(),
            message: "Output file must not be empty".to_string(),
        });
    }

    match url::Url::parse(&config.vault.address) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            if url.scheme() == "http" {
                warn!("Vault address {} is not using TLS", config.vault.address);
            }
        }
        Ok(url) => errors.push(ConfigValidationError {
            path: "vault.address".to_string(),
            message: format!("Unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ConfigValidationError {
            path: "vault.address".to_string(),
            message: format!("Invalid URL: {e}"),
        }),
    }

    if config.vault.max_concurrent_fetches == 0 {
        errors.push(ConfigValidationError {
            path: "vault.maxConcurrentFetches".to_string(),
            message: "Concurrency must be greater than 0".to_string(),
        });
    }

    if config.vault.request_timeout.is_zero() {
        errors.push(ConfigValidationError {
            path: "vault.requestTimeout".to_string(),
            message: "Timeout must be greater than 0".to_string(),
        });
    }

    if config.vault.auth_mount.trim_matches('/').is_empty() {
        errors.push(ConfigValidationError {
            path: "vault.authMount".to_string(),
            message: "Auth mount must not be empty".to_string(),
        });
    }

    errors
}

/// Validate configuration and return Result.
pub fn validate_config_object(config: &Config) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        Err(Error::InvalidConfig(messages.join("; ")))
    }
}
