mod defaults;
mod validation;

pub use defaults::*;
pub use validation::*;

use crate::cli::Cli;
use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Run configuration, built once at startup and passed down read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    /// Equal to `input_file` when rendering in place.
    pub output_file: PathBuf,
    pub continue_on_error: bool,
    pub vault: VaultConfig,
}

/// Connection and authentication settings for Vault.
#[derive(Clone)]
pub struct VaultConfig {
    pub address: String,
    pub token: Option<String>,
    pub namespace: Option<String>,
    pub role: Option<String>,
    pub auth_mount: String,
    pub jwt_path: PathBuf,
    pub request_timeout: Duration,
    pub max_concurrent_fetches: usize,
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("namespace", &self.namespace)
            .field("role", &self.role)
            .field("auth_mount", &self.auth_mount)
            .field("jwt_path", &self.jwt_path)
            .field("request_timeout", &self.request_timeout)
            .field("max_concurrent_fetches", &self.max_concurrent_fetches)
            .finish()
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_VAULT_ADDR.to_string(),
            token: None,
            namespace: None,
            role: None,
            auth_mount: DEFAULT_AUTH_MOUNT.to_string(),
            jwt_path: PathBuf::from(DEFAULT_JWT_PATH),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl Config {
    /// Build the run configuration from parsed command-line flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (input_file, output_file) = match (&cli.input_file, &cli.output_file, cli.inplace) {
            (Some(input), _, true) => (input.clone(), input.clone()),
            (None, _, true) => {
                return Err(Error::InvalidConfig(
                    "input file must be specified".to_string(),
                ))
            }
            (Some(input), Some(output), false) => (input.clone(), output.clone()),
            _ => {
                return Err(Error::InvalidConfig(
                    "both input and output files must be specified".to_string(),
                ))
            }
        };

        let config = Self {
            input_file,
            output_file,
            continue_on_error: cli.continue_on_error,
            vault: VaultConfig {
                address: cli.vault_addr.clone(),
                token: non_empty(cli.vault_token.as_deref()),
                namespace: non_empty(cli.vault_namespace.as_deref()),
                role: non_empty(cli.role.as_deref()),
                auth_mount: cli.auth_mount.clone(),
                jwt_path: cli.jwt_path.clone(),
                request_timeout: Duration::from_secs(cli.timeout_secs),
                max_concurrent_fetches: cli.concurrency,
            },
        };

        validate_config_object(&config)?;
        debug!("Loaded configuration: {config:?}");
        Ok(config)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
