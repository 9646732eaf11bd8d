use crate::config::{
    DEFAULT_AUTH_MOUNT, DEFAULT_JWT_PATH, DEFAULT_MAX_CONCURRENT_FETCHES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_VAULT_ADDR,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vault-render",
    version,
    about = "Render secrets from Vault into configuration templates",
    after_help = "Placeholders look like {{ secret/path!key }} or {{ secret/path!key:fallback }}.\n\
                  Vault connection settings follow the official client's environment \
                  variables, so VAULT_ADDR and VAULT_TOKEN are honoured."
)]
pub struct Cli {
    /// The path of the source template
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// The path of the rendered file to write
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Alter input-file in place instead of writing to output-file
    #[arg(long)]
    pub inplace: bool,

    /// The Vault role to authenticate as
    #[arg(long)]
    pub role: Option<String>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Don't abort on error, always exit 0
    #[arg(long)]
    pub continue_on_error: bool,

    #[arg(long, env = "VAULT_ADDR", default_value = DEFAULT_VAULT_ADDR)]
    pub vault_addr: String,

    #[arg(long, env = "VAULT_TOKEN", hide_env_values = true)]
    pub vault_token: Option<String>,

    #[arg(long, env = "VAULT_NAMESPACE")]
    pub vault_namespace: Option<String>,

    /// Auth method mount used when logging in with --role
    #[arg(long, default_value = DEFAULT_AUTH_MOUNT)]
    pub auth_mount: String,

    /// JWT presented when logging in with --role
    #[arg(long, default_value = DEFAULT_JWT_PATH)]
    pub jwt_path: PathBuf,

    /// Maximum number of secrets fetched concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_FETCHES)]
    pub concurrency: usize,

    /// Per-request timeout for Vault calls, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
