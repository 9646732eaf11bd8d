//! Error taxonomy for template rendering and secret resolution.
//!
//! Per-reference failures (`UnsupportedBackendVersion` through
//! `UnsupportedFieldType`) never abort a batch on their own; the resolver
//! collects them into a single `ResolutionPartialFailure`.

use std::path::PathBuf;

/// Errors returned by the secret store transport.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("unexpected status {status}: {}", .errors.join("; "))]
    Status { status: u16, errors: Vec<String> },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed placeholder {placeholder:?}: {reason}")]
    MalformedReference { placeholder: String, reason: String },

    #[error("could not construct secret for {placeholder}: {source}")]
    BatchConstructionFailed {
        placeholder: String,
        #[source]
        source: Box<Error>,
    },

    #[error("unknown KV API version {version:?} for mount of '{path}'")]
    UnsupportedBackendVersion { path: String, version: String },

    #[error("failed to fetch secret '{path}' from Vault: {source}")]
    BackendUnreachable {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("secret '{path}' does not exist in Vault")]
    SecretNotFound { path: String },

    #[error("secret '{path}' was returned without data")]
    EmptyDocument { path: String },

    #[error("could not parse KV v2 secret data at '{path}'")]
    MalformedEnvelope { path: String },

    #[error("secret data for path {path} does not contain key {key}")]
    FieldNotFound { path: String, key: String },

    #[error("key {key} at path {path} is not a scalar value")]
    UnsupportedFieldType { path: String, key: String },

    #[error("[{}]", quote_all(.messages))]
    ResolutionPartialFailure { messages: Vec<String> },

    #[error("template file {} does not exist", .path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("failed reading template '{}': {source}", .path.display())]
    TemplateReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed writing to file '{}': {source}", .path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed authenticating with Vault: {0}")]
    AuthenticationFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn quote_all(messages: &[String]) -> String {
    messages
        .iter()
        .map(|m| format!("{m:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_lists_quoted_messages() {
        let err = Error::ResolutionPartialFailure {
            messages: vec!["first failure".into(), "second failure".into()],
        };
        assert_eq!(err.to_string(), r#"["first failure", "second failure"]"#);
    }

    #[test]
    fn store_status_joins_vault_errors() {
        let err = StoreError::Status {
            status: 403,
            errors: vec!["permission denied".into(), "invalid token".into()],
        };
        assert_eq!(
            err.to_string(),
            "unexpected status 403: permission denied; invalid token"
        );
    }
}
