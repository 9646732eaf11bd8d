//! Core types shared by the resolution pipeline and store implementations.

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;

/// Member name under which KV v2 nests a secret's fields.
pub const ENVELOPE_FIELD: &str = "data";

// ============================================================================
// Store Trait
// ============================================================================

/// A remote key-value secret store.
///
/// Implementations are thin transports; path rewriting and KV shape
/// handling happen in the resolver, not here.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Display name for logging.
    fn name(&self) -> &str;

    /// Obtain credentials before any read. Stores without an auth step
    /// succeed immediately.
    async fn authenticate(&self, _role: Option<&str>) -> crate::error::Result<()> {
        Ok(())
    }

    /// Query the KV version indicator of the mount backing `path`.
    ///
    /// `Ok(None)` means the mount reports no version. Backends that do not
    /// expose mount metadata at all return `StoreError::NotFound`.
    async fn mount_version(&self, path: &str) -> Result<Option<String>, StoreError>;

    /// Read the document at `path`. `Ok(None)` when nothing exists there;
    /// `Ok(Some(Value::Null))` when the store answered without data.
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;
}

// ============================================================================
// Redaction
// ============================================================================

/// Redact a secret value for display (show first 2 and last 2 chars).
pub fn redact_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}…{tail}")
}
