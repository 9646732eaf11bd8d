//! Secret references and their resolution against a key-value store.
//!
//! 1. **Parse**: each placeholder becomes a [`SecretReference`] carrying its fallback
//! 2. **Classify**: the mount's KV version decides the read path and document shape
//! 3. **Fetch**: values overwrite fallbacks only on success; failures are aggregated

pub mod kv;
pub mod reference;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use kv::{sanitize_path, update_path, KvShape, KvVersionResolver, SecretDocument};
pub use reference::SecretReference;
pub use resolver::{Resolution, ResolutionBatch, SecretResolver};
pub use types::{redact_secret, SecretStore, ENVELOPE_FIELD};
