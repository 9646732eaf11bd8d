//! In-memory store used by unit tests.

use super::types::SecretStore;
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub(crate) struct MemoryStore {
    mounts: HashMap<String, Option<String>>,
    documents: HashMap<String, Value>,
    broken_paths: Vec<String>,
    metadata_fails: bool,
    auth_fails: bool,
    metadata_queries: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register mount metadata; unregistered mounts answer `NotFound`.
    pub(crate) fn with_mount(mut self, mount: &str, version: Option<&str>) -> Self {
        self.mounts
            .insert(mount.to_string(), version.map(String::from));
        self
    }

    /// Store `data` as the read response at the effective read path.
    pub(crate) fn with_document(mut self, read_path: &str, data: Value) -> Self {
        self.documents.insert(read_path.to_string(), data);
        self
    }

    /// Fail every read of `read_path` with a transport-style error.
    pub(crate) fn with_broken_path(mut self, read_path: &str) -> Self {
        self.broken_paths.push(read_path.to_string());
        self
    }

    pub(crate) fn failing_metadata(mut self) -> Self {
        self.metadata_fails = true;
        self
    }

    pub(crate) fn failing_auth(mut self) -> Self {
        self.auth_fails = true;
        self
    }

    pub(crate) fn metadata_queries(&self) -> usize {
        self.metadata_queries.load(Ordering::SeqCst)
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn authenticate(&self, _role: Option<&str>) -> crate::error::Result<()> {
        if self.auth_fails {
            return Err(crate::error::Error::AuthenticationFailed(
                "entry for role InvalidRole not found".to_string(),
            ));
        }
        Ok(())
    }

    async fn mount_version(&self, path: &str) -> Result<Option<String>, StoreError> {
        self.metadata_queries.fetch_add(1, Ordering::SeqCst);
        // Let other in-flight fetches run, as a network round trip would.
        tokio::task::yield_now().await;
        if self.metadata_fails {
            return Err(StoreError::Status {
                status: 503,
                errors: vec!["Vault is sealed".to_string()],
            });
        }
        let mount = path.split('/').next().unwrap_or(path);
        match self.mounts.get(mount) {
            Some(version) => Ok(version.clone()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.broken_paths.iter().any(|p| p == path) {
            return Err(StoreError::Status {
                status: 403,
                errors: vec!["permission denied".to_string()],
            });
        }
        Ok(self.documents.get(path).cloned())
    }
}
