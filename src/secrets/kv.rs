//! KV backend shape detection and path rewriting.
//!
//! Vault's KV v1 engine returns a secret's fields as top-level members of
//! `data`; KV v2 nests them one level further under another `data` member
//! and expects reads at `<mount>/data/<rest>`.

use super::types::{SecretStore, ENVELOPE_FIELD};
use crate::error::{Error, Result, StoreError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// How a mount lays out a document's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvShape {
    /// KV v1: fields are top-level members.
    Flat,
    /// KV v2: fields are nested under [`ENVELOPE_FIELD`].
    Enveloped,
}

impl KvShape {
    /// Classify a mount from its reported version indicator.
    pub fn from_version(path: &str, version: Option<&str>) -> Result<Self> {
        match version {
            None | Some("") | Some("1") => Ok(KvShape::Flat),
            Some("2") => Ok(KvShape::Enveloped),
            Some(other) => Err(Error::UnsupportedBackendVersion {
                path: path.to_string(),
                version: other.to_string(),
            }),
        }
    }

    /// The path to read for a secret stored at `path`.
    pub fn read_path(self, path: &str) -> String {
        match self {
            KvShape::Flat => sanitize_path(path).to_string(),
            KvShape::Enveloped => update_path(path),
        }
    }
}

/// Trim whitespace and leading/trailing slashes.
pub fn sanitize_path(path: &str) -> &str {
    path.trim().trim_matches('/')
}

/// Insert the envelope segment after the mount: `mount/a/b` → `mount/data/a/b`.
pub fn update_path(path: &str) -> String {
    let path = sanitize_path(path);
    match path.split_once('/') {
        Some((mount, rest)) => format!("{mount}/{ENVELOPE_FIELD}/{rest}"),
        None => format!("{path}/{ENVELOPE_FIELD}"),
    }
}

fn mount_name(path: &str) -> &str {
    let path = sanitize_path(path);
    path.split_once('/').map_or(path, |(mount, _)| mount)
}

// ============================================================================
// Version Resolver
// ============================================================================

/// Determines the KV shape for store paths, caching the answer per mount
/// for the lifetime of one batch.
///
/// Concurrent first lookups on one mount wait on a shared cell, so each mount
/// is queried at most once unless the query fails.
pub struct KvVersionResolver<'a> {
    store: &'a dyn SecretStore,
    shapes: Mutex<HashMap<String, Arc<OnceCell<KvShape>>>>,
}

impl<'a> KvVersionResolver<'a> {
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self {
            store,
            shapes: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &'a dyn SecretStore {
        self.store
    }

    /// Classify the mount backing `path`.
    pub async fn shape(&self, path: &str) -> Result<KvShape> {
        let path = sanitize_path(path);
        let mount = mount_name(path);

        let cell = self
            .shapes
            .lock()
            .await
            .entry(mount.to_string())
            .or_default()
            .clone();

        cell.get_or_try_init(|| self.query_shape(path, mount))
            .await
            .copied()
    }

    async fn query_shape(&self, path: &str, mount: &str) -> Result<KvShape> {
        let shape = match self.store.mount_version(path).await {
            Ok(version) => KvShape::from_version(path, version.as_deref())?,
            Err(StoreError::NotFound) => {
                debug!("No mount metadata for '{path}', assuming KV v1");
                KvShape::Flat
            }
            Err(source) => {
                return Err(Error::BackendUnreachable {
                    path: path.to_string(),
                    source,
                })
            }
        };

        debug!("Mount '{mount}' uses {shape:?} KV shape");
        Ok(shape)
    }

    /// Classify `path` and compute the effective read path.
    pub async fn read_path(&self, path: &str) -> Result<(KvShape, String)> {
        let shape = self.shape(path).await?;
        Ok((shape, shape.read_path(path)))
    }
}

// ============================================================================
// Documents
// ============================================================================

/// A fetched secret document, tagged with the shape it was read under.
#[derive(Debug, Clone, PartialEq)]
pub enum SecretDocument {
    Flat(Map<String, Value>),
    Enveloped(Map<String, Value>),
}

impl SecretDocument {
    /// Interpret the `data` member of a read response under `shape`.
    pub fn from_response(shape: KvShape, path: &str, data: Value) -> Result<Self> {
        let mut map = match data {
            Value::Object(map) => map,
            _ => {
                return Err(Error::EmptyDocument {
                    path: path.to_string(),
                })
            }
        };

        match shape {
            KvShape::Flat => Ok(SecretDocument::Flat(map)),
            KvShape::Enveloped => match map.remove(ENVELOPE_FIELD) {
                Some(Value::Object(fields)) => Ok(SecretDocument::Enveloped(fields)),
                _ => Err(Error::MalformedEnvelope {
                    path: path.to_string(),
                }),
            },
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            SecretDocument::Flat(fields) | SecretDocument::Enveloped(fields) => fields,
        }
    }

    /// Look up `key`, rendering scalars as text.
    pub fn field(&self, path: &str, key: &str) -> Result<String> {
        match self.fields().get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(Value::Null) | None => Err(Error::FieldNotFound {
                path: path.to_string(),
                key: key.to_string(),
            }),
            Some(Value::Array(_)) | Some(Value::Object(_)) => Err(Error::UnsupportedFieldType {
                path: path.to_string(),
                key: key.to_string(),
            }),
        }
    }
}
