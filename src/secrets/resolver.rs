//! Batch resolution of placeholders against a secret store.
//!
//! Every distinct placeholder becomes one [`SecretReference`]. Fetches fan
//! out up to a concurrency limit; failures are collected per placeholder
//! and reported together, never short-circuiting the rest of the batch.

use super::kv::{KvVersionResolver, SecretDocument};
use super::reference::SecretReference;
use super::types::{redact_secret, SecretStore};
use crate::error::{Error, Result};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Default number of fetches in flight at once.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

// ============================================================================
// Batch
// ============================================================================

/// All references of one run, keyed by their raw placeholder text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionBatch {
    references: BTreeMap<String, SecretReference>,
}

impl ResolutionBatch {
    /// Parse every placeholder. Duplicates collapse into one reference; a
    /// single malformed placeholder fails the whole batch.
    pub fn from_placeholders<S: AsRef<str>>(placeholders: &[S]) -> Result<Self> {
        let mut references = BTreeMap::new();
        for placeholder in placeholders {
            let placeholder = placeholder.as_ref();
            if references.contains_key(placeholder) {
                continue;
            }
            let reference = SecretReference::parse(placeholder).map_err(|source| {
                Error::BatchConstructionFailed {
                    placeholder: placeholder.to_string(),
                    source: Box::new(source),
                }
            })?;
            references.insert(placeholder.to_string(), reference);
        }
        Ok(Self { references })
    }

    pub fn get(&self, placeholder: &str) -> Option<&SecretReference> {
        self.references.get(placeholder)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SecretReference)> {
        self.references.iter()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub(crate) fn set_value(&mut self, placeholder: &str, value: String) {
        if let Some(reference) = self.references.get_mut(placeholder) {
            reference.set_value(value);
        }
    }
}

/// Outcome of resolving a batch: every reference, plus the failures.
#[derive(Debug)]
pub struct Resolution {
    pub batch: ResolutionBatch,
    /// Per-placeholder failures. These references still hold their fallback.
    pub failures: BTreeMap<String, Error>,
    resolved: usize,
}

impl Resolution {
    /// References whose value came from the store. Empty store values keep
    /// the fallback and are not counted.
    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// Split into the batch and one aggregate error, if anything failed.
    pub fn into_parts(self) -> (ResolutionBatch, Option<Error>) {
        if self.failures.is_empty() {
            return (self.batch, None);
        }
        let messages = self.failures.values().map(|e| e.to_string()).collect();
        (self.batch, Some(Error::ResolutionPartialFailure { messages }))
    }
}

// ============================================================================
// Resolver
// ============================================================================

pub struct SecretResolver<'a> {
    store: &'a dyn SecretStore,
    max_concurrent: usize,
}

impl<'a> SecretResolver<'a> {
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self {
            store,
            max_concurrent: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Resolve secrets for the given placeholders.
    ///
    /// Only batch construction errors are returned as `Err`; fetch failures
    /// end up in [`Resolution::failures`].
    pub async fn resolve<S: AsRef<str>>(&self, placeholders: &[S]) -> Result<Resolution> {
        let mut batch = ResolutionBatch::from_placeholders(placeholders)?;
        info!(
            "Resolving {} secret reference(s) via {}",
            batch.len(),
            self.store.name()
        );

        let shapes = KvVersionResolver::new(self.store);
        let shapes = &shapes;
        let outcomes: Vec<(String, Result<Option<String>>)> = stream::iter(batch.iter())
            .map(|(placeholder, reference)| async move {
                (placeholder.clone(), retrieve(shapes, reference).await)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut failures = BTreeMap::new();
        let mut resolved = 0;
        for (placeholder, outcome) in outcomes {
            match outcome {
                Ok(Some(value)) => {
                    batch.set_value(&placeholder, value);
                    resolved += 1;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!("Could not resolve {placeholder}: {err}");
                    failures.insert(placeholder, err);
                }
            }
        }

        let resolution = Resolution {
            batch,
            failures,
            resolved,
        };
        info!(
            "Secret resolution complete: {} resolved, {} failed",
            resolution.resolved_count(),
            resolution.failures.len()
        );
        Ok(resolution)
    }
}

/// Fetch one reference. `Ok(None)` means the store answered with an empty
/// value and the fallback stays in place.
async fn retrieve(
    shapes: &KvVersionResolver<'_>,
    reference: &SecretReference,
) -> Result<Option<String>> {
    let path = reference.store_path();
    let key = reference.field_key();

    let (shape, read_path) = shapes.read_path(path).await?;
    debug!("Reading '{read_path}' for key {key} ({shape:?})");

    let data = shapes
        .store()
        .read(&read_path)
        .await
        .map_err(|source| Error::BackendUnreachable {
            path: path.to_string(),
            source,
        })?
        .ok_or_else(|| Error::SecretNotFound {
            path: path.to_string(),
        })?;

    let document = SecretDocument::from_response(shape, path, data)?;
    let value = document.field(path, key)?;

    if value.is_empty() {
        warn!("Vault returned an empty value for {key} at '{path}', keeping fallback");
        return Ok(None);
    }

    debug!("Setting value of {key} ({})", redact_secret(&value));
    Ok(Some(value))
}
