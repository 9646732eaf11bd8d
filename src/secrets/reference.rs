//! Parsing of a single placeholder into a secret reference.
//!
//! Grammar (delimiters optional): `{{ <path>!<key>[:<fallback>] }}`.

use super::types::ENVELOPE_FIELD;
use crate::error::{Error, Result};
use tracing::warn;

/// One parsed placeholder.
///
/// `value` starts out as the fallback and is only replaced by a verified
/// fetch, so an unresolved reference still carries its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReference {
    store_path: String,
    field_key: String,
    fallback: String,
    value: String,
}

impl SecretReference {
    /// Parse a raw placeholder token, with or without its `{{ }}` delimiters.
    pub fn parse(placeholder: &str) -> Result<Self> {
        let inner = trim_brackets(placeholder);

        let (store_path, key_segment) =
            inner
                .split_once('!')
                .ok_or_else(|| Error::MalformedReference {
                    placeholder: placeholder.to_string(),
                    reason: "path does not contain a `!` separator".to_string(),
                })?;

        let (field_key, fallback) = key_segment.split_once(':').unwrap_or((key_segment, ""));

        if store_path.trim().is_empty() {
            return Err(Error::MalformedReference {
                placeholder: placeholder.to_string(),
                reason: "secret path is empty".to_string(),
            });
        }
        if field_key.is_empty() {
            return Err(Error::MalformedReference {
                placeholder: placeholder.to_string(),
                reason: "secret key is empty".to_string(),
            });
        }

        if field_key == ENVELOPE_FIELD {
            warn!(
                "A secret called {field_key:?} can confuse things, as it's the name of the \
                 data field in the Vault response. It should work under KV v2, but please \
                 consider renaming it."
            );
        }

        Ok(Self {
            store_path: store_path.to_string(),
            field_key: field_key.to_string(),
            fallback: fallback.to_string(),
            value: fallback.to_string(),
        })
    }

    pub fn store_path(&self) -> &str {
        &self.store_path
    }

    pub fn field_key(&self) -> &str {
        &self.field_key
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Current best-known value: the fetched secret, or the fallback.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn set_value(&mut self, value: String) {
        self.value = value;
    }
}

fn trim_brackets(placeholder: &str) -> &str {
    placeholder
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim()
}
