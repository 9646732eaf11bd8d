use super::extract::{placeholder_text, PLACEHOLDER};
use crate::secrets::ResolutionBatch;
use regex::bytes::Captures;
use tracing::{debug, warn};

/// Result of substituting a batch into template bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: Vec<u8>,
    /// Placeholders left in place because their value was empty.
    pub skipped: Vec<String>,
}

/// Replace every occurrence of each placeholder with its resolved value.
///
/// Substitution is a single pass over `text`, so values are never scanned
/// for placeholders themselves. Bytes outside placeholders are copied as-is.
/// Placeholders whose value is empty, or which the batch does not know, are
/// left untouched rather than blanked.
pub fn render_secrets(text: &[u8], batch: &ResolutionBatch) -> Rendered {
    let mut skipped = Vec::new();
    for (placeholder, reference) in batch.iter() {
        if reference.value().is_empty() {
            warn!("Not replacing {placeholder}, empty string value");
            skipped.push(placeholder.clone());
        } else {
            debug!("Replacing {}", reference.store_path());
        }
    }

    let rendered = PLACEHOLDER.replace_all(text, |caps: &Captures| {
        let matched = &caps[0];
        match batch.get(&placeholder_text(matched)) {
            Some(reference) if !reference.value().is_empty() => {
                reference.value().as_bytes().to_vec()
            }
            _ => matched.to_vec(),
        }
    });

    Rendered {
        text: rendered.into_owned(),
        skipped,
    }
}
