//! One render run: read → extract → authenticate → resolve → render.
//!
//! The run decides at each step whether to stop or continue; with
//! `continue_on_error` every recoverable failure is logged and tolerated.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::secrets::{ResolutionBatch, SecretResolver, SecretStore};
use crate::template::TemplateFile;
use tracing::{debug, error, info};

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Placeholder occurrences in the template.
    pub placeholders: usize,
    /// Distinct placeholders resolved as one batch.
    pub distinct: usize,
    /// References whose value came from the store.
    pub resolved: usize,
    /// Placeholders left in the output because they had no value.
    pub unrendered: Vec<String>,
    /// Errors logged instead of aborting the run.
    pub tolerated_errors: Vec<String>,
}

/// Main control function.
pub async fn run(store: &dyn SecretStore, config: &Config) -> Result<RunReport> {
    let mut report = RunReport::default();

    // Not really possible to continue without a template.
    let template = TemplateFile::open(&config.input_file)?;
    let placeholders = template.find_placeholders();
    report.placeholders = placeholders.len();
    info!(
        "Found {} placeholder(s) in {}",
        placeholders.len(),
        template.path().display()
    );

    if let Err(err) = store.authenticate(config.vault.role.as_deref()).await {
        tolerate(config, &mut report, err)?;
    }

    let resolution = SecretResolver::new(store)
        .with_max_concurrent(config.vault.max_concurrent_fetches)
        .resolve(&placeholders)
        .await?;
    report.distinct = resolution.batch.len();
    report.resolved = resolution.resolved_count();

    let (batch, failure) = resolution.into_parts();
    if let Some(err) = failure {
        tolerate(config, &mut report, err)?;
    }

    let unrendered = render(&template, &batch, config, &mut report)?;
    report.unrendered = unrendered;

    debug!("Reached end of run: {report:?}");
    Ok(report)
}

fn render(
    template: &TemplateFile,
    batch: &ResolutionBatch,
    config: &Config,
    report: &mut RunReport,
) -> Result<Vec<String>> {
    match template.render_to(batch, &config.output_file) {
        Ok(rendered) => Ok(rendered.skipped),
        Err(err) => {
            tolerate(config, report, err)?;
            Ok(Vec::new())
        }
    }
}

fn tolerate(config: &Config, report: &mut RunReport, err: Error) -> Result<()> {
    if !config.continue_on_error {
        return Err(err);
    }
    error!("{err}; continuing");
    report.tolerated_errors.push(err.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfig;
    use crate::secrets::testing::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::Path;

    fn config(dir: &Path, template: &str, continue_on_error: bool) -> Config {
        let input = dir.join("app.properties");
        std::fs::write(&input, template).unwrap();
        Config {
            input_file: input,
            output_file: dir.join("out.properties"),
            continue_on_error,
            vault: VaultConfig::default(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_mount("secret", Some("2"))
            .with_document(
                "secret/data/example",
                json!({"data": {"foo": "s3cr3t", "two": "other"}}),
            )
    }

    #[tokio::test]
    async fn renders_all_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            "a={{ secret/example!foo }}\nb={{ secret/example!two }}\nc={{ secret/example!foo }}\n",
            false,
        );
        let report = run(&store(), &config).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&config.output_file).unwrap(),
            "a=s3cr3t\nb=other\nc=s3cr3t\n"
        );
        assert_eq!(report.placeholders, 3);
        assert_eq!(report.distinct, 2);
        assert_eq!(report.resolved, 2);
        assert!(report.unrendered.is_empty());
        assert!(report.tolerated_errors.is_empty());
    }

    #[tokio::test]
    async fn partial_failure_aborts_without_continue() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            "a={{ secret/example!foo }}\nb={{ secret/example!missing:dflt }}\n",
            false,
        );
        let err = run(&store(), &config).await.unwrap_err();
        assert!(matches!(err, Error::ResolutionPartialFailure { .. }));
        assert!(!config.output_file.exists());
    }

    #[tokio::test]
    async fn partial_failure_renders_with_continue() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            "a={{ secret/example!foo }}\nb={{ secret/example!missing:dflt }}\nc={{ secret/example!gone }}\n",
            true,
        );
        let report = run(&store(), &config).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&config.output_file).unwrap(),
            "a=s3cr3t\nb=dflt\nc={{ secret/example!gone }}\n"
        );
        assert_eq!(report.resolved, 1);
        assert_eq!(report.unrendered, vec!["{{ secret/example!gone }}".to_string()]);
        assert_eq!(report.tolerated_errors.len(), 1);
    }

    #[tokio::test]
    async fn malformed_placeholder_is_fatal_even_with_continue() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), "a={{ secret/example }}\n", true);
        let err = run(&store(), &config).await.unwrap_err();
        assert!(matches!(err, Error::BatchConstructionFailed { .. }));
    }

    #[tokio::test]
    async fn auth_failure_respects_continue_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let strict = config(dir.path(), "a={{ secret/example!foo:x }}\n", false);
        let err = run(&store().failing_auth(), &strict).await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed(_)));

        let lenient = Config {
            continue_on_error: true,
            ..strict
        };
        let report = run(&store().failing_auth(), &lenient).await.unwrap();
        assert_eq!(report.tolerated_errors.len(), 1);
        assert_eq!(
            std::fs::read_to_string(&lenient.output_file).unwrap(),
            "a=s3cr3t\n"
        );
    }

    #[tokio::test]
    async fn empty_store_value_is_not_counted_as_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            "a={{ secret/example!foo }}\nb={{ secret/example!blank:dflt }}\n",
            false,
        );
        let store = MemoryStore::new().with_mount("secret", Some("2")).with_document(
            "secret/data/example",
            json!({"data": {"foo": "s3cr3t", "blank": ""}}),
        );
        let report = run(&store, &config).await.unwrap();

        assert_eq!(report.distinct, 2);
        assert_eq!(report.resolved, 1);
        assert_eq!(
            std::fs::read_to_string(&config.output_file).unwrap(),
            "a=s3cr3t\nb=dflt\n"
        );
    }

    #[tokio::test]
    async fn missing_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            input_file: dir.path().join("absent.properties"),
            output_file: dir.path().join("out.properties"),
            continue_on_error: true,
            vault: VaultConfig::default(),
        };
        let err = run(&store(), &config).await.unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { .. }));
    }

    #[tokio::test]
    async fn write_failure_respects_continue_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), "a={{ secret/example!foo }}\n", false);
        config.output_file = dir.path().join("no-such-dir").join("out.properties");

        let err = run(&store(), &config).await.unwrap_err();
        assert!(matches!(err, Error::OutputWriteFailed { .. }));

        config.continue_on_error = true;
        let report = run(&store(), &config).await.unwrap();
        assert_eq!(report.tolerated_errors.len(), 1);
    }

    #[tokio::test]
    async fn inplace_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), "a={{ secret/example!foo }}\n", false);
        config.output_file = config.input_file.clone();

        run(&store(), &config).await.unwrap();
        let first = std::fs::read_to_string(&config.input_file).unwrap();
        let report = run(&store(), &config).await.unwrap();
        let second = std::fs::read_to_string(&config.input_file).unwrap();

        assert_eq!(first, "a=s3cr3t\n");
        assert_eq!(second, first);
        assert_eq!(report.placeholders, 0);
    }
}
