use super::auth;
use crate::config::VaultConfig;
use crate::error::{Error, Result, StoreError};
use crate::secrets::SecretStore;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

/// Vault HTTP API client.
pub struct VaultClient {
    address: String,
    namespace: Option<String>,
    auth_mount: String,
    jwt_path: std::path::PathBuf,
    token: RwLock<Option<String>>,
    client: Client,
}

impl VaultClient {
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("could not build HTTP client: {e}")))?;

        Ok(Self {
            address: config.address.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
            auth_mount: config.auth_mount.trim_matches('/').to_string(),
            jwt_path: config.jwt_path.clone(),
            token: RwLock::new(config.token.clone()),
            client,
        })
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, path.trim_start_matches('/'))
    }

    /// Attach token and namespace headers.
    pub(super) async fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request;
        if let Some(token) = self.token.read().await.as_deref() {
            request = request.header("X-Vault-Token", token);
        }
        if let Some(namespace) = &self.namespace {
            request = request.header("X-Vault-Namespace", namespace);
        }
        request
    }

    pub(super) async fn set_token(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    async fn get(&self, path: &str) -> std::result::Result<Response, StoreError> {
        let url = self.url(path);
        debug!("GET {url}");
        let request = self.prepare(self.client.get(&url)).await;
        Ok(request.send().await?)
    }

    pub(super) fn http(&self) -> &Client {
        &self.client
    }

    pub(super) fn auth_mount(&self) -> &str {
        &self.auth_mount
    }

    pub(super) fn jwt_path(&self) -> &std::path::Path {
        &self.jwt_path
    }
}

// ============================================================================
// Vault API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SecretResponse {
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MountResponse {
    #[serde(default)]
    data: Option<MountData>,
}

#[derive(Debug, Deserialize)]
struct MountData {
    #[serde(default)]
    options: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Turn a non-success response into a `StoreError`, keeping Vault's messages.
pub(super) async fn status_error(response: Response) -> StoreError {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return StoreError::NotFound;
    }
    let body: ErrorResponse = response.json().await.unwrap_or_default();
    StoreError::Status {
        status: status.as_u16(),
        errors: body.errors,
    }
}

fn version_indicator(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// SecretStore Implementation
// ============================================================================

#[async_trait]
impl SecretStore for VaultClient {
    fn name(&self) -> &str {
        "vault"
    }

    async fn authenticate(&self, role: Option<&str>) -> Result<()> {
        auth::authenticate(self, role).await
    }

    async fn mount_version(&self, path: &str) -> std::result::Result<Option<String>, StoreError> {
        let response = self
            .get(&format!("sys/internal/ui/mounts/{}", path.trim_matches('/')))
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: MountResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(body
            .data
            .and_then(|d| d.options)
            .and_then(|options| options.get("version").and_then(version_indicator)))
    }

    async fn read(&self, path: &str) -> std::result::Result<Option<Value>, StoreError> {
        let response = self.get(path).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: SecretResponse = response
                    .json()
                    .await
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                Ok(Some(body.data.unwrap_or(Value::Null)))
            }
            _ => Err(status_error(response).await),
        }
    }
}
