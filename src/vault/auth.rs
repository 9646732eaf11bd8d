//! Role-based login against a JWT auth method (Kubernetes by default).
//!
//! A token supplied up front (flag or `VAULT_TOKEN`) always wins; login is
//! only attempted when the client holds no token.

use super::client::{status_error, VaultClient};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    role: &'a str,
    jwt: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    auth: Option<LoginAuth>,
}

#[derive(Debug, Deserialize)]
struct LoginAuth {
    #[serde(default)]
    client_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    data: Option<Value>,
}

pub(super) async fn authenticate(client: &VaultClient, role: Option<&str>) -> Result<()> {
    if client.has_token().await {
        debug!("Already authenticated by token");
        return Ok(());
    }

    let role = role.ok_or_else(|| {
        Error::AuthenticationFailed("no Vault token is set and no role was given".to_string())
    })?;

    debug!("Authenticating with Vault as role {role}...");
    let jwt = tokio::fs::read_to_string(client.jwt_path())
        .await
        .map_err(|e| {
            Error::AuthenticationFailed(format!(
                "could not read JWT from {}: {e}",
                client.jwt_path().display()
            ))
        })?;

    let url = client.url(&format!("auth/{}/login", client.auth_mount()));
    let request = client
        .prepare(client.http().post(&url).json(&LoginRequest {
            role,
            jwt: jwt.trim(),
        }))
        .await;
    let response = request
        .send()
        .await
        .map_err(|e| Error::AuthenticationFailed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(Error::AuthenticationFailed(
            status_error(response).await.to_string(),
        ));
    }

    let body: LoginResponse = response
        .json()
        .await
        .map_err(|e| Error::AuthenticationFailed(format!("could not decode login response: {e}")))?;
    let token = body
        .auth
        .map(|auth| auth.client_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::AuthenticationFailed("no secret returned from Vault".to_string()))?;

    client.set_token(token).await;
    lookup_self(client).await?;
    info!("Authenticated with Vault as role {role}");
    Ok(())
}

/// Confirm the held token is accepted.
async fn lookup_self(client: &VaultClient) -> Result<()> {
    let url = client.url("auth/token/lookup-self");
    let response = client
        .prepare(client.http().get(&url))
        .await
        .send()
        .await
        .map_err(|e| Error::AuthenticationFailed(format!("no token found in Vault client: {e}")))?;
    if !response.status().is_success() {
        return Err(Error::AuthenticationFailed(format!(
            "no token found in Vault client: {}",
            status_error(response).await
        )));
    }

    let body: LookupResponse = response
        .json()
        .await
        .map_err(|e| Error::AuthenticationFailed(format!("could not decode token lookup: {e}")))?;
    match body.data {
        Some(Value::Object(_)) => Ok(()),
        _ => Err(Error::AuthenticationFailed(
            "got empty secret when checking token".to_string(),
        )),
    }
}
