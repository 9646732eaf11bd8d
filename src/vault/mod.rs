//! HashiCorp Vault as a [`SecretStore`](crate::secrets::SecretStore).

mod auth;
mod client;

pub use client::VaultClient;
