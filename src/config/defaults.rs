/// Default configuration constants used across the system.

/// Default Vault address, matching the official client.
pub const DEFAULT_VAULT_ADDR: &str = "https://127.0.0.1:8200";

/// Default auth method mount used for role-based login.
pub const DEFAULT_AUTH_MOUNT: &str = "kubernetes";

/// Default location of the service account JWT presented at login.
pub const DEFAULT_JWT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Default per-request timeout for Vault calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of secret fetches in flight at once.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = crate::secrets::resolver::DEFAULT_MAX_CONCURRENT_FETCHES;
