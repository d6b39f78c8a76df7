//! Admin API client handle and environment-driven configuration.

use std::env;

use reqwest::Client;
use url::Url;

use crate::error::HarnessError;

/// Environment variable naming the target admin API, `host:port` form.
pub const ADMIN_HOST_ENV: &str = "CONVERGE_TEST_ADMIN_HOST";

/// Canonical host substituted into logged `uri` fields so logs compare
/// equal regardless of where the gateway actually runs.
pub const CANONICAL_ADMIN_HOST: &str = "localhost:8001";

/// Connection settings for the admin API client factory.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub host: String,
    pub https: bool,
    pub ignore_consumers: bool,
    pub cache: bool,
}

impl AdminConfig {
    /// Reads the target admin host from [`ADMIN_HOST_ENV`].
    ///
    /// A missing variable is a fatal configuration error: the harness must
    /// not run tests against an unknown gateway, so this is checked before
    /// any test step executes.
    pub fn from_env() -> Result<Self, HarnessError> {
        let host = env::var(ADMIN_HOST_ENV).map_err(|_| {
            HarnessError::Config(format!(
                "{ADMIN_HOST_ENV} is not set.\n\n    \
                 Point it at the admin API of a disposable gateway:\n\n    \
                 {ADMIN_HOST_ENV}=localhost:8001 cargo test\n\n    \
                 WARNING: integration tests remove all data from that gateway."
            ))
        })?;
        Ok(Self::new(host))
    }

    /// Plain-http config with consumers enabled and caching disabled,
    /// matching what integration tests expect from a disposable gateway.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            https: false,
            ignore_consumers: false,
            cache: false,
        }
    }
}

/// Long-lived admin API handle, built once per test process and reused for
/// every state read and convergence pass.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    config: AdminConfig,
}

impl AdminClient {
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }
}

/// Admin API client factory.
pub fn admin_client(config: AdminConfig) -> Result<AdminClient, HarnessError> {
    let scheme = if config.https { "https" } else { "http" };
    let base_url = Url::parse(&format!("{scheme}://{}", config.host)).map_err(|e| {
        HarnessError::Config(format!("invalid admin host {:?}: {e}", config.host))
    })?;
    let http = Client::builder()
        .build()
        .map_err(|e| HarnessError::Config(format!("build http client: {e}")))?;
    Ok(AdminClient {
        http,
        base_url,
        config,
    })
}
