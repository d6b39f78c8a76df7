//! Collaborator seams consumed by the harness.
//!
//! The convergence engine proper lives behind these traits; the harness
//! only drives them. Retry, timeout and cancellation semantics belong to
//! the implementations, never to the harness.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::AdminClient;
use crate::state::{DesiredConfig, GatewayState};

/// Snapshot read of live gateway entities.
#[async_trait]
pub trait StateReader: Send + Sync {
    async fn read_state(&self, client: &AdminClient) -> anyhow::Result<GatewayState>;
}

/// Applies a desired-state document against the live gateway, creating,
/// updating and removing entities as needed.
#[async_trait]
pub trait ConvergeExecutor: Send + Sync {
    async fn execute(&self, desired: &DesiredConfig, client: &AdminClient) -> anyhow::Result<()>;
}

/// Renders an exported document for inspection. The tool ships a yaml
/// printer; the harness never calls this itself.
pub trait PrettyPrinter {
    fn format(&self, doc: &Value) -> String;
}
