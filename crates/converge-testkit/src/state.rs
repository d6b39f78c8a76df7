//! Gateway state snapshots and desired-state documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of live entities returned by the state reader. Entities keep
/// whatever shape the gateway reports; the harness never interprets them
/// beyond annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayState {
    #[serde(default)]
    pub apis: Vec<Value>,
    #[serde(default)]
    pub consumers: Vec<Value>,
    #[serde(default)]
    pub plugins: Vec<Value>,
}

/// Desired-state document submitted to the convergence executor. Entities
/// may carry an `ensure: removed` directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredConfig {
    pub apis: Vec<Value>,
    pub consumers: Vec<Value>,
    pub plugins: Vec<Value>,
}

/// Builds the teardown plan: every live api, consumer and plugin annotated
/// `ensure: removed`. Constructed fresh per teardown, never persisted.
pub fn removal_plan(state: &GatewayState) -> DesiredConfig {
    DesiredConfig {
        apis: state.apis.iter().map(mark_removed).collect(),
        consumers: state.consumers.iter().map(mark_removed).collect(),
        plugins: state.plugins.iter().map(mark_removed).collect(),
    }
}

fn mark_removed(entity: &Value) -> Value {
    let mut copy = entity.clone();
    if let Value::Object(map) = &mut copy {
        map.insert("ensure".into(), Value::String("removed".into()));
    }
    copy
}
