//! Action-log capture and teardown orchestration.

use std::sync::Mutex;

use serde_json::Value;
use tracing::{debug, info};

use crate::client::{AdminClient, CANONICAL_ADMIN_HOST};
use crate::error::HarnessError;
use crate::sanitize::{IGNORED_KEYS, Sanitizer};
use crate::state::removal_plan;
use crate::traits::{ConvergeExecutor, StateReader};

// Emitted when feature flags differ across the test matrix; recording them
// would make logs diverge between environments.
const SUPPRESSED_TYPE: &str = "experimental-features";

#[derive(Debug, Default)]
struct HarnessState {
    sanitizer: Sanitizer,
    raw_log: Vec<Value>,
    log: Vec<Value>,
}

/// Process-wide harness state: the uuid memo table and the two action logs.
///
/// One instance is shared by every test step in a run. The engine pushes
/// action messages through [`Harness::append`]; assertions read
/// [`Harness::sanitized_log`]; [`Harness::tear_down`] removes all live
/// gateway entities and resets the in-memory state between tests.
///
/// The mutex provides interior mutability for the shared logger callback;
/// the harness assumes a single logical test sequence, not concurrent
/// writers.
pub struct Harness {
    host: String,
    state: Mutex<HarnessState>,
}

impl Harness {
    /// `host` is the admin API address substituted out of logged uris.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            state: Mutex::new(HarnessState::default()),
        }
    }

    /// Builds the harness from [`crate::ADMIN_HOST_ENV`]; fatal if unset.
    pub fn from_env() -> Result<Self, HarnessError> {
        Ok(Self::new(crate::client::AdminConfig::from_env()?.host))
    }

    /// Logger callback handed to the convergence executor.
    ///
    /// `experimental-features` markers are discarded outright. Every other
    /// message is deep-copied, its `uri` host rewritten to
    /// [`CANONICAL_ADMIN_HOST`], appended to the raw log, and a sanitized
    /// copy (uuids normalized, volatile keys redacted) appended to the
    /// sanitized log. The two logs stay index-aligned.
    pub fn append(&self, message: &Value) {
        if message.get("type").and_then(Value::as_str) == Some(SUPPRESSED_TYPE) {
            debug!("suppressing experimental-features action message");
            return;
        }

        let mut raw = message.clone();
        if let Some(Value::String(uri)) = raw.get_mut("uri") {
            *uri = uri.replace(&self.host, CANONICAL_ADMIN_HOST);
        }

        let mut state = self.state.lock().expect("harness state poisoned");
        let sanitized = state.sanitizer.sanitize(&raw, IGNORED_KEYS);
        state.raw_log.push(raw);
        state.log.push(sanitized);
    }

    /// Sanitized log snapshot, in append order.
    pub fn sanitized_log(&self) -> Vec<Value> {
        self.state.lock().expect("harness state poisoned").log.clone()
    }

    /// Raw (host-normalized only) log snapshot, in append order.
    pub fn raw_log(&self) -> Vec<Value> {
        self.state
            .lock()
            .expect("harness state poisoned")
            .raw_log
            .clone()
    }

    /// Left-folds the raw log through the engine's state reducer, yielding
    /// the logical gateway state implied by all actions recorded so far.
    /// Re-deriving from the same log always yields the same state.
    pub fn effective_state<S>(
        &self,
        mut reduce: impl FnMut(Option<S>, &Value) -> Option<S>,
    ) -> Option<S> {
        let state = self.state.lock().expect("harness state poisoned");
        state.raw_log.iter().fold(None, |acc, m| reduce(acc, m))
    }

    /// Clears the memo table and both logs.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("harness state poisoned");
        state.sanitizer.reset();
        state.raw_log.clear();
        state.log.clear();
    }

    /// Removes every live api, consumer and plugin through the convergence
    /// executor, then resets the in-memory harness state.
    ///
    /// Remote cleanup runs first: a state-read or executor failure
    /// propagates and leaves the local logs and memo table intact, so a
    /// failed teardown never reports a clean local view the gateway does
    /// not share. No retries at this layer.
    pub async fn tear_down<R, E>(
        &self,
        reader: &R,
        executor: &E,
        client: &AdminClient,
    ) -> Result<(), HarnessError>
    where
        R: StateReader,
        E: ConvergeExecutor,
    {
        let live = reader
            .read_state(client)
            .await
            .map_err(HarnessError::StateRead)?;
        let plan = removal_plan(&live);
        info!(
            apis = plan.apis.len(),
            consumers = plan.consumers.len(),
            plugins = plan.plugins.len(),
            "tearing down gateway state"
        );
        executor
            .execute(&plan, client)
            .await
            .map_err(HarnessError::Execute)?;
        self.reset();
        Ok(())
    }
}
