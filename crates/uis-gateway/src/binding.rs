//! Query bindings — the per-view query lifecycle.
//!
//! A binding ties one operation + variables to one view's lifetime and
//! exposes the uniform {data, loading, error, refetch} contract. Responses
//! apply under a sequence-number discipline: every issue bumps a
//! per-binding counter and a response only lands if its number is still the
//! latest issued — last write wins by issue order, not completion order.
//! This replaces a UI framework's unmount hook with an explicit rule.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::cache::{FetchPolicy, QueryCache};
use crate::client::{GatewayClient, GatewayError};
use crate::operations::Operation;

/// Lifecycle phase of a binding.
///
/// Transitions: `Idle → Loading → {Success, Error}`; `Success|Error →
/// Loading` on refetch or variable change, and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

/// A read-only snapshot a view renders from.
#[derive(Debug, Clone)]
pub struct BindingView {
    pub phase: Phase,
    /// Last successful payload. Retained through later errors so the view
    /// can show stale content alongside an error banner.
    pub data: Option<Value>,
    pub error: Option<GatewayError>,
}

struct BindingState {
    variables: Value,
    phase: Phase,
    data: Option<Value>,
    error: Option<GatewayError>,
    issued: u64,
    closed: bool,
}

/// One view's binding to one operation.
///
/// Clones share the same state (a view handle plus its in-flight request);
/// separate bindings never share mutable state, even for the same
/// operation — deduplication is the cache's concern, not this layer's.
#[derive(Clone)]
pub struct QueryBinding {
    operation: &'static Operation,
    fetch_policy: FetchPolicy,
    state: Arc<Mutex<BindingState>>,
}

impl QueryBinding {
    /// Create an idle binding with the default fetch policy
    /// (cache-and-network).
    pub fn new(operation: &'static Operation, variables: Value) -> Self {
        Self::with_policy(operation, variables, FetchPolicy::default())
    }

    pub fn with_policy(
        operation: &'static Operation,
        variables: Value,
        fetch_policy: FetchPolicy,
    ) -> Self {
        Self {
            operation,
            fetch_policy,
            state: Arc::new(Mutex::new(BindingState {
                variables,
                phase: Phase::Idle,
                data: None,
                error: None,
                issued: 0,
                closed: false,
            })),
        }
    }

    pub fn operation(&self) -> &'static Operation {
        self.operation
    }

    /// Snapshot of the current lifecycle state.
    pub fn snapshot(&self) -> BindingView {
        let state = self.lock();
        BindingView {
            phase: state.phase,
            data: state.data.clone(),
            error: state.error.clone(),
        }
    }

    /// Start a request: enter Loading and reserve the next sequence number.
    /// Returns `None` once the binding is closed.
    ///
    /// Issuing implicitly supersedes any outstanding request — its eventual
    /// response will fail the sequence check and be discarded.
    pub fn issue(&self) -> Option<u64> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        state.issued += 1;
        state.phase = Phase::Loading;
        Some(state.issued)
    }

    /// Apply a successful response for the given sequence number.
    ///
    /// Returns false when the response is stale (superseded or after
    /// teardown); stale responses are discarded by design, not errors.
    pub fn apply_success(&self, seq: u64, data: Value) -> bool {
        let mut state = self.lock();
        if !Self::is_current(&state, seq) {
            tracing::debug!(
                operation = self.operation.name,
                seq,
                latest = state.issued,
                "Stale response discarded"
            );
            return false;
        }
        state.phase = Phase::Success;
        state.data = Some(data);
        state.error = None;
        true
    }

    /// Apply a failed response for the given sequence number.
    ///
    /// Prior data, if any, is retained alongside the error.
    pub fn apply_error(&self, seq: u64, error: GatewayError) -> bool {
        let mut state = self.lock();
        if !Self::is_current(&state, seq) {
            tracing::debug!(
                operation = self.operation.name,
                seq,
                latest = state.issued,
                "Stale failure discarded"
            );
            return false;
        }
        state.phase = Phase::Error;
        state.error = Some(error);
        true
    }

    /// Re-parameterize the binding. Logically cancels any outstanding
    /// request; the next [`fetch`](QueryBinding::fetch) re-enters Loading
    /// with the new variables.
    pub fn set_variables(&self, variables: Value) {
        let mut state = self.lock();
        if state.variables == variables {
            return;
        }
        state.variables = variables;
        // Bumping the counter without issuing invalidates in-flight
        // responses for the old variables.
        state.issued += 1;
    }

    /// Tear the binding down. Any in-flight request's eventual result is
    /// discarded; no state mutates after this.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
    }

    /// Drive one fetch round through the cache and the gateway.
    ///
    /// Under cache-and-network, a cached payload is applied synchronously
    /// (the view renders instantly on repeat visits) and the network
    /// revalidation then updates it under the same sequence number. The
    /// cache is only written on success, so a failed revalidation leaves
    /// last-known-good data in place.
    pub async fn fetch(&self, client: &GatewayClient, cache: &QueryCache) -> BindingView {
        let Some(seq) = self.issue() else {
            return self.snapshot();
        };
        let variables = self.lock().variables.clone();

        let cached = cache.lookup(self.operation.name, &variables);
        if let Some(cached) = cached {
            self.apply_success(seq, cached);
            if self.fetch_policy == FetchPolicy::CacheFirst {
                return self.snapshot();
            }
        }

        match client
            .execute(self.operation.name, self.operation.document, &variables)
            .await
        {
            Ok(fresh) => {
                let stored = cache.store(self.operation.name, &variables, fresh, self.operation.merge);
                self.apply_success(seq, stored);
            }
            Err(error) => {
                self.apply_error(seq, error);
            }
        }

        self.snapshot()
    }

    /// Manual refetch: re-enters Loading from Success or Error and runs the
    /// same round as [`fetch`](QueryBinding::fetch).
    pub async fn refetch(&self, client: &GatewayClient, cache: &QueryCache) -> BindingView {
        self.fetch(client, cache).await
    }

    fn is_current(state: &BindingState, seq: u64) -> bool {
        !state.closed && seq == state.issued
    }

    fn lock(&self) -> MutexGuard<'_, BindingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
