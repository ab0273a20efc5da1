//! Query resolver
//!
//! Adapts a remote GraphQL query plus bound variables into a lazy Action.
//! The returned Action is `Callback`-wrapped, so the query only runs when
//! that branch of the completion tree is actually reached, and the
//! resolution cache guarantees at most one remote call per key within a
//! single completion request.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tracing::debug;

use crate::api::QueryExecutor;
use crate::complete::action::Action;
use crate::complete::cache::ResolutionCache;
use crate::complete::candidate::Candidate;
use crate::error::{CompletionError, ForgeError};

/// Turns remote queries into lazy, cached Actions.
///
/// Cheap to clone; clones share the executor and the per-request cache.
#[derive(Clone)]
pub struct QueryResolver {
    /// Transport collaborator executing GraphQL queries
    executor: Arc<dyn QueryExecutor>,

    /// Per-request memo, shared across all resolvers of the request
    cache: Arc<ResolutionCache>,
}

impl QueryResolver {
    /// Create a resolver over an executor and a fresh per-request cache.
    pub fn new(executor: Arc<dyn QueryExecutor>, cache: Arc<ResolutionCache>) -> Self {
        Self { executor, cache }
    }

    /// Build a lazy Action for a query.
    ///
    /// # Arguments
    /// * `key` - Cache key uniquely identifying the bound variables
    /// * `query` - GraphQL document
    /// * `variables` - JSON object bound to the document's variables
    /// * `map` - Maps the query's `data` object into candidates; a shape
    ///   mismatch fails into the empty-candidate path
    ///
    /// # Returns
    /// * `Action` - A `Callback` node; invoking it resolves through the
    ///   cache and degrades to empty on any failure
    pub fn resolve<M>(
        &self,
        key: impl Into<String>,
        query: &'static str,
        variables: Value,
        map: M,
    ) -> Action
    where
        M: Fn(&Value) -> Result<Vec<Candidate>, ForgeError> + Send + Sync + 'static,
    {
        let executor = self.executor.clone();
        let cache = self.cache.clone();
        let key = key.into();

        Action::callback(move |_ctx| {
            let candidates = cache.resolve_with(&key, || {
                debug!(key, "resolving completion query");
                let data = execute_blocking(executor.as_ref(), query, variables.clone())?;
                map(&data)
            });
            Ok(Action::Static(candidates))
        })
    }
}

/// Run an async query to completion from the synchronous completion path.
///
/// Completion walks the Action tree synchronously while the transport is
/// async, so the call is bridged onto the ambient runtime. Outside a
/// runtime there is nothing to block on and the resolution fails into the
/// empty-candidate path.
fn execute_blocking(
    executor: &dyn QueryExecutor,
    query: &str,
    variables: Value,
) -> Result<Value, ForgeError> {
    if Handle::try_current().is_err() {
        return Err(
            CompletionError::QueryFailed("no async runtime available".to_string()).into(),
        );
    }

    tokio::task::block_in_place(|| {
        Handle::current().block_on(executor.execute(query, variables))
    })
    .map_err(ForgeError::Api)
}
