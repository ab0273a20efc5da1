//! Lazy completion actions
//!
//! This module provides the Action tree, the core of the completion
//! engine:
//! - `Static` leaves holding fixed candidate lists
//! - `Callback` nodes deferring construction of a child until reached
//! - `MultiParts` nodes dispatching on segments of hierarchical input
//! - `Filtered` nodes excluding already-consumed values
//!
//! Invoking an Action is idempotent. The only sanctioned side effect is
//! the remote query inside a `Callback`, and that is memoized both here
//! (the thunk runs at most once per node) and in the resolution cache
//! (at most one remote call per key per request).

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::complete::candidate::Candidate;
use crate::complete::context::InvocationContext;
use crate::error::ForgeError;

/// Produces the child Action of a `Callback` node.
pub type ThunkFn = dyn Fn(&InvocationContext) -> Result<Action, ForgeError> + Send + Sync;

/// Chooses the Action governing the next segment of a `MultiParts` node.
///
/// Receives the full invocation context and the confirmed leading
/// segments of the in-progress token.
pub type DispatchFn = dyn Fn(&InvocationContext, &[String]) -> Action + Send + Sync;

/// A lazily-evaluated, composable completion-candidate provider.
#[derive(Clone)]
pub enum Action {
    /// Fixed candidates, returned unchanged and in declaration order.
    Static(Vec<Candidate>),

    /// Deferred child construction; the suspend point of the tree.
    Callback(Thunk),

    /// Segment dispatch for hierarchical identifiers like `owner/repo`.
    MultiParts {
        separator: String,
        dispatch: Arc<DispatchFn>,
    },

    /// Wraps a base Action and drops candidates whose value is excluded.
    Filtered {
        base: Box<Action>,
        exclude: BTreeSet<String>,
    },
}

impl Action {
    /// An Action producing no candidates. Terminal nodes and degraded
    /// failure paths both resolve to this.
    pub fn empty() -> Self {
        Action::Static(Vec::new())
    }

    /// Static Action from `(value, description)` pairs.
    pub fn values(pairs: &[(&str, &str)]) -> Self {
        Action::Static(
            pairs
                .iter()
                .map(|(value, description)| Candidate::new(*value, *description))
                .collect(),
        )
    }

    /// Wrap a producer in a `Callback` node.
    pub fn callback<F>(producer: F) -> Self
    where
        F: Fn(&InvocationContext) -> Result<Action, ForgeError> + Send + Sync + 'static,
    {
        Action::Callback(Thunk::new(producer))
    }

    /// Build a `MultiParts` node.
    pub fn multi_parts<F>(separator: impl Into<String>, dispatch: F) -> Self
    where
        F: Fn(&InvocationContext, &[String]) -> Action + Send + Sync + 'static,
    {
        Action::MultiParts {
            separator: separator.into(),
            dispatch: Arc::new(dispatch),
        }
    }

    /// Wrap an Action so that excluded values are dropped.
    pub fn filtered(base: Action, exclude: impl IntoIterator<Item = String>) -> Self {
        Action::Filtered {
            base: Box::new(base),
            exclude: exclude.into_iter().collect(),
        }
    }

    /// Invoke the Action with the given context.
    ///
    /// Returns the candidates for the in-progress token. Failures inside
    /// `Callback` producers degrade to an empty list; completion never
    /// surfaces an error to the shell.
    pub fn invoke(&self, ctx: &InvocationContext) -> Vec<Candidate> {
        match self {
            Action::Static(values) => values.clone(),
            Action::Callback(thunk) => thunk.force(ctx).invoke(ctx),
            Action::MultiParts {
                separator,
                dispatch,
            } => invoke_multi_parts(separator, dispatch, ctx),
            Action::Filtered { base, exclude } => base
                .invoke(ctx)
                .into_iter()
                .filter(|candidate| !exclude.contains(&candidate.value))
                .collect(),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Static(values) => f.debug_tuple("Static").field(values).finish(),
            Action::Callback(_) => f.write_str("Callback(..)"),
            Action::MultiParts { separator, .. } => f
                .debug_struct("MultiParts")
                .field("separator", separator)
                .finish_non_exhaustive(),
            Action::Filtered { base, exclude } => f
                .debug_struct("Filtered")
                .field("base", base)
                .field("exclude", exclude)
                .finish(),
        }
    }
}

/// Memoizing holder for a `Callback` producer.
///
/// The producer runs at most once per node; clones share the memo, so
/// re-invoking an already-forced node reuses the first result. A failed
/// producer memoizes the empty Action.
#[derive(Clone)]
pub struct Thunk {
    producer: Arc<ThunkFn>,
    memo: Arc<OnceLock<Action>>,
}

impl Thunk {
    /// Wrap a producer.
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn(&InvocationContext) -> Result<Action, ForgeError> + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
            memo: Arc::new(OnceLock::new()),
        }
    }

    /// Force the thunk, producing its child Action.
    fn force(&self, ctx: &InvocationContext) -> Action {
        self.memo
            .get_or_init(|| match (self.producer)(ctx) {
                Ok(action) => action,
                Err(err) => {
                    warn!(error = %err, "completion callback failed, degrading to empty");
                    Action::empty()
                }
            })
            .clone()
    }
}

/// Split the in-progress token and invoke the Action for its last segment.
///
/// The final element of the split (possibly empty) is the segment still
/// being typed; everything before it is confirmed. The dispatcher decides
/// what governs the next segment, including the terminal case where more
/// segments were typed than it supports.
fn invoke_multi_parts(
    separator: &str,
    dispatch: &Arc<DispatchFn>,
    ctx: &InvocationContext,
) -> Vec<Candidate> {
    let mut parts: Vec<String> = ctx
        .current
        .split(separator)
        .map(str::to_string)
        .collect();

    // split() yields at least one element even for empty input
    let current = parts.pop().unwrap_or_default();
    let confirmed = parts;

    let child = dispatch(ctx, &confirmed);
    child.invoke(&ctx.with_current(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctx(current: &str) -> InvocationContext {
        InvocationContext::new(Vec::new(), current)
    }

    #[test]
    fn test_static_returns_declared_values_in_order() {
        let action = Action::values(&[("ssh", ""), ("https", "")]);

        for current in ["", "s", "anything"] {
            let candidates = action.invoke(&ctx(current));
            assert_eq!(candidates.len(), 2);
            assert_eq!(candidates[0].value, "ssh");
            assert_eq!(candidates[1].value, "https");
        }
    }

    #[test]
    fn test_callback_runs_producer_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let action = Action::callback(move |_ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Action::values(&[("bug", "Something is broken")]))
        });

        let first = action.invoke(&ctx(""));
        let second = action.invoke(&ctx(""));

        assert_eq!(first, second);
        assert_eq!(first[0].value, "bug");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_failure_degrades_to_empty() {
        let action = Action::callback(|_ctx| {
            Err(ForgeError::Generic("query exploded".to_string()))
        });

        assert!(action.invoke(&ctx("")).is_empty());
        // The failure is memoized too; a second invoke stays empty.
        assert!(action.invoke(&ctx("")).is_empty());
    }

    #[test]
    fn test_multi_parts_split_law() {
        let action = Action::multi_parts("/", |_ctx, confirmed| {
            let confirmed = confirmed.to_vec();
            Action::callback(move |segment_ctx| {
                Ok(Action::Static(vec![Candidate::bare(format!(
                    "{}:{}",
                    confirmed.join("+"),
                    segment_ctx.current
                ))]))
            })
        });

        let candidates = action.invoke(&ctx("octo/hello"));
        assert_eq!(candidates[0].value, "octo:hello");

        let candidates = action.invoke(&ctx("octo/"));
        assert_eq!(candidates[0].value, "octo:");

        let candidates = action.invoke(&ctx(""));
        assert_eq!(candidates[0].value, ":");
    }

    #[test]
    fn test_multi_parts_terminal_dispatch() {
        let action = Action::multi_parts("/", |_ctx, confirmed| {
            if confirmed.len() > 1 {
                Action::empty()
            } else {
                Action::values(&[("x", "")])
            }
        });

        assert!(!action.invoke(&ctx("a/b")).is_empty());
        assert!(action.invoke(&ctx("a/b/c")).is_empty());
    }

    #[test]
    fn test_filtered_excludes_and_preserves_order() {
        let base = Action::values(&[
            ("bug", ""),
            ("enhancement", ""),
            ("docs", ""),
        ]);
        let action = Action::filtered(base, vec!["bug".to_string()]);

        let candidates = action.invoke(&ctx(""));
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["enhancement", "docs"]);
    }
}
