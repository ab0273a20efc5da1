//! Lazy completion engine for shell tab-completion.
//!
//! Completion walks a tree of lazily-evaluated [`action::Action`] nodes.
//! Branches are only evaluated when the in-progress token actually
//! reaches them, remote lookups are memoized per request by the
//! [`cache::ResolutionCache`], and every failure along the way degrades
//! to an empty candidate set so a keystroke never surfaces an error.

pub mod action;
pub mod cache;
pub mod candidate;
pub mod context;
pub mod engine;
pub mod entities;
pub mod resolver;

// Re-export commonly used types
pub use action::{Action, Thunk};
pub use cache::{CacheState, ResolutionCache};
pub use candidate::Candidate;
pub use context::{InvocationContext, RepoRef};
pub use engine::CompletionEngine;
pub use resolver::QueryResolver;
