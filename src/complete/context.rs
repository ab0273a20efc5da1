//! Invocation context for completion
//!
//! This module provides the immutable input to an Action invocation:
//! - The already-typed prior arguments and flags
//! - The raw text of the token currently being typed
//! - The active repository, resolved through a fixed precedence chain
//!
//! The context is never mutated during a completion request. Dispatchers
//! that need to narrow it (e.g. rewrite `current` to one segment of a
//! hierarchical identifier) derive a new context instead.

use std::fmt;

use crate::config::REPO_ENV;

/// An `owner/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner (user or organization login)
    pub owner: String,

    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// Parse an `owner/name` string.
    ///
    /// Returns `None` when the input is not exactly two non-empty
    /// segments, so a half-typed reference never masquerades as a
    /// resolved repository.
    pub fn parse(input: &str) -> Option<Self> {
        let (owner, name) = input.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Immutable input to one Action invocation.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// Already-typed arguments and flags, in order
    pub prior_args: Vec<String>,

    /// Raw text of the in-progress token
    pub current: String,

    /// Repository chosen earlier in this same completion request.
    ///
    /// Set by dispatchers that resolve an owner/repo pair mid-walk;
    /// takes precedence over the `--repo` flag and the environment.
    pub repo_override: Option<RepoRef>,
}

impl InvocationContext {
    /// Create a context from prior arguments and the in-progress token.
    pub fn new(prior_args: Vec<String>, current: impl Into<String>) -> Self {
        Self {
            prior_args,
            current: current.into(),
            repo_override: None,
        }
    }

    /// Derive a context with `current` replaced, everything else kept.
    pub fn with_current(&self, current: impl Into<String>) -> Self {
        Self {
            prior_args: self.prior_args.clone(),
            current: current.into(),
            repo_override: self.repo_override.clone(),
        }
    }

    /// Derive a context carrying a repository override.
    pub fn with_repo_override(&self, repo: RepoRef) -> Self {
        Self {
            prior_args: self.prior_args.clone(),
            current: self.current.clone(),
            repo_override: Some(repo),
        }
    }

    /// Resolve the repository that scopes repository-bound queries.
    ///
    /// Precedence: the in-request override, then a `--repo`/`-R` flag
    /// among the prior arguments, then the `FORGE_REPO` environment
    /// variable. Returns `None` when nothing resolves; callers degrade
    /// to an empty candidate set in that case.
    pub fn active_repo(&self) -> Option<RepoRef> {
        if let Some(repo) = &self.repo_override {
            return Some(repo.clone());
        }

        if let Some(value) = flag_value(&self.prior_args, &["--repo", "-R"]) {
            if let Some(repo) = RepoRef::parse(&value) {
                return Some(repo);
            }
        }

        std::env::var(REPO_ENV)
            .ok()
            .and_then(|value| RepoRef::parse(&value))
    }
}

/// Find the value of a flag in an argument list.
///
/// Handles both `--flag value` and `--flag=value` spellings. The last
/// occurrence wins, matching how the command layer parses repeated flags.
fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    let mut found = None;
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        for name in names {
            if arg == name {
                if let Some(value) = iter.peek() {
                    found = Some((*value).clone());
                }
            } else if let Some(value) = arg.strip_prefix(&format!("{name}=")) {
                found = Some(value.to_string());
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref_parse() {
        let repo = RepoRef::parse("octocat/hello").unwrap();
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.name, "hello");
        assert_eq!(repo.to_string(), "octocat/hello");
    }

    #[test]
    fn test_repo_ref_parse_rejects_partial() {
        assert!(RepoRef::parse("octocat").is_none());
        assert!(RepoRef::parse("octocat/").is_none());
        assert!(RepoRef::parse("/hello").is_none());
        assert!(RepoRef::parse("host/octocat/hello").is_none());
    }

    #[test]
    fn test_with_current_keeps_rest() {
        let ctx = InvocationContext::new(vec!["issue".to_string()], "octo/he")
            .with_repo_override(RepoRef::parse("octocat/hello").unwrap());
        let derived = ctx.with_current("he");

        assert_eq!(derived.current, "he");
        assert_eq!(derived.prior_args, ctx.prior_args);
        assert_eq!(derived.repo_override, ctx.repo_override);
    }

    #[test]
    fn test_active_repo_prefers_override() {
        let ctx = InvocationContext::new(
            vec!["--repo".to_string(), "other/repo".to_string()],
            "",
        )
        .with_repo_override(RepoRef::parse("octocat/hello").unwrap());

        assert_eq!(ctx.active_repo().unwrap().to_string(), "octocat/hello");
    }

    #[test]
    fn test_active_repo_from_flag() {
        let ctx = InvocationContext::new(
            vec![
                "issue".to_string(),
                "create".to_string(),
                "--repo".to_string(),
                "octocat/hello".to_string(),
            ],
            "",
        );
        assert_eq!(ctx.active_repo().unwrap().to_string(), "octocat/hello");

        let ctx = InvocationContext::new(vec!["-R=octocat/hello".to_string()], "");
        assert_eq!(ctx.active_repo().unwrap().to_string(), "octocat/hello");
    }

    #[test]
    fn test_active_repo_last_flag_wins() {
        let ctx = InvocationContext::new(
            vec![
                "--repo".to_string(),
                "first/one".to_string(),
                "--repo".to_string(),
                "second/two".to_string(),
            ],
            "",
        );
        assert_eq!(ctx.active_repo().unwrap().to_string(), "second/two");
    }

    #[test]
    fn test_active_repo_ignores_malformed_flag() {
        let ctx = InvocationContext::new(
            vec!["--repo".to_string(), "not-a-repo".to_string()],
            "",
        );
        // Malformed flag value falls through; without an environment
        // override this resolves to nothing.
        assert!(ctx.repo_override.is_none());
        assert!(RepoRef::parse("not-a-repo").is_none());
    }
}
