//! Command implementations for forge
//!
//! This module provides the execution layer behind the CLI subcommands:
//! - Configuration commands (list, set)
//! - Issue commands (create)
//! - Repository commands (view)
//! - SSH key commands (add)
//!
//! Command execution is the diagnostic side of the crate: unlike the
//! completion path, failures here surface to the user as errors.

pub mod config;
pub mod issue;
pub mod repo;
pub mod ssh_key;

use nu_ansi_term::Color;

use crate::complete::context::RepoRef;
use crate::config::REPO_ENV;
use crate::error::{ForgeError, Result};

/// Green check mark prefix for success messages.
pub(crate) fn success_icon() -> String {
    Color::Green.paint("\u{2713}").to_string()
}

/// Yellow exclamation prefix for warnings.
pub(crate) fn warning_icon() -> String {
    Color::Yellow.paint("!").to_string()
}

/// Resolve the repository a command operates on.
///
/// Precedence: the `--repo` flag value, then the `FORGE_REPO` environment
/// variable. Commands that need a repository fail with a usage hint when
/// neither is present.
pub(crate) fn resolve_repo(flag: Option<&str>) -> Result<RepoRef> {
    let raw = match flag {
        Some(value) => value.to_string(),
        None => std::env::var(REPO_ENV).map_err(|_| {
            ForgeError::Generic(
                "no repository specified; use --repo OWNER/REPO or set FORGE_REPO".to_string(),
            )
        })?,
    };

    RepoRef::parse(&raw)
        .ok_or_else(|| ForgeError::Generic(format!("expected the OWNER/REPO format, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_repo_from_flag() {
        let repo = resolve_repo(Some("octocat/hello")).unwrap();
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.name, "hello");
    }

    #[test]
    fn test_resolve_repo_rejects_malformed() {
        assert!(resolve_repo(Some("not-a-repo")).is_err());
        assert!(resolve_repo(Some("a/b/c")).is_err());
    }
}
