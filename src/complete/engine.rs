//! Completion engine - orchestrates the completion flow
//!
//! This module ties the completion components together: it receives the
//! raw words of the command line being completed, builds the invocation
//! context, routes to the Action decorating the position being typed,
//! and invokes it. The engine owns the per-request resolution cache; one
//! engine instance corresponds to one completion request.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::QueryExecutor;
use crate::complete::action::Action;
use crate::complete::cache::ResolutionCache;
use crate::complete::candidate::Candidate;
use crate::complete::context::InvocationContext;
use crate::complete::entities;
use crate::complete::resolver::QueryResolver;
use crate::config::{Config, KNOWN_KEYS, valid_values};

/// One flag of a command, for flag-name and flag-value completion.
struct FlagSpec {
    /// Long spelling first, then aliases
    names: &'static [&'static str],
    description: &'static str,
    takes_value: bool,
}

const TOP_COMMANDS: &[(&str, &str)] = &[
    ("completion", "Generate shell completion scripts"),
    ("config", "Manage configuration for forge"),
    ("issue", "Manage issues"),
    ("repo", "Manage repositories"),
    ("ssh-key", "Manage SSH keys"),
];

const CONFIG_SUBCOMMANDS: &[(&str, &str)] = &[
    ("list", "Print a list of configuration keys and values"),
    ("set", "Update configuration with a value for the given key"),
];

const ISSUE_SUBCOMMANDS: &[(&str, &str)] = &[("create", "Create a new issue")];

const REPO_SUBCOMMANDS: &[(&str, &str)] = &[("view", "View a repository")];

const SSH_KEY_SUBCOMMANDS: &[(&str, &str)] = &[("add", "Add an SSH key to your account")];

const SHELLS: &[(&str, &str)] = &[
    ("bash", ""),
    ("elvish", ""),
    ("fish", ""),
    ("powershell", ""),
    ("zsh", ""),
];

const CONFIG_FLAGS: &[FlagSpec] = &[FlagSpec {
    names: &["--host"],
    description: "Operate on a specific host",
    takes_value: true,
}];

const ISSUE_CREATE_FLAGS: &[FlagSpec] = &[
    FlagSpec {
        names: &["--body", "-b"],
        description: "Supply a body",
        takes_value: true,
    },
    FlagSpec {
        names: &["--label", "-l"],
        description: "Add labels by name",
        takes_value: true,
    },
    FlagSpec {
        names: &["--repo", "-R"],
        description: "Select another repository using the OWNER/REPO format",
        takes_value: true,
    },
    FlagSpec {
        names: &["--title", "-t"],
        description: "Supply a title",
        takes_value: true,
    },
    FlagSpec {
        names: &["--web", "-w"],
        description: "Open the browser to create an issue",
        takes_value: false,
    },
];

const REPO_VIEW_FLAGS: &[FlagSpec] = &[
    FlagSpec {
        names: &["--branch", "-b"],
        description: "View a specific branch of the repository",
        takes_value: true,
    },
    FlagSpec {
        names: &["--web", "-w"],
        description: "Open a repository in the browser",
        takes_value: false,
    },
];

const SSH_KEY_ADD_FLAGS: &[FlagSpec] = &[FlagSpec {
    names: &["--title", "-t"],
    description: "Title for the new key",
    takes_value: true,
}];

/// Suggestions for free-form keys. Unlike the constrained keys these are
/// not validated on `config set`; any value is accepted.
const EDITOR_SUGGESTIONS: &[&str] = &["code --wait", "emacs", "nano", "vim"];
const PAGER_SUGGESTIONS: &[&str] = &["cat", "less", "more"];

/// Per-request completion engine.
pub struct CompletionEngine {
    resolver: QueryResolver,
    config: Config,
}

impl CompletionEngine {
    /// Create an engine with a fresh resolution cache.
    ///
    /// # Arguments
    /// * `executor` - Transport collaborator for remote lookups
    /// * `config` - Loaded configuration, used for host-name completion
    pub fn new(executor: Arc<dyn QueryExecutor>, config: Config) -> Self {
        Self {
            resolver: QueryResolver::new(executor, Arc::new(ResolutionCache::new())),
            config,
        }
    }

    /// Complete the in-progress last word of a command line.
    ///
    /// # Arguments
    /// * `words` - All words after the program name; the final element is
    ///   the token being typed, possibly empty
    ///
    /// # Returns
    /// * `Vec<Candidate>` - Candidates in source order, deduplicated by
    ///   value; the shell integration filters by the typed prefix
    pub fn complete(&self, words: &[String]) -> Vec<Candidate> {
        let (current, prior) = match words.split_last() {
            Some((current, prior)) => (current.clone(), prior.to_vec()),
            None => (String::new(), Vec::new()),
        };

        let ctx = InvocationContext::new(prior, current);
        let action = self.route(&ctx);
        dedup_by_value(action.invoke(&ctx))
    }

    /// Pick the Action governing the position being typed.
    fn route(&self, ctx: &InvocationContext) -> Action {
        let (path, rest) = command_path(&ctx.prior_args);

        match path.as_slice() {
            [] => Action::values(TOP_COMMANDS),
            ["config"] => Action::values(CONFIG_SUBCOMMANDS),
            ["config", "set"] => self.config_set_action(ctx, rest),
            ["config", "list"] => self.config_list_action(ctx, rest),
            ["issue"] => Action::values(ISSUE_SUBCOMMANDS),
            ["issue", "create"] => self.issue_create_action(ctx, rest),
            ["repo"] => Action::values(REPO_SUBCOMMANDS),
            ["repo", "view"] => self.repo_view_action(ctx, rest),
            ["ssh-key"] => Action::values(SSH_KEY_SUBCOMMANDS),
            ["ssh-key", "add"] => self.ssh_key_add_action(ctx, rest),
            ["completion"] => match positional_args(rest, &[]).len() {
                0 => Action::values(SHELLS),
                _ => Action::empty(),
            },
            _ => Action::empty(),
        }
    }

    fn config_set_action(&self, ctx: &InvocationContext, rest: &[String]) -> Action {
        if let Some(flag) = pending_value_flag(rest, CONFIG_FLAGS) {
            return match flag {
                "--host" => self.host_names_action(),
                _ => Action::empty(),
            };
        }
        if ctx.current.starts_with('-') {
            return flags_action(CONFIG_FLAGS);
        }

        match positional_args(rest, CONFIG_FLAGS).as_slice() {
            [] => Action::values(KNOWN_KEYS),
            [key] => {
                let values = valid_values(key).or(match key.as_str() {
                    "editor" => Some(EDITOR_SUGGESTIONS),
                    "pager" => Some(PAGER_SUGGESTIONS),
                    _ => None,
                });
                match values {
                    Some(values) => Action::Static(
                        values.iter().map(|value| Candidate::bare(*value)).collect(),
                    ),
                    None => Action::empty(),
                }
            }
            _ => Action::empty(),
        }
    }

    fn config_list_action(&self, ctx: &InvocationContext, rest: &[String]) -> Action {
        if let Some("--host") = pending_value_flag(rest, CONFIG_FLAGS) {
            return self.host_names_action();
        }
        if ctx.current.starts_with('-') {
            return flags_action(CONFIG_FLAGS);
        }
        Action::empty()
    }

    fn issue_create_action(&self, ctx: &InvocationContext, rest: &[String]) -> Action {
        if let Some(flag) = pending_value_flag(rest, ISSUE_CREATE_FLAGS) {
            return match flag {
                "--label" => entities::multi_labels(self.resolver.clone()),
                "--repo" => entities::owner_repositories(self.resolver.clone()),
                _ => Action::empty(),
            };
        }
        if ctx.current.starts_with('-') {
            return flags_action(ISSUE_CREATE_FLAGS);
        }
        Action::empty()
    }

    fn repo_view_action(&self, ctx: &InvocationContext, rest: &[String]) -> Action {
        if pending_value_flag(rest, REPO_VIEW_FLAGS).is_some() {
            return Action::empty();
        }
        if ctx.current.starts_with('-') {
            return flags_action(REPO_VIEW_FLAGS);
        }

        match positional_args(rest, REPO_VIEW_FLAGS).len() {
            0 => entities::owner_repositories(self.resolver.clone()),
            _ => Action::empty(),
        }
    }

    fn ssh_key_add_action(&self, ctx: &InvocationContext, rest: &[String]) -> Action {
        if pending_value_flag(rest, SSH_KEY_ADD_FLAGS).is_some() {
            return Action::empty();
        }
        if ctx.current.starts_with('-') {
            return flags_action(SSH_KEY_ADD_FLAGS);
        }

        match positional_args(rest, SSH_KEY_ADD_FLAGS).len() {
            0 => entities::local_files(),
            _ => Action::empty(),
        }
    }

    fn host_names_action(&self) -> Action {
        Action::Static(
            self.config
                .host_names()
                .into_iter()
                .map(Candidate::bare)
                .collect(),
        )
    }
}

/// Walk the command tree as far as the typed words allow.
///
/// Returns the matched command path and the remaining words (flags and
/// positionals) after it.
fn command_path(prior: &[String]) -> (Vec<&str>, &[String]) {
    let mut path: Vec<&str> = Vec::new();
    let mut idx = 0;

    while idx < prior.len() {
        let children = subcommands_of(&path);
        match children.iter().find(|(name, _)| *name == prior[idx]) {
            Some((name, _)) => {
                path.push(name);
                idx += 1;
            }
            None => break,
        }
    }

    (path, &prior[idx..])
}

fn subcommands_of(path: &[&str]) -> &'static [(&'static str, &'static str)] {
    match path {
        [] => TOP_COMMANDS,
        ["config"] => CONFIG_SUBCOMMANDS,
        ["issue"] => ISSUE_SUBCOMMANDS,
        ["repo"] => REPO_SUBCOMMANDS,
        ["ssh-key"] => SSH_KEY_SUBCOMMANDS,
        _ => &[],
    }
}

/// Flag whose value the in-progress token is, if any.
///
/// Returns the canonical (long) spelling when the directly preceding
/// word is a value-taking flag typed without `=`.
fn pending_value_flag(rest: &[String], flags: &[FlagSpec]) -> Option<&'static str> {
    let last = rest.last()?;
    flags
        .iter()
        .find(|spec| spec.takes_value && spec.names.contains(&last.as_str()))
        .map(|spec| spec.names[0])
}

/// Positional arguments among `rest`, with flags and their values removed.
fn positional_args(rest: &[String], flags: &[FlagSpec]) -> Vec<String> {
    let mut positionals = Vec::new();
    let mut iter = rest.iter();

    while let Some(arg) = iter.next() {
        if arg.starts_with('-') {
            let consumes_next = !arg.contains('=')
                && flags
                    .iter()
                    .any(|spec| spec.takes_value && spec.names.contains(&arg.as_str()));
            if consumes_next {
                iter.next();
            }
            continue;
        }
        positionals.push(arg.clone());
    }

    positionals
}

fn flags_action(flags: &[FlagSpec]) -> Action {
    Action::Static(
        flags
            .iter()
            .map(|spec| Candidate::new(spec.names[0], spec.description))
            .collect(),
    )
}

fn dedup_by_value(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = BTreeSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::ApiError;

    struct RecordingExecutor {
        calls: AtomicUsize,
        last_variables: Mutex<Option<Value>>,
        response: Result<Value, ()>,
    }

    impl RecordingExecutor {
        fn ok(response: Value) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_variables: Mutex::new(None),
                response: Ok(response),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_variables: Mutex::new(None),
                response: Err(()),
            }
        }
    }

    #[async_trait]
    impl QueryExecutor for RecordingExecutor {
        async fn execute(&self, _query: &str, variables: Value) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_variables.lock().unwrap() = Some(variables);
            match &self.response {
                Ok(value) => Ok(value.clone()),
                Err(()) => Err(ApiError::Timeout),
            }
        }
    }

    fn engine(executor: Arc<RecordingExecutor>) -> CompletionEngine {
        CompletionEngine::new(executor, Config::default())
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_top_level_commands() {
        let engine = engine(Arc::new(RecordingExecutor::failing()));
        let candidates = engine.complete(&words(&[""]));

        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert!(values.contains(&"config"));
        assert!(values.contains(&"repo"));
        assert!(values.contains(&"ssh-key"));
    }

    #[test]
    fn test_config_set_keys() {
        let engine = engine(Arc::new(RecordingExecutor::failing()));
        let candidates = engine.complete(&words(&["config", "set", ""]));

        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["git_protocol", "editor", "prompt", "pager"]);
    }

    #[test]
    fn test_config_set_git_protocol_values_need_no_network() {
        // A failing executor proves the static path never queries.
        let executor = Arc::new(RecordingExecutor::failing());
        let engine = engine(executor.clone());

        let candidates = engine.complete(&words(&["config", "set", "git_protocol", ""]));
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();

        assert_eq!(values, vec!["ssh", "https"]);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_config_set_editor_suggests_common_editors() {
        let engine = engine(Arc::new(RecordingExecutor::failing()));
        let candidates = engine.complete(&words(&["config", "set", "editor", ""]));

        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert!(values.contains(&"vim"));
        assert!(values.contains(&"nano"));
    }

    #[test]
    fn test_config_set_unknown_key_has_no_values() {
        let engine = engine(Arc::new(RecordingExecutor::failing()));
        assert!(
            engine
                .complete(&words(&["config", "set", "no_such_key", ""]))
                .is_empty()
        );
    }

    #[test]
    fn test_flag_name_completion() {
        let engine = engine(Arc::new(RecordingExecutor::failing()));
        let candidates = engine.complete(&words(&["issue", "create", "-"]));

        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert!(values.contains(&"--label"));
        assert!(values.contains(&"--repo"));
        assert!(values.contains(&"--web"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_repo_view_positional_issues_one_search() {
        let executor = Arc::new(RecordingExecutor::ok(json!({
            "search": {
                "nodes": [
                    { "name": "hello-world", "description": "My first repository" }
                ]
            }
        })));
        let engine = engine(executor.clone());

        let candidates = engine.complete(&words(&["repo", "view", "octocat/"]));
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();

        assert_eq!(values, vec!["hello-world"]);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

        let variables = executor.last_variables.lock().unwrap().clone().unwrap();
        assert!(variables["query"].as_str().unwrap().contains("user:octocat"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_issue_create_label_value_scoped_by_repo_flag() {
        let executor = Arc::new(RecordingExecutor::ok(json!({
            "repository": {
                "labels": {
                    "nodes": [
                        { "name": "bug", "description": "Something is broken" },
                        { "name": "docs", "description": null }
                    ]
                }
            }
        })));
        let engine = engine(executor.clone());

        let candidates = engine.complete(&words(&[
            "issue",
            "create",
            "--repo",
            "octocat/hello",
            "--label",
            "bug,",
        ]));
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();

        // Already-chosen "bug" is excluded from the second segment.
        assert_eq!(values, vec!["docs"]);

        let variables = executor.last_variables.lock().unwrap().clone().unwrap();
        assert_eq!(variables["owner"], "octocat");
        assert_eq!(variables["repo"], "hello");
    }

    #[test]
    fn test_issue_create_label_without_repo_is_empty() {
        let executor = Arc::new(RecordingExecutor::failing());
        let engine = engine(executor.clone());

        let candidates = engine.complete(&words(&["issue", "create", "--label", ""]));

        assert!(candidates.is_empty());
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_completion_shell_names() {
        let engine = engine(Arc::new(RecordingExecutor::failing()));
        let candidates = engine.complete(&words(&["completion", ""]));

        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["bash", "elvish", "fish", "powershell", "zsh"]);
    }

    #[test]
    fn test_unknown_command_is_empty() {
        let engine = engine(Arc::new(RecordingExecutor::failing()));
        assert!(engine.complete(&words(&["frobnicate", ""])).is_empty());
    }

    #[test]
    fn test_positional_args_skip_flag_values() {
        let rest = words(&["--label", "bug", "git_protocol", "--web"]);
        let positionals = positional_args(&rest, ISSUE_CREATE_FLAGS);
        assert_eq!(positionals, vec!["git_protocol".to_string()]);
    }

    #[test]
    fn test_pending_value_flag_canonicalizes() {
        let rest = words(&["-l"]);
        assert_eq!(pending_value_flag(&rest, ISSUE_CREATE_FLAGS), Some("--label"));

        let rest = words(&["--web"]);
        assert_eq!(pending_value_flag(&rest, ISSUE_CREATE_FLAGS), None);
    }
}
