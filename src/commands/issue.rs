//! Issue commands
//!
//! `issue create` opens an issue through the REST endpoint, which accepts
//! label names directly. With `--web` the command prints the browser URL
//! for the new-issue form instead of calling the API.

use serde_json::{Value, json};

use crate::api::ForgeClient;
use crate::commands::resolve_repo;
use crate::complete::context::RepoRef;
use crate::error::{ForgeError, Result};

/// Options collected from the `issue create` flags.
#[derive(Debug, Default)]
pub struct IssueCreateOptions {
    /// Issue title
    pub title: Option<String>,

    /// Issue body
    pub body: Option<String>,

    /// Label names to attach
    pub labels: Vec<String>,

    /// `OWNER/REPO` target, overriding the environment
    pub repo: Option<String>,

    /// Print the browser URL instead of creating via the API
    pub web: bool,
}

/// Create an issue in the resolved repository.
pub async fn run_create(client: &ForgeClient, opts: IssueCreateOptions) -> Result<()> {
    let repo = resolve_repo(opts.repo.as_deref())?;

    if opts.web {
        println!("{}", new_issue_url(client.host(), &repo));
        return Ok(());
    }

    let title = opts.title.ok_or_else(|| {
        ForgeError::Generic("a title is required; supply one with --title".to_string())
    })?;

    let body = create_body(&title, opts.body.as_deref(), &opts.labels);
    let created = client
        .rest_post(&format!("repos/{}/{}/issues", repo.owner, repo.name), &body)
        .await?;

    if let Some(url) = created.get("html_url").and_then(Value::as_str) {
        println!("{url}");
    }
    Ok(())
}

fn create_body(title: &str, body: Option<&str>, labels: &[String]) -> Value {
    let mut payload = json!({
        "title": title,
        "body": body.unwrap_or_default(),
    });
    if !labels.is_empty() {
        payload["labels"] = json!(labels);
    }
    payload
}

fn new_issue_url(host: &str, repo: &RepoRef) -> String {
    format!("https://{host}/{}/{}/issues/new", repo.owner, repo.name)
}
