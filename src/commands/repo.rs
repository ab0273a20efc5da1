//! Repository commands
//!
//! `repo view` fetches repository metadata over GraphQL and prints a short
//! summary. With `--web` the command prints the browser URL instead.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::{ForgeClient, QueryExecutor};
use crate::commands::resolve_repo;
use crate::complete::context::RepoRef;
use crate::error::{ApiError, ForgeError, Result};

const REPO_VIEW_QUERY: &str = "\
query ($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    nameWithOwner
    description
    isPrivate
    stargazerCount
    defaultBranchRef {
      name
    }
  }
}";

/// Shape of the repository view result, validated right after execution.
#[derive(Debug, Deserialize)]
struct RepoViewData {
    repository: Option<RepositoryDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryDetails {
    name_with_owner: String,
    #[serde(default)]
    description: Option<String>,
    is_private: bool,
    stargazer_count: u64,
    #[serde(default)]
    default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    name: String,
}

/// View a repository.
///
/// # Arguments
/// * `client` - API transport
/// * `repo_arg` - Positional `OWNER/REPO`, falling back to the environment
/// * `branch` - Branch to link to in `--web` mode
/// * `web` - Print the browser URL instead of fetching metadata
pub async fn run_view(
    client: &ForgeClient,
    repo_arg: Option<&str>,
    branch: Option<&str>,
    web: bool,
) -> Result<()> {
    let repo = resolve_repo(repo_arg)?;

    if web {
        println!("{}", browse_url(client.host(), &repo, branch));
        return Ok(());
    }

    let data = client
        .execute(REPO_VIEW_QUERY, json!({ "owner": repo.owner, "name": repo.name }))
        .await?;

    let details = parse_details(&data)?
        .ok_or_else(|| ForgeError::Generic(format!("repository '{repo}' not found")))?;
    print!("{}", render_details(&details));
    Ok(())
}

fn parse_details(data: &Value) -> Result<Option<RepositoryDetails>> {
    let parsed: RepoViewData = serde_json::from_value(data.clone())
        .map_err(|e| ForgeError::Api(ApiError::MalformedResponse(e.to_string())))?;
    Ok(parsed.repository)
}

fn render_details(details: &RepositoryDetails) -> String {
    let mut out = String::new();
    out.push_str(&details.name_with_owner);
    out.push('\n');

    if let Some(description) = &details.description {
        if !description.is_empty() {
            out.push_str(description);
            out.push('\n');
        }
    }

    out.push('\n');
    let visibility = if details.is_private { "private" } else { "public" };
    out.push_str(&format!("  visibility: {visibility}\n"));
    if let Some(branch) = &details.default_branch_ref {
        out.push_str(&format!("  default branch: {}\n", branch.name));
    }
    out.push_str(&format!("  stars: {}\n", details.stargazer_count));
    out
}

fn browse_url(host: &str, repo: &RepoRef, branch: Option<&str>) -> String {
    let base = format!("https://{host}/{}/{}", repo.owner, repo.name);
    match branch {
        Some(branch) => format!("{base}/tree/{branch}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render_details() {
        let data = json!({
            "repository": {
                "nameWithOwner": "octocat/hello-world",
                "description": "My first repository",
                "isPrivate": false,
                "stargazerCount": 42,
                "defaultBranchRef": { "name": "main" }
            }
        });

        let details = parse_details(&data).unwrap().unwrap();
        let rendered = render_details(&details);

        assert!(rendered.starts_with("octocat/hello-world\n"));
        assert!(rendered.contains("My first repository"));
        assert!(rendered.contains("visibility: public"));
        assert!(rendered.contains("default branch: main"));
        assert!(rendered.contains("stars: 42"));
    }

    #[test]
    fn test_parse_details_unknown_repository() {
        let data = json!({ "repository": null });
        assert!(parse_details(&data).unwrap().is_none());
    }

    #[test]
    fn test_parse_details_rejects_malformed() {
        let data = json!({ "repository": { "nameWithOwner": 42 } });
        assert!(parse_details(&data).is_err());
    }

    #[test]
    fn test_browse_url_with_branch() {
        let repo = RepoRef::parse("octocat/hello").unwrap();
        assert_eq!(
            browse_url("github.com", &repo, None),
            "https://github.com/octocat/hello"
        );
        assert_eq!(
            browse_url("github.com", &repo, Some("dev")),
            "https://github.com/octocat/hello/tree/dev"
        );
    }
}
