//! Owner and repository completion
//!
//! Completes hierarchical `owner/repo` references with two remote
//! lookups: a user/organization search for the owner segment and a
//! repository search scoped to the confirmed owner for the name
//! segment. The repository cache key binds the concrete
//! `(owner, partial name)` pair, so distinct prefixes resolve
//! independently while repeated invocations against the same prefix hit
//! the cache.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::complete::action::Action;
use crate::complete::candidate::Candidate;
use crate::complete::resolver::QueryResolver;
use crate::error::{CompletionError, ForgeError};

const OWNERS_QUERY: &str = "\
query ($query: String!, $limit: Int = 100) {
  search(type: USER, query: $query, first: $limit) {
    nodes {
      ... on User {
        login
        name
      }
      ... on Organization {
        login
        description
      }
    }
  }
}";

const REPOSITORIES_QUERY: &str = "\
query ($query: String!, $limit: Int = 100) {
  search(type: REPOSITORY, query: $query, first: $limit) {
    nodes {
      ... on Repository {
        name
        description
      }
    }
  }
}";

/// Shape of a search query result, validated right after execution.
#[derive(Debug, Deserialize)]
struct SearchData<T> {
    search: SearchNodes<T>,
}

#[derive(Debug, Deserialize)]
struct SearchNodes<T> {
    nodes: Vec<T>,
}

/// One owner node. Fields are optional because the search union can
/// yield nodes outside the requested fragments.
#[derive(Debug, Deserialize)]
struct OwnerNode {
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryNode {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// `owner/repo` completion.
///
/// Segment 0 completes owners, segment 1 completes repositories of the
/// confirmed owner, anything deeper is terminal.
pub fn owner_repositories(resolver: QueryResolver) -> Action {
    Action::multi_parts("/", move |_ctx, confirmed| match confirmed {
        [] => owners(resolver.clone()),
        [owner] => repositories_for(resolver.clone(), owner.clone()),
        _ => Action::empty(),
    })
}

/// Owner (user or organization) completion.
///
/// Policy for the empty prompt: an unbounded owner listing is neither
/// useful nor fast, so nothing is suggested until at least one character
/// has been typed.
fn owners(resolver: QueryResolver) -> Action {
    Action::callback(move |ctx| {
        if ctx.current.is_empty() {
            return Ok(Action::empty());
        }

        let term = format!("{} in:login", ctx.current);
        Ok(resolver.resolve(
            format!("owners:{}", ctx.current),
            OWNERS_QUERY,
            json!({ "query": term }),
            map_owners,
        ))
    })
}

/// Repositories of one owner, narrowed by the typed name prefix.
fn repositories_for(resolver: QueryResolver, owner: String) -> Action {
    Action::callback(move |ctx| {
        let term = format!("user:{} \"{}\" in:name fork:true", owner, ctx.current);
        Ok(resolver.resolve(
            format!("repos:{}/{}", owner, ctx.current),
            REPOSITORIES_QUERY,
            json!({ "query": term }),
            map_repositories,
        ))
    })
}

fn map_owners(data: &Value) -> Result<Vec<Candidate>, ForgeError> {
    let parsed: SearchData<OwnerNode> = serde_json::from_value(data.clone())
        .map_err(|e| CompletionError::UnexpectedShape(e.to_string()))?;

    Ok(parsed
        .search
        .nodes
        .into_iter()
        .filter_map(|node| {
            let login = node.login?;
            let description = node.name.or(node.description).unwrap_or_default();
            // Trailing separator so the shell opens the repository
            // segment right after selection.
            Some(Candidate::new(format!("{login}/"), description))
        })
        .collect())
}

fn map_repositories(data: &Value) -> Result<Vec<Candidate>, ForgeError> {
    let parsed: SearchData<RepositoryNode> = serde_json::from_value(data.clone())
        .map_err(|e| CompletionError::UnexpectedShape(e.to_string()))?;

    Ok(parsed
        .search
        .nodes
        .into_iter()
        .filter_map(|node| {
            let name = node.name?;
            Some(Candidate::new(name, node.description.unwrap_or_default()))
        })
        .collect())
}
