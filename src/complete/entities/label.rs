//! Label completion
//!
//! Resolves the labels of the active repository into candidates, with a
//! multi-label variant for comma-joined flag values that never
//! re-suggests an already-chosen label.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::complete::action::Action;
use crate::complete::candidate::Candidate;
use crate::complete::resolver::QueryResolver;
use crate::error::{CompletionError, ForgeError};

const LABELS_QUERY: &str = "\
query ($owner: String!, $repo: String!, $limit: Int = 100) {
  repository(owner: $owner, name: $repo) {
    labels(first: $limit, orderBy: {field: NAME, direction: ASC}) {
      nodes {
        name
        description
      }
    }
  }
}";

/// Shape of the labels query result, validated right after execution.
#[derive(Debug, Deserialize)]
struct LabelsData {
    repository: Option<LabelsRepository>,
}

#[derive(Debug, Deserialize)]
struct LabelsRepository {
    labels: LabelConnection,
}

#[derive(Debug, Deserialize)]
struct LabelConnection {
    nodes: Vec<LabelNode>,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

/// Labels of the active repository.
///
/// The repository is read from the invocation context at invoke time, so
/// a `--repo` flag typed earlier on the same line scopes the lookup. No
/// active repository means no candidates.
pub fn labels(resolver: QueryResolver) -> Action {
    Action::callback(move |ctx| {
        let repo = ctx.active_repo().ok_or_else(|| {
            CompletionError::MissingContext("no active repository for label lookup".to_string())
        })?;

        Ok(resolver.resolve(
            format!("labels:{repo}"),
            LABELS_QUERY,
            json!({ "owner": repo.owner, "repo": repo.name }),
            map_labels,
        ))
    })
}

/// Comma-joined label list.
///
/// Every segment dispatches to the same labels action; labels already
/// present among the confirmed segments are excluded so the list never
/// suggests a duplicate.
pub fn multi_labels(resolver: QueryResolver) -> Action {
    Action::multi_parts(",", move |_ctx, confirmed| {
        Action::filtered(labels(resolver.clone()), confirmed.iter().cloned())
    })
}

fn map_labels(data: &Value) -> Result<Vec<Candidate>, ForgeError> {
    let parsed: LabelsData = serde_json::from_value(data.clone())
        .map_err(|e| CompletionError::UnexpectedShape(e.to_string()))?;

    let Some(repository) = parsed.repository else {
        // Unknown repository; nothing to suggest.
        return Ok(Vec::new());
    };

    Ok(repository
        .labels
        .nodes
        .into_iter()
        .map(|node| Candidate::new(node.name, node.description.unwrap_or_default()))
        .collect())
}
