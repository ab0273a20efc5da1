//! Local file completion
//!
//! Completes filesystem paths for arguments that name local files, such
//! as the public key file of `ssh-key add`. Directory candidates carry a
//! trailing `/` so the shell descends on selection. I/O failures follow
//! the engine-wide rule and degrade to an empty candidate set.

use std::path::Path;

use crate::complete::action::Action;
use crate::complete::candidate::Candidate;
use crate::error::ForgeError;

/// Completion over local filesystem paths.
pub fn local_files() -> Action {
    Action::callback(|ctx| Ok(Action::Static(path_candidates(&ctx.current)?)))
}

/// Split a typed path into the directory to list and the name prefix.
fn split_typed_path(current: &str) -> (String, String) {
    match current.rfind('/') {
        Some(idx) => (current[..=idx].to_string(), current[idx + 1..].to_string()),
        None => (String::new(), current.to_string()),
    }
}

fn path_candidates(current: &str) -> Result<Vec<Candidate>, ForgeError> {
    let (dir_prefix, name_prefix) = split_typed_path(current);
    let dir: &Path = if dir_prefix.is_empty() {
        Path::new(".")
    } else {
        Path::new(&dir_prefix)
    };

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();

        // Hidden entries only when explicitly asked for.
        if name.starts_with('.') && !name_prefix.starts_with('.') {
            continue;
        }
        if !name.starts_with(&name_prefix) {
            continue;
        }

        let is_dir = entry.file_type()?.is_dir();
        let value = if is_dir {
            format!("{dir_prefix}{name}/")
        } else {
            format!("{dir_prefix}{name}")
        };
        candidates.push(Candidate::bare(value));
    }

    candidates.sort_by(|a, b| a.value.cmp(&b.value));
    Ok(candidates)
}
