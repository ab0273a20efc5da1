//! SSH key commands
//!
//! `ssh-key add` reads a public key from a file (or stdin when the
//! argument is `-`) and uploads it through the REST endpoint. A rejected
//! upload caused by missing token scope is mapped to a hint naming the
//! scope to grant.

use std::io::Read;
use std::path::Path;

use serde_json::json;

use crate::api::ForgeClient;
use crate::commands::success_icon;
use crate::error::{ApiError, AuthError, ForgeError, Result};

/// Upload a public key to the authenticated user's account.
///
/// # Arguments
/// * `client` - API transport
/// * `key_file` - Path to the public key, or `None`/`-` for stdin
/// * `title` - Key title; falls back to the key's comment field
pub async fn run_add(
    client: &ForgeClient,
    key_file: Option<&Path>,
    title: Option<&str>,
) -> Result<()> {
    let key = read_key(key_file)?;
    let title = key_title(&key, title);

    let body = json!({ "title": title, "key": key });
    match client.rest_post("user/keys", &body).await {
        Ok(_) => {
            println!("{} Public key added to your account", success_icon());
            Ok(())
        }
        Err(ApiError::HttpStatus { status: 404, .. }) => {
            Err(AuthError::InsufficientScopes("admin:public_key".to_string()).into())
        }
        Err(ApiError::HttpStatus {
            status: 422,
            message,
        }) => Err(ForgeError::Generic(format!("key rejected: {message}"))),
        Err(e) => Err(e.into()),
    }
}

/// Read and trim the key material from the file or stdin.
fn read_key(key_file: Option<&Path>) -> Result<String> {
    let raw = match key_file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let key = raw.trim().to_string();
    if key.is_empty() {
        return Err(ForgeError::Generic("no key data read".to_string()));
    }
    Ok(key)
}

/// Title for the uploaded key.
///
/// An explicit title wins; otherwise the comment field of the key line
/// (the third whitespace-separated column) is used when present.
fn key_title(key: &str, flag: Option<&str>) -> String {
    if let Some(title) = flag {
        return title.to_string();
    }
    key.split_whitespace().nth(2).unwrap_or_default().to_string()
}
