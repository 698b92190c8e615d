//! Common test utilities for examprep-client integration tests

use examprep_client::{ApiClient, Config, connect};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

/// Client pointed at `{server_uri}/api` with its session file under `dir`
pub fn client_for(server_uri: &str, dir: &Path) -> ApiClient {
    let mut config = Config::default();
    config.api.base_url = format!("{server_uri}/api");
    config.session.path = dir.join("session").join("user.json");
    connect(&config).unwrap()
}

/// Client with a saved session holding `token`
///
/// Returns the temp dir too; keep it alive for the test duration.
pub fn logged_in_client(server_uri: &str, token: &str) -> (ApiClient, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let session_dir = dir.path().join("session");
    std::fs::create_dir_all(&session_dir).unwrap();
    std::fs::write(
        session_dir.join("user.json"),
        json!({ "token": token, "username": "ana" }).to_string(),
    )
    .unwrap();
    (client_for(server_uri, dir.path()), dir)
}

/// Article as the service returns it
#[allow(dead_code)]
pub fn article_json(id: &str, title: &str, subject: &str, created: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "subject": subject,
        "content": format!("# {title}"),
        "files": [],
        "favorite": false,
        "pinned": false,
        "createdAt": created
    })
}
