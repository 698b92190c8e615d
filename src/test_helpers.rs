//! Shared test helpers for building articles and fake file sources.

use crate::error::{Error, Result};
use crate::preview::FileFetcher;
use crate::types::{Article, ArticleId};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Article with the given id/title/subject and every other field defaulted.
pub(crate) fn article(id: &str, title: &str, subject: &str) -> Article {
    Article {
        id: ArticleId::new(id),
        title: title.to_string(),
        content: None,
        subject: Some(subject.to_string()),
        files: Vec::new(),
        favorite: false,
        pinned: false,
        created_at: None,
        updated_at: None,
    }
}

/// Same as [`article`] with a creation day in March 2024.
pub(crate) fn article_on(id: &str, title: &str, subject: &str, day: u32) -> Article {
    Article {
        created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).single(),
        ..article(id, title, subject)
    }
}

/// In-memory file source that records every fetch.
///
/// When gated, each fetch waits for [`MockFetcher::open_gate`] before answering.
#[derive(Default)]
pub(crate) struct MockFetcher {
    files: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl MockFetcher {
    pub(crate) fn with_files(files: &[(&str, &[u8])]) -> Self {
        Self {
            files: Mutex::new(
                files
                    .iter()
                    .map(|(name, bytes)| (name.to_string(), bytes.to_vec()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub(crate) fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_waiters();
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_for(&self, filename: &str) -> usize {
        self.calls().iter().filter(|c| *c == filename).count()
    }

    /// Wait until `filename` has been requested at least once.
    pub(crate) async fn wait_for_call(&self, filename: &str) {
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while self.calls_for(filename) == 0 {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("fetch was never issued");
    }
}

#[async_trait]
impl FileFetcher for MockFetcher {
    async fn fetch(&self, filename: &str) -> Result<Vec<u8>> {
        // register for the wakeup before the call becomes visible to the test
        let waiter = self.gate.as_ref().map(|gate| gate.notified());
        self.calls.lock().unwrap().push(filename.to_string());
        if let Some(waiter) = waiter {
            waiter.await;
        }
        self.files
            .lock()
            .unwrap()
            .get(filename)
            .cloned()
            .ok_or_else(|| Error::Http {
                status: 404,
                message: "Not Found".to_string(),
                from_server: false,
            })
    }
}

/// API client pointed at `{server_uri}/api`, optionally logged in with `token`.
pub(crate) fn api_client(server_uri: &str, token: Option<&str>) -> crate::api::ApiClient {
    let store = match token {
        Some(token) => crate::session::MemorySessionStore::with_session(
            crate::types::Session::with_token(token),
        ),
        None => crate::session::MemorySessionStore::new(),
    };
    let config = crate::config::ApiConfig {
        base_url: format!("{server_uri}/api"),
        ..Default::default()
    };
    crate::api::ApiClient::new(&config, Arc::new(store)).unwrap()
}

/// JSON for an article as the service returns it.
pub(crate) fn article_json(id: &str, title: &str, subject: &str) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "title": title,
        "subject": subject,
        "content": "",
        "files": [],
        "favorite": false,
        "pinned": false,
        "createdAt": "2024-03-01T09:00:00.000Z"
    })
}
