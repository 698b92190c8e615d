//! # examprep-client
//!
//! Client library for the Exam Prep study-notes service.
//!
//! ## Design Philosophy
//!
//! examprep-client is designed to be:
//! - **Library-first** - No UI; callers drive it from whatever front end they have
//! - **Server-authoritative** - Local state changes only after the service answers
//! - **Leak-free** - Every preview handle is revoked when its owner goes away
//!
//! ## Quick Start
//!
//! ```no_run
//! use examprep_client::{Config, Dashboard, QueryState, connect};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let api = connect(&config)?;
//!     api.login("ana", "secret").await?;
//!
//!     let dashboard = Dashboard::new(api);
//!     dashboard.refresh().await?;
//!
//!     let mut query = QueryState::from_config(&config.listing);
//!     query.set_search_term("dsa");
//!     dashboard
//!         .view(&query, |view| {
//!             for article in &view.visible {
//!                 println!("{}", article.title);
//!             }
//!         })
//!         .await;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API client
pub mod api;
/// Files attached to a draft
pub mod attachments;
/// Configuration types
pub mod config;
/// Article collection and editor state
pub mod dashboard;
/// Error types
pub mod error;
/// Display helpers
pub mod format;
/// Filtering, sorting and pagination
pub mod listing;
/// File previews
pub mod preview;
/// Session persistence
pub mod session;
/// Core types
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

// Re-export commonly used types
pub use api::{ApiClient, UploadFile, is_accepted_upload};
pub use attachments::Attachments;
pub use config::{ApiConfig, Config, ListingConfig, SessionConfig};
pub use dashboard::{ArticleDraft, Dashboard};
pub use error::{Error, Result};
pub use listing::{ArticleStats, ArticleView, PageSlot, QueryState, SubjectOption, derive_view};
pub use preview::{
    FileFetcher, FileKind, FilePreview, PreviewHandle, PreviewMaterializer, PreviewSet,
    PreviewStatus,
};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use types::{Article, ArticleId, ArticleUpdate, NewArticle, Session, SortKey};

/// Build an [`ApiClient`] whose session lives in the file named by `config.session`
///
/// # Errors
/// Returns error if the configured base URL is invalid
pub fn connect(config: &Config) -> Result<ApiClient> {
    config.api.validate()?;
    let store = Arc::new(FileSessionStore::new(config.session.path.clone()));
    tracing::debug!(
        base_url = %config.api.base_url,
        session = %config.session.path.display(),
        "connecting"
    );
    ApiClient::new(&config.api, store)
}
