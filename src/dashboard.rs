//! Article mutation flow
//!
//! [`Dashboard`] keeps the in-memory mirror of the user's articles in step
//! with the service. Every mutation waits for the server's answer before the
//! mirror changes, so a failed call leaves the collection exactly as it was.
//!
//! - Fetch replaces the collection wholesale.
//! - Create prepends the stored article.
//! - Update and the favorite/pinned toggles replace the entry with the same id.
//! - Delete removes the entry with the same id.

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::listing::{
    ArticleStats, ArticleView, QueryState, SubjectOption, derive_view, subject_options,
};
use crate::types::{Article, ArticleId, ArticleUpdate, NewArticle};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Form state for creating or editing an article
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArticleDraft {
    /// Title input
    pub title: String,
    /// Subject input
    pub subject: String,
    /// Markdown body input
    pub content: String,
    /// Attached filenames
    pub files: Vec<String>,
    /// Article being edited; None when creating
    pub editing: Option<ArticleId>,
}

impl ArticleDraft {
    /// Empty draft for a new article
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing article into the form
    pub fn begin_edit(&mut self, article: &Article) {
        self.title = article.title.clone();
        self.subject = article.subject.clone().unwrap_or_default();
        self.content = article.content.clone().unwrap_or_default();
        self.files = article.files.clone();
        self.editing = Some(article.id.clone());
    }

    /// Reset every field, leaving edit mode
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether submitting updates an existing article
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".to_string()));
        }
        if self.subject.trim().is_empty() {
            return Err(Error::InvalidInput("subject is required".to_string()));
        }
        Ok(())
    }

    /// Body for creating an article; a blank body is omitted
    pub fn to_new_article(&self) -> NewArticle {
        NewArticle {
            title: self.title.clone(),
            content: (!self.content.trim().is_empty()).then(|| self.content.clone()),
            subject: self.subject.clone(),
            files: self.files.clone(),
        }
    }

    /// Body for updating an article; every form field is sent
    pub fn to_update(&self) -> ArticleUpdate {
        ArticleUpdate {
            title: Some(self.title.clone()),
            content: Some(self.content.clone()),
            subject: Some(self.subject.clone()),
            files: Some(self.files.clone()),
            ..Default::default()
        }
    }
}

/// Clears the in-flight flag when the submission ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// In-memory article collection kept in step with the service
pub struct Dashboard {
    api: ApiClient,
    articles: RwLock<Vec<Article>>,
    submitting: AtomicBool,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("api", &self.api)
            .field("submitting", &self.submitting.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Empty dashboard; call [`Dashboard::refresh`] to load articles
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            articles: RwLock::new(Vec::new()),
            submitting: AtomicBool::new(false),
        }
    }

    /// The underlying API client
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Copy of the current collection, newest mutation first
    pub async fn snapshot(&self) -> Vec<Article> {
        self.articles.read().await.clone()
    }

    /// Article with `id`, if loaded
    pub async fn get(&self, id: &ArticleId) -> Option<Article> {
        self.articles.read().await.iter().find(|a| &a.id == id).cloned()
    }

    /// Derive the page `query` selects and pass it to `f`
    ///
    /// The view borrows the collection, so it only lives for the call.
    pub async fn view<R>(&self, query: &QueryState, f: impl FnOnce(&ArticleView<'_>) -> R) -> R {
        let articles = self.articles.read().await;
        f(&derive_view(&articles, query))
    }

    /// Subject filter choices for the current collection
    pub async fn subject_options(&self) -> Vec<SubjectOption> {
        subject_options(&self.articles.read().await)
    }

    /// Counts for the current collection
    pub async fn stats(&self) -> ArticleStats {
        ArticleStats::collect(&self.articles.read().await)
    }

    /// Replace the collection with the server's list
    pub async fn refresh(&self) -> Result<usize> {
        let fetched = self.api.list_articles().await?;
        let count = fetched.len();
        *self.articles.write().await = fetched;
        tracing::debug!(count, "article collection refreshed");
        Ok(count)
    }

    /// Create an article and prepend it
    pub async fn create(&self, article: &NewArticle) -> Result<Article> {
        let created = self.api.create_article(article).await?;
        self.articles.write().await.insert(0, created.clone());
        tracing::info!(id = %created.id, "article created");
        Ok(created)
    }

    /// Update an article and replace the local copy
    pub async fn update(&self, id: &ArticleId, update: &ArticleUpdate) -> Result<Article> {
        if update.is_empty() {
            return Err(Error::InvalidInput("update carries no fields".to_string()));
        }
        let updated = self.api.update_article(id, update).await?;
        self.replace(id, updated.clone()).await;
        tracing::info!(id = %id, "article updated");
        Ok(updated)
    }

    /// Delete an article and drop the local copy
    pub async fn delete(&self, id: &ArticleId) -> Result<()> {
        self.api.delete_article(id).await?;
        self.articles.write().await.retain(|a| &a.id != id);
        tracing::info!(id = %id, "article deleted");
        Ok(())
    }

    /// Flip the favorite flag
    pub async fn toggle_favorite(&self, id: &ArticleId) -> Result<Article> {
        let current = self.require(id).await?;
        self.apply_toggle(id, ArticleUpdate::favorite(!current.favorite))
            .await
    }

    /// Flip the pinned flag
    pub async fn toggle_pinned(&self, id: &ArticleId) -> Result<Article> {
        let current = self.require(id).await?;
        self.apply_toggle(id, ArticleUpdate::pinned(!current.pinned))
            .await
    }

    /// Create or update from a draft, clearing it on success
    ///
    /// Only one submission runs at a time; a second call while one is in
    /// flight fails with `Error::Busy` without contacting the service.
    pub async fn submit(&self, draft: &mut ArticleDraft) -> Result<Article> {
        draft.validate()?;
        let Some(_guard) = InFlight::acquire(&self.submitting) else {
            return Err(Error::Busy("a submission is already in progress".to_string()));
        };

        let saved = match &draft.editing {
            Some(id) => self.update(id, &draft.to_update()).await?,
            None => self.create(&draft.to_new_article()).await?,
        };
        draft.clear();
        Ok(saved)
    }

    async fn require(&self, id: &ArticleId) -> Result<Article> {
        self.get(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("article {id}")))
    }

    async fn apply_toggle(&self, id: &ArticleId, update: ArticleUpdate) -> Result<Article> {
        let updated = self.api.update_article(id, &update).await?;
        // the server's copy is authoritative, keyed by the id it returned
        self.replace(&updated.id, updated.clone()).await;
        tracing::debug!(id = %id, favorite = updated.favorite, pinned = updated.pinned, "article flags changed");
        Ok(updated)
    }

    async fn replace(&self, id: &ArticleId, article: Article) {
        let mut articles = self.articles.write().await;
        if let Some(slot) = articles.iter_mut().find(|a| &a.id == id) {
            *slot = article;
        }
    }
}
