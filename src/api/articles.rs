//! Article endpoints

use super::{ApiClient, encode_segment};
use crate::error::Result;
use crate::types::{Article, ArticleId, ArticleUpdate, NewArticle};

impl ApiClient {
    /// `GET /articles`
    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        let articles: Vec<Article> = self.get("articles").await?;
        tracing::debug!(count = articles.len(), "articles fetched");
        Ok(articles)
    }

    /// `POST /articles`; returns the stored article
    pub async fn create_article(&self, article: &NewArticle) -> Result<Article> {
        self.post("articles", article).await
    }

    /// `PUT /articles/:id` with only the fields set in `update`
    ///
    /// The server merges the fields and returns the full article.
    pub async fn update_article(&self, id: &ArticleId, update: &ArticleUpdate) -> Result<Article> {
        self.put(&article_path(id), update).await
    }

    /// `DELETE /articles/:id`
    pub async fn delete_article(&self, id: &ArticleId) -> Result<()> {
        self.delete(&article_path(id)).await
    }
}

fn article_path(id: &ArticleId) -> String {
    format!("articles/{}", encode_segment(id.as_str()))
}
