//! Files attached to the article being edited
//!
//! [`Attachments`] tracks the ordered filename list of a draft and keeps one
//! [`FilePreview`] mounted per listed file. Uploading appends the names the
//! service assigned; deleting removes the file remotely, then drops it from
//! the list and revokes its preview.

use crate::api::{ApiClient, UploadFile};
use crate::error::Result;
use crate::preview::{FileFetcher, FilePreview, PreviewMaterializer, PreviewSet};
use std::sync::Arc;

/// Attachment list of one draft with its previews
pub struct Attachments {
    api: ApiClient,
    files: Vec<String>,
    previews: PreviewSet,
}

impl std::fmt::Debug for Attachments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachments")
            .field("files", &self.files)
            .field("previews", &self.previews.len())
            .finish_non_exhaustive()
    }
}

impl Attachments {
    /// Empty list; previews are fetched through `api`
    pub fn new(api: ApiClient, materializer: PreviewMaterializer) -> Self {
        let fetcher: Arc<dyn FileFetcher> = Arc::new(api.clone());
        Self {
            api,
            files: Vec::new(),
            previews: PreviewSet::new(fetcher, materializer),
        }
    }

    /// Start from an existing list, e.g. the files of an article being edited
    ///
    /// Must be called inside a Tokio runtime; previews start fetching at once.
    pub fn with_files(
        api: ApiClient,
        materializer: PreviewMaterializer,
        files: Vec<String>,
    ) -> Result<Self> {
        let mut attachments = Self::new(api, materializer);
        attachments.files = files;
        attachments.previews.sync(&attachments.files)?;
        Ok(attachments)
    }

    /// Attached filenames in upload order
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Take the list, unmounting every preview
    pub fn into_files(mut self) -> Vec<String> {
        self.previews.clear();
        std::mem::take(&mut self.files)
    }

    /// Preview mounted for `filename`
    pub fn preview(&self, filename: &str) -> Option<&FilePreview> {
        self.previews.get(filename)
    }

    /// Wait until every preview has finished loading
    pub async fn settle(&mut self) {
        self.previews.settle_all().await;
    }

    /// Upload a batch and attach the stored names
    ///
    /// Returns the names the service assigned. Names already attached are not
    /// listed twice. On failure the list is unchanged.
    pub async fn upload(&mut self, files: Vec<UploadFile>) -> Result<Vec<String>> {
        let stored = self.api.upload_files(files).await?;
        for name in &stored {
            if !self.files.contains(name) {
                self.files.push(name.clone());
            }
        }
        self.previews.sync(&self.files)?;
        tracing::debug!(attached = self.files.len(), "attachments updated");
        Ok(stored)
    }

    /// Delete `filename` from the file store and detach it
    ///
    /// The preview is revoked only after the service confirmed the deletion;
    /// on failure both the list and the preview stay as they were.
    pub async fn delete(&mut self, filename: &str) -> Result<()> {
        self.api.delete_file(filename).await?;
        self.files.retain(|f| f != filename);
        self.previews.remove(filename);
        Ok(())
    }

    /// Names of every file the user has uploaded, attached or not
    pub async fn list_uploads(&self) -> Result<Vec<String>> {
        self.api.list_uploads().await
    }
}
