//! File previews
//!
//! A [`FilePreview`] is bound to one displayed file reference. On mount it
//! fetches the file bytes once and materializes them into a [`PreviewHandle`]
//! (a temporary file a viewer can open). The handle is revoked when the
//! preview switches to another filename or is dropped, whichever comes first.
//!
//! # Lifecycle
//!
//! - Each mount or filename change starts a new generation with its own
//!   cancellation token. The previous generation's fetch is cancelled and its
//!   handle revoked before the next fetch starts.
//! - A fetch that completes after its generation ended is discarded, and the
//!   handle it produced is revoked immediately.
//! - Fetch failures are never reported to the caller; the preview falls back
//!   to [`PreviewStatus::Unavailable`] and the filename is shown as a label.

use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use tempfile::TempPath;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[allow(clippy::expect_used)]
static IMAGE_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpe?g|png|gif|webp)$").expect("literal pattern"));

#[allow(clippy::expect_used)]
static PDF_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.pdf$").expect("literal pattern"));

/// How a file can be displayed, decided by its extension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `.jpg`, `.jpeg`, `.png`, `.gif`, `.webp`; shown inline
    Image,
    /// `.pdf`; shown as a link that opens the document
    Document,
    /// Anything else; only the filename is shown
    Unknown,
}

impl FileKind {
    /// Classify a filename (case-insensitive)
    pub fn classify(filename: &str) -> Self {
        if IMAGE_EXT.is_match(filename) {
            FileKind::Image
        } else if PDF_EXT.is_match(filename) {
            FileKind::Document
        } else {
            FileKind::Unknown
        }
    }

    /// Whether a preview is worth fetching
    pub fn is_previewable(&self) -> bool {
        !matches!(self, FileKind::Unknown)
    }
}

/// Source of file bytes, keyed by filename
#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Fetch the raw content of `filename`
    async fn fetch(&self, filename: &str) -> Result<Vec<u8>>;
}

/// Creates preview handles in one directory and counts the live ones
#[derive(Clone, Debug)]
pub struct PreviewMaterializer {
    dir: PathBuf,
    live: Arc<AtomicUsize>,
}

impl PreviewMaterializer {
    /// Materialize into `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Materialize under the system temporary directory
    pub fn in_temp_dir() -> Result<Self> {
        Self::new(std::env::temp_dir().join("examprep-previews"))
    }

    /// Directory handles are created in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of handles created by this materializer and not yet revoked
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Write `bytes` to a fresh temporary file and wrap it in a handle
    pub fn materialize(&self, filename: &str, bytes: &[u8]) -> Result<PreviewHandle> {
        let suffix = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("preview-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(PreviewHandle {
            filename: filename.to_string(),
            kind: FileKind::classify(filename),
            path: Some(file.into_temp_path()),
            live: Arc::clone(&self.live),
        })
    }
}

/// Locally materialized content of one file
///
/// Dropping the handle revokes it: the backing file is removed.
#[derive(Debug)]
pub struct PreviewHandle {
    filename: String,
    kind: FileKind,
    path: Option<TempPath>,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    /// Filename this handle was created for
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Display kind
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Local path of the materialized content
    pub fn path(&self) -> &Path {
        match &self.path {
            Some(p) => p,
            None => Path::new(""),
        }
    }

    /// Revoke now, reporting removal errors that `Drop` would swallow
    pub fn revoke(mut self) -> Result<()> {
        match self.path.take() {
            Some(path) => path.close().map_err(Error::from),
            None => Ok(()),
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(filename = %self.filename, "preview handle revoked");
    }
}

/// Observable state of a [`FilePreview`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewStatus {
    /// Fetch in flight
    Loading,
    /// Content materialized at `path`
    Ready {
        /// Display kind
        kind: FileKind,
        /// Local path of the content
        path: PathBuf,
    },
    /// No preview; show the filename only
    Unavailable,
}

enum SlotState {
    Loading,
    Ready(PreviewHandle),
    Unavailable,
}

struct Slot {
    generation: u64,
    state: SlotState,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Preview bound to one displayed file reference
///
/// Must be created inside a Tokio runtime; the fetch runs as a spawned task.
pub struct FilePreview {
    filename: String,
    kind: FileKind,
    fetcher: Arc<dyn FileFetcher>,
    materializer: PreviewMaterializer,
    slot: Arc<Mutex<Slot>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for FilePreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePreview")
            .field("filename", &self.filename)
            .field("kind", &self.kind)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl FilePreview {
    /// Mount a preview for `filename` and start fetching it
    ///
    /// # Errors
    /// `Error::InvalidInput` for an empty filename
    pub fn mount(
        fetcher: Arc<dyn FileFetcher>,
        materializer: PreviewMaterializer,
        filename: impl Into<String>,
    ) -> Result<Self> {
        let filename = filename.into();
        if filename.is_empty() {
            return Err(Error::InvalidInput("empty filename".to_string()));
        }
        let mut preview = Self {
            kind: FileKind::classify(&filename),
            filename,
            fetcher,
            materializer,
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                state: SlotState::Loading,
            })),
            cancel: CancellationToken::new(),
            task: None,
        };
        preview.start();
        Ok(preview)
    }

    /// Filename currently displayed
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Display kind of the current filename
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Current state
    pub fn status(&self) -> PreviewStatus {
        match &lock(&self.slot).state {
            SlotState::Loading => PreviewStatus::Loading,
            SlotState::Ready(handle) => PreviewStatus::Ready {
                kind: handle.kind(),
                path: handle.path().to_path_buf(),
            },
            SlotState::Unavailable => PreviewStatus::Unavailable,
        }
    }

    /// Wait for the outstanding fetch, then report the state
    pub async fn settled(&mut self) -> PreviewStatus {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(filename = %self.filename, error = %e, "preview task failed");
                }
            }
        }
        self.status()
    }

    /// Point the preview at another file
    ///
    /// The current handle is revoked and its fetch cancelled before the new
    /// fetch starts. Setting the same filename is a no-op.
    pub fn set_filename(&mut self, filename: impl Into<String>) -> Result<()> {
        let filename = filename.into();
        if filename.is_empty() {
            return Err(Error::InvalidInput("empty filename".to_string()));
        }
        if filename == self.filename {
            return Ok(());
        }
        self.release();
        self.kind = FileKind::classify(&filename);
        self.filename = filename;
        self.start();
        Ok(())
    }

    /// Cancel the fetch and revoke the handle, leaving the preview unavailable
    pub fn release(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let previous = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            std::mem::replace(&mut slot.state, SlotState::Unavailable)
        };
        // revoke outside the lock
        drop(previous);
    }

    fn start(&mut self) {
        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.state = if self.kind.is_previewable() {
                SlotState::Loading
            } else {
                SlotState::Unavailable
            };
            slot.generation
        };
        if !self.kind.is_previewable() {
            tracing::debug!(filename = %self.filename, "no preview for file type");
            return;
        }

        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let materializer = self.materializer.clone();
        let slot = Arc::clone(&self.slot);
        let filename = self.filename.clone();

        self.task = Some(tokio::spawn(async move {
            let fetched = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(filename = %filename, "preview fetch cancelled");
                    return;
                }
                result = fetcher.fetch(&filename) => result,
            };

            let next = match fetched.and_then(|bytes| materializer.materialize(&filename, &bytes)) {
                Ok(handle) => SlotState::Ready(handle),
                Err(e) => {
                    tracing::debug!(filename = %filename, error = %e, "preview unavailable");
                    SlotState::Unavailable
                }
            };

            let stale = {
                let mut guard = lock(&slot);
                if guard.generation == generation {
                    guard.state = next;
                    None
                } else {
                    Some(next)
                }
            };
            if let Some(stale) = stale {
                tracing::debug!(filename = %filename, "discarding stale preview");
                drop(stale);
            }
        }));
    }
}

impl Drop for FilePreview {
    fn drop(&mut self) {
        self.release();
    }
}

/// Previews for an ordered list of filenames, keyed by filename
///
/// [`PreviewSet::sync`] keeps previews for names that are still listed,
/// mounts new ones, and revokes the rest.
pub struct PreviewSet {
    fetcher: Arc<dyn FileFetcher>,
    materializer: PreviewMaterializer,
    previews: HashMap<String, FilePreview>,
}

impl PreviewSet {
    /// Empty set
    pub fn new(fetcher: Arc<dyn FileFetcher>, materializer: PreviewMaterializer) -> Self {
        Self {
            fetcher,
            materializer,
            previews: HashMap::new(),
        }
    }

    /// Match the mounted previews to `filenames`
    pub fn sync(&mut self, filenames: &[String]) -> Result<()> {
        self.previews
            .retain(|name, _| filenames.iter().any(|f| f == name));
        for name in filenames {
            if name.is_empty() || self.previews.contains_key(name) {
                continue;
            }
            let preview = FilePreview::mount(
                Arc::clone(&self.fetcher),
                self.materializer.clone(),
                name.clone(),
            )?;
            self.previews.insert(name.clone(), preview);
        }
        Ok(())
    }

    /// Unmount the preview for `filename`, revoking its handle
    pub fn remove(&mut self, filename: &str) -> bool {
        self.previews.remove(filename).is_some()
    }

    /// Preview mounted for `filename`
    pub fn get(&self, filename: &str) -> Option<&FilePreview> {
        self.previews.get(filename)
    }

    /// Wait for every outstanding fetch
    pub async fn settle_all(&mut self) {
        for preview in self.previews.values_mut() {
            preview.settled().await;
        }
    }

    /// Number of mounted previews
    pub fn len(&self) -> usize {
        self.previews.len()
    }

    /// True when nothing is mounted
    pub fn is_empty(&self) -> bool {
        self.previews.is_empty()
    }

    /// Unmount everything
    pub fn clear(&mut self) {
        self.previews.clear();
    }
}
