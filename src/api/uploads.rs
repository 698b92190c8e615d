//! File store endpoints
//!
//! Files are addressed by the filename the service assigned at upload time.
//! Only PDF documents and common web image formats are accepted.

use super::{ApiClient, encode_segment};
use crate::error::{Error, Result};
use crate::preview::FileFetcher;
use crate::types::FileList;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::path::Path;

/// Extensions accepted for upload with the MIME type sent for them
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// MIME type for `filename` if the service accepts it, by extension (case-insensitive)
pub fn is_accepted_upload(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    ACCEPTED_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// A file queued for upload
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// Name reported to the service
    pub filename: String,
    /// MIME type of the content
    pub mime: &'static str,
    /// File content
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Wrap in-memory content
    ///
    /// # Errors
    /// `Error::UnsupportedFile` unless the name has an accepted extension
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let filename = filename.into();
        let mime =
            is_accepted_upload(&filename).ok_or_else(|| Error::UnsupportedFile(filename.clone()))?;
        Ok(Self {
            filename,
            mime,
            bytes,
        })
    }

    /// Read a file from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("no file name in {}", path.display())))?
            .to_string();
        // check the type before reading a possibly large file
        if is_accepted_upload(&filename).is_none() {
            return Err(Error::UnsupportedFile(filename));
        }
        let bytes = tokio::fs::read(path).await?;
        Self::new(filename, bytes)
    }

    fn into_part(self) -> Result<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.filename)
            .mime_str(self.mime)?)
    }
}

impl ApiClient {
    /// `POST /upload`; returns the names the service stored the files under
    ///
    /// An empty batch returns immediately without a request.
    pub async fn upload_files(&self, files: Vec<UploadFile>) -> Result<Vec<String>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let count = files.len();
        let mut form = Form::new();
        for file in files {
            form = form.part("files", file.into_part()?);
        }
        let stored: FileList = self.post_multipart("upload", form).await?;
        tracing::info!(sent = count, stored = stored.files.len(), "files uploaded");
        Ok(stored.files)
    }

    /// `GET /upload/uploads`
    pub async fn list_uploads(&self) -> Result<Vec<String>> {
        let list: FileList = self.get("upload/uploads").await?;
        Ok(list.files)
    }

    /// `GET /upload/file/:filename`; raw bytes
    pub async fn fetch_file(&self, filename: &str) -> Result<Vec<u8>> {
        self.get_bytes(&file_path(filename)).await
    }

    /// `DELETE /upload/file/:filename`
    pub async fn delete_file(&self, filename: &str) -> Result<()> {
        self.delete(&file_path(filename)).await?;
        tracing::info!(filename = %filename, "file deleted");
        Ok(())
    }
}

#[async_trait]
impl FileFetcher for ApiClient {
    async fn fetch(&self, filename: &str) -> Result<Vec<u8>> {
        self.fetch_file(filename).await
    }
}

fn file_path(filename: &str) -> String {
    format!("upload/file/{}", encode_segment(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_and_web_images() {
        assert_eq!(is_accepted_upload("notes.pdf"), Some("application/pdf"));
        assert_eq!(is_accepted_upload("Photo.JPG"), Some("image/jpeg"));
        assert_eq!(is_accepted_upload("a.jpeg"), Some("image/jpeg"));
        assert_eq!(is_accepted_upload("diagram.png"), Some("image/png"));
        assert_eq!(is_accepted_upload("anim.gif"), Some("image/gif"));
        assert_eq!(is_accepted_upload("shot.webp"), Some("image/webp"));
    }

    #[test]
    fn rejects_other_types() {
        assert_eq!(is_accepted_upload("notes.docx"), None);
        assert_eq!(is_accepted_upload("README"), None);
        assert_eq!(is_accepted_upload("archive.pdf.zip"), None);
        assert!(matches!(
            UploadFile::new("x.exe", vec![1]),
            Err(Error::UnsupportedFile(name)) if name == "x.exe"
        ));
    }

    #[test]
    fn file_path_is_percent_encoded() {
        assert_eq!(
            file_path("my notes #1.pdf"),
            "upload/file/my%20notes%20%231.pdf"
        );
    }

    #[tokio::test]
    async fn from_path_reads_accepted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.filename, "scan.png");
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.bytes.len(), 4);
    }

    #[tokio::test]
    async fn from_path_rejects_before_reading() {
        // path does not exist; the type check must fail first
        let result = UploadFile::from_path("/nonexistent/dir/payload.sh").await;
        assert!(matches!(result, Err(Error::UnsupportedFile(_))));
    }
}
