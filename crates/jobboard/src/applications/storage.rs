//! Resume file storage.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use uuid::Uuid;

use super::domain::ResumeUpload;
use crate::config::StorageConfig;

/// Public path prefix under which stored resumes are linked.
pub const RESUME_LINK_PREFIX: &str = "/uploads/";

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Persists uploaded resumes and hands back the link stored on the application.
pub trait ResumeStore: Send + Sync {
    fn max_bytes(&self) -> usize;
    fn store(&self, upload: &ResumeUpload) -> Result<String, StorageError>;
    /// Contents behind a link handed out by `store`; `None` when nothing is
    /// stored there.
    fn load(&self, link: &str) -> Result<Option<Vec<u8>>, StorageError>;
    /// Remove a previously stored resume. Missing files are not an error.
    fn discard(&self, link: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("resume file is empty")]
    Empty,
    #[error("resume is {found} bytes; the limit is {limit} bytes")]
    TooLarge { limit: usize, found: usize },
    #[error("resume must be a PDF document (got {0})")]
    UnsupportedType(String),
    #[error("resume storage failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether the upload itself was at fault, as opposed to the disk.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StorageError::Io(_))
    }
}

/// Writes resumes as `<uuid>.pdf` under a local directory.
#[derive(Debug, Clone)]
pub struct LocalResumeStore {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalResumeStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.upload_dir.clone(), config.max_upload_bytes)
    }

    fn check(&self, upload: &ResumeUpload) -> Result<(), StorageError> {
        if upload.bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                limit: self.max_bytes,
                found: upload.bytes.len(),
            });
        }
        if !declared_pdf(upload) {
            let declared = upload
                .content_type
                .clone()
                .unwrap_or_else(|| upload.file_name.clone());
            return Err(StorageError::UnsupportedType(declared));
        }
        if !upload.bytes.starts_with(PDF_MAGIC) {
            return Err(StorageError::UnsupportedType(
                "content is not a PDF document".to_string(),
            ));
        }
        Ok(())
    }
}

/// File name inside the upload directory for a link this store produced.
fn stored_name(link: &str) -> Option<&str> {
    let name = link.strip_prefix(RESUME_LINK_PREFIX)?;
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return None;
    }
    Some(name)
}

/// PDF content type, or a generic/absent type on a `.pdf` file name.
fn declared_pdf(upload: &ResumeUpload) -> bool {
    let pdf_name = upload.file_name.to_ascii_lowercase().ends_with(".pdf");
    match upload
        .content_type
        .as_deref()
        .and_then(|raw| raw.parse::<mime::Mime>().ok())
    {
        Some(kind) if kind.essence_str() == mime::APPLICATION_PDF.essence_str() => true,
        Some(kind) if kind == mime::APPLICATION_OCTET_STREAM => pdf_name,
        Some(_) => false,
        None => pdf_name,
    }
}

impl ResumeStore for LocalResumeStore {
    fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn store(&self, upload: &ResumeUpload) -> Result<String, StorageError> {
        self.check(upload)?;
        fs::create_dir_all(&self.root)?;

        let name = format!("{}.pdf", Uuid::now_v7());
        fs::write(self.root.join(&name), &upload.bytes)?;
        tracing::debug!(file = %name, bytes = upload.bytes.len(), "resume stored");
        Ok(format!("{RESUME_LINK_PREFIX}{name}"))
    }

    fn load(&self, link: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let Some(name) = stored_name(link) else {
            return Ok(None);
        };
        match fs::read(self.root.join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn discard(&self, link: &str) -> Result<(), StorageError> {
        let Some(name) = stored_name(link) else {
            return Ok(());
        };
        match fs::remove_file(self.root.join(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
