use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use bytes::Bytes;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// A single file part pulled out of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Lowercased extension including the leading dot, e.g. `".png"`.
    /// Dotfiles such as `.png` have no extension.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
    }

    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.filename.to_ascii_lowercase().ends_with(suffix)
    }

    /// Final path component of the upload name with its extension swapped.
    pub fn renamed(&self, extension: &str) -> String {
        let base = Path::new(&self.filename)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("converted");
        let stem = match base.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => base,
        };
        format!("{}.{}", stem, extension)
    }
}

#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub content: Vec<u8>,
    pub media_type: &'static str,
    pub filename: String,
}

impl ConversionResult {
    pub fn new(content: Vec<u8>, media_type: &'static str, filename: impl Into<String>) -> Self {
        Self {
            content,
            media_type,
            filename: filename.into(),
        }
    }
}

/// Classification used to pick the HTTP status of a [`ConversionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    ConversionFailed,
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Only {expected} files allowed")]
    WrongExtension { expected: &'static str },

    #[error("Unsupported file type: {filename}")]
    UnsupportedFileType { filename: String },

    #[error("Please upload at least one image.")]
    NoFiles,

    #[error("Missing form field: {field}")]
    MissingField { field: &'static str },

    #[error("Malformed upload: {0}")]
    Upload(String),

    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(String),

    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WrongExtension { .. }
            | Self::UnsupportedFileType { .. }
            | Self::NoFiles
            | Self::MissingField { .. }
            | Self::Upload(_)
            | Self::TooLarge { .. } => ErrorKind::InvalidInput,
            Self::Image(_) | Self::Io(_) | Self::Render(_) => ErrorKind::ConversionFailed,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Prefixes failures with `context`; client errors pass through untouched.
    pub fn context(self, context: &'static str) -> Self {
        match self.kind() {
            ErrorKind::InvalidInput => self,
            ErrorKind::ConversionFailed => Self::Context {
                context,
                source: Box::new(self),
            },
        }
    }
}

impl From<tokio::task::JoinError> for ConversionError {
    fn from(err: tokio::task::JoinError) -> Self {
        ConversionError::Io(std::io::Error::new(std::io::ErrorKind::Other, err))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ResponseError for ConversionError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::ConversionFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            detail: self.to_string(),
        })
    }
}
