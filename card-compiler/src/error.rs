//! Error types for the card compiler.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from palette extraction.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// The image could not be opened or decoded.
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        /// Image path.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },
}

/// Errors from the object-storage uploader.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Required storage settings are missing.
    #[error("object storage not configured: {0}")]
    NotConfigured(&'static str),
    /// The endpoint or object URL is invalid.
    #[error("invalid storage URL: {0}")]
    InvalidUrl(String),
    /// The local file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The storage service rejected the upload.
    #[error("upload rejected with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, usually an XML error document.
        body: String,
    },
    /// The request could not be signed.
    #[error("failed to sign upload request: {0}")]
    Signing(String),
}

/// Errors from the text generator.
#[derive(Debug, Error)]
pub enum TextGenError {
    /// No API key was configured.
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    /// The base URL is invalid.
    #[error("invalid LLM base URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The API returned an error status.
    #[error("LLM request failed with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The response envelope did not match the chat completions shape.
    #[error("unexpected LLM response: {0}")]
    UnexpectedResponse(String),
}

/// Errors that abort a compile.
#[derive(Debug, Error)]
pub enum CompileError {
    /// No image path was given.
    #[error("image path is required")]
    MissingImagePath,
    /// Palette extraction failed.
    #[error(transparent)]
    Palette(#[from] PaletteError),
    /// Upload failed.
    #[error(transparent)]
    Upload(#[from] UploadError),
    /// Text generation failed.
    #[error(transparent)]
    TextGen(#[from] TextGenError),
}
