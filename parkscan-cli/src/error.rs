//! CLI error types.

use thiserror::Error;

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad or missing configuration (arguments, keys).
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to construct the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] parkscan::http::HttpError),

    /// The capture run was rejected before dispatch.
    #[error("capture failed: {0}")]
    Capture(#[from] parkscan::CaptureError),

    /// Writing exported artifacts failed.
    #[error("export failed: {0}")]
    Export(#[from] std::io::Error),
}
