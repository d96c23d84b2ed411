//! # Error Types
//!
//! This module defines error types used throughout the labelpress library.
//!
//! Most of these never abort a render: content failures become placeholder
//! boxes, page failures are reported per page, and lost execution contexts
//! only disable themselves. See [`crate::pool`] for how each kind is routed.

use std::time::Duration;
use thiserror::Error;

/// Main error type for labelpress operations
#[derive(Debug, Error)]
pub enum LabelError {
    /// The item set cannot take the parallel fast path (caller should fall
    /// back to the single-threaded renderer)
    #[error("Unsupported layout for parallel rendering: {0}")]
    UnsupportedLayout(String),

    /// A QR, barcode, text or image provider could not produce a raster
    #[error("Content provider error: {0}")]
    ContentProvider(String),

    /// An execution context was lost (crash or disconnect)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A page task completed but reported an application-level failure
    #[error("Page render failed: {0}")]
    Response(#[source] Box<LabelError>),

    /// No response arrived before the client-level deadline
    #[error("Render request timed out after {0:?}")]
    Timeout(Duration),

    /// A page cannot be packed into printer raster lines
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid profile, catalog id or option
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image decode/encode error wrapper
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
