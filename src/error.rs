//! Error types.
//!
//! Content-level problems (bad colors, failed decodes) never show up here:
//! they degrade to a transparent color or an empty image instead.

use crate::view::ViewId;

/// Invalid host configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("image size bucket `{0}` must be positive")]
    ZeroImageSize(&'static str),

    #[error("display density must be a positive finite number, got {0}")]
    InvalidDensity(f32),

    #[error("malformed host config: {0}")]
    Json(#[from] serde_json::Error),
}

/// A card document that violates the element contract.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("unknown image size `{0}`")]
    UnknownImageSize(String),

    #[error("unknown image style `{0}`")]
    UnknownImageStyle(String),

    #[error("unknown horizontal alignment `{0}`")]
    UnknownAlignment(String),

    #[error("malformed card element: {0}")]
    Json(#[from] serde_json::Error),
}

/// A render call that cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("expected an Image element, got {0}")]
    NotAnImage(&'static str),

    #[error("view {0:?} does not exist in this tree")]
    UnknownView(ViewId),
}

/// Why a bitmap could not be produced. Never escapes a loader: failures are
/// logged and delivered as an absent bitmap.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),
}
