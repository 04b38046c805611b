//! Error types shared by the catalog loader and the media sync controller.
//!
//! None of these are fatal to the page: media errors are logged and leave the
//! machine paused, catalog errors fall back to an empty viewer.

use thiserror::Error;

/// Failures while starting, probing or analysing media.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MediaError {
    #[error("play() rejected: {reason}")]
    StartRejected { reason: String },

    #[error("media not ready after {timeout_ms} ms")]
    ReadyTimeout { timeout_ms: u64 },

    #[error("asset not found: {0}")]
    MissingAsset(String),

    /// A newer transition replaced the one this error belongs to.
    #[error("superseded by a newer transition")]
    Superseded,

    #[error("analysis graph unavailable: {0}")]
    GraphUnavailable(String),
}

impl MediaError {
    /// Stale transitions are dropped quietly; everything else is worth logging.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Failures while loading the site description.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("site JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog has no works")]
    Empty,

    #[error("work {index} (\"{title}\") has no videos")]
    NoScenes { index: usize, title: String },
}
