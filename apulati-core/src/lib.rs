//! Browser-independent core of the apulati viewer: the content catalog,
//! per-browser source ordering, the playback state machine, the audio/video
//! sync controller, input mapping, and the meter math.
//!
//! Nothing here touches `web-sys`; the app crate binds the traits in
//! [`sync`] and [`analysis`] to real media elements and an `AnalyserNode`.

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod navigation;
pub mod playback;
pub mod source;
pub mod sync;

pub use catalog::{Catalog, Scene, SceneKey, Site, Work};
pub use config::{AnalysisConfig, PlayerConfig, WrapPolicy};
pub use error::{CatalogError, MediaError};
pub use navigation::{Intent, NavKey, Navigator};
pub use playback::{Phase, PlaybackSelection};
pub use sync::{AudioOutput, MediaBackend, MediaElement, SyncController};
