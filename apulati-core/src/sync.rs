//! Audio/video sync controller.
//!
//! Owns the playback machine, the one shared audio element, and a registry of
//! mounted scene videos keyed by [`SceneKey`]. It turns intents into ordered
//! media calls: stop everything, load, start audio, then start exactly the one
//! active video. All other videos are paused before any play call is issued.
//!
//! Everything runs on one thread. Borrows of the interior cells are never held
//! across an `.await`; a superseded start is detected by re-checking its
//! [`Ticket`] after every suspension point.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use crate::analysis::ElementId;
use crate::catalog::{Catalog, SceneKey};
use crate::config::PlayerConfig;
use crate::error::MediaError;
use crate::navigation::Intent;
use crate::playback::{Phase, PlaybackMachine, PlaybackSelection, Ticket, Transition};

/// The slice of `HTMLMediaElement` the controller sequences against.
#[allow(async_fn_in_trait)]
pub trait MediaElement {
    fn id(&self) -> ElementId;
    fn is_paused(&self) -> bool;
    /// At least `HAVE_CURRENT_DATA`.
    fn is_ready(&self) -> bool;
    fn pause(&self);
    async fn play(&self) -> Result<(), MediaError>;
    /// Resolve on the next `canplay`, or fail after `timeout`.
    async fn wait_ready(&self, timeout: Duration) -> Result<(), MediaError>;
}

/// The shared audio element: one element, many sources over its lifetime.
pub trait AudioOutput: MediaElement {
    fn source(&self) -> Option<String>;
    /// Assign `url` and start loading it.
    fn load_source(&self, url: &str);
    /// Pause, seek to zero and forget the source.
    fn rewind(&self);
}

/// Environment the controller runs in.
#[allow(async_fn_in_trait)]
pub trait MediaBackend {
    type Audio: AudioOutput;
    type Video: MediaElement;

    /// Resume the analysis graph's audio context if it is suspended.
    async fn resume_graph(&self);
    async fn asset_exists(&self, url: &str) -> bool;
    fn publish(&self, selection: PlaybackSelection);
}

/// Held while a pause/resume is in flight. Released on drop, so an early
/// return or a failed start cannot leave it set.
struct OperationGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> OperationGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

pub struct SyncController<B: MediaBackend> {
    backend: B,
    catalog: Rc<Catalog>,
    config: PlayerConfig,
    audio: B::Audio,
    videos: RefCell<BTreeMap<SceneKey, Rc<B::Video>>>,
    machine: RefCell<PlaybackMachine>,
    busy: Cell<bool>,
    /// Scene whose sources are actually in the elements. Set only once a
    /// load got past its probe.
    loaded: Cell<Option<SceneKey>>,
}

impl<B: MediaBackend> SyncController<B> {
    pub fn new(backend: B, catalog: Rc<Catalog>, config: PlayerConfig, audio: B::Audio) -> Self {
        Self {
            backend,
            catalog,
            config,
            audio,
            videos: RefCell::new(BTreeMap::new()),
            machine: RefCell::new(PlaybackMachine::new()),
            busy: Cell::new(false),
            loaded: Cell::new(None),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn audio(&self) -> &B::Audio {
        &self.audio
    }

    pub fn selection(&self) -> PlaybackSelection {
        self.machine.borrow().selection()
    }

    fn publish(&self) {
        self.backend.publish(self.selection());
    }

    /// A scene tile mounted its `<video>`.
    pub fn register_video(&self, key: SceneKey, video: Rc<B::Video>) {
        if !self.catalog.contains(key) {
            log::warn!("Ignoring video for unknown scene {key:?}");
            return;
        }
        if self.selection().active() != Some(key) && !video.is_paused() {
            video.pause();
        }
        self.videos.borrow_mut().insert(key, video);
    }

    /// Drop the video a tile registered. A no-op when `id` has since been
    /// replaced by a remounted tile's element.
    pub fn unregister_video(&self, key: SceneKey, id: ElementId) -> Option<Rc<B::Video>> {
        let mut videos = self.videos.borrow_mut();
        if videos.get(&key).map(|v| v.id()) != Some(id) {
            return None;
        }
        videos.remove(&key)
    }

    fn video(&self, key: SceneKey) -> Option<Rc<B::Video>> {
        self.videos.borrow().get(&key).cloned()
    }

    /// Pause the audio and every playing video. Synchronous and idempotent.
    pub fn stop_all(&self) {
        if !self.audio.is_paused() {
            self.audio.pause();
        }
        self.pause_videos_except(None);
    }

    fn pause_videos_except(&self, keep: Option<SceneKey>) {
        for (key, video) in self.videos.borrow().iter() {
            if Some(*key) != keep && !video.is_paused() {
                video.pause();
            }
        }
    }

    fn any_unpaused(&self) -> bool {
        !self.audio.is_paused() || self.videos.borrow().values().any(|v| !v.is_paused())
    }

    fn ensure_current(&self, ticket: Ticket) -> Result<(), MediaError> {
        if self.machine.borrow().is_current(ticket) {
            Ok(())
        } else {
            Err(MediaError::Superseded)
        }
    }

    /// Carry out the part of `intent` that must finish before the input
    /// handler returns. Work changes complete here; scene intents are handed
    /// back for [`dispatch`](Self::dispatch).
    pub fn dispatch_now(&self, intent: Intent) -> Option<Intent> {
        match intent {
            Intent::ChangeWork(index) => {
                self.change_work(index);
                None
            }
            other => Some(other),
        }
    }

    pub async fn dispatch(&self, intent: Intent) {
        match intent {
            Intent::SelectScene(key) => self.select_scene(key).await,
            Intent::Toggle => self.toggle().await,
            Intent::ChangeWork(index) => self.change_work(index),
        }
    }

    /// Select `key`. Re-selecting the settled active scene is a play/pause
    /// toggle; anything else stops all media and reloads.
    pub async fn select_scene(&self, key: SceneKey) {
        if !self.catalog.contains(key) {
            log::warn!("Scene {key:?} is not in the catalog");
            return;
        }
        let sel = self.selection();
        if sel.active() == Some(key) && matches!(sel.phase, Phase::Playing | Phase::Paused) {
            self.toggle().await;
            return;
        }

        let transition = self.machine.borrow_mut().select_scene(key);
        log::debug!("Select {key:?} -> {transition:?}");
        self.publish();
        self.apply(key, transition).await;
    }

    /// Play/pause the active scene. Skipped while another pause/resume is
    /// still in flight.
    pub async fn toggle(&self) {
        let Some(_guard) = OperationGuard::acquire(&self.busy) else {
            log::warn!("Playback operation in progress, skipping toggle");
            return;
        };
        let Some(key) = self.machine.borrow().active() else {
            return;
        };
        let Some(transition) = self.machine.borrow_mut().toggle() else {
            return;
        };
        log::debug!("Toggle {key:?} -> {transition:?}");
        self.publish();
        self.apply(key, transition).await;
    }

    /// Switch works. Media is force-stopped before any state changes.
    pub fn change_work(&self, index: usize) {
        if index >= self.catalog.work_count() {
            log::warn!("Work {index} is out of range");
            return;
        }
        self.stop_all();
        self.audio.rewind();
        self.loaded.set(None);
        self.machine.borrow_mut().change_work(index);
        log::debug!("Changed to work {index}");
        self.publish();
    }

    async fn apply(&self, key: SceneKey, transition: Transition) {
        match transition {
            Transition::Pause => self.stop_all(),
            Transition::Resume(ticket) if self.loaded.get() != Some(key) => {
                log::debug!("Resume of {key:?} without its sources; reloading");
                self.load_and_start(key, ticket).await;
            }
            Transition::Resume(ticket) => {
                let result = self.start(key, ticket).await;
                self.settle(ticket, result);
            }
            Transition::Load(ticket) => self.load_and_start(key, ticket).await,
        }
    }

    async fn load_and_start(&self, key: SceneKey, ticket: Ticket) {
        self.stop_all();
        self.loaded.set(None);
        let audio_url = self.catalog.scene(key).and_then(|s| s.audio.clone());

        match audio_url {
            Some(url) => {
                if self.config.probe_assets && !self.backend.asset_exists(&url).await {
                    self.settle(ticket, Err(MediaError::MissingAsset(url)));
                    return;
                }
                if self.ensure_current(ticket).is_err() {
                    log::debug!("Dropping stale load for {key:?}");
                    return;
                }
                log::info!("Loading audio {url} for {key:?}");
                self.audio.load_source(&url);
            }
            None => {
                log::debug!("Scene {key:?} has no audio; video only");
                self.audio.rewind();
            }
        }
        self.loaded.set(Some(key));

        let result = self.start(key, ticket).await;
        self.settle(ticket, result);
    }

    /// Audio first, then the scene's video.
    async fn start(&self, key: SceneKey, ticket: Ticket) -> Result<(), MediaError> {
        self.backend.resume_graph().await;
        self.ensure_current(ticket)?;
        self.pause_videos_except(Some(key));

        let has_audio = self.audio.source().is_some();
        if has_audio {
            self.start_element(&self.audio, ticket).await?;
        }

        match self.video(key) {
            Some(video) => {
                self.pause_videos_except(Some(key));
                self.start_element(video.as_ref(), ticket).await?;
            }
            None if has_audio => log::warn!("No mounted video for {key:?}; audio only"),
            None => {
                return Err(MediaError::StartRejected {
                    reason: format!("nothing to play for {key:?}"),
                });
            }
        }
        Ok(())
    }

    async fn start_element<E: MediaElement>(&self, element: &E, ticket: Ticket) -> Result<(), MediaError> {
        if !element.is_ready() {
            element.wait_ready(self.config.ready_timeout()).await?;
        }
        self.ensure_current(ticket)?;
        element.play().await?;
        self.ensure_current(ticket)
    }

    fn settle(&self, ticket: Ticket, result: Result<(), MediaError>) {
        match result {
            Ok(()) => {
                if self.machine.borrow_mut().complete(ticket) {
                    log::debug!("Playing {:?}", self.selection().active());
                } else {
                    log::debug!("Start finished after being superseded");
                }
            }
            Err(e) if e.is_stale() => log::debug!("Dropped stale start: {e}"),
            Err(e) => {
                if self.machine.borrow_mut().fail(ticket) {
                    match &e {
                        MediaError::MissingAsset(_) => log::warn!("{e}"),
                        _ => log::error!("Media start failed: {e}"),
                    }
                    self.stop_all();
                } else {
                    log::debug!("Ignoring failure of superseded start: {e}");
                }
            }
        }
        self.publish();
    }

    /// Bring the machine and the media back into agreement. Run periodically:
    /// elements can pause on their own (errors, OS media keys).
    pub fn reconcile(&self) {
        let sel = self.selection();
        let Some(key) = sel.active() else {
            if self.any_unpaused() {
                log::debug!("Reconcile: media playing with no scene selected");
                self.stop_all();
            }
            return;
        };

        match sel.phase {
            Phase::Playing => {
                let lead_paused = if self.audio.source().is_some() {
                    self.audio.is_paused()
                } else {
                    self.video(key).map_or(true, |v| v.is_paused())
                };
                if lead_paused && self.machine.borrow_mut().playback_lost() {
                    log::warn!("Reconcile: {key:?} stopped on its own");
                    self.stop_all();
                    self.publish();
                } else {
                    self.pause_videos_except(Some(key));
                }
            }
            Phase::Paused | Phase::Idle if self.any_unpaused() => {
                log::debug!("Reconcile: pausing stray media");
                self.stop_all();
            }
            _ => {}
        }
    }
}
