use leptos::prelude::*;
use apulati_core::PlaybackSelection;

/// Reactive mirror of the controller's published selection, plus view-only state.
#[derive(Clone, Copy)]
pub struct AppState {
    pub work_index: RwSignal<usize>,
    pub scene_index: RwSignal<Option<usize>>,
    pub is_playing: RwSignal<bool>,
    pub is_selecting: RwSignal<bool>,
    pub has_user_interacted: RwSignal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            work_index: RwSignal::new(0),
            scene_index: RwSignal::new(None),
            is_playing: RwSignal::new(false),
            is_selecting: RwSignal::new(false),
            has_user_interacted: RwSignal::new(false),
        }
    }

    /// Copy a controller snapshot into the signals, touching only what changed.
    pub fn apply(&self, sel: PlaybackSelection) {
        fn set_if_changed<T: PartialEq + Send + Sync + 'static>(signal: RwSignal<T>, value: T) {
            if signal.with_untracked(|v| *v != value) {
                signal.set(value);
            }
        }
        set_if_changed(self.work_index, sel.work);
        set_if_changed(self.scene_index, sel.scene);
        set_if_changed(self.is_playing, sel.is_playing());
        set_if_changed(self.is_selecting, sel.is_selecting());
        set_if_changed(self.has_user_interacted, sel.has_user_interacted);
    }

    pub fn is_active(&self, work: usize, scene: usize) -> bool {
        self.work_index.get() == work && self.scene_index.get() == Some(scene)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
