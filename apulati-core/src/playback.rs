//! Playback state machine: which work and scene are active and whether they
//! are playing.
//!
//! The machine never touches media. It answers "what should happen now" with a
//! [`Transition`], and the sync controller carries it out and reports back via
//! [`PlaybackMachine::complete`] / [`PlaybackMachine::fail`].
//!
//! Every start attempt carries a [`Ticket`] drawn from a generation counter.
//! Anything that supersedes in-flight work bumps the generation, so a late
//! completion for an old ticket is recognised and ignored.

use crate::catalog::SceneKey;

/// Generation stamp of one start attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No scene selected.
    Idle,
    /// A start (load or resume) is in flight.
    Selecting(Ticket),
    Playing,
    Paused,
}

/// What the controller must do to honour a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Stop all media; no reload.
    Pause,
    /// Start the already-loaded scene again.
    Resume(Ticket),
    /// Stop all media, load the new scene's sources, then start it.
    Load(Ticket),
}

/// Snapshot published to the view layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackSelection {
    pub work: usize,
    pub scene: Option<usize>,
    pub phase: Phase,
    pub has_user_interacted: bool,
}

impl PlaybackSelection {
    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.phase, Phase::Selecting(_))
    }

    pub fn active(&self) -> Option<SceneKey> {
        self.scene.map(|scene| SceneKey::new(self.work, scene))
    }
}

#[derive(Debug)]
pub struct PlaybackMachine {
    work: usize,
    scene: Option<usize>,
    phase: Phase,
    has_user_interacted: bool,
    generation: u32,
}

impl Default for PlaybackMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackMachine {
    pub fn new() -> Self {
        Self {
            work: 0,
            scene: None,
            phase: Phase::Idle,
            has_user_interacted: false,
            generation: 0,
        }
    }

    pub fn selection(&self) -> PlaybackSelection {
        PlaybackSelection {
            work: self.work,
            scene: self.scene,
            phase: self.phase,
            has_user_interacted: self.has_user_interacted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active(&self) -> Option<SceneKey> {
        self.selection().active()
    }

    fn next_ticket(&mut self) -> Ticket {
        self.generation = self.generation.wrapping_add(1);
        Ticket(self.generation)
    }

    /// Whether `ticket` still belongs to the newest in-flight start.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.phase == Phase::Selecting(ticket)
    }

    /// A tile (or keyboard) asked for `key`.
    ///
    /// Re-selecting the active scene pauses or resumes it without a reload;
    /// any other key is a genuine scene change and always reloads.
    pub fn select_scene(&mut self, key: SceneKey) -> Transition {
        if self.active() == Some(key) {
            match self.phase {
                Phase::Playing => {
                    self.next_ticket();
                    self.phase = Phase::Paused;
                    return Transition::Pause;
                }
                Phase::Paused => {
                    let ticket = self.next_ticket();
                    self.phase = Phase::Selecting(ticket);
                    return Transition::Resume(ticket);
                }
                Phase::Idle | Phase::Selecting(_) => {}
            }
        }

        self.work = key.work;
        self.scene = Some(key.scene);
        self.has_user_interacted = true;
        let ticket = self.next_ticket();
        self.phase = Phase::Selecting(ticket);
        Transition::Load(ticket)
    }

    /// Play/pause for the active scene. `None` when nothing is selected.
    pub fn toggle(&mut self) -> Option<Transition> {
        self.scene?;
        match self.phase {
            Phase::Idle => None,
            Phase::Playing | Phase::Selecting(_) => {
                self.next_ticket();
                self.phase = Phase::Paused;
                Some(Transition::Pause)
            }
            Phase::Paused => {
                let ticket = self.next_ticket();
                self.phase = Phase::Selecting(ticket);
                Some(Transition::Resume(ticket))
            }
        }
    }

    /// Switch works. Deselects the scene and collapses the credits panel.
    pub fn change_work(&mut self, index: usize) {
        self.next_ticket();
        self.work = index;
        self.scene = None;
        self.phase = Phase::Idle;
        self.has_user_interacted = false;
    }

    /// The start for `ticket` succeeded. False when it was superseded.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = Phase::Playing;
        true
    }

    /// The start for `ticket` failed. False when it was superseded.
    pub fn fail(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = Phase::Paused;
        true
    }

    /// Media stopped underneath us (error, external pause).
    pub fn playback_lost(&mut self) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        self.next_ticket();
        self.phase = Phase::Paused;
        true
    }
}
