//! Maps clicks, wheel gestures and arrow keys onto playback intents.

use crate::catalog::{Catalog, SceneKey};
use crate::config::{PlayerConfig, WrapPolicy};
use crate::playback::PlaybackSelection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    SelectScene(SceneKey),
    Toggle,
    ChangeWork(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
    Up,
    Down,
    Space,
}

impl NavKey {
    /// From `KeyboardEvent.key`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            " " | "Spacebar" => Some(Self::Space),
            _ => None,
        }
    }
}

/// Step `index` one place in a list of `len`. `None` when clamped in place.
fn step(index: usize, len: usize, forward: bool, policy: WrapPolicy) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let next = match (forward, policy) {
        (true, WrapPolicy::Wrap) => (index + 1) % len,
        (false, WrapPolicy::Wrap) => (index + len - 1) % len,
        (true, WrapPolicy::Clamp) => (index + 1).min(len - 1),
        (false, WrapPolicy::Clamp) => index.saturating_sub(1),
    };
    (next != index).then_some(next)
}

#[derive(Debug)]
pub struct Navigator {
    wrap: WrapPolicy,
    wheel_threshold: f64,
    wheel_throttle_ms: f64,
    last_wheel_ms: Option<f64>,
}

impl Navigator {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            wrap: config.wrap,
            wheel_threshold: config.wheel_threshold,
            wheel_throttle_ms: config.wheel_throttle_ms,
            last_wheel_ms: None,
        }
    }

    /// A click on a scene tile or its play/pause button.
    pub fn on_tile_click(&self, key: SceneKey, sel: &PlaybackSelection) -> Intent {
        if sel.active() == Some(key) {
            Intent::Toggle
        } else {
            Intent::SelectScene(key)
        }
    }

    /// Vertical wheel over the viewer. One gesture produces a burst of
    /// events; only the first past the threshold in each throttle window counts.
    pub fn on_wheel(
        &mut self,
        delta_x: f64,
        delta_y: f64,
        now_ms: f64,
        sel: &PlaybackSelection,
        catalog: &Catalog,
    ) -> Option<Intent> {
        if delta_y.abs() <= delta_x.abs() || delta_y.abs() <= self.wheel_threshold {
            return None;
        }
        if let Some(last) = self.last_wheel_ms {
            if now_ms - last < self.wheel_throttle_ms {
                return None;
            }
        }
        self.last_wheel_ms = Some(now_ms);
        step(sel.work, catalog.work_count(), delta_y > 0.0, self.wrap).map(Intent::ChangeWork)
    }

    pub fn on_key(&self, key: NavKey, sel: &PlaybackSelection, catalog: &Catalog) -> Option<Intent> {
        let scenes = catalog.scene_count(sel.work);
        match key {
            NavKey::Left | NavKey::Right => {
                let forward = key == NavKey::Right;
                let target = match sel.scene {
                    None if forward => 0,
                    None => scenes.checked_sub(1)?,
                    Some(current) => step(current, scenes, forward, WrapPolicy::Wrap)?,
                };
                Some(Intent::SelectScene(SceneKey::new(sel.work, target)))
            }
            NavKey::Up | NavKey::Down => {
                step(sel.work, catalog.work_count(), key == NavKey::Down, self.wrap)
                    .map(Intent::ChangeWork)
            }
            NavKey::Space => match sel.scene {
                None if scenes > 0 => Some(Intent::SelectScene(SceneKey::new(sel.work, 0))),
                None => None,
                Some(_) => Some(Intent::Toggle),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::playback::Phase;

    fn at(work: usize, scene: Option<usize>, phase: Phase) -> PlaybackSelection {
        PlaybackSelection {
            work,
            scene,
            phase,
            has_user_interacted: scene.is_some(),
        }
    }

    #[test]
    fn test_step() {
        assert_eq!(step(0, 3, false, WrapPolicy::Wrap), Some(2));
        assert_eq!(step(2, 3, true, WrapPolicy::Wrap), Some(0));
        assert_eq!(step(2, 3, true, WrapPolicy::Clamp), None);
        assert_eq!(step(0, 3, false, WrapPolicy::Clamp), None);
        assert_eq!(step(1, 3, false, WrapPolicy::Clamp), Some(0));
        assert_eq!(step(0, 1, true, WrapPolicy::Wrap), None, "single item never moves");
        assert_eq!(step(0, 0, true, WrapPolicy::Wrap), None);
    }

    #[test]
    fn test_tile_click() {
        let nav = Navigator::new(&PlayerConfig::default());
        let playing = at(0, Some(1), Phase::Playing);
        assert_eq!(nav.on_tile_click(SceneKey::new(0, 1), &playing), Intent::Toggle);
        assert_eq!(
            nav.on_tile_click(SceneKey::new(0, 2), &playing),
            Intent::SelectScene(SceneKey::new(0, 2))
        );
        assert_eq!(
            nav.on_tile_click(SceneKey::new(1, 1), &playing),
            Intent::SelectScene(SceneKey::new(1, 1))
        );
    }

    #[test]
    fn test_arrow_keys_wrap() {
        let catalog = sample_catalog();
        let nav = Navigator::new(&PlayerConfig::default());

        let fresh = at(1, None, Phase::Idle);
        assert_eq!(
            nav.on_key(NavKey::Left, &fresh, &catalog),
            Some(Intent::SelectScene(SceneKey::new(1, 4)))
        );
        assert_eq!(
            nav.on_key(NavKey::Right, &fresh, &catalog),
            Some(Intent::SelectScene(SceneKey::new(1, 0)))
        );
        assert_eq!(nav.on_key(NavKey::Down, &fresh, &catalog), Some(Intent::ChangeWork(0)));
        assert_eq!(nav.on_key(NavKey::Up, &fresh, &catalog), Some(Intent::ChangeWork(0)));

        let last = at(0, Some(2), Phase::Playing);
        assert_eq!(
            nav.on_key(NavKey::Right, &last, &catalog),
            Some(Intent::SelectScene(SceneKey::new(0, 0)))
        );
    }

    #[test]
    fn test_space() {
        let catalog = sample_catalog();
        let nav = Navigator::new(&PlayerConfig::default());
        assert_eq!(
            nav.on_key(NavKey::Space, &at(1, None, Phase::Idle), &catalog),
            Some(Intent::SelectScene(SceneKey::new(1, 0)))
        );
        assert_eq!(
            nav.on_key(NavKey::Space, &at(1, Some(3), Phase::Paused), &catalog),
            Some(Intent::Toggle)
        );
    }

    #[test]
    fn test_wheel_threshold_and_throttle() {
        let catalog = sample_catalog();
        let mut nav = Navigator::new(&PlayerConfig::default());
        let sel = at(0, None, Phase::Idle);

        assert_eq!(nav.on_wheel(0.0, 30.0, 0.0, &sel, &catalog), None, "below threshold");
        assert_eq!(nav.on_wheel(120.0, 80.0, 0.0, &sel, &catalog), None, "mostly horizontal");
        assert_eq!(nav.on_wheel(0.0, 80.0, 1000.0, &sel, &catalog), Some(Intent::ChangeWork(1)));
        assert_eq!(nav.on_wheel(0.0, 80.0, 1100.0, &sel, &catalog), None, "same gesture");
        assert_eq!(nav.on_wheel(0.0, -80.0, 1350.0, &sel, &catalog), Some(Intent::ChangeWork(1)));
    }

    #[test]
    fn test_wheel_clamp_policy() {
        let catalog = sample_catalog();
        let cfg = PlayerConfig {
            wrap: WrapPolicy::Clamp,
            ..PlayerConfig::default()
        };
        let mut nav = Navigator::new(&cfg);
        let last = at(1, None, Phase::Idle);
        assert_eq!(nav.on_wheel(0.0, 100.0, 0.0, &last, &catalog), None);
        assert_eq!(nav.on_wheel(0.0, -100.0, 500.0, &last, &catalog), Some(Intent::ChangeWork(0)));
        assert_eq!(nav.on_key(NavKey::Down, &last, &catalog), None);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(NavKey::from_key("ArrowUp"), Some(NavKey::Up));
        assert_eq!(NavKey::from_key(" "), Some(NavKey::Space));
        assert_eq!(NavKey::from_key("Enter"), None);
    }
}
