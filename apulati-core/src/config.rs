//! Player tuning values, read from the `player` section of the site JSON.
//!
//! Every field has a default so an absent or partial section is fine.

use serde::Deserialize;
use std::time::Duration;

/// What happens when navigation steps past either end of the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapPolicy {
    #[default]
    Wrap,
    Clamp,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub fft_size: u32,
    pub smoothing: f64,
    pub tick_ms: u32,
    /// RMS multiplier before clamping to [0, 1]. Tuning value, no derivation.
    pub volume_scale: f32,
    pub noise_floor: f32,
    pub trail_ms: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            tick_ms: 50,
            volume_scale: 2.0,
            noise_floor: 0.001,
            trail_ms: 2000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub ready_timeout_ms: u64,
    pub reconcile_interval_ms: u64,
    pub wheel_threshold: f64,
    pub wheel_throttle_ms: f64,
    pub wrap: WrapPolicy,
    pub probe_assets: bool,
    pub log_level: String,
    pub analysis: AnalysisConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 5000,
            reconcile_interval_ms: 1000,
            wheel_threshold: 50.0,
            wheel_throttle_ms: 300.0,
            wrap: WrapPolicy::Wrap,
            probe_assets: true,
            log_level: "debug".into(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl PlayerConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval_ms)
    }

    /// Unknown names fall back to `Debug`.
    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let cfg: PlayerConfig =
            serde_json::from_str(r#"{ "wrap": "clamp", "analysis": { "volume_scale": 1.2 } }"#)
                .unwrap();
        assert_eq!(cfg.wrap, WrapPolicy::Clamp);
        assert_eq!(cfg.analysis.volume_scale, 1.2);
        assert_eq!(cfg.analysis.fft_size, 256);
        assert_eq!(cfg.ready_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.wheel_throttle_ms, 300.0);
    }

    #[test]
    fn test_log_level_parsing() {
        let mut cfg = PlayerConfig::default();
        assert_eq!(cfg.log_level(), log::Level::Debug);
        cfg.log_level = "warn".into();
        assert_eq!(cfg.log_level(), log::Level::Warn);
        cfg.log_level = "loud".into();
        assert_eq!(cfg.log_level(), log::Level::Debug);
    }
}
