//! Meter math over analyser byte data, the fading waveform trail, and the
//! record of which media elements are already wired into the analysis graph.
//!
//! Byte data follows the Web Audio conventions: time-domain samples are
//! unsigned with 128 as zero, frequency bins are 0–255 magnitudes.

use std::collections::{HashSet, VecDeque};
use crate::config::AnalysisConfig;

/// Something that can be read like an `AnalyserNode`.
pub trait Analyser {
    fn bin_count(&self) -> usize;
    fn frequency_bytes(&self, out: &mut [u8]);
    fn time_domain_bytes(&self, out: &mut [u8]);
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bands {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeterFrame {
    /// Scaled RMS, in [0, 1].
    pub volume: f32,
    /// Centered time-domain samples in [-1, 1].
    pub waveform: Vec<f32>,
    pub bands: Bands,
}

fn centered(byte: u8) -> f32 {
    (byte as f32 - 128.0) / 128.0
}

fn band_peak(bins: &[u8], from: usize, to: usize) -> f32 {
    bins.get(from..to.min(bins.len()))
        .and_then(|range| range.iter().max())
        .map_or(0.0, |&peak| peak as f32 / 255.0)
}

/// Derive one meter frame from a frequency read and a time-domain read.
pub fn compute_frame(frequency: &[u8], time_domain: &[u8], volume_scale: f32) -> MeterFrame {
    let waveform: Vec<f32> = time_domain.iter().map(|&b| centered(b)).collect();

    let volume = if waveform.is_empty() {
        0.0
    } else {
        let mean_sq = waveform.iter().map(|s| s * s).sum::<f32>() / waveform.len() as f32;
        (mean_sq.sqrt() * volume_scale).clamp(0.0, 1.0)
    };

    let n = frequency.len();
    let low = n / 10;
    let high = n / 2;
    let bands = Bands {
        bass: band_peak(frequency, 0, low),
        mid: band_peak(frequency, low, high),
        treble: band_peak(frequency, high, n),
    };

    MeterFrame { volume, waveform, bands }
}

/// Pull both reads from `analyser` and compute a frame.
pub fn read_frame(analyser: &impl Analyser, volume_scale: f32) -> MeterFrame {
    let n = analyser.bin_count();
    let mut frequency = vec![0u8; n];
    let mut time_domain = vec![0u8; n];
    analyser.frequency_bytes(&mut frequency);
    analyser.time_domain_bytes(&mut time_domain);
    compute_frame(&frequency, &time_domain, volume_scale)
}

/// Whether the meters should draw anything this tick.
pub fn should_render(paused: bool, volume: f32, noise_floor: f32) -> bool {
    !paused && volume >= noise_floor
}

/// Recent waveform frames, faded by age.
#[derive(Debug)]
pub struct WaveformTrail {
    window_ms: f64,
    frames: VecDeque<(f64, Vec<f32>)>,
}

/// Oldest frames never fade below this.
const MIN_TRAIL_OPACITY: f64 = 0.1;

impl WaveformTrail {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            frames: VecDeque::new(),
        }
    }

    pub fn push(&mut self, now_ms: f64, waveform: Vec<f32>) {
        self.frames.push_back((now_ms, waveform));
        self.prune(now_ms);
    }

    fn prune(&mut self, now_ms: f64) {
        while let Some((t, _)) = self.frames.front() {
            if now_ms - t < self.window_ms {
                break;
            }
            self.frames.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Oldest first, so newer traces are drawn on top.
    pub fn iter_faded(&self, now_ms: f64) -> impl Iterator<Item = (f64, &[f32])> + '_ {
        let window = self.window_ms;
        self.frames.iter().map(move |(t, data)| {
            let opacity = (1.0 - (now_ms - t) / window).max(MIN_TRAIL_OPACITY);
            (opacity, data.as_slice())
        })
    }
}

impl Default for WaveformTrail {
    fn default() -> Self {
        Self::new(AnalysisConfig::default().trail_ms)
    }
}

/// Stable identity of one media element for the page's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// Elements already routed into the analysis graph. A media element can be
/// wrapped in a source node only once, so this is keyed by element, not by URL.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connected: HashSet<ElementId>,
}

impl ConnectionRegistry {
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.connected.contains(&id)
    }

    /// Record a successful connection. False if it was already recorded.
    pub fn mark_connected(&mut self, id: ElementId) -> bool {
        self.connected.insert(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAnalyser {
        freq: Vec<u8>,
        time: Vec<u8>,
    }

    impl Analyser for FixedAnalyser {
        fn bin_count(&self) -> usize {
            self.freq.len()
        }
        fn frequency_bytes(&self, out: &mut [u8]) {
            out.copy_from_slice(&self.freq);
        }
        fn time_domain_bytes(&self, out: &mut [u8]) {
            out.copy_from_slice(&self.time);
        }
    }

    #[test]
    fn test_silence() {
        let frame = compute_frame(&[0; 128], &[128; 128], 2.0);
        assert_eq!(frame.volume, 0.0);
        assert!(frame.waveform.iter().all(|&s| s == 0.0));
        assert_eq!(frame.bands, Bands::default());
        assert!(!should_render(false, frame.volume, 0.001));
    }

    #[test]
    fn test_volume_scaling_and_clamp() {
        // Square wave at +-0.25: RMS 0.25.
        let time: Vec<u8> = (0..128).map(|i| if i % 2 == 0 { 160 } else { 96 }).collect();
        let frame = compute_frame(&[0; 128], &time, 2.0);
        assert!((frame.volume - 0.5).abs() < 1e-6, "volume {}", frame.volume);

        let frame = compute_frame(&[0; 128], &time, 1.2);
        assert!((frame.volume - 0.3).abs() < 1e-6, "volume {}", frame.volume);

        // Full-scale square: RMS ~1, doubled, clamped.
        let loud: Vec<u8> = (0..128).map(|i| if i % 2 == 0 { 255 } else { 0 }).collect();
        assert_eq!(compute_frame(&[0; 128], &loud, 2.0).volume, 1.0);
    }

    #[test]
    fn test_band_ranges() {
        let mut freq = vec![0u8; 128];
        freq[5] = 255; // bass: bins 0..12
        freq[12] = 51; // mid: bins 12..64
        freq[100] = 102; // treble: bins 64..
        let frame = compute_frame(&freq, &[128; 128], 2.0);
        assert_eq!(frame.bands.bass, 1.0);
        assert!((frame.bands.mid - 0.2).abs() < 1e-6);
        assert!((frame.bands.treble - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_empty_reads() {
        let frame = compute_frame(&[], &[], 2.0);
        assert_eq!(frame, MeterFrame::default());
    }

    #[test]
    fn test_read_frame_uses_analyser() {
        let analyser = FixedAnalyser {
            freq: vec![10; 4],
            time: vec![128, 192, 128, 64],
        };
        let frame = read_frame(&analyser, 1.0);
        assert_eq!(frame.waveform, vec![0.0, 0.5, 0.0, -0.5]);
        assert_eq!(frame.bands.treble, 10.0 / 255.0);
    }

    #[test]
    fn test_render_gate() {
        assert!(should_render(false, 0.2, 0.001));
        assert!(!should_render(true, 0.2, 0.001), "paused element draws nothing");
        assert!(!should_render(false, 0.0005, 0.001));
    }

    #[test]
    fn test_trail_fades_and_expires() {
        let mut trail = WaveformTrail::new(2000.0);
        trail.push(0.0, vec![0.1]);
        trail.push(1000.0, vec![0.2]);
        trail.push(1900.0, vec![0.3]);

        let faded: Vec<f64> = trail.iter_faded(1900.0).map(|(o, _)| o).collect();
        assert_eq!(faded.len(), 3);
        assert!((faded[0] - 0.1).abs() < 1e-9, "floor at 0.1, got {}", faded[0]);
        assert!((faded[1] - 0.55).abs() < 1e-9);
        assert_eq!(faded[2], 1.0);

        trail.push(2000.0, vec![0.4]);
        assert_eq!(trail.len(), 3, "frame at t=0 is 2 s old and dropped");

        trail.clear();
        assert!(trail.is_empty());
    }

    #[test]
    fn test_connection_registry() {
        let mut reg = ConnectionRegistry::default();
        let audio = ElementId(7);
        assert!(!reg.is_connected(audio));
        assert!(reg.mark_connected(audio));
        assert!(!reg.mark_connected(audio), "second connect is a no-op");
        assert!(reg.is_connected(audio));
        assert!(!reg.is_connected(ElementId(8)));
    }
}
