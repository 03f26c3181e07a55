//! Reduction of a byte magnitude spectrum into volume and beat onsets.

use crate::constants::*;

/// Latest audio observation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioSignal {
    /// Bass-weighted loudness in `[0, 1]`.
    pub volume: f32,
    /// True on the tick a beat onset was detected.
    pub beat: bool,
}

/// Mean of the lower half of the spectrum, normalized to `[0, 1]`.
///
/// The lower bins carry most of the rhythmic energy, so the upper half is
/// ignored. An empty or single-bin spectrum reads as silence.
pub fn bass_volume(spectrum: &[u8]) -> f32 {
    let bass = &spectrum[..spectrum.len() / 2];
    if bass.is_empty() {
        return 0.0;
    }
    let sum: u32 = bass.iter().map(|&v| v as u32).sum();
    (sum as f32 / bass.len() as f32 / 255.0).clamp(0.0, 1.0)
}

/// Adaptive-threshold onset detector.
///
/// A beat fires when volume exceeds both the running cutoff and the absolute
/// floor; the cutoff then jumps above the triggering volume so a sustained
/// loud passage does not re-trigger, and decays geometrically otherwise
/// without dropping below the floor.
#[derive(Clone, Debug)]
pub struct BeatDetector {
    cutoff: f32,
    floor: f32,
    decay: f32,
    raise: f32,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(BEAT_FLOOR, BEAT_DECAY, BEAT_RAISE)
    }
}

impl BeatDetector {
    pub fn new(floor: f32, decay: f32, raise: f32) -> Self {
        Self {
            cutoff: floor,
            floor,
            decay,
            raise,
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    pub fn step(&mut self, volume: f32) -> bool {
        if volume > self.cutoff && volume > self.floor {
            self.cutoff = volume * self.raise;
            true
        } else {
            self.cutoff = (self.cutoff * self.decay).max(self.floor);
            false
        }
    }

    pub fn reset(&mut self) {
        self.cutoff = self.floor;
    }
}

/// Turns each refreshed spectrum into an [`AudioSignal`].
#[derive(Clone, Debug, Default)]
pub struct AudioReducer {
    beat: BeatDetector,
    signal: AudioSignal,
}

impl AudioReducer {
    pub fn new(beat: BeatDetector) -> Self {
        Self {
            beat,
            signal: AudioSignal::default(),
        }
    }

    pub fn signal(&self) -> AudioSignal {
        self.signal
    }

    pub fn observe(&mut self, spectrum: &[u8]) -> AudioSignal {
        self.observe_volume(bass_volume(spectrum))
    }

    pub fn observe_volume(&mut self, volume: f32) -> AudioSignal {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let beat = self.beat.step(volume);
        self.signal = AudioSignal { volume, beat };
        self.signal
    }

    /// Immediate return to silence; the threshold re-arms from the floor.
    pub fn reset(&mut self) {
        self.beat.reset();
        self.signal = AudioSignal::default();
    }
}
