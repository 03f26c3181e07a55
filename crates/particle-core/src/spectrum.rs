//! PCM to byte-spectrum conversion for microphone producers.
//!
//! Mirrors what a browser analyser node hands back from its byte frequency
//! query, so the audio reducer sees the same scale regardless of where the
//! samples came from: Blackman window, magnitude normalized by the FFT size,
//! exponential smoothing across frames, then decibels mapped onto `0..=255`.

use crate::constants::*;
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// Power of two; the spectrum has half as many bins.
    pub fft_size: usize,
    /// Weight of the previous frame, 0 disables smoothing.
    pub smoothing: f32,
    pub min_db: f32,
    pub max_db: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: ANALYSER_FFT_SIZE,
            smoothing: ANALYSER_SMOOTHING,
            min_db: ANALYSER_MIN_DB,
            max_db: ANALYSER_MAX_DB,
        }
    }
}

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    config: AnalyserConfig,
    window: Vec<f32>,
    samples: VecDeque<f32>,
    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl SpectrumAnalyzer {
    pub fn new(mut config: AnalyserConfig) -> Self {
        config.fft_size = config.fft_size.max(32).next_power_of_two();
        config.smoothing = config.smoothing.clamp(0.0, 1.0);
        let n = config.fft_size;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let window = (0..n)
            .map(|i| {
                let x = i as f32 / n as f32;
                0.42 - 0.5 * (TAU * x).cos() + 0.08 * (2.0 * TAU * x).cos()
            })
            .collect();

        log::debug!(
            "[audio] analyser fft_size={} smoothing={} db=[{}, {}]",
            n,
            config.smoothing,
            config.min_db,
            config.max_db
        );

        Self {
            fft,
            window,
            samples: VecDeque::from(vec![0.0; n]),
            fft_buffer: vec![Complex::new(0.0, 0.0); n],
            scratch,
            smoothed: vec![0.0; n / 2],
            bytes: vec![0; n / 2],
            config,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    /// Append mono samples; only the most recent `fft_size` are kept.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let n = self.config.fft_size;
        let keep = &samples[samples.len().saturating_sub(n)..];
        for &s in keep {
            if self.samples.len() == n {
                self.samples.pop_front();
            }
            self.samples.push_back(if s.is_finite() { s } else { 0.0 });
        }
    }

    /// Transform the current window and return the byte spectrum.
    pub fn analyze(&mut self) -> &[u8] {
        let n = self.config.fft_size;
        for (slot, (sample, w)) in self
            .fft_buffer
            .iter_mut()
            .zip(self.samples.iter().zip(self.window.iter()))
        {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        let tau = self.config.smoothing;
        let db_span = (self.config.max_db - self.config.min_db).max(f32::EPSILON);
        for k in 0..n / 2 {
            let magnitude = self.fft_buffer[k].norm() / n as f32;
            self.smoothed[k] = tau * self.smoothed[k] + (1.0 - tau) * magnitude;
            let db = 20.0 * self.smoothed[k].log10();
            self.bytes[k] = if db.is_finite() {
                (255.0 / db_span * (db - self.config.min_db)).clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
        &self.bytes
    }

    pub fn reset(&mut self) {
        self.samples.iter_mut().for_each(|s| *s = 0.0);
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
        self.bytes.iter_mut().for_each(|b| *b = 0);
    }
}
