//! Reduction of raw hand landmarks into the pose signal the blend engine reads.
//!
//! Landmarks follow the 21-point hand topology (wrist at 0, thumb tip at 4,
//! middle-finger knuckle at 9, fingertips at 4/8/12/16/20) in camera-normalized
//! coordinates: x and y in `[0, 1]` across the frame, z relative depth.

use crate::constants::*;
use glam::Vec3;

pub const LANDMARK_COUNT: usize = 21;
pub const WRIST: usize = 0;
pub const MIDDLE_MCP: usize = 9;
pub const FINGERTIPS: [usize; 5] = [4, 8, 12, 16, 20];

/// One detected hand's landmark set.
pub type HandLandmarks = [Vec3; LANDMARK_COUNT];

/// Latest hand observation.
///
/// `tension` runs from 0 (closed fist) to 1 (open palm). `x`/`y` are the
/// mirrored screen position of the palm centre. When `is_present` is false the
/// pose fields hold the last observation and must not drive the animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSignal {
    pub is_present: bool,
    pub tension: f32,
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for HandSignal {
    fn default() -> Self {
        Self {
            is_present: false,
            tension: 0.5,
            x: 0.5,
            y: 0.5,
            zoom: 1.0,
        }
    }
}

impl HandSignal {
    /// Open-palm classification for UI affordances.
    pub fn is_open(&self) -> bool {
        self.tension > OPEN_HAND_THRESHOLD
    }
}

/// What a hand producer saw on one inference cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HandObservation {
    /// No new frame was ready before the poll timeout.
    Pending,
    /// The frame was processed and contained no hand.
    Absent,
    Hand(HandLandmarks),
}

/// Stateful reducer: keeps the last pose so absence only flips `is_present`.
#[derive(Clone, Debug, Default)]
pub struct HandReducer {
    signal: HandSignal,
}

impl HandReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) -> HandSignal {
        self.signal
    }

    pub fn observe(&mut self, landmarks: &HandLandmarks) -> HandSignal {
        let previous = self.signal;
        let reduced = reduce_landmarks(landmarks);
        // Degenerate input keeps the last good pose rather than leaking NaN
        self.signal = HandSignal {
            is_present: true,
            tension: finite_or(reduced.tension, previous.tension),
            x: finite_or(reduced.x, previous.x),
            y: finite_or(reduced.y, previous.y),
            zoom: finite_or(reduced.zoom, previous.zoom),
        };
        self.signal
    }

    pub fn observe_absent(&mut self) -> HandSignal {
        self.signal.is_present = false;
        self.signal
    }

    pub fn reset(&mut self) {
        self.signal = HandSignal::default();
    }
}

/// Stateless reduction of one landmark set.
pub fn reduce_landmarks(landmarks: &HandLandmarks) -> HandSignal {
    let wrist = landmarks[WRIST];
    let palm_base = landmarks[MIDDLE_MCP];
    let palm_size = wrist.distance(palm_base);

    let mean_tip_distance = FINGERTIPS
        .iter()
        .map(|&i| landmarks[i].distance(wrist))
        .sum::<f32>()
        / FINGERTIPS.len() as f32;

    HandSignal {
        is_present: true,
        tension: tension_from_ratio(mean_tip_distance / palm_size.max(PALM_SIZE_FLOOR)),
        // The preview is mirrored for the user, so flip x to match
        x: (1.0 - palm_base.x).clamp(0.0, 1.0),
        y: palm_base.y.clamp(0.0, 1.0),
        zoom: zoom_from_palm_size(palm_size),
    }
}

/// Map the fingertip/palm ratio onto tension in `[0, 1]`.
#[inline]
pub fn tension_from_ratio(ratio: f32) -> f32 {
    ((ratio - TENSION_RATIO_MIN) / (TENSION_RATIO_MAX - TENSION_RATIO_MIN)).clamp(0.0, 1.0)
}

/// Map wrist-to-knuckle distance (larger when closer to the camera) onto a zoom multiplier.
#[inline]
pub fn zoom_from_palm_size(palm_size: f32) -> f32 {
    let normalized = (palm_size - ZOOM_PALM_NEAR) / ZOOM_PALM_SPAN;
    (normalized * ZOOM_GAIN).clamp(ZOOM_MIN, ZOOM_MAX)
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
