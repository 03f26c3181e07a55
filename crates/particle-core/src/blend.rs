//! Per-frame blend engine driving the live particle buffer toward the shape target.
//!
//! Each tick reads one hand and one audio snapshot, resolves scale, jitter,
//! rotation and color from them, then pulls every live particle toward its
//! scaled target. Smoothing uses `1 - exp(-rate * dt)` so the fraction of
//! remaining distance closed per second does not depend on the refresh rate.

use crate::audio::AudioSignal;
use crate::color::Rgb;
use crate::constants::*;
use crate::hand::HandSignal;
use crate::shape::{generate, ParticleShape, ShapeTarget};
use glam::{EulerRot, Mat4};
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Sensor snapshot and clock for one render tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Seconds since the animation started; drives breathing and shimmer.
    pub elapsed: f32,
    pub hand: HandSignal,
    pub audio: AudioSignal,
    pub camera_enabled: bool,
}

impl FrameInput {
    /// Copy with every field forced into its documented range.
    pub fn sanitized(&self) -> Self {
        let unit = |v: f32, fallback: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { fallback };
        let neutral = HandSignal::default();
        Self {
            dt: if self.dt.is_finite() { self.dt.max(0.0) } else { 0.0 },
            elapsed: if self.elapsed.is_finite() { self.elapsed } else { 0.0 },
            hand: HandSignal {
                is_present: self.hand.is_present,
                tension: unit(self.hand.tension, neutral.tension),
                x: unit(self.hand.x, neutral.x),
                y: unit(self.hand.y, neutral.y),
                zoom: if self.hand.zoom.is_finite() {
                    self.hand.zoom.clamp(ZOOM_MIN, ZOOM_MAX)
                } else {
                    neutral.zoom
                },
            },
            audio: AudioSignal {
                volume: unit(self.audio.volume, 0.0),
                beat: self.audio.beat,
            },
            camera_enabled: self.camera_enabled,
        }
    }

    /// Hand pose is only usable when tracking is on and a hand is in view.
    #[inline]
    pub fn tracking(&self) -> bool {
        self.camera_enabled && self.hand.is_present
    }
}

/// Euler rotation of the whole point cloud (pitch about x, yaw about y).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
}

impl Rotation {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }
}

/// Parameters resolved for one tick; recomputed from scratch every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub target_scale: f32,
    pub jitter_amplitude: f32,
    pub rotation: Rotation,
    pub color: Rgb,
}

/// Fraction of remaining distance closed in `dt` at `rate` per second.
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    (1.0 - (-rate * dt).exp()).clamp(0.0, 1.0)
}

pub fn resolve_scale(input: &FrameInput) -> f32 {
    let mut scale = if input.tracking() {
        // Closing the hand zooms in: fist 2.5x, open palm 0.5x
        GRAB_SCALE_MIN + (1.0 - input.hand.tension) * GRAB_SCALE_SPAN
    } else if input.camera_enabled {
        1.0 + input.elapsed.sin() * IDLE_BREATH_AMPLITUDE
    } else {
        1.0
    };
    if input.audio.beat {
        scale *= BEAT_SCALE_PUNCH;
    } else {
        scale *= 1.0 + input.audio.volume * VOLUME_SCALE_GAIN;
    }
    scale
}

pub fn resolve_jitter(input: &FrameInput) -> f32 {
    let base = if input.tracking() && input.hand.tension < FIST_JITTER_TENSION {
        FIST_JITTER
    } else {
        BASE_JITTER
    };
    base + input.audio.volume * VOLUME_JITTER_GAIN
}

/// Advance the smoothed rotation by one tick.
pub fn step_rotation(current: Rotation, input: &FrameInput) -> Rotation {
    let dt = input.dt;
    let mut next = current;
    if input.tracking() {
        let target_yaw = (input.hand.x - 0.5) * TAU;
        let target_pitch = (input.hand.y - 0.5) * PI;
        let k = smoothing_factor(ROTATION_FOLLOW_RATE, dt);
        next.yaw += (target_yaw - next.yaw) * k;
        next.pitch += (target_pitch - next.pitch) * k;
    } else {
        next.yaw = wrap_angle(next.yaw + dt * AUTO_ROTATE_SPEED);
        next.pitch -= next.pitch * smoothing_factor(PITCH_RELAX_RATE, dt);
    }
    if input.audio.beat {
        next.yaw += dt * BEAT_YAW_IMPULSE;
    }
    next
}

// Keeps auto-rotation bounded so a later hand target is approached the short way.
#[inline]
fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

/// Shimmer offset for the coordinate at flat index `i3`.
#[inline]
pub fn particle_noise(i3: usize, elapsed: f32, jitter: f32) -> f32 {
    (i3 as f32 * NOISE_INDEX_FREQ + elapsed * NOISE_TIME_FREQ).sin() * jitter
}

/// Pull every live coordinate toward `target * scale + noise`.
pub fn blend_positions(
    live: &mut [f32],
    target: &[f32],
    scale: f32,
    jitter: f32,
    elapsed: f32,
    dt: f32,
) {
    let k = smoothing_factor(POSITION_LERP_SPEED, dt);
    for (i3, (cur, tgt)) in live
        .chunks_exact_mut(3)
        .zip(target.chunks_exact(3))
        .enumerate()
        .map(|(p, pair)| (p * 3, pair))
    {
        let noise = particle_noise(i3, elapsed, jitter);
        for axis in 0..3 {
            let aim = tgt[axis] * scale + noise;
            cur[axis] += (aim - cur[axis]) * k;
        }
    }
}

/// Per-tick color target: base color brightened on beats and on a tight fist.
pub fn color_target(base: Rgb, input: &FrameInput) -> Rgb {
    let mut color = base;
    if input.audio.beat {
        color = color.offset_hsl(0.0, 0.0, BEAT_LIGHTNESS_BOOST);
    }
    if input.tracking() && input.hand.tension < FIST_COLOR_TENSION {
        color = color.offset_hsl(0.0, FIST_SATURATION_BOOST, FIST_LIGHTNESS_BOOST);
    }
    color
}

/// Shape target and live buffer; always regenerated together so lengths match.
#[derive(Clone, Debug)]
pub struct ParticleField {
    target: ShapeTarget,
    live: Vec<f32>,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(shape: ParticleShape, count: usize, rng: &mut R) -> Self {
        let target = generate(shape, count, rng);
        let live = scattered_positions(count, rng);
        Self { target, live }
    }

    pub fn shape(&self) -> ParticleShape {
        self.target.shape()
    }

    pub fn target(&self) -> &ShapeTarget {
        &self.target
    }

    pub fn positions(&self) -> &[f32] {
        &self.live
    }

    pub fn point_count(&self) -> usize {
        self.live.len() / 3
    }

    /// Swap in a new target; live particles stay put and flow to the new shape.
    pub fn set_shape<R: Rng + ?Sized>(&mut self, shape: ParticleShape, rng: &mut R) {
        let count = self.point_count();
        self.target = generate(shape, count, rng);
        if self.live.len() != self.target.as_slice().len() {
            self.live = scattered_positions(count, rng);
        }
        log::info!("[shape] switched to {}", shape);
    }

    fn blend(&mut self, scale: f32, jitter: f32, elapsed: f32, dt: f32) {
        blend_positions(
            &mut self.live,
            self.target.as_slice(),
            scale,
            jitter,
            elapsed,
            dt,
        );
    }
}

fn scattered_positions<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f32> {
    (0..count * 3)
        .map(|_| (rng.gen::<f32>() - 0.5) * INITIAL_SPREAD)
        .collect()
}

/// Owner of the live buffer, rotation and material color.
pub struct BlendEngine {
    field: ParticleField,
    base_color: Rgb,
    color: Rgb,
    rotation: Rotation,
    last: Option<AnimationState>,
}

impl BlendEngine {
    pub fn new(field: ParticleField, base_color: Rgb) -> Self {
        Self {
            field,
            base_color,
            color: base_color,
            rotation: Rotation::default(),
            last: None,
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn positions(&self) -> &[f32] {
        self.field.positions()
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn base_color(&self) -> Rgb {
        self.base_color
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// State resolved by the most recent tick.
    pub fn last_state(&self) -> Option<AnimationState> {
        self.last
    }

    pub fn set_base_color(&mut self, color: Rgb) {
        self.base_color = color;
    }

    pub fn set_shape<R: Rng + ?Sized>(&mut self, shape: ParticleShape, rng: &mut R) {
        self.field.set_shape(shape, rng);
    }

    /// Run one frame. The input is read once and applied to every particle.
    pub fn tick(&mut self, input: &FrameInput) -> AnimationState {
        let input = input.sanitized();
        let target_scale = resolve_scale(&input);
        let jitter_amplitude = resolve_jitter(&input);
        self.rotation = step_rotation(self.rotation, &input);
        self.field
            .blend(target_scale, jitter_amplitude, input.elapsed, input.dt);
        let target_color = color_target(self.base_color, &input);
        self.color = self.color.lerp(target_color, COLOR_BLEND);

        let state = AnimationState {
            target_scale,
            jitter_amplitude,
            rotation: self.rotation,
            color: self.color,
        };
        log::trace!(
            "[blend] scale={:.3} jitter={:.3} yaw={:.3} pitch={:.3}",
            state.target_scale,
            state.jitter_amplitude,
            state.rotation.yaw,
            state.rotation.pitch
        );
        self.last = Some(state);
        state
    }
}
