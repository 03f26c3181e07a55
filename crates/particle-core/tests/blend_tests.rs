// Host-side tests for the per-frame blend engine.

use particle_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f32::consts::PI;

fn hand(tension: f32) -> HandSignal {
    HandSignal {
        is_present: true,
        tension,
        ..HandSignal::default()
    }
}

fn input(hand: HandSignal, audio: AudioSignal, camera_enabled: bool) -> FrameInput {
    FrameInput {
        dt: 1.0 / 60.0,
        elapsed: 0.0,
        hand,
        audio,
        camera_enabled,
    }
}

fn engine(shape: ParticleShape, count: usize) -> BlendEngine {
    let mut rng = StdRng::seed_from_u64(11);
    BlendEngine::new(ParticleField::new(shape, count, &mut rng), Rgb::CYAN)
}

#[test]
fn grab_tension_maps_onto_scale() {
    let quiet = AudioSignal::default();
    assert!((resolve_scale(&input(hand(0.0), quiet, true)) - 2.5).abs() < 1e-6);
    assert!((resolve_scale(&input(hand(1.0), quiet, true)) - 0.5).abs() < 1e-6);
    assert!((resolve_scale(&input(hand(0.5), quiet, true)) - 1.5).abs() < 1e-6);
}

#[test]
fn hand_is_ignored_without_camera_tracking() {
    let quiet = AudioSignal::default();
    assert_eq!(resolve_scale(&input(hand(0.0), quiet, false)), 1.0);
    assert_eq!(resolve_jitter(&input(hand(0.0), quiet, false)), BASE_JITTER);
    // Camera on but nobody in view: idle breathing, which is 1.0 at t = 0
    let absent = HandSignal::default();
    assert!((resolve_scale(&input(absent, quiet, true)) - 1.0).abs() < 1e-6);
}

#[test]
fn beat_overrides_the_volume_scale() {
    let loud = AudioSignal { volume: 0.5, beat: false };
    let hit = AudioSignal { volume: 0.5, beat: true };
    assert!((resolve_scale(&input(hand(0.0), loud, false)) - 1.1).abs() < 1e-6);
    assert!((resolve_scale(&input(hand(0.0), hit, false)) - 1.2).abs() < 1e-6);
    assert!((resolve_scale(&input(hand(0.5), hit, true)) - 1.8).abs() < 1e-5);
}

#[test]
fn fist_and_volume_raise_jitter() {
    let quiet = AudioSignal::default();
    assert_eq!(resolve_jitter(&input(hand(0.1), quiet, true)), FIST_JITTER);
    assert_eq!(resolve_jitter(&input(hand(0.2), quiet, true)), BASE_JITTER);
    let full = AudioSignal { volume: 1.0, beat: false };
    assert!((resolve_jitter(&input(hand(0.9), full, true)) - 0.55).abs() < 1e-6);
}

#[test]
fn idle_breathing_stays_in_band_for_a_second() {
    let mut eng = engine(ParticleShape::Sphere, 300);
    let dt = 1.0 / 60.0;
    for frame in 0..60 {
        let state = eng.tick(&FrameInput {
            dt,
            elapsed: frame as f32 * dt,
            hand: HandSignal::default(),
            audio: AudioSignal::default(),
            camera_enabled: true,
        });
        assert!((0.9..=1.1).contains(&state.target_scale), "{}", state.target_scale);
        assert_eq!(state.jitter_amplitude, BASE_JITTER);
    }
}

#[test]
fn huge_dt_lands_on_target_plus_noise() {
    let mut eng = engine(ParticleShape::Cube, 200);
    let frame = FrameInput {
        dt: 10.0,
        elapsed: 2.0,
        ..FrameInput::default()
    };
    let state = eng.tick(&frame);
    assert_eq!(state.target_scale, 1.0);
    let target = eng.field().target().as_slice().to_vec();
    for (i3, (live, tgt)) in eng.positions().iter().zip(target.iter()).enumerate() {
        // All three axes of a particle share the noise of its first coordinate
        let base = i3 - i3 % 3;
        let aim = tgt + particle_noise(base, frame.elapsed, state.jitter_amplitude);
        assert!((live - aim).abs() < 1e-3, "coordinate {i3}: {live} vs {aim}");
    }
}

#[test]
fn positions_converge_monotonically_without_overshoot() {
    let target: Vec<f32> = (0..30).map(|i| i as f32 - 15.0).collect();
    let mut live = vec![0.0f32; 30];
    let mut previous: Vec<f32> = target.iter().map(|t| t.abs()).collect();
    for _ in 0..200 {
        blend_positions(&mut live, &target, 1.0, 0.0, 0.0, 1.0 / 60.0);
        for (i, (l, t)) in live.iter().zip(target.iter()).enumerate() {
            let gap = t - l;
            assert!(gap.abs() <= previous[i] + 1e-6);
            assert!(gap * t >= 0.0, "overshoot at {i}");
            previous[i] = gap.abs();
        }
    }
    assert!(previous.iter().all(|g| *g < 0.1));
}

#[test]
fn rotation_follows_the_hand() {
    let mut r = Rotation::default();
    let tracked = FrameInput {
        dt: 1.0 / 60.0,
        hand: HandSignal {
            is_present: true,
            x: 1.0,
            y: 0.5,
            ..HandSignal::default()
        },
        camera_enabled: true,
        ..FrameInput::default()
    };
    r = step_rotation(r, &tracked);
    let k = smoothing_factor(ROTATION_FOLLOW_RATE, 1.0 / 60.0);
    assert!((r.yaw - PI * k).abs() < 1e-5);
    for _ in 0..600 {
        r = step_rotation(r, &tracked);
    }
    assert!((r.yaw - PI).abs() < 1e-3);
    assert!(r.pitch.abs() < 1e-6);
}

#[test]
fn untracked_rotation_drifts_and_levels_out() {
    let mut r = Rotation { pitch: 1.0, yaw: 0.0 };
    let idle = FrameInput {
        dt: 0.5,
        ..FrameInput::default()
    };
    r = step_rotation(r, &idle);
    assert!((r.yaw - 0.05).abs() < 1e-6);
    assert!(r.pitch < 1.0 && r.pitch > 0.0);
    for _ in 0..100_000 {
        r = step_rotation(r, &idle);
    }
    assert!((-PI..PI).contains(&r.yaw));
    assert!(r.pitch.abs() < 1e-3);
}

#[test]
fn beat_adds_a_yaw_impulse() {
    let idle = FrameInput {
        dt: 0.1,
        ..FrameInput::default()
    };
    let beating = FrameInput {
        audio: AudioSignal { volume: 0.5, beat: true },
        ..idle
    };
    let plain = step_rotation(Rotation::default(), &idle);
    let kicked = step_rotation(Rotation::default(), &beating);
    assert!((kicked.yaw - plain.yaw - 0.1 * BEAT_YAW_IMPULSE).abs() < 1e-6);
}

#[test]
fn beat_and_fist_brighten_the_color_target() {
    let (_, _, l) = Rgb::CYAN.to_hsl();
    let beat = FrameInput {
        audio: AudioSignal { volume: 0.4, beat: true },
        ..FrameInput::default()
    };
    let (_, _, lb) = color_target(Rgb::CYAN, &beat).to_hsl();
    assert!((lb - (l + BEAT_LIGHTNESS_BOOST)).abs() < 1e-5);

    let fist = input(hand(0.1), AudioSignal::default(), true);
    let (_, _, lf) = color_target(Rgb::CYAN, &fist).to_hsl();
    assert!((lf - (l + FIST_LIGHTNESS_BOOST)).abs() < 1e-5);

    assert_eq!(color_target(Rgb::CYAN, &FrameInput::default()), Rgb::CYAN);
}

#[test]
fn material_color_eases_toward_a_new_base() {
    let mut eng = engine(ParticleShape::Sphere, 10);
    eng.set_base_color(Rgb::BLACK);
    let state = eng.tick(&FrameInput::default());
    assert!((state.color.g - 0.9).abs() < 1e-6);
    for _ in 0..200 {
        eng.tick(&FrameInput::default());
    }
    assert!(eng.color().g < 1e-3);
}

#[test]
fn shape_change_keeps_live_positions() {
    let mut eng = engine(ParticleShape::Sphere, 500);
    let before = eng.positions().to_vec();
    let mut rng = StdRng::seed_from_u64(99);
    eng.set_shape(ParticleShape::Heart, &mut rng);
    assert_eq!(eng.field().shape(), ParticleShape::Heart);
    assert_eq!(eng.positions(), &before[..]);
    assert_eq!(eng.field().target().as_slice().len(), before.len());
}

#[test]
fn non_finite_inputs_never_reach_the_buffer() {
    let mut eng = engine(ParticleShape::Galaxy, 100);
    let broken = FrameInput {
        dt: f32::NAN,
        elapsed: f32::INFINITY,
        hand: HandSignal {
            is_present: true,
            tension: f32::NAN,
            x: f32::NAN,
            y: f32::NEG_INFINITY,
            zoom: f32::NAN,
        },
        audio: AudioSignal { volume: f32::NAN, beat: true },
        camera_enabled: true,
    };
    for _ in 0..10 {
        let state = eng.tick(&broken);
        assert!(state.target_scale.is_finite() && state.jitter_amplitude.is_finite());
    }
    assert!(eng.positions().iter().all(|v| v.is_finite()));
    assert!(eng.rotation().yaw.is_finite() && eng.rotation().pitch.is_finite());
}

#[test]
fn live_buffer_is_seeded_inside_the_spread_cube() {
    let eng = engine(ParticleShape::Sphere, PARTICLE_COUNT);
    assert_eq!(eng.positions().len(), 3 * PARTICLE_COUNT);
    assert!(eng
        .positions()
        .iter()
        .all(|v| v.abs() <= INITIAL_SPREAD / 2.0));
    assert!(eng.last_state().is_none());
}
