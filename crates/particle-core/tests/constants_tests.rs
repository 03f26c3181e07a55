// Host-side tests for constants and their relationships.

use particle_core::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn constants_are_within_reasonable_bounds() {
    // Rates and gains should be positive
    assert!(POSITION_LERP_SPEED > 0.0);
    assert!(ROTATION_FOLLOW_RATE > 0.0);
    assert!(PITCH_RELAX_RATE > 0.0);
    assert!(AUTO_ROTATE_SPEED > 0.0);

    // Beat detector must decay toward the floor and jump above a trigger
    assert!(BEAT_DECAY > 0.0 && BEAT_DECAY < 1.0);
    assert!(BEAT_RAISE > 1.0);
    assert!(BEAT_FLOOR > 0.0 && BEAT_FLOOR < 1.0);

    assert!(TENSION_RATIO_MIN < TENSION_RATIO_MAX);
    assert!(ZOOM_MIN < 1.0 && 1.0 < ZOOM_MAX);
    assert!(OPEN_HAND_THRESHOLD > 0.0 && OPEN_HAND_THRESHOLD < 1.0);
    assert!(COLOR_BLEND > 0.0 && COLOR_BLEND <= 1.0);
    assert!(ANALYSER_MIN_DB < ANALYSER_MAX_DB);
    assert!(ANALYSER_FFT_SIZE.is_power_of_two());
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn grab_scale_spans_open_palm_to_fist() {
    assert_eq!(GRAB_SCALE_MIN, 0.5);
    assert_eq!(GRAB_SCALE_MIN + GRAB_SCALE_SPAN, 2.5);
    // Idle breathing stays inside the band the hand can reach
    assert!(1.0 - IDLE_BREATH_AMPLITUDE > GRAB_SCALE_MIN);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn fist_thresholds_are_ordered() {
    // The jitter fist is tighter than the color fist
    assert!(FIST_JITTER_TENSION < FIST_COLOR_TENSION);
    assert!(FIST_COLOR_TENSION < OPEN_HAND_THRESHOLD);
    assert!(FIST_JITTER > BASE_JITTER);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn saturn_ring_clears_the_planet() {
    assert!(SATURN_RING_INNER > SATURN_PLANET_RADIUS);
    assert!(SATURN_PLANET_SHARE > 0.0 && SATURN_PLANET_SHARE < 1.0);
}
