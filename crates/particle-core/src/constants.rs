// Shared shape, signal and blend tuning constants used by the core and the native frontend.

// Particle field
pub const PARTICLE_COUNT: usize = 12_000; // points per shape target
pub const INITIAL_SPREAD: f32 = 10.0; // edge of the cube live positions are seeded in

// Shape geometry
pub const SPHERE_RADIUS: f32 = 4.0;
pub const HEART_FILL: f32 = 0.3; // outline scale at full radial fill
pub const HEART_DEPTH: f32 = 1.0; // half-thickness along z
pub const SATURN_PLANET_SHARE: f64 = 0.6; // fraction of points on the planet
pub const SATURN_PLANET_RADIUS: f32 = 2.5;
pub const SATURN_RING_INNER: f32 = 3.5;
pub const SATURN_RING_WIDTH: f32 = 2.5;
pub const SATURN_RING_HALF_THICKNESS: f32 = 0.1;
pub const SATURN_TILT: f32 = std::f32::consts::FRAC_PI_6; // ring tilt about x
pub const GALAXY_BRANCHES: usize = 3;
pub const GALAXY_RADIUS: f32 = 8.0;
pub const GALAXY_SPIN: f32 = 1.5; // radians of twist per unit radius
pub const GALAXY_SCATTER: f32 = 0.5;
pub const GALAXY_SCATTER_POWER: i32 = 3; // higher keeps scatter closer to the arm
pub const CUBE_EDGE: f32 = 5.0;
pub const BURST_RADIUS: f32 = 6.0;

// Hand landmark reduction
pub const ZOOM_PALM_NEAR: f32 = 0.05; // palm size mapped to zoom 0
pub const ZOOM_PALM_SPAN: f32 = 0.25;
pub const ZOOM_GAIN: f32 = 2.0;
pub const ZOOM_MIN: f32 = 0.5;
pub const ZOOM_MAX: f32 = 3.0;
pub const TENSION_RATIO_MIN: f32 = 0.8; // fingertip/palm ratio of a closed fist
pub const TENSION_RATIO_MAX: f32 = 2.0; // fingertip/palm ratio of an open palm
pub const OPEN_HAND_THRESHOLD: f32 = 0.5;
pub const PALM_SIZE_FLOOR: f32 = 1e-3; // guards the tension ratio denominator

// Audio reduction and beat detection
pub const BEAT_FLOOR: f32 = 0.15; // absolute volume a beat must exceed
pub const BEAT_DECAY: f32 = 0.95; // per-tick cutoff decay
pub const BEAT_RAISE: f32 = 1.15; // cutoff multiplier after a beat

// Analyser defaults (match a browser analyser node)
pub const ANALYSER_FFT_SIZE: usize = 512;
pub const ANALYSER_SMOOTHING: f32 = 0.8;
pub const ANALYSER_MIN_DB: f32 = -100.0;
pub const ANALYSER_MAX_DB: f32 = -30.0;

// Scale resolution
pub const GRAB_SCALE_MIN: f32 = 0.5; // open palm
pub const GRAB_SCALE_SPAN: f32 = 2.0; // added at a closed fist
pub const IDLE_BREATH_AMPLITUDE: f32 = 0.1;
pub const VOLUME_SCALE_GAIN: f32 = 0.2;
pub const BEAT_SCALE_PUNCH: f32 = 1.2;

// Jitter resolution
pub const BASE_JITTER: f32 = 0.05;
pub const FIST_JITTER: f32 = 0.15;
pub const FIST_JITTER_TENSION: f32 = 0.2; // tension below which the fist jitter applies
pub const VOLUME_JITTER_GAIN: f32 = 0.5;

// Rotation resolution
pub const ROTATION_FOLLOW_RATE: f32 = 5.0; // per second, toward hand-driven target
pub const AUTO_ROTATE_SPEED: f32 = 0.1; // radians per second
pub const PITCH_RELAX_RATE: f32 = 1.0; // per second, back to level
pub const BEAT_YAW_IMPULSE: f32 = 0.5; // radians per second for one tick

// Position blend
pub const POSITION_LERP_SPEED: f32 = 3.0; // fraction of remaining distance per second
pub const NOISE_INDEX_FREQ: f32 = 0.1;
pub const NOISE_TIME_FREQ: f32 = 5.0;

// Color blend
pub const COLOR_BLEND: f32 = 0.1; // per tick
pub const BEAT_LIGHTNESS_BOOST: f32 = 0.2;
pub const FIST_COLOR_TENSION: f32 = 0.3;
pub const FIST_SATURATION_BOOST: f32 = 0.2;
pub const FIST_LIGHTNESS_BOOST: f32 = 0.1;
pub const DEFAULT_COLOR_HEX: &str = "#00ffff";

// Producer sessions
pub const PRODUCER_POLL_MS: u64 = 50; // longest a producer blocks before re-checking its stop flag
pub const PRODUCER_OPEN_TIMEOUT_SECS: u64 = 10; // fail fast if a device never answers

// Snapshot upload
pub const SNAPSHOT_MIN_INTERVAL_SECS: f32 = 1.0;
