//! Procedural target geometry for each selectable shape.
//!
//! Every generator emits exactly `count` points, flattened into `3 * count`
//! floats. Stochastic shapes draw from the random source they are handed, so a
//! seeded `StdRng` reproduces a target exactly while production code passes a
//! freshly seeded one for every shape change.

use crate::constants::*;
use crate::error::ConfigError;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

/// The fixed set of silhouettes the particle field can form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParticleShape {
    #[default]
    Sphere,
    Heart,
    Saturn,
    Galaxy,
    Cube,
    Burst,
}

impl ParticleShape {
    pub const ALL: [ParticleShape; 6] = [
        ParticleShape::Sphere,
        ParticleShape::Heart,
        ParticleShape::Saturn,
        ParticleShape::Galaxy,
        ParticleShape::Cube,
        ParticleShape::Burst,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParticleShape::Sphere => "Sphere",
            ParticleShape::Heart => "Heart",
            ParticleShape::Saturn => "Saturn",
            ParticleShape::Galaxy => "Galaxy",
            ParticleShape::Cube => "Cube",
            ParticleShape::Burst => "Burst",
        }
    }

    /// Cycle to the following shape, wrapping after `Burst`.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Shape bound to a 1-based selector key, as shown in the help text.
    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for ParticleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParticleShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|shape| shape.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownShape(s.to_string()))
    }
}

impl TryFrom<String> for ParticleShape {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParticleShape> for String {
    fn from(shape: ParticleShape) -> Self {
        shape.name().to_string()
    }
}

/// Immutable flattened `x, y, z` triples for one shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeTarget {
    shape: ParticleShape,
    coords: Vec<f32>,
}

impl ShapeTarget {
    pub fn shape(&self) -> ParticleShape {
        self.shape
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.coords
    }

    /// Number of points (a third of the float count).
    pub fn point_count(&self) -> usize {
        self.coords.len() / 3
    }

    pub fn point(&self, index: usize) -> Vec3 {
        let i3 = index * 3;
        Vec3::new(self.coords[i3], self.coords[i3 + 1], self.coords[i3 + 2])
    }
}

/// Build the target geometry for `shape` with `count` points.
pub fn generate<R: Rng + ?Sized>(shape: ParticleShape, count: usize, rng: &mut R) -> ShapeTarget {
    let mut coords = Vec::with_capacity(count * 3);
    for i in 0..count {
        let p = match shape {
            ParticleShape::Sphere => fibonacci_sphere(i, count as f32, SPHERE_RADIUS),
            ParticleShape::Heart => heart_point(rng),
            ParticleShape::Saturn => saturn_point(i, count, rng),
            ParticleShape::Galaxy => galaxy_point(i, rng),
            ParticleShape::Cube => cube_point(rng),
            ParticleShape::Burst => burst_point(rng),
        };
        coords.extend_from_slice(&[p.x, p.y, p.z]);
    }
    log::debug!("[shape] generated {} points for {}", count, shape);
    ShapeTarget { shape, coords }
}

/// Golden-angle spiral point `i` of `n` on a sphere surface; avoids pole clustering.
#[inline]
pub fn fibonacci_sphere(i: usize, n: f32, radius: f32) -> Vec3 {
    let phi = (-1.0 + (2.0 * i as f32) / n).clamp(-1.0, 1.0).acos();
    let theta = (n * PI).sqrt() * phi;
    Vec3::new(
        radius * theta.cos() * phi.sin(),
        radius * theta.sin() * phi.sin(),
        radius * phi.cos(),
    )
}

fn heart_point<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let t = rng.gen::<f32>() * TAU;
    let outline_x = 16.0 * t.sin().powi(3);
    let outline_y =
        13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    // sqrt keeps the fill uniform instead of crowding the centre
    let fill = rng.gen::<f32>().sqrt() * HEART_FILL;
    let z = (rng.gen::<f32>() - 0.5) * 2.0 * HEART_DEPTH;
    Vec3::new(outline_x * fill, outline_y * fill, z)
}

fn saturn_point<R: Rng + ?Sized>(i: usize, count: usize, rng: &mut R) -> Vec3 {
    let planet = saturn_planet_count(count);
    if i < planet {
        return fibonacci_sphere(i, planet as f32, SATURN_PLANET_RADIUS);
    }
    let angle = rng.gen::<f32>() * TAU;
    let dist = SATURN_RING_INNER + rng.gen::<f32>() * SATURN_RING_WIDTH;
    let x = angle.cos() * dist;
    let z = angle.sin() * dist;
    let y = (rng.gen::<f32>() - 0.5) * 2.0 * SATURN_RING_HALF_THICKNESS;
    let (sin_t, cos_t) = SATURN_TILT.sin_cos();
    Vec3::new(x, y * cos_t - z * sin_t, y * sin_t + z * cos_t)
}

/// Points assigned to the planet body of the Saturn shape.
#[inline]
pub fn saturn_planet_count(count: usize) -> usize {
    ((count as f64 * SATURN_PLANET_SHARE).ceil() as usize).min(count)
}

fn galaxy_point<R: Rng + ?Sized>(i: usize, rng: &mut R) -> Vec3 {
    let radius = rng.gen::<f32>() * GALAXY_RADIUS;
    let spin = radius * GALAXY_SPIN;
    let branch = ((i % GALAXY_BRANCHES) as f32 / GALAXY_BRANCHES as f32) * TAU;
    let scatter_x = galaxy_scatter(rng);
    let scatter_y = galaxy_scatter(rng);
    let scatter_z = galaxy_scatter(rng);
    Vec3::new(
        (branch + spin).cos() * radius + scatter_x,
        scatter_y,
        (branch + spin).sin() * radius + scatter_z,
    )
}

#[inline]
fn galaxy_scatter<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let magnitude = rng.gen::<f32>().powi(GALAXY_SCATTER_POWER);
    let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
    magnitude * sign * GALAXY_SCATTER
}

fn cube_point<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * CUBE_EDGE,
        (rng.gen::<f32>() - 0.5) * CUBE_EDGE,
        (rng.gen::<f32>() - 0.5) * CUBE_EDGE,
    )
}

fn burst_point<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    // cube root gives a uniform density through the volume
    let r = rng.gen::<f32>().cbrt() * BURST_RADIUS;
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}
