// Host-side tests for the procedural shape generators.

use particle_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn points(target: &ShapeTarget) -> Vec<glam::Vec3> {
    (0..target.point_count()).map(|i| target.point(i)).collect()
}

#[test]
fn every_shape_emits_exactly_three_floats_per_particle_and_all_finite() {
    let mut rng = StdRng::seed_from_u64(7);
    for shape in ParticleShape::ALL {
        let target = generate(shape, PARTICLE_COUNT, &mut rng);
        assert_eq!(target.as_slice().len(), 3 * PARTICLE_COUNT, "{shape}");
        assert_eq!(target.point_count(), PARTICLE_COUNT);
        assert_eq!(target.shape(), shape);
        assert!(
            target.as_slice().iter().all(|v| v.is_finite()),
            "{shape} produced a non-finite coordinate"
        );
    }
}

#[test]
fn sphere_points_lie_on_the_surface() {
    let mut rng = StdRng::seed_from_u64(1);
    let target = generate(ParticleShape::Sphere, PARTICLE_COUNT, &mut rng);
    for (i, p) in points(&target).iter().enumerate() {
        let r = p.length();
        assert!(
            (r - SPHERE_RADIUS).abs() < 1e-3,
            "point {i} at radius {r}, expected {SPHERE_RADIUS}"
        );
    }
}

#[test]
fn sphere_does_not_cluster_at_the_poles() {
    let mut rng = StdRng::seed_from_u64(1);
    let target = generate(ParticleShape::Sphere, PARTICLE_COUNT, &mut rng);
    // Two polar caps of height 0.1r cover 10% of a sphere's area
    let polar = points(&target)
        .iter()
        .filter(|p| p.z.abs() > 0.9 * SPHERE_RADIUS)
        .count();
    let share = polar as f32 / PARTICLE_COUNT as f32;
    assert!((0.08..0.12).contains(&share), "polar share {share}");
}

#[test]
fn sphere_is_identical_regardless_of_random_source() {
    let a = generate(ParticleShape::Sphere, 500, &mut StdRng::seed_from_u64(1));
    let b = generate(ParticleShape::Sphere, 500, &mut StdRng::seed_from_u64(2));
    assert_eq!(a, b);
}

#[test]
fn burst_points_stay_inside_the_bounding_radius() {
    let mut rng = StdRng::seed_from_u64(3);
    let target = generate(ParticleShape::Burst, PARTICLE_COUNT, &mut rng);
    for p in points(&target) {
        assert!(p.length() <= BURST_RADIUS + 1e-4, "{p:?}");
    }
}

#[test]
fn cube_points_stay_inside_the_extent() {
    let mut rng = StdRng::seed_from_u64(4);
    let target = generate(ParticleShape::Cube, PARTICLE_COUNT, &mut rng);
    let half = CUBE_EDGE / 2.0;
    assert!(target.as_slice().iter().all(|v| v.abs() <= half));
}

#[test]
fn saturn_splits_into_planet_and_ring() {
    let mut rng = StdRng::seed_from_u64(5);
    let target = generate(ParticleShape::Saturn, PARTICLE_COUNT, &mut rng);
    let planet = saturn_planet_count(PARTICLE_COUNT);
    assert_eq!(planet, 7200);
    let pts = points(&target);
    for p in &pts[..planet] {
        assert!((p.length() - SATURN_PLANET_RADIUS).abs() < 1e-3);
    }
    let ring_max = (SATURN_RING_INNER + SATURN_RING_WIDTH).hypot(SATURN_RING_HALF_THICKNESS);
    for p in &pts[planet..] {
        let r = p.length();
        assert!(r >= SATURN_RING_INNER - 1e-4 && r <= ring_max + 1e-4, "ring radius {r}");
    }
}

#[test]
fn galaxy_is_a_flat_disc_of_bounded_radius() {
    let mut rng = StdRng::seed_from_u64(6);
    let target = generate(ParticleShape::Galaxy, PARTICLE_COUNT, &mut rng);
    for p in points(&target) {
        assert!(p.y.abs() <= GALAXY_SCATTER + 1e-6);
        let planar = p.x.hypot(p.z);
        assert!(planar <= GALAXY_RADIUS + GALAXY_SCATTER * 2f32.sqrt() + 1e-4);
    }
}

#[test]
fn heart_has_bounded_thickness() {
    let mut rng = StdRng::seed_from_u64(8);
    let target = generate(ParticleShape::Heart, PARTICLE_COUNT, &mut rng);
    for p in points(&target) {
        assert!(p.z.abs() <= HEART_DEPTH);
        assert!(p.x.abs() <= 16.0 * HEART_FILL + 1e-4);
    }
}

#[test]
fn seeded_generation_is_reproducible_and_reseeding_changes_it() {
    let a = generate(ParticleShape::Galaxy, 1000, &mut StdRng::seed_from_u64(42));
    let b = generate(ParticleShape::Galaxy, 1000, &mut StdRng::seed_from_u64(42));
    let c = generate(ParticleShape::Galaxy, 1000, &mut StdRng::seed_from_u64(43));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn shape_names_parse_case_insensitively() {
    assert_eq!("heart".parse::<ParticleShape>().unwrap(), ParticleShape::Heart);
    assert_eq!(" SATURN ".parse::<ParticleShape>().unwrap(), ParticleShape::Saturn);
    for shape in ParticleShape::ALL {
        assert_eq!(shape.to_string().parse::<ParticleShape>().unwrap(), shape);
    }
}

#[test]
fn unknown_shape_is_rejected_at_the_boundary() {
    let err = "Donut".parse::<ParticleShape>().unwrap_err();
    assert!(matches!(err, ConfigError::UnknownShape(ref s) if s == "Donut"));
}

#[test]
fn shape_cycling_and_key_selection() {
    assert_eq!(ParticleShape::Sphere.next(), ParticleShape::Heart);
    assert_eq!(ParticleShape::Burst.next(), ParticleShape::Sphere);
    assert_eq!(ParticleShape::from_index(1), Some(ParticleShape::Sphere));
    assert_eq!(ParticleShape::from_index(6), Some(ParticleShape::Burst));
    assert_eq!(ParticleShape::from_index(0), None);
    assert_eq!(ParticleShape::from_index(7), None);
}
