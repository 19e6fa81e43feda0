// Copyright 2025 Lars Brubaker
// Spatial index queries compared against brute-force scans.

mod helpers;

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spherical_regions::vector::radec_deg_to_vec;
use spherical_regions::{
    IndexConfig, RegionObject, SphericalCap, SphericalIndex, SphericalRegion, SphericalRegionP, Vec3d,
};

struct Star {
    id: usize,
    position: Vec3d,
    region: SphericalRegionP,
}

impl RegionObject for Star {
    fn region(&self) -> SphericalRegionP {
        Rc::clone(&self.region)
    }
}

/// Uniformly distributed direction.
fn random_direction(rng: &mut StdRng) -> Vec3d {
    let z: f64 = rng.gen_range(-1.0..1.0);
    let phi: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
    let r = (1.0 - z * z).sqrt();
    Vec3d::new(r * phi.cos(), r * phi.sin(), z)
}

fn star_field(rng: &mut StdRng, count: usize) -> Vec<Rc<Star>> {
    (0..count)
        .map(|id| {
            let position = random_direction(rng);
            let region = Rc::new(SphericalRegion::Cap(SphericalCap::new(position, 1.0)));
            Rc::new(Star { id, position, region })
        })
        .collect()
}

fn found_ids(index: &SphericalIndex<Star>, query: &SphericalRegion) -> Vec<usize> {
    let mut ids = Vec::new();
    index.process_intersecting_regions(query, |s| ids.push(s.id));
    ids.sort_unstable();
    ids
}

#[test]
fn cap_queries_match_a_linear_scan() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let stars = star_field(&mut rng, 1000);
    let mut index = SphericalIndex::new(IndexConfig {
        max_objects_per_node: 10,
        max_level: 7,
    });
    for s in &stars {
        index.insert(Rc::clone(s));
    }
    assert_eq!(index.len(), 1000);

    for _ in 0..20 {
        let cap = SphericalCap::from_radius(random_direction(&mut rng), 10f64.to_radians());
        let expected: Vec<usize> = stars.iter().filter(|s| cap.contains(&s.position)).map(|s| s.id).collect();
        assert_eq!(found_ids(&index, &SphericalRegion::Cap(cap)), expected);
    }
}

#[test]
fn polygon_queries_match_a_linear_scan() {
    let mut rng = StdRng::seed_from_u64(42);
    let stars = star_field(&mut rng, 600);
    let mut index = SphericalIndex::default();
    for s in &stars {
        index.insert(Rc::clone(s));
    }
    let queries = [
        helpers::polygon_square(20.0, 10.0, 15.0),
        helpers::convex_square(200.0, -30.0, 12.0),
        helpers::polygon_square(0.0, 0.0, 20.0).get_subtraction(&helpers::polygon_square(0.0, 0.0, 8.0)),
    ];
    for query in &queries {
        let expected: Vec<usize> = stars
            .iter()
            .filter(|s| query.contains_point(&s.position))
            .map(|s| s.id)
            .collect();
        assert_eq!(found_ids(&index, query), expected);
    }
}

#[test]
fn mixed_sizes_are_all_reachable() {
    let mut index = SphericalIndex::default();
    let mut id = 0;
    for radius in [0.1, 1.5, 4.0, 9.0, 45.0, 179.0] {
        let region = Rc::new(SphericalRegion::Cap(SphericalCap::from_radius(
            radec_deg_to_vec(100.0, -20.0),
            f64::to_radians(radius),
        )));
        index.insert(Rc::new(Star {
            id,
            position: radec_deg_to_vec(100.0, -20.0),
            region,
        }));
        id += 1;
    }
    let mut all = 0;
    index.process_all(|_| all += 1);
    assert_eq!(all, 6);

    let near = SphericalRegion::Cap(SphericalCap::from_radius(radec_deg_to_vec(100.0, -20.0), 0.01));
    assert_eq!(found_ids(&index, &near), vec![0, 1, 2, 3, 4, 5]);
    // 30° away only the two largest objects reach.
    let away = SphericalRegion::Cap(SphericalCap::from_radius(radec_deg_to_vec(100.0, 10.0), 0.01));
    assert_eq!(found_ids(&index, &away), vec![4, 5]);
}
