use std::collections::HashSet;

use nalgebra as na;
use rand::{rngs::StdRng, Rng, SeedableRng as _};

use quickhull::ConvexHull;

fn points_in_sphere(seed: u64, count: usize) -> Vec<na::Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(count + 6);
    while points.len() < count {
        let p = na::Point3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.coords.norm_squared() < 1.0 {
            points.push(p);
        }
    }
    for axis in 0..3 {
        let mut p = na::Point3::origin();
        p[axis] = 1.0;
        points.push(p);
        p[axis] = -1.0;
        points.push(p);
    }
    points
}

/// Random points on the six faces of a box of half-width 1000 centered at
/// `offset` along the diagonal.
fn points_on_box(seed: u64, count: usize, offset: f64) -> Vec<na::Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut p = na::Point3::new(
                rng.gen_range(-1e3..1e3),
                rng.gen_range(-1e3..1e3),
                rng.gen_range(-1e3..1e3),
            );
            let axis = rng.gen_range(0..3);
            p[axis] = if rng.gen_bool(0.5) { 1e3 } else { -1e3 };
            p + na::Vector3::repeat(offset)
        })
        .collect()
}

#[test]
fn random_sphere_cloud() {
    let points = points_in_sphere(1234567892, 1000);
    assert_eq!(points.len(), 1006);

    let hull = ConvexHull::from_points(&points).unwrap();
    hull.check().unwrap();

    let indices: HashSet<_> = hull.vertex_point_indices().iter().copied().collect();
    assert_eq!(indices.len(), hull.vertex_count());
    assert!(indices.iter().all(|&i| i < points.len()));
    for i in 1000..1006 {
        assert!(indices.contains(&i), "axis extreme {} missing", i);
    }
    for (vertex, &i) in hull.vertices().iter().zip(hull.vertex_point_indices()) {
        assert_eq!(*vertex, points[i]);
    }

    let edges: usize = hull.faces().iter().map(|f| f.len()).sum::<usize>() / 2;
    assert_eq!(hull.vertex_count() as i64 - edges as i64 + hull.face_count() as i64, 2);
}

#[test]
fn triangulated_random_cloud_stays_closed() {
    let points = points_in_sphere(42, 500);
    let mut hull = ConvexHull::from_points(&points).unwrap();
    let vertex_count = hull.vertex_count();

    hull.triangulate();

    assert_eq!(hull.vertex_count(), vertex_count);
    assert!(hull.faces().iter().all(|f| f.len() == 3));
    let edges = hull.faces().len() * 3 / 2;
    assert_eq!(hull.vertex_count() as i64 - edges as i64 + hull.face_count() as i64, 2);
}

#[test]
fn rebuilding_gives_the_same_hull() {
    let points = points_in_sphere(7, 300);
    let mut hull = ConvexHull::new();

    hull.build(&points).unwrap();
    let faces = hull.faces();
    let vertices = hull.vertex_point_indices().to_vec();

    hull.build(&points_in_sphere(8, 50)).unwrap();
    hull.build(&points).unwrap();

    assert_eq!(hull.faces(), faces);
    assert_eq!(hull.vertex_point_indices(), &vertices[..]);
    hull.check().unwrap();
}

#[test]
fn points_on_a_sphere_are_all_hull_vertices() {
    let n = 200;
    let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    let points: Vec<_> = (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f64;
            na::Point3::new(r * theta.cos(), y, r * theta.sin())
        })
        .collect();

    let hull = ConvexHull::from_points(&points).unwrap();

    assert_eq!(hull.vertex_count(), n);
    hull.check().unwrap();
}

#[test]
fn points_on_box_faces() {
    for offset in [0.0, 5e4] {
        for seed in 0..500 {
            let points = points_on_box(seed, 300, offset);
            let hull = ConvexHull::from_points(&points).unwrap();

            if let Err(err) = hull.check() {
                panic!("seed {} offset {}: {}", seed, offset, err);
            }
            let edges: usize = hull.faces().iter().map(|f| f.len()).sum::<usize>() / 2;
            assert_eq!(
                hull.vertex_count() as i64 - edges as i64 + hull.face_count() as i64,
                2,
                "seed {} offset {}",
                seed,
                offset
            );
            assert!(hull.faces().iter().all(|f| f.len() >= 3));
        }
    }
}
