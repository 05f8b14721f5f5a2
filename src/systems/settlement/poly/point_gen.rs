// handles point generation logic

use bevy::prelude::*;
use rand::Rng;

use crate::systems::settlement::{Polygon, RoadCrossing};

/// Lays a jittered grid over `bounds`, one point per cell in row-major order.
/// Every cell draws its jitter even if the caller later rejects the point,
/// so the stream consumed depends only on the bounds.
pub fn jittered_grid<R: Rng>(bounds: Rect, spacing: f32, jitter: f32, rng: &mut R) -> Vec<Vec2> {
    if spacing <= 0.0 || bounds.width() < 0.0 || bounds.height() < 0.0 {
        return Vec::new();
    }

    let cols = (bounds.width() / spacing).floor() as usize + 1;
    let rows = (bounds.height() / spacing).floor() as usize + 1;
    let jitter = jitter.max(0.0);
    let mut points = Vec::with_capacity(cols * rows);

    for row in 0..rows {
        for col in 0..cols {
            let base = Vec2::new(
                bounds.min.x + spacing * (col as f32 + 0.5),
                bounds.min.y + spacing * (row as f32 + 0.5),
            );
            let offset = Vec2::new(
                rng.random_range(-jitter..=jitter),
                rng.random_range(-jitter..=jitter),
            );
            points.push(base + offset);
        }
    }

    points
}

// generate a random polygon boundary with vertices arranged in a circle
// represents settlement boundary size
pub fn generate_boundary_polygon<R: Rng>(num_vertices: usize, base_radius: f32, center: Vec2, rng: &mut R) -> Polygon {
    let mut vertices = Vec::with_capacity(num_vertices);

    for i in 0..num_vertices {
        let angle = (i as f32 / num_vertices as f32) * std::f32::consts::TAU;
        let distance_variation = rng.random_range(-0.2..=0.2);
        let radius = base_radius * (1.0 + distance_variation);

        vertices.push(center + Vec2::from_angle(angle) * radius);
    }

    vertices
}

// fake external roads for the demo host and tests
// each crossing links a tile just inside the boundary with one just outside
pub fn generate_road_crossings<R: Rng>(boundary: &[Vec2], count: usize, tile_size: f32, rng: &mut R) -> Vec<RoadCrossing> {
    if boundary.len() < 3 || count == 0 {
        return Vec::new();
    }

    let center = super::utils::polygon_centroid(boundary);
    let sector = std::f32::consts::TAU / count as f32;

    (0..count)
        .filter_map(|i| {
            let angle = sector * (i as f32 + rng.random_range(0.2..=0.8));
            let dir = Vec2::from_angle(angle);

            // walk outward until we leave the settlement
            let far = center + dir * 10_000.0;
            let hit = (0..boundary.len())
                .filter_map(|j| {
                    super::utils::line_segment_intersection(center, far, boundary[j], boundary[(j + 1) % boundary.len()])
                })
                .min_by(|a, b| a.distance_squared(center).total_cmp(&b.distance_squared(center)))?;

            Some(RoadCrossing {
                tile_center: hit - dir * tile_size * 0.5,
                neighbor_center: hit + dir * tile_size * 0.5,
            })
        })
        .collect()
}
