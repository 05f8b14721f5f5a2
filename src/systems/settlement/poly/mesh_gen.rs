use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use super::utils::vertex_average;

fn empty_mesh() -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

// extrude a convex footprint (x, y on the ground plane) into a closed box-like mesh
// the cap fans out from the vertex average, fine for the rectangles we place
pub fn extrude_footprint(footprint: &[Vec2], height: f32) -> Mesh {
    if footprint.len() < 3 || height <= 0.0 {
        return empty_mesh();
    }

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    // walls
    for i in 0..footprint.len() {
        let v1 = footprint[i];
        let v2 = footprint[(i + 1) % footprint.len()];
        let edge = v2 - v1;
        let normal = Vec2::new(edge.y, -edge.x).normalize_or_zero();
        let base_idx = positions.len() as u32;

        positions.extend([
            [v1.x, 0.0, v1.y],
            [v2.x, 0.0, v2.y],
            [v1.x, height, v1.y],
            [v2.x, height, v2.y],
        ]);
        normals.extend([[normal.x, 0.0, normal.y]; 4]);

        let length = edge.length();
        uvs.extend([[0.0, 0.0], [length, 0.0], [0.0, height], [length, height]]);

        indices.extend([base_idx, base_idx + 2, base_idx + 1]);
        indices.extend([base_idx + 1, base_idx + 2, base_idx + 3]);
    }

    // roof cap, the ground side is never seen
    let centroid = vertex_average(footprint);
    let top_center = positions.len() as u32;
    positions.push([centroid.x, height, centroid.y]);
    normals.push([0.0, 1.0, 0.0]);
    uvs.push([0.5, 0.5]);

    for (i, vertex) in footprint.iter().enumerate() {
        positions.push([vertex.x, height, vertex.y]);
        normals.push([0.0, 1.0, 0.0]);
        uvs.push([0.0, 0.0]);

        let next_i = (i + 1) % footprint.len();
        indices.extend([top_center, top_center + 1 + next_i as u32, top_center + 1 + i as u32]);
    }

    let mut mesh = empty_mesh();
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));

    mesh
}
