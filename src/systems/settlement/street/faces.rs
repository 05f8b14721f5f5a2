// minimal cycle (city block) extraction

use std::collections::HashSet;

use super::graph::{NodeId, StreetGraph};
use crate::systems::settlement::Polygon;
use crate::systems::settlement::poly::utils::polygon_area;

/// A minimal enclosed region, node ids in counter-clockwise order.
/// Derived on demand, never stored in the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub nodes: Vec<NodeId>,
    pub area: f32,
}

impl Face {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl StreetGraph {
    /// Every interior face, outer boundaries (clockwise traces) and degenerate
    /// walks (zero area, e.g. around a tree) are dropped.
    pub fn find_faces(&self) -> Vec<Face> {
        self.find_faces_bounded(f32::INFINITY)
    }

    /// Like `find_faces`, additionally dropping faces larger than `max_area`.
    /// The winding test alone can let a boundary artifact through; the area cap
    /// catches those at the cost of also rejecting genuinely large blocks.
    pub fn find_faces_bounded(&self, max_area: f32) -> Vec<Face> {
        if self.node_count() < 3 || self.edge_count() < 3 {
            return Vec::new();
        }

        let rotation = self.rotation_system();
        let step_cap = self.node_count() + 1;
        let mut used: HashSet<(NodeId, NodeId)> = HashSet::new();
        let mut faces = Vec::new();

        for (start, neighbors) in &rotation {
            let start = *start;
            for &first in neighbors {
                if !used.insert((start, first)) {
                    continue;
                }

                let Some(cycle) = trace_face(&rotation, &mut used, start, first, step_cap) else {
                    continue;
                };
                if cycle.len() < 3 {
                    continue;
                }

                let polygon: Polygon = cycle.iter().filter_map(|&id| self.position(id)).collect();
                let area = polygon_area(&polygon);
                if area <= f32::EPSILON || area > max_area {
                    continue;
                }

                faces.push(Face { nodes: cycle, area });
            }
        }

        faces
    }

    /// Node positions of a face, in face order
    pub fn face_polygon(&self, face: &Face) -> Polygon {
        face.nodes.iter().filter_map(|&id| self.position(id)).collect()
    }

    /// Neighbours of every node sorted by direction angle (ascending atan2),
    /// in node id order. Ties fall back to the neighbour id.
    fn rotation_system(&self) -> Vec<(NodeId, Vec<NodeId>)> {
        self.nodes()
            .map(|node| {
                let origin = node.position;
                let mut keyed: Vec<(f32, NodeId)> = self
                    .neighbors(node.id)
                    .into_iter()
                    .filter_map(|n| {
                        let d = self.position(n)? - origin;
                        Some((d.y.atan2(d.x), n))
                    })
                    .collect();
                keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                (node.id, keyed.into_iter().map(|(_, n)| n).collect())
            })
            .collect()
    }
}

// Follows half-edges from `start -> first`, at each node leaving by the neighbour
// just before the one we arrived from. Returns the closed cycle, or `None` when a
// half-edge repeats or the step cap runs out first.
fn trace_face(
    rotation: &[(NodeId, Vec<NodeId>)],
    used: &mut HashSet<(NodeId, NodeId)>,
    start: NodeId,
    first: NodeId,
    step_cap: usize,
) -> Option<Vec<NodeId>> {
    let mut cycle = vec![start];
    let mut prev = start;
    let mut current = first;

    for _ in 0..step_cap {
        if current == start {
            return Some(cycle);
        }
        cycle.push(current);

        let neighbors = neighbors_of(rotation, current)?;
        let arrived = neighbors.iter().position(|&n| n == prev)?;
        let next = neighbors[(arrived + neighbors.len() - 1) % neighbors.len()];

        if !used.insert((current, next)) {
            return None;
        }
        prev = current;
        current = next;
    }

    None
}

fn neighbors_of(rotation: &[(NodeId, Vec<NodeId>)], node: NodeId) -> Option<&[NodeId]> {
    rotation
        .binary_search_by_key(&node, |(id, _)| *id)
        .ok()
        .map(|idx| rotation[idx].1.as_slice())
}
