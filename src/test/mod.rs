use bevy::prelude::*;

use crate::systems::settlement::street::graph::{NodeId, NodeKind, StreetGraph, StreetKind};
use crate::systems::settlement::{demo_site, SettlementId, SettlementKind, SettlementSite};

pub mod blocks;
pub mod export;
pub mod faces;
pub mod record;

// counter-clockwise square with its lower left corner at the origin
pub fn square_graph(size: f32) -> (StreetGraph, [NodeId; 4]) {
    let mut graph = StreetGraph::new();
    let ids = [
        graph.add_node(Vec2::new(0.0, 0.0), NodeKind::District),
        graph.add_node(Vec2::new(size, 0.0), NodeKind::District),
        graph.add_node(Vec2::new(size, size), NodeKind::District),
        graph.add_node(Vec2::new(0.0, size), NodeKind::District),
    ];
    for i in 0..4 {
        graph.add_edge(ids[i], ids[(i + 1) % 4], StreetKind::District);
    }
    (graph, ids)
}

// n x n lattice, node id = row * n + column
pub fn grid_graph(n: usize, spacing: f32) -> StreetGraph {
    let mut graph = StreetGraph::new();
    for row in 0..n {
        for col in 0..n {
            graph.add_node(Vec2::new(col as f32 * spacing, row as f32 * spacing), NodeKind::District);
        }
    }

    let id = |row: usize, col: usize| (row * n + col) as NodeId;
    for row in 0..n {
        for col in 0..n {
            if col + 1 < n {
                graph.add_edge(id(row, col), id(row, col + 1), StreetKind::District);
            }
            if row + 1 < n {
                graph.add_edge(id(row, col), id(row + 1, col), StreetKind::District);
            }
        }
    }
    graph
}

// a spread of demo sites over every settlement kind
pub fn sample_sites() -> Vec<SettlementSite> {
    let mut sites = Vec::new();
    for id in 0..6 {
        for kind in SettlementKind::ALL {
            sites.push(demo_site(SettlementId(id), kind, 0xdead_beef + id as u64));
        }
    }
    sites
}
