use bevy::prelude::*;

use super::{grid_graph, square_graph};
use crate::config::MAX_FACE_AREA;
use crate::systems::settlement::poly::utils::polygon_area;
use crate::systems::settlement::street::graph::{NodeKind, StreetGraph, StreetKind};

#[test]
fn square_has_one_face() {
    let (graph, ids) = square_graph(100.0);
    let faces = graph.find_faces();

    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].len(), 4);
    assert!((faces[0].area - 10_000.0).abs() < 1e-2);

    let mut nodes = faces[0].nodes.clone();
    nodes.sort_unstable();
    assert_eq!(nodes, ids.to_vec());
}

#[test]
fn oversized_faces_are_capped_when_bounded() {
    let (graph, _) = square_graph(100.0);
    assert!(graph.find_faces_bounded(MAX_FACE_AREA).is_empty());

    let (small, _) = square_graph(50.0);
    assert_eq!(small.find_faces_bounded(MAX_FACE_AREA).len(), 1);
}

#[test]
fn triangle_has_one_face() {
    let mut graph = StreetGraph::new();
    let a = graph.add_node(Vec2::new(0.0, 0.0), NodeKind::District);
    let b = graph.add_node(Vec2::new(30.0, 0.0), NodeKind::District);
    let c = graph.add_node(Vec2::new(0.0, 30.0), NodeKind::District);
    graph.add_edge(a, b, StreetKind::District);
    graph.add_edge(b, c, StreetKind::District);
    graph.add_edge(c, a, StreetKind::District);

    let faces = graph.find_faces();
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].len(), 3);
    assert!((faces[0].area - 450.0).abs() < 1e-3);
}

#[test]
fn path_has_no_faces() {
    let mut graph = StreetGraph::new();
    let ids: Vec<_> = (0..5)
        .map(|i| graph.add_node(Vec2::new(i as f32 * 10.0, (i % 2) as f32 * 5.0), NodeKind::District))
        .collect();
    for pair in ids.windows(2) {
        graph.add_edge(pair[0], pair[1], StreetKind::District);
    }

    assert!(graph.find_faces().is_empty());
}

#[test]
fn star_has_no_faces() {
    let mut graph = StreetGraph::new();
    let hub = graph.add_node(Vec2::ZERO, NodeKind::Center);
    for dir in [Vec2::X, Vec2::Y, Vec2::NEG_X, Vec2::NEG_Y] {
        let leaf = graph.add_node(dir * 20.0, NodeKind::District);
        graph.add_edge(hub, leaf, StreetKind::Main);
    }

    assert!(graph.find_faces().is_empty());
}

#[test]
fn grid_has_four_faces() {
    let graph = grid_graph(3, 10.0);
    assert_eq!(graph.node_count(), 9);
    assert_eq!(graph.edge_count(), 12);

    let faces = graph.find_faces();
    assert!(faces.len() >= 4);
    for face in &faces {
        assert_eq!(face.len(), 4);
        assert!((face.area - 100.0).abs() < 1e-3);
    }
}

#[test]
fn faces_are_counter_clockwise() {
    let graph = grid_graph(4, 20.0);
    let faces = graph.find_faces();
    assert_eq!(faces.len(), 9);

    for face in &faces {
        let polygon = graph.face_polygon(face);
        assert_eq!(polygon.len(), face.len());
        assert!(polygon_area(&polygon) > 0.0);
    }
}

#[test]
fn dangling_street_does_not_break_faces() {
    let (mut graph, ids) = square_graph(40.0);
    let inner = graph.add_node(Vec2::new(20.0, 20.0), NodeKind::Alley);
    graph.add_edge(ids[0], inner, StreetKind::Alley);

    let faces = graph.find_faces();
    assert_eq!(faces.len(), 1);
    assert!((faces[0].area - 1600.0).abs() < 1e-2);
}

#[test]
fn too_small_graphs_have_no_faces() {
    let mut graph = StreetGraph::new();
    assert!(graph.find_faces().is_empty());

    let a = graph.add_node(Vec2::ZERO, NodeKind::Center);
    let b = graph.add_node(Vec2::X, NodeKind::District);
    graph.add_edge(a, b, StreetKind::Main);
    assert!(graph.find_faces().is_empty());
}
