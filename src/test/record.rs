use bevy::prelude::*;

use super::{grid_graph, square_graph};
use crate::systems::settlement::record::{
    EdgeRecord, NodeKindRecord, NodeRecord, RecordError, SettlementRecord, StreetGraphRecord, StreetKindRecord,
};
use crate::systems::settlement::street::graph::{NodeKind, StreetGraph, StreetKind};
use crate::systems::settlement::{demo_site, generate_settlement, FillParams, GrowthParams, SettlementId, SettlementKind};

fn node(id: u32, x: f32) -> NodeRecord {
    NodeRecord { id, position: [x, 0.0], kind: NodeKindRecord::District }
}

fn edge(id: u32, a: u32, b: u32) -> EdgeRecord {
    EdgeRecord { id, a, b, kind: StreetKindRecord::District, width: StreetKind::District.width() }
}

#[test]
fn graph_survives_a_round_trip() {
    let graph = grid_graph(3, 20.0);
    let restored = StreetGraph::from_record(&graph.to_record()).unwrap();

    assert_eq!(restored.to_record(), graph.to_record());
    for node in graph.nodes() {
        assert_eq!(restored.degree(node.id), node.degree());
    }
    assert_eq!(restored.find_faces().len(), 4);
}

#[test]
fn restore_keeps_holes_and_counters() {
    let (mut graph, ids) = square_graph(30.0);
    graph.remove_node(ids[1]);
    let extra = graph.add_node(Vec2::new(15.0, 15.0), NodeKind::Alley);
    graph.remove_node(extra);

    let record = graph.to_record();
    assert_eq!(record.next_node_id, 5);
    assert_eq!(record.next_edge_id, 4);

    let mut restored = StreetGraph::from_record(&record).unwrap();
    assert!(restored.node(ids[1]).is_none());
    assert_eq!(restored.node_count(), 3);
    assert_eq!(restored.edge_count(), 2);

    // fresh ids continue after the recorded counters
    assert_eq!(restored.add_node(Vec2::ZERO, NodeKind::District), 5);
    assert_eq!(restored.add_edge(ids[0], ids[2], StreetKind::Alley), Some(4));
}

#[test]
fn settlement_survives_json() {
    let site = demo_site(SettlementId(8), SettlementKind::Town, 600);
    let layout = generate_settlement(&site, "600:8", &GrowthParams::default(), &FillParams::default());

    let json = layout.to_record().to_json().unwrap();
    let restored = SettlementRecord::from_json(&json).unwrap().into_layout().unwrap();

    assert_eq!(restored.id, layout.id);
    assert_eq!(restored.seed, layout.seed);
    assert_eq!(restored.graph.to_record(), layout.graph.to_record());
    assert_eq!(restored.buildings.len(), layout.buildings.len());
    for (a, b) in restored.buildings.iter().zip(&layout.buildings) {
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.block(), b.block());
        assert_eq!(a.center(), b.center());
    }
}

#[test]
fn duplicate_node_ids_are_rejected() {
    let record = StreetGraphRecord {
        nodes: vec![node(0, 0.0), node(0, 5.0)],
        edges: vec![],
        next_node_id: 1,
        next_edge_id: 0,
    };
    assert!(matches!(StreetGraph::from_record(&record), Err(RecordError::DuplicateNode(0))));
}

#[test]
fn broken_edges_are_rejected() {
    let missing = StreetGraphRecord {
        nodes: vec![node(0, 0.0)],
        edges: vec![edge(0, 0, 3)],
        next_node_id: 1,
        next_edge_id: 1,
    };
    assert!(matches!(
        StreetGraph::from_record(&missing),
        Err(RecordError::MissingNode { edge: 0, node: 3 })
    ));

    let looped = StreetGraphRecord {
        nodes: vec![node(0, 0.0)],
        edges: vec![edge(0, 0, 0)],
        next_node_id: 1,
        next_edge_id: 1,
    };
    assert!(matches!(StreetGraph::from_record(&looped), Err(RecordError::SelfLoop(0))));

    let doubled = StreetGraphRecord {
        nodes: vec![node(0, 0.0), node(1, 10.0)],
        edges: vec![edge(0, 0, 1), edge(1, 1, 0)],
        next_node_id: 2,
        next_edge_id: 2,
    };
    assert!(matches!(StreetGraph::from_record(&doubled), Err(RecordError::DuplicateEdge(1))));
}

#[test]
fn counters_behind_ids_are_rejected() {
    let record = StreetGraphRecord {
        nodes: vec![node(0, 0.0), node(4, 10.0)],
        edges: vec![],
        next_node_id: 4,
        next_edge_id: 0,
    };
    assert!(matches!(
        StreetGraph::from_record(&record),
        Err(RecordError::CounterBehind { counter: 4, existing: 4 })
    ));
}

#[test]
fn unknown_building_kind_is_rejected() {
    let json = r#"{
        "id": 1,
        "seed": "0:1",
        "graph": { "nodes": [], "edges": [], "next_node_id": 0, "next_edge_id": 0 },
        "buildings": [
            { "center": [0.0, 0.0], "width": 6.0, "depth": 8.0, "rotation": 0.0, "kind": "mansion", "block": 0 }
        ]
    }"#;
    let record = SettlementRecord::from_json(json).unwrap();
    assert!(matches!(record.into_layout(), Err(RecordError::UnknownBuildingKind(kind)) if kind == "mansion"));
}

#[test]
fn malformed_json_is_an_error() {
    assert!(matches!(SettlementRecord::from_json("{ not json"), Err(RecordError::Json(_))));
}

#[test]
fn kinds_serialize_lowercase() {
    let json = serde_json::to_string(&node(2, 1.0)).unwrap();
    assert!(json.contains("\"district\""));
}
