use bevy::prelude::*;

use super::square_graph;
use crate::systems::export::{export_obj, write_obj, ExportEvent};
use crate::systems::settlement::blocks::{Building, BuildingKind};
use crate::systems::settlement::street::graph::{NodeKind, StreetKind};
use crate::systems::settlement::{SettlementId, SettlementLayout, SettlementPlugin, SettlementCache};

fn small_layout() -> SettlementLayout {
    let (mut graph, ids) = square_graph(40.0);
    let hole = graph.add_node(Vec2::new(80.0, 0.0), NodeKind::District);
    graph.remove_node(hole);
    let main = graph.add_node(Vec2::new(20.0, -20.0), NodeKind::Main);
    graph.add_edge(ids[0], main, StreetKind::Main);

    SettlementLayout {
        id: SettlementId(4),
        seed: "1:4".to_string(),
        graph,
        buildings: vec![
            Building::new(Vec2::new(20.0, 20.0), 6.0, 8.0, 0.0, BuildingKind::House, 0),
            Building::new(Vec2::new(10.0, 30.0), 7.0, 8.0, 0.0, BuildingKind::Shop, 0),
        ],
    }
}

fn lines_with<'a>(obj: &'a str, prefix: &str) -> Vec<&'a str> {
    obj.lines().filter(|l| l.starts_with(prefix)).collect()
}

#[test]
fn obj_lists_nodes_streets_and_buildings() {
    let layout = small_layout();
    let mut out = Vec::new();
    write_obj(&layout, &mut out).unwrap();
    let obj = String::from_utf8(out).unwrap();

    assert_eq!(lines_with(&obj, "v ").len(), layout.graph.node_count() + 4 * layout.buildings.len());
    assert_eq!(lines_with(&obj, "l ").len(), layout.graph.edge_count());
    assert_eq!(lines_with(&obj, "f ").len(), layout.buildings.len());

    assert!(obj.contains("o streets_main"));
    assert!(obj.contains("o streets_district"));
    assert!(!obj.contains("o streets_alley"));
    assert!(obj.contains("o building_0_house"));
    assert!(obj.contains("o building_1_shop"));
}

#[test]
fn obj_indices_skip_removed_nodes() {
    let layout = small_layout();
    let mut out = Vec::new();
    write_obj(&layout, &mut out).unwrap();
    let obj = String::from_utf8(out).unwrap();

    // five live nodes, the removed slot is not written
    let node_vertices = layout.graph.node_count() as u32;
    for line in lines_with(&obj, "l ") {
        for index in line[2..].split_whitespace() {
            let index: u32 = index.parse().unwrap();
            assert!((1..=node_vertices).contains(&index));
        }
    }
    assert!(lines_with(&obj, "l ").contains(&"l 1 5"));

    let faces = lines_with(&obj, "f ");
    assert_eq!(faces[0], format!("f {} {} {} {}", node_vertices + 1, node_vertices + 2, node_vertices + 3, node_vertices + 4));
}

#[test]
fn export_writes_a_file() {
    let layout = small_layout();
    let path = std::env::temp_dir().join("settlement_weaver_export_test.obj");

    export_obj(&layout, &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# settlement 4"));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn export_event_writes_cached_layouts_only() {
    let mut app = App::new();
    app.add_plugins(SettlementPlugin);
    app.world_mut().resource_mut::<SettlementCache>().insert(small_layout());

    let cached = std::env::temp_dir().join("settlement_weaver_event_4.obj");
    let unknown = std::env::temp_dir().join("settlement_weaver_event_5.obj");
    let _ = std::fs::remove_file(&unknown);

    app.world_mut().send_event(ExportEvent { id: SettlementId(4), filename: cached.to_string_lossy().into_owned() });
    app.world_mut().send_event(ExportEvent { id: SettlementId(5), filename: unknown.to_string_lossy().into_owned() });
    app.update();

    assert!(cached.exists());
    assert!(!unknown.exists());
    std::fs::remove_file(&cached).unwrap();
}
