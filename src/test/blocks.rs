use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{grid_graph, sample_sites, square_graph};
use crate::systems::settlement::blocks::{fill_blocks, BlockFiller, Building, BuildingKind};
use crate::systems::settlement::poly::utils::{point_in_polygon, rects_overlap};
use crate::systems::settlement::street::graph::StreetGraph;
use crate::systems::settlement::street::grow_streets;
use crate::systems::settlement::{FillParams, GrowthParams, SettlementKind};

fn assert_valid_placement(graph: &StreetGraph, buildings: &[Building], params: &FillParams, kind: SettlementKind) {
    let filler = BlockFiller::new(kind.params(), params);
    let faces = graph.find_faces_bounded(params.max_face_area);

    for building in buildings {
        let face = &faces[building.block()];
        let plot = filler.plot(graph, face, building.block()).unwrap();
        for &corner in building.footprint() {
            assert!(point_in_polygon(corner, &plot.inset), "corner {corner} outside block {}", building.block());
        }
    }

    for (i, a) in buildings.iter().enumerate() {
        for b in buildings[i + 1..].iter().filter(|b| b.block() == a.block()) {
            assert!(!rects_overlap(&a.padded_bounds(params.spacing), &b.padded_bounds(params.spacing)));
        }
    }
}

#[test]
fn lattice_blocks_get_buildings() {
    let graph = grid_graph(3, 40.0);
    let params = FillParams::default();

    let buildings = fill_blocks(&graph, SettlementKind::Town.params(), &params, 12);
    assert!(!buildings.is_empty());
    assert_valid_placement(&graph, &buildings, &params, SettlementKind::Town);
}

#[test]
fn generated_settlements_place_valid_buildings() {
    let growth = GrowthParams::default();
    let params = FillParams::default();

    for (i, site) in sample_sites().iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(i as u64);
        let graph = grow_streets(&site.boundary, &site.road_crossings, &growth, &mut rng);
        let buildings = fill_blocks(&graph, site.kind.params(), &params, i as u64);
        assert_valid_placement(&graph, &buildings, &params, site.kind);
    }
}

#[test]
fn per_block_limits_cap_each_block() {
    let graph = grid_graph(4, 50.0);
    let params = FillParams::default();
    let kind = SettlementKind::Hamlet;
    let (_, max) = kind.params().per_block_limits();

    let buildings = fill_blocks(&graph, kind.params(), &params, 3);
    for block in 0..9 {
        assert!(buildings.iter().filter(|b| b.block() == block).count() <= max);
    }
}

#[test]
fn target_count_is_clamped() {
    let params = FillParams::default();
    let hamlet = BlockFiller::new(SettlementKind::Hamlet.params(), &params);
    assert_eq!(SettlementKind::Hamlet.params().per_block_limits(), (1, 3));
    assert_eq!(hamlet.target_count(10_000.0), 3);
    assert_eq!(hamlet.target_count(0.0), 1);

    let town = BlockFiller::new(SettlementKind::Town.params(), &params);
    assert_eq!(SettlementKind::Town.params().per_block_limits(), (3, 20));
    // floor(1200 * 1.0 / 120)
    assert_eq!(town.target_count(1200.0), 10);
}

#[test]
fn area_window_rejects_blocks() {
    let params = FillParams::default();
    let filler = BlockFiller::new(SettlementKind::Village.params(), &params);

    // 64 is below the minimum block area
    let (tiny, _) = square_graph(8.0);
    let faces = tiny.find_faces();
    assert_eq!(faces.len(), 1);
    assert!(filler.plot(&tiny, &faces[0], 0).is_none());

    // 3600 is above the maximum block area
    let (large, _) = square_graph(60.0);
    let faces = large.find_faces();
    assert!(filler.plot(&large, &faces[0], 0).is_none());

    let (fine, _) = square_graph(40.0);
    let faces = fine.find_faces();
    let plot = filler.plot(&fine, &faces[0], 0).unwrap();
    assert_eq!(plot.inset.len(), 4);
    assert!(plot.inset_area < 1600.0 && plot.inset_area > params.inset_area_min);
}

#[test]
fn blocks_draw_from_their_own_stream() {
    let graph = grid_graph(3, 40.0);
    let params = FillParams::default();
    let filler = BlockFiller::new(SettlementKind::Village.params(), &params);
    let seed = 1000;

    let buildings = filler.fill(&graph, seed);
    let faces = graph.find_faces_bounded(params.max_face_area);

    for (block, face) in faces.iter().enumerate() {
        let plot = filler.plot(&graph, face, block).unwrap();
        let mut rng = StdRng::seed_from_u64(seed + block as u64);
        let alone = filler.place_buildings(&plot, &mut rng);

        let in_fill: Vec<_> = buildings.iter().filter(|b| b.block() == block).cloned().collect();
        assert_eq!(alone, in_fill);
    }
}

#[test]
fn filling_is_deterministic() {
    let graph = grid_graph(4, 35.0);
    let params = FillParams::default();

    let first = fill_blocks(&graph, SettlementKind::City.params(), &params, 99);
    let second = fill_blocks(&graph, SettlementKind::City.params(), &params, 99);
    assert_eq!(first, second);
}

#[test]
fn graphs_without_blocks_get_no_buildings() {
    let params = FillParams::default();
    assert!(fill_blocks(&StreetGraph::new(), SettlementKind::City.params(), &params, 0).is_empty());
}

#[test]
fn building_footprint_matches_dimensions() {
    let building = Building::new(Vec2::new(10.0, 20.0), 6.0, 8.0, 0.0, BuildingKind::House, 0);
    let bounds = building.bounds();
    assert!((bounds.width() - 6.0).abs() < 1e-4);
    assert!((bounds.height() - 8.0).abs() < 1e-4);
    assert!(bounds.center().distance(Vec2::new(10.0, 20.0)) < 1e-4);

    let padded = building.padded_bounds(2.0);
    assert!((padded.width() - 10.0).abs() < 1e-4);
}

#[test]
fn building_kinds_round_trip_by_name() {
    for kind in BuildingKind::ALL {
        assert_eq!(BuildingKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(BuildingKind::from_name("mansion"), None);
    assert_eq!(BuildingKind::ALL.iter().map(|k| k.weight()).sum::<u32>(), 100);
}
