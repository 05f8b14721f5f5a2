// this is the entry point for the settlement generation plugin
use std::fmt;

use bevy::prelude::*;

use crate::config::*;

pub mod blocks;
pub mod poly;
pub mod record;
pub mod street;
pub mod town;

pub use blocks::{Building, BuildingKind};
pub use street::{StreetGraph, StreetKind};
pub use town::{demo_site, generate_settlement, seed_from_str, settlement_seed, SettlementCache, SettlementLayout};

// my 2d polygon datatype
pub type Polygon = Vec<Vec2>;

// resources
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldSeed(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettlementId(pub u32);

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An external road leaving the settlement: the center of the occupied tile it
/// starts from and the center of the outside tile it leads to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadCrossing {
    pub tile_center: Vec2,
    pub neighbor_center: Vec2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SettlementKind {
    Hamlet,
    #[default]
    Village,
    Town,
    City,
}

impl SettlementKind {
    pub const ALL: [SettlementKind; 4] = [
        SettlementKind::Hamlet,
        SettlementKind::Village,
        SettlementKind::Town,
        SettlementKind::City,
    ];

    pub const fn params(self) -> SettlementParams {
        match self {
            SettlementKind::Hamlet => SettlementParams { building_density: 0.6, min_buildings: 3, max_buildings: 15 },
            SettlementKind::Village => SettlementParams { building_density: 0.8, min_buildings: 10, max_buildings: 40 },
            SettlementKind::Town => SettlementParams { building_density: 1.0, min_buildings: 30, max_buildings: 100 },
            SettlementKind::City => SettlementParams { building_density: 1.3, min_buildings: 80, max_buildings: 250 },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SettlementKind::Hamlet => "hamlet",
            SettlementKind::Village => "village",
            SettlementKind::Town => "town",
            SettlementKind::City => "city",
        }
    }
}

/// Per settlement-type building parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettlementParams {
    pub building_density: f32,
    pub min_buildings: usize,
    pub max_buildings: usize,
}

impl SettlementParams {
    /// Settlement-wide limits spread over the assumed 5-10 blocks
    pub fn per_block_limits(&self) -> (usize, usize) {
        let min = (self.min_buildings / ASSUMED_BLOCKS_MAX).max(1);
        let max = (self.max_buildings / ASSUMED_BLOCKS_MIN).max(min);
        (min, max)
    }
}

/// Everything the world layer hands over for one settlement
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementSite {
    pub id: SettlementId,
    pub kind: SettlementKind,
    pub boundary: Polygon,
    pub road_crossings: Vec<RoadCrossing>,
}

impl SettlementSite {
    pub fn bounds(&self) -> Option<Rect> {
        poly::utils::polygon_bounds(&self.boundary)
    }
}

// street growth parameters
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct GrowthParams {
    pub grid_spacing: f32,
    pub grid_jitter: f32,
    pub min_node_spacing: f32,
    pub max_degree: usize,
    pub min_angle_deg: f32,
    // gate threading
    pub gate_search_factor: f32,
    pub gate_arrival_factor: f32,
    pub gate_step_weight: f32,
    pub max_gate_hops: usize,
    pub gate_dedup_factor: f32,
    // infill scoring
    pub infill_radius_factor: f32,
    pub center_pair_bias: f32,
    pub gate_pair_bias: f32,
    pub busy_node_penalty: f32,
    pub short_edge_penalty: f32,
    pub short_edge_factor: f32,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            grid_spacing: GRID_SPACING,
            grid_jitter: GRID_JITTER,
            min_node_spacing: MIN_NODE_SPACING,
            max_degree: MAX_NODE_DEGREE,
            min_angle_deg: MIN_STREET_ANGLE_DEG,
            gate_search_factor: GATE_SEARCH_FACTOR,
            gate_arrival_factor: GATE_ARRIVAL_FACTOR,
            gate_step_weight: GATE_STEP_WEIGHT,
            max_gate_hops: MAX_GATE_HOPS,
            gate_dedup_factor: GATE_DEDUP_FACTOR,
            infill_radius_factor: INFILL_RADIUS_FACTOR,
            center_pair_bias: CENTER_PAIR_BIAS,
            gate_pair_bias: GATE_PAIR_BIAS,
            busy_node_penalty: BUSY_NODE_PENALTY,
            short_edge_penalty: SHORT_EDGE_PENALTY,
            short_edge_factor: SHORT_EDGE_FACTOR,
        }
    }
}

// block filling parameters
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct FillParams {
    pub max_face_area: f32,
    pub block_area_min: f32,
    pub block_area_max: f32,
    pub inset: f32,
    pub inset_area_min: f32,
    pub area_per_building: f32,
    pub spacing: f32,
    pub attempt_factor: usize,
    pub axis_aligned_chance: f32,
    pub size_chaos: f32,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            max_face_area: MAX_FACE_AREA,
            block_area_min: BLOCK_AREA_MIN,
            block_area_max: BLOCK_AREA_MAX,
            inset: BLOCK_INSET,
            inset_area_min: INSET_AREA_MIN,
            area_per_building: AREA_PER_BUILDING,
            spacing: BUILDING_SPACING,
            attempt_factor: PLACEMENT_ATTEMPT_FACTOR,
            axis_aligned_chance: AXIS_ALIGNED_CHANCE,
            size_chaos: BUILDING_SIZE_CHAOS,
        }
    }
}

// Event for a settlement coming into focus
#[derive(Event, Clone, Debug)]
pub struct SettlementFocusEvent {
    pub site: SettlementSite,
}

// Event for a layout being available in the cache
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementReadyEvent {
    pub id: SettlementId,
    pub cached: bool, // served without generating
}

// main plugin for generation
pub struct SettlementPlugin;

impl Plugin for SettlementPlugin {
    fn build(&self, app: &mut App) {
        app
            .insert_resource(WorldSeed(INITIAL_WORLD_SEED))
            .insert_resource(GrowthParams::default())
            .insert_resource(FillParams::default())
            .insert_resource(SettlementCache::default())

            .add_event::<SettlementFocusEvent>()
            .add_event::<SettlementReadyEvent>()
            .add_event::<crate::systems::export::ExportEvent>()

            .add_systems(Update, (town::handle_focus, crate::systems::export::handle_export).chain());
    }
}
