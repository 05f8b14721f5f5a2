use std::collections::hash_map::Entry;
use std::collections::HashMap;

use bevy::log::{debug, info};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::config::{DEMO_BOUNDARY_VERTICES, DEMO_MAX_ROADS, DEMO_SETTLEMENT_RADIUS, DEMO_TILE_SIZE};
use crate::systems::settlement::blocks::fill_blocks;
use crate::systems::settlement::poly::point_gen::{generate_boundary_polygon, generate_road_crossings};
use crate::systems::settlement::street::grow_streets;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const FILL_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Street graph plus buildings of one settlement; frozen once generated
#[derive(Clone, Debug)]
pub struct SettlementLayout {
    pub id: SettlementId,
    pub seed: String,
    pub graph: StreetGraph,
    pub buildings: Vec<Building>,
}

/// Seed string for a settlement, the same on every machine
pub fn settlement_seed(world_seed: u64, id: SettlementId) -> String {
    format!("{world_seed}:{id}")
}

/// FNV-1a over the seed bytes, finished with splitmix64
pub fn seed_from_str(seed: &str) -> u64 {
    let hash = seed
        .bytes()
        .fold(FNV_OFFSET, |acc, byte| (acc ^ byte as u64).wrapping_mul(FNV_PRIME));
    splitmix64(hash)
}

fn splitmix64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9e37_79b9_7f4a_7c15);
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}

// boundary + crossings + rng -> streets -> buildings
pub fn generate_settlement(
    site: &SettlementSite,
    seed: &str,
    growth: &GrowthParams,
    fill: &FillParams,
) -> SettlementLayout {
    let base = seed_from_str(seed);
    let mut rng = StdRng::seed_from_u64(base);

    let graph = grow_streets(&site.boundary, &site.road_crossings, growth, &mut rng);
    let buildings = fill_blocks(&graph, site.kind.params(), fill, splitmix64(base ^ FILL_SALT));

    info!(
        "generated {} {} (seed {}): {} intersections, {} streets, {} buildings",
        site.kind.name(),
        site.id,
        seed,
        graph.node_count(),
        graph.edge_count(),
        buildings.len()
    );

    SettlementLayout {
        id: site.id,
        seed: seed.to_string(),
        graph,
        buildings,
    }
}

/// A made-up site around the origin for hosts without a world map; up to
/// four external roads, none for hamlets
pub fn demo_site(id: SettlementId, kind: SettlementKind, world_seed: u64) -> SettlementSite {
    let mut rng = StdRng::seed_from_u64(splitmix64(world_seed ^ id.0 as u64));
    let boundary = generate_boundary_polygon(DEMO_BOUNDARY_VERTICES, DEMO_SETTLEMENT_RADIUS, Vec2::ZERO, &mut rng);

    let roads = match kind {
        SettlementKind::Hamlet => 0,
        _ => rng.random_range(1..=DEMO_MAX_ROADS),
    };
    let road_crossings = generate_road_crossings(&boundary, roads, DEMO_TILE_SIZE, &mut rng);

    SettlementSite { id, kind, boundary, road_crossings }
}

/// Finished layouts by settlement id; a settlement is generated at most once
#[derive(Resource, Default)]
pub struct SettlementCache {
    layouts: HashMap<SettlementId, SettlementLayout>,
}

impl SettlementCache {
    pub fn get(&self, id: SettlementId) -> Option<&SettlementLayout> {
        self.layouts.get(&id)
    }

    pub fn contains(&self, id: SettlementId) -> bool {
        self.layouts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Cached ids in ascending order
    pub fn ids(&self) -> Vec<SettlementId> {
        let mut ids: Vec<_> = self.layouts.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn get_or_generate(
        &mut self,
        world_seed: u64,
        site: &SettlementSite,
        growth: &GrowthParams,
        fill: &FillParams,
    ) -> &SettlementLayout {
        match self.layouts.entry(site.id) {
            Entry::Occupied(entry) => {
                debug!("settlement {} served from cache", site.id);
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                let seed = settlement_seed(world_seed, site.id);
                entry.insert(generate_settlement(site, &seed, growth, fill))
            }
        }
    }

    /// Stores a layout restored from elsewhere, returning the one it replaced
    pub fn insert(&mut self, layout: SettlementLayout) -> Option<SettlementLayout> {
        self.layouts.insert(layout.id, layout)
    }

    pub fn evict(&mut self, id: SettlementId) -> Option<SettlementLayout> {
        self.layouts.remove(&id)
    }

    pub fn clear(&mut self) {
        self.layouts.clear();
    }
}

pub fn handle_focus(
    mut events: EventReader<SettlementFocusEvent>,
    mut ready: EventWriter<SettlementReadyEvent>,
    mut cache: ResMut<SettlementCache>,
    world_seed: Res<WorldSeed>,
    growth: Res<GrowthParams>,
    fill: Res<FillParams>,
) {
    for event in events.read() {
        let cached = cache.contains(event.site.id);
        let layout = cache.get_or_generate(world_seed.0, &event.site, &growth, &fill);
        debug!(
            "settlement {} ready ({} buildings, cached: {})",
            layout.id,
            layout.buildings.len(),
            cached
        );
        ready.write(SettlementReadyEvent { id: event.site.id, cached });
    }
}
