// fills street blocks with building footprints by rejection sampling

use std::f32::consts::FRAC_PI_4;

use bevy::log::debug;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::systems::settlement::poly::utils::{
    inset_polygon, point_in_polygon, polygon_area, polygon_bounds, rects_overlap, rotated_rect,
};
use crate::systems::settlement::street::faces::Face;
use crate::systems::settlement::street::graph::StreetGraph;
use crate::systems::settlement::{FillParams, Polygon, SettlementParams};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildingKind {
    House,
    Shop,
    Tavern,
    Warehouse,
    Market,
    Temple,
    Castle,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 7] = [
        BuildingKind::House,
        BuildingKind::Shop,
        BuildingKind::Warehouse,
        BuildingKind::Tavern,
        BuildingKind::Temple,
        BuildingKind::Market,
        BuildingKind::Castle,
    ];

    /// Relative draw weight when picking a building for a plot
    pub const fn weight(self) -> u32 {
        match self {
            BuildingKind::House => 50,
            BuildingKind::Shop => 20,
            BuildingKind::Warehouse => 10,
            BuildingKind::Tavern => 8,
            BuildingKind::Temple => 5,
            BuildingKind::Market => 5,
            BuildingKind::Castle => 2,
        }
    }

    /// Default (width, depth) in meters
    pub const fn default_size(self) -> (f32, f32) {
        match self {
            BuildingKind::House => (6.0, 8.0),
            BuildingKind::Shop => (7.0, 8.0),
            BuildingKind::Tavern => (10.0, 12.0),
            BuildingKind::Warehouse => (10.0, 14.0),
            BuildingKind::Market => (14.0, 14.0),
            BuildingKind::Temple => (12.0, 18.0),
            BuildingKind::Castle => (20.0, 20.0),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BuildingKind::House => "house",
            BuildingKind::Shop => "shop",
            BuildingKind::Tavern => "tavern",
            BuildingKind::Warehouse => "warehouse",
            BuildingKind::Market => "market",
            BuildingKind::Temple => "temple",
            BuildingKind::Castle => "castle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// A placed footprint; immutable once placed
#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    center: Vec2,
    width: f32,
    depth: f32,
    rotation: f32,
    kind: BuildingKind,
    block: usize,
    footprint: [Vec2; 4],
}

impl Building {
    pub fn new(center: Vec2, width: f32, depth: f32, rotation: f32, kind: BuildingKind, block: usize) -> Self {
        Self {
            center,
            width,
            depth,
            rotation,
            kind,
            block,
            footprint: rotated_rect(center, width, depth, rotation),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Radians, counter-clockwise
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    /// Index of the source block in the face list it was filled from
    pub fn block(&self) -> usize {
        self.block
    }

    pub fn footprint(&self) -> &[Vec2; 4] {
        &self.footprint
    }

    pub fn bounds(&self) -> Rect {
        let mut rect = Rect::from_center_size(self.footprint[0], Vec2::ZERO);
        for corner in &self.footprint[1..] {
            rect = rect.union_point(*corner);
        }
        rect
    }

    pub fn padded_bounds(&self, padding: f32) -> Rect {
        self.bounds().inflate(padding)
    }
}

/// A face that passed the area window together with its inset
#[derive(Clone, Debug)]
pub struct Plot {
    pub block: usize,
    pub outline: Polygon,
    pub inset: Polygon,
    pub inset_area: f32,
}

pub struct BlockFiller<'a> {
    settlement: SettlementParams,
    params: &'a FillParams,
}

impl<'a> BlockFiller<'a> {
    pub fn new(settlement: SettlementParams, params: &'a FillParams) -> Self {
        Self { settlement, params }
    }

    /// Fills every usable block of `graph`; block `i` draws from its own stream
    /// seeded with `seed + i`.
    pub fn fill(&self, graph: &StreetGraph, seed: u64) -> Vec<Building> {
        let faces = graph.find_faces_bounded(self.params.max_face_area);
        let mut buildings = Vec::new();
        let mut plots = 0;

        for (block, face) in faces.iter().enumerate() {
            let Some(plot) = self.plot(graph, face, block) else {
                continue;
            };
            plots += 1;

            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(block as u64));
            buildings.extend(self.place_buildings(&plot, &mut rng));
        }

        debug!(
            "block filling: {} faces, {} usable plots, {} buildings",
            faces.len(),
            plots,
            buildings.len()
        );
        buildings
    }

    /// Area window and inset; `None` when the block can't hold anything
    pub fn plot(&self, graph: &StreetGraph, face: &Face, block: usize) -> Option<Plot> {
        let outline = graph.face_polygon(face);
        let area = polygon_area(&outline).abs();
        if area < self.params.block_area_min || area > self.params.block_area_max {
            return None;
        }

        let inset = inset_polygon(&outline, self.params.inset);
        if inset.len() < 3 {
            return None;
        }

        let inset_area = polygon_area(&inset).abs();
        if inset_area < self.params.inset_area_min {
            return None;
        }

        Some(Plot { block, outline, inset, inset_area })
    }

    pub fn target_count(&self, inset_area: f32) -> usize {
        let (min, max) = self.settlement.per_block_limits();
        let raw = (inset_area * self.settlement.building_density / self.params.area_per_building).floor();
        (raw.max(0.0) as usize).clamp(min, max)
    }

    /// Rejection sampling inside the inset; fewer buildings than targeted is fine
    pub fn place_buildings<R: Rng>(&self, plot: &Plot, rng: &mut R) -> Vec<Building> {
        let Some(bounds) = polygon_bounds(&plot.inset) else {
            return Vec::new();
        };

        let target = self.target_count(plot.inset_area);
        let attempts = target * self.params.attempt_factor;
        let chaos = self.params.size_chaos;
        let mut placed: Vec<Building> = Vec::with_capacity(target);
        let mut padded: Vec<Rect> = Vec::with_capacity(target);

        for _ in 0..attempts {
            if placed.len() >= target {
                break;
            }

            let center = Vec2::new(
                rng.random_range(bounds.min.x..=bounds.max.x),
                rng.random_range(bounds.min.y..=bounds.max.y),
            );
            let kind = BuildingKind::ALL
                .choose_weighted(&mut *rng, |k| k.weight())
                .copied()
                .unwrap_or(BuildingKind::House);
            let (base_w, base_d) = kind.default_size();
            let width = base_w * rng.random_range(1.0 - chaos..=1.0 + chaos);
            let depth = base_d * rng.random_range(1.0 - chaos..=1.0 + chaos);
            let rotation = if rng.random::<f32>() < self.params.axis_aligned_chance {
                0.0
            } else {
                rng.random_range(0..8u32) as f32 * FRAC_PI_4
            };

            let building = Building::new(center, width, depth, rotation, kind, plot.block);
            if !building.footprint().iter().all(|&c| point_in_polygon(c, &plot.inset)) {
                continue;
            }

            let pad = building.padded_bounds(self.params.spacing);
            if padded.iter().any(|other| rects_overlap(&pad, other)) {
                continue;
            }

            padded.push(pad);
            placed.push(building);
        }

        placed
    }
}

pub fn fill_blocks(graph: &StreetGraph, settlement: SettlementParams, params: &FillParams, seed: u64) -> Vec<Building> {
    BlockFiller::new(settlement, params).fill(graph, seed)
}
