// grows the street graph from a settlement boundary and its road crossings

use std::collections::HashSet;
use std::f32::consts::TAU;

use bevy::log::debug;
use bevy::prelude::*;
use rand::Rng;

use super::graph::{angle_between_directions, NodeId, NodeKind, StreetGraph, StreetKind};
use crate::systems::settlement::poly::point_gen::jittered_grid;
use crate::systems::settlement::poly::utils::{
    closest_point_on_polygon, line_segment_intersection, point_in_polygon, polygon_bounds, polygon_centroid,
};
use crate::systems::settlement::{GrowthParams, RoadCrossing};

/// Growth runs these in order, each one mutating the shared graph
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthPhase {
    SeedPlacement,
    GateDerivation,
    CandidateGeneration,
    GateConnection,
    DistrictInfill,
    Pruning,
    Done,
}

impl GrowthPhase {
    pub const fn next(self) -> Self {
        match self {
            GrowthPhase::SeedPlacement => GrowthPhase::GateDerivation,
            GrowthPhase::GateDerivation => GrowthPhase::CandidateGeneration,
            GrowthPhase::CandidateGeneration => GrowthPhase::GateConnection,
            GrowthPhase::GateConnection => GrowthPhase::DistrictInfill,
            GrowthPhase::DistrictInfill => GrowthPhase::Pruning,
            GrowthPhase::Pruning | GrowthPhase::Done => GrowthPhase::Done,
        }
    }
}

pub struct StreetGrowth<'a, R: Rng> {
    graph: StreetGraph,
    boundary: &'a [Vec2],
    crossings: &'a [RoadCrossing],
    params: &'a GrowthParams,
    rng: &'a mut R,
    phase: GrowthPhase,
    center: Option<NodeId>,
    gates: Vec<NodeId>,
    candidates: Vec<NodeId>,
    used: HashSet<NodeId>,
}

impl<'a, R: Rng> StreetGrowth<'a, R> {
    pub fn new(boundary: &'a [Vec2], crossings: &'a [RoadCrossing], params: &'a GrowthParams, rng: &'a mut R) -> Self {
        Self {
            graph: StreetGraph::new(),
            boundary,
            crossings,
            params,
            rng,
            phase: GrowthPhase::SeedPlacement,
            center: None,
            gates: Vec::new(),
            candidates: Vec::new(),
            used: HashSet::new(),
        }
    }

    pub fn phase(&self) -> GrowthPhase {
        self.phase
    }

    pub fn graph(&self) -> &StreetGraph {
        &self.graph
    }

    /// Runs the current phase and moves to the next one
    pub fn step(&mut self) -> GrowthPhase {
        match self.phase {
            GrowthPhase::SeedPlacement => self.place_center(),
            GrowthPhase::GateDerivation => self.derive_gates(),
            GrowthPhase::CandidateGeneration => self.generate_candidates(),
            GrowthPhase::GateConnection => self.connect_gates(),
            GrowthPhase::DistrictInfill => self.infill_districts(),
            GrowthPhase::Pruning => self.prune(),
            GrowthPhase::Done => {}
        }

        debug!(
            "street growth {:?} done: {} nodes, {} edges",
            self.phase,
            self.graph.node_count(),
            self.graph.edge_count()
        );
        self.phase = self.phase.next();
        self.phase
    }

    pub fn run(mut self) -> StreetGraph {
        while self.phase != GrowthPhase::Done {
            self.step();
        }
        self.graph
    }

    fn pos(&self, id: NodeId) -> Vec2 {
        self.graph.position(id).unwrap_or(Vec2::ZERO)
    }

    // ---- phase 1 ----

    fn place_center(&mut self) {
        let centroid = polygon_centroid(self.boundary);
        self.center = Some(self.graph.add_node(centroid, NodeKind::Center));
    }

    // ---- phase 2 ----

    fn derive_gates(&mut self) {
        let min_gap = self.params.min_node_spacing * self.params.gate_dedup_factor;

        for crossing in self.crossings {
            let Some(point) = gate_point(self.boundary, crossing) else {
                continue;
            };

            let too_close = self.gates.iter().any(|&g| self.pos(g).distance(point) < min_gap);
            if too_close {
                continue;
            }

            let gate = self.graph.add_node(point, NodeKind::Gate);
            self.gates.push(gate);
        }
    }

    // ---- phase 3 ----

    fn generate_candidates(&mut self) {
        let Some(bounds) = polygon_bounds(self.boundary) else {
            return;
        };

        let points = jittered_grid(bounds, self.params.grid_spacing, self.params.grid_jitter, &mut *self.rng);
        let min_spacing_sq = self.params.min_node_spacing * self.params.min_node_spacing;

        for point in points {
            if !point_in_polygon(point, self.boundary) {
                continue;
            }
            if self.graph.nodes().any(|n| n.position.distance_squared(point) < min_spacing_sq) {
                continue;
            }

            let id = self.graph.add_node(point, NodeKind::District);
            self.candidates.push(id);
        }
    }

    // ---- phase 4 ----

    fn connect_gates(&mut self) {
        let Some(center) = self.center else {
            return;
        };

        if self.gates.is_empty() {
            self.connect_center_radially(center);
            return;
        }

        for gate in self.gates.clone() {
            self.thread_main_street(gate, center);
        }
    }

    fn thread_main_street(&mut self, gate: NodeId, center: NodeId) {
        let target = self.pos(center);
        let search = self.params.grid_spacing * self.params.gate_search_factor;
        let arrival = self.params.grid_spacing * self.params.gate_arrival_factor;

        let mut path = vec![gate];
        let mut current = gate;

        for _ in 0..self.params.max_gate_hops {
            if self.pos(current).distance(target) <= arrival {
                break;
            }

            let Some(next) = self.next_hop(current, target, search) else {
                break;
            };

            if self.graph.add_edge(current, next, StreetKind::Main).is_none() {
                break;
            }
            self.used.insert(next);
            self.graph.set_node_kind(next, NodeKind::Main);
            path.push(next);
            current = next;
        }

        if !self.join_main_network(current, center, &path) {
            debug!("main street from gate {} stopped short at node {}", gate, current);
        }
    }

    // closest-to-target unused candidate within reach that keeps main streets from crossing
    fn next_hop(&self, current: NodeId, target: Vec2, search: f32) -> Option<NodeId> {
        let here = self.pos(current);
        let here_to_target = here.distance(target);
        let weight = self.params.gate_step_weight;

        self.candidates
            .iter()
            .copied()
            .filter(|c| !self.used.contains(c))
            .filter_map(|c| {
                let p = self.pos(c);
                let step = p.distance(here);
                let remaining = p.distance(target);
                (step <= search && remaining < here_to_target).then_some((remaining + weight * step, c))
            })
            .filter(|&(_, c)| !self.graph.crosses_any(current, c, |e| e.kind == StreetKind::Main))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, c)| c)
    }

    // Straight to the center when it still has room and nothing main is in the way,
    // otherwise onto the nearest main street node already reaching it.
    fn join_main_network(&mut self, current: NodeId, center: NodeId, path: &[NodeId]) -> bool {
        let here = self.pos(current);
        let reach = self.params.grid_spacing * self.params.gate_search_factor;

        let mut targets: Vec<(f32, NodeId)> = self
            .graph
            .nodes()
            .filter(|n| n.kind == NodeKind::Main && n.degree() > 0 && !path.contains(&n.id))
            .map(|n| (n.position.distance(here), n.id))
            .filter(|&(d, _)| d <= reach)
            .collect();
        targets.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let max_degree = self.params.max_degree;
        let found = std::iter::once(center)
            .chain(targets.into_iter().map(|(_, id)| id))
            .find(|&target| {
                self.graph.degree(current) < max_degree
                    && self.graph.degree(target) < max_degree
                    && !self.graph.has_edge(current, target)
                    && !self.graph.crosses_any(current, target, |e| e.kind == StreetKind::Main)
            });

        match found {
            Some(target) => self.graph.add_edge(current, target, StreetKind::Main).is_some(),
            None => false,
        }
    }

    // no gates: 3-4 spokes, nearest candidate in each angular sector
    fn connect_center_radially(&mut self, center: NodeId) {
        let origin = self.pos(center);
        let spokes: usize = self.rng.random_range(3..=4);
        let sector = TAU / spokes as f32;

        for s in 0..spokes {
            let pick = self
                .candidates
                .iter()
                .copied()
                .filter(|c| !self.used.contains(c))
                .filter_map(|c| {
                    let d = self.pos(c) - origin;
                    let angle = d.y.atan2(d.x).rem_euclid(TAU);
                    let in_sector = ((angle / sector) as usize).min(spokes - 1) == s;
                    in_sector.then_some((d.length(), c))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            if let Some((_, candidate)) = pick {
                if self.graph.add_edge(center, candidate, StreetKind::Main).is_some() {
                    self.used.insert(candidate);
                    self.graph.set_node_kind(candidate, NodeKind::Main);
                }
            }
        }
    }

    // ---- phase 5 ----

    fn infill_districts(&mut self) {
        let p = self.params;
        let radius = p.grid_spacing * p.infill_radius_factor;
        let short = p.min_node_spacing * p.short_edge_factor;
        let ids: Vec<NodeId> = self.graph.node_ids().collect();

        let mut pairs: Vec<(f32, NodeId, NodeId)> = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if self.graph.has_edge(a, b) {
                    continue;
                }

                let distance = self.pos(a).distance(self.pos(b));
                if distance > radius {
                    continue;
                }

                let kinds = [self.kind(a), self.kind(b)];
                let mut score = distance;
                if kinds.contains(&NodeKind::Center) {
                    score *= p.center_pair_bias;
                }
                if kinds.contains(&NodeKind::Gate) {
                    score *= p.gate_pair_bias;
                }
                for id in [a, b] {
                    if self.graph.degree(id) >= 3 {
                        score *= p.busy_node_penalty;
                    }
                }
                if distance < short {
                    score *= p.short_edge_penalty;
                }

                pairs.push((score, a, b));
            }
        }

        pairs.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)).then(x.2.cmp(&y.2)));

        let mut added = 0;
        for (_, a, b) in pairs {
            if self.try_add_street(a, b) {
                added += 1;
            }
        }
        debug!("district infill added {} streets", added);
    }

    fn kind(&self, id: NodeId) -> NodeKind {
        self.graph.node(id).map_or(NodeKind::District, |n| n.kind)
    }

    /// Adds a district or alley street if it keeps degree, angle and crossing limits
    pub fn try_add_street(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || self.graph.has_edge(a, b) {
            return false;
        }
        if self.graph.degree(a) >= self.params.max_degree || self.graph.degree(b) >= self.params.max_degree {
            return false;
        }
        if !self.angle_clear(a, b) || !self.angle_clear(b, a) {
            return false;
        }
        if self.graph.crosses_any(a, b, |_| true) {
            return false;
        }

        let short = self.params.min_node_spacing * self.params.short_edge_factor;
        let kind = if self.pos(a).distance(self.pos(b)) < short {
            StreetKind::Alley
        } else {
            StreetKind::District
        };
        self.graph.add_edge(a, b, kind).is_some()
    }

    // every street already at `at` leaves at least the minimum angle to `at -> to`
    fn angle_clear(&self, at: NodeId, to: NodeId) -> bool {
        let origin = self.pos(at);
        let heading = self.pos(to) - origin;
        let min_angle = self.params.min_angle_deg.to_radians();

        self.graph.edges_at(at).all(|edge| {
            let Some(other) = edge.other(at) else {
                return true;
            };
            angle_between_directions(heading, self.pos(other) - origin).is_none_or(|angle| angle >= min_angle)
        })
    }

    // ---- final ----

    fn prune(&mut self) {
        let isolated: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| !n.kind.is_anchor() && n.degree() == 0)
            .map(|n| n.id)
            .collect();
        for id in &isolated {
            self.graph.remove_node(*id);
        }

        // district nodes served only by alleys become alley nodes
        let alley_only: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| n.kind == NodeKind::District)
            .filter(|n| self.graph.edges_at(n.id).all(|e| e.kind == StreetKind::Alley))
            .map(|n| n.id)
            .collect();
        for id in alley_only {
            self.graph.set_node_kind(id, NodeKind::Alley);
        }

        debug!("pruned {} isolated nodes", isolated.len());
    }
}

/// Where the road from `tile_center` to `neighbor_center` crosses the boundary,
/// closest crossing to the inside tile; falls back to the boundary point nearest the
/// segment midpoint when the segment never crosses.
pub fn gate_point(boundary: &[Vec2], crossing: &RoadCrossing) -> Option<Vec2> {
    if boundary.len() < 3 {
        return None;
    }

    let from = crossing.tile_center;
    let to = crossing.neighbor_center;
    let n = boundary.len();

    (0..n)
        .filter_map(|i| line_segment_intersection(from, to, boundary[i], boundary[(i + 1) % n]))
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
        .or_else(|| closest_point_on_polygon(from.lerp(to, 0.5), boundary))
}

/// Runs every growth phase and returns the finished graph
pub fn grow_streets<R: Rng>(
    boundary: &[Vec2],
    crossings: &[RoadCrossing],
    params: &GrowthParams,
    rng: &mut R,
) -> StreetGraph {
    StreetGrowth::new(boundary, crossings, params, rng).run()
}
