use std::collections::{HashMap, VecDeque};

use bevy::prelude::*;

use crate::config::*;
use crate::systems::settlement::poly::utils::segments_cross;

pub type NodeId = u32;
pub type EdgeId = u32;

/// Intersection category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Center,   // settlement focal point, exactly one per graph
    Gate,     // an external road enters the boundary here
    Main,
    District,
    Alley,
}

impl NodeKind {
    /// Center and gates survive pruning even when isolated
    pub const fn is_anchor(self) -> bool {
        matches!(self, NodeKind::Center | NodeKind::Gate)
    }
}

/// Street segment category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreetKind {
    Main,
    District,
    Alley,
}

impl StreetKind {
    pub const ALL: [StreetKind; 3] = [StreetKind::Main, StreetKind::District, StreetKind::Alley];

    pub const fn width(self) -> f32 {
        match self {
            StreetKind::Main => MAIN_STREET_WIDTH,
            StreetKind::District => DISTRICT_STREET_WIDTH,
            StreetKind::Alley => ALLEY_WIDTH,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StreetKind::Main => "main",
            StreetKind::District => "district",
            StreetKind::Alley => "alley",
        }
    }
}

/// Unordered node pair, lower id first
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub NodeId, pub NodeId);

impl EdgeKey {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b { EdgeKey(a, b) } else { EdgeKey(b, a) }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Vec2,
    pub kind: NodeKind,
    degree: usize,
    incident: Vec<EdgeId>,
}

impl Node {
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Incident edge ids in insertion order
    pub fn incident(&self) -> &[EdgeId] {
        &self.incident
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub a: NodeId,
    pub b: NodeId,
    pub kind: StreetKind,
    pub width: f32,
}

impl Edge {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.a, self.b)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// The endpoint opposite `node`, `None` if `node` is not an endpoint
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn shares_endpoint(&self, other: &Edge) -> bool {
        self.touches(other.a) || self.touches(other.b)
    }
}

/// Intersections and street segments of one settlement.
///
/// Nodes and edges live in index-stable arenas: an id is its slot, removal leaves a
/// hole, and ids are never reused. Degree is bookkept only through `attach`/`detach`.
#[derive(Clone, Debug, Default)]
pub struct StreetGraph {
    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    edge_index: HashMap<EdgeKey, EdgeId>,
    node_count: usize,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- nodes ----

    pub fn add_node(&mut self, position: Vec2, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Some(Node {
            id,
            position,
            kind,
            degree: 0,
            incident: Vec::new(),
        }));
        self.node_count += 1;
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)?.as_ref()
    }

    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.node(id).map(|n| n.position)
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, Node::degree)
    }

    pub fn set_node_kind(&mut self, id: NodeId, kind: NodeKind) -> bool {
        match self.nodes.get_mut(id as usize).and_then(Option::as_mut) {
            Some(node) => {
                node.kind = kind;
                true
            }
            None => false,
        }
    }

    /// Removes the node and every edge touching it
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let incident = self.node(id)?.incident.clone();
        for edge_id in incident {
            self.remove_edge(edge_id);
        }

        let node = self.nodes.get_mut(id as usize)?.take()?;
        self.node_count -= 1;
        Some(node)
    }

    /// Live nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().map(|n| n.id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes().filter(move |n| n.kind == kind)
    }

    pub fn center(&self) -> Option<NodeId> {
        self.nodes_of_kind(NodeKind::Center).next().map(|n| n.id)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Next id `add_node` will hand out
    pub fn next_node_id(&self) -> NodeId {
        self.nodes.len() as NodeId
    }

    pub fn nearest_node(&self, point: Vec2) -> Option<NodeId> {
        self.nodes()
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .total_cmp(&b.position.distance_squared(point))
                    .then(a.id.cmp(&b.id))
            })
            .map(|n| n.id)
    }

    pub fn nodes_within(&self, point: Vec2, radius: f32) -> Vec<NodeId> {
        let radius_sq = radius * radius;
        self.nodes()
            .filter(|n| n.position.distance_squared(point) <= radius_sq)
            .map(|n| n.id)
            .collect()
    }

    // ---- edges ----

    /// Adds a street with the default width for its category.
    /// An existing edge between the pair is returned unchanged, self-loops and
    /// unknown endpoints give `None`.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, kind: StreetKind) -> Option<EdgeId> {
        self.add_edge_with_width(a, b, kind, kind.width())
    }

    pub fn add_edge_with_width(&mut self, a: NodeId, b: NodeId, kind: StreetKind, width: f32) -> Option<EdgeId> {
        if a == b || self.node(a).is_none() || self.node(b).is_none() {
            return None;
        }

        let key = EdgeKey::new(a, b);
        if let Some(&existing) = self.edge_index.get(&key) {
            return Some(existing);
        }

        let id = self.edges.len() as EdgeId;
        self.edges.push(Some(Edge { id, a, b, kind, width }));
        self.edge_index.insert(key, id);
        self.attach(a, id);
        self.attach(b, id);
        Some(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id as usize)?.as_ref()
    }

    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        let id = *self.edge_index.get(&EdgeKey::new(a, b))?;
        self.edge(id)
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edge_index.contains_key(&EdgeKey::new(a, b))
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.get_mut(id as usize)?.take()?;
        self.edge_index.remove(&edge.key());
        self.detach(edge.a, id);
        self.detach(edge.b, id);
        Some(edge)
    }

    /// Live edges in id order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().flatten()
    }

    pub fn edges_of_kind(&self, kind: StreetKind) -> impl Iterator<Item = &Edge> {
        self.edges().filter(move |e| e.kind == kind)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    pub fn next_edge_id(&self) -> EdgeId {
        self.edges.len() as EdgeId
    }

    pub fn edges_at(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.node(node)
            .map(|n| n.incident.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| self.edge(id))
    }

    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.edges_at(node).filter_map(|e| e.other(node)).collect()
    }

    // the only two places degree changes
    fn attach(&mut self, node: NodeId, edge: EdgeId) {
        if let Some(n) = self.nodes.get_mut(node as usize).and_then(Option::as_mut) {
            n.incident.push(edge);
            n.degree += 1;
        }
    }

    fn detach(&mut self, node: NodeId, edge: EdgeId) {
        if let Some(n) = self.nodes.get_mut(node as usize).and_then(Option::as_mut) {
            if let Some(pos) = n.incident.iter().position(|&e| e == edge) {
                n.incident.remove(pos);
                n.degree -= 1;
            }
        }
    }

    // ---- restore ----
    // ids must arrive in ascending order; skipped ids stay as holes

    pub(crate) fn restore_node(&mut self, id: NodeId, position: Vec2, kind: NodeKind) -> bool {
        if (id as usize) < self.nodes.len() {
            return false;
        }
        self.nodes.resize(id as usize, None);
        self.add_node(position, kind);
        true
    }

    pub(crate) fn restore_edge(&mut self, id: EdgeId, a: NodeId, b: NodeId, kind: StreetKind, width: f32) -> bool {
        if (id as usize) < self.edges.len() || a == b || self.node(a).is_none() || self.node(b).is_none() || self.has_edge(a, b) {
            return false;
        }
        self.edges.resize(id as usize, None);
        self.add_edge_with_width(a, b, kind, width).is_some()
    }

    /// Pads the arenas so the next ids handed out are at least the given counters
    pub(crate) fn reserve_ids(&mut self, next_node_id: NodeId, next_edge_id: EdgeId) {
        if self.nodes.len() < next_node_id as usize {
            self.nodes.resize(next_node_id as usize, None);
        }
        if self.edges.len() < next_edge_id as usize {
            self.edges.resize(next_edge_id as usize, None);
        }
    }

    // ---- connectivity ----

    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut seen = vec![false; self.nodes.len()];
        let mut components = Vec::new();

        for start in self.node_ids() {
            if seen[start as usize] {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);
            seen[start as usize] = true;

            while let Some(current) = queue.pop_front() {
                component.push(current);
                for next in self.neighbors(current) {
                    if !seen[next as usize] {
                        seen[next as usize] = true;
                        queue.push_back(next);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components
    }

    /// An empty graph counts as connected
    pub fn is_connected(&self) -> bool {
        self.connected_components().len() <= 1
    }

    // ---- geometry ----

    pub fn edge_endpoints(&self, id: EdgeId) -> Option<(Vec2, Vec2)> {
        let edge = self.edge(id)?;
        Some((self.position(edge.a)?, self.position(edge.b)?))
    }

    pub fn edge_length(&self, id: EdgeId) -> Option<f32> {
        let (a, b) = self.edge_endpoints(id)?;
        Some(a.distance(b))
    }

    pub fn edge_midpoint(&self, id: EdgeId) -> Option<Vec2> {
        let (a, b) = self.edge_endpoints(id)?;
        Some(a.lerp(b, 0.5))
    }

    /// Direction of travel from `a` to `b`, radians in (-PI, PI]
    pub fn edge_angle(&self, id: EdgeId) -> Option<f32> {
        let (a, b) = self.edge_endpoints(id)?;
        let d = b - a;
        Some(d.y.atan2(d.x))
    }

    /// Angle in radians [0, PI] between two edges leaving the shared node `at`
    pub fn angle_between(&self, first: EdgeId, second: EdgeId, at: NodeId) -> Option<f32> {
        let origin = self.position(at)?;
        let a = self.position(self.edge(first)?.other(at)?)? - origin;
        let b = self.position(self.edge(second)?.other(at)?)? - origin;
        angle_between_directions(a, b)
    }

    /// Whether two edges cross; edges sharing an endpoint never count
    pub fn edges_intersect(&self, first: EdgeId, second: EdgeId) -> bool {
        let (Some(e1), Some(e2)) = (self.edge(first), self.edge(second)) else {
            return false;
        };
        if e1.shares_endpoint(e2) {
            return false;
        }
        match (self.edge_endpoints(first), self.edge_endpoints(second)) {
            (Some((p1, p2)), Some((p3, p4))) => segments_cross(p1, p2, p3, p4),
            _ => false,
        }
    }

    /// Whether a prospective street `a`-`b` would cross any existing edge
    /// accepted by `filter`; edges touching `a` or `b` are exempt
    pub fn crosses_any(&self, a: NodeId, b: NodeId, filter: impl Fn(&Edge) -> bool) -> bool {
        let (Some(pa), Some(pb)) = (self.position(a), self.position(b)) else {
            return false;
        };

        self.edges()
            .filter(|e| !e.touches(a) && !e.touches(b) && filter(e))
            .any(|e| match (self.position(e.a), self.position(e.b)) {
                (Some(p3), Some(p4)) => segments_cross(pa, pb, p3, p4),
                _ => false,
            })
    }
}

pub fn angle_between_directions(a: Vec2, b: Vec2) -> Option<f32> {
    if a.length_squared() < f32::EPSILON || b.length_squared() < f32::EPSILON {
        return None;
    }
    Some(a.perp_dot(b).atan2(a.dot(b)).abs())
}
