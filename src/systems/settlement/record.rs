// plain-data snapshots of generated settlements, for saving and restoring
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::street::graph::{EdgeId, NodeId, NodeKind, StreetGraph, StreetKind};
use super::{Building, BuildingKind, SettlementId, SettlementLayout};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("node id {0} appears more than once")]
    DuplicateNode(NodeId),
    #[error("edge {edge} references missing node {node}")]
    MissingNode { edge: EdgeId, node: NodeId },
    #[error("edge {0} connects a node to itself")]
    SelfLoop(EdgeId),
    #[error("edge {0} repeats an id or an endpoint pair")]
    DuplicateEdge(EdgeId),
    #[error("counter {counter} is behind existing id {existing}")]
    CounterBehind { counter: u32, existing: u32 },
    #[error("unknown building kind {0:?}")]
    UnknownBuildingKind(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKindRecord {
    Center,
    Gate,
    Main,
    District,
    Alley,
}

impl From<NodeKind> for NodeKindRecord {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Center => NodeKindRecord::Center,
            NodeKind::Gate => NodeKindRecord::Gate,
            NodeKind::Main => NodeKindRecord::Main,
            NodeKind::District => NodeKindRecord::District,
            NodeKind::Alley => NodeKindRecord::Alley,
        }
    }
}

impl From<NodeKindRecord> for NodeKind {
    fn from(kind: NodeKindRecord) -> Self {
        match kind {
            NodeKindRecord::Center => NodeKind::Center,
            NodeKindRecord::Gate => NodeKind::Gate,
            NodeKindRecord::Main => NodeKind::Main,
            NodeKindRecord::District => NodeKind::District,
            NodeKindRecord::Alley => NodeKind::Alley,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreetKindRecord {
    Main,
    District,
    Alley,
}

impl From<StreetKind> for StreetKindRecord {
    fn from(kind: StreetKind) -> Self {
        match kind {
            StreetKind::Main => StreetKindRecord::Main,
            StreetKind::District => StreetKindRecord::District,
            StreetKind::Alley => StreetKindRecord::Alley,
        }
    }
}

impl From<StreetKindRecord> for StreetKind {
    fn from(kind: StreetKindRecord) -> Self {
        match kind {
            StreetKindRecord::Main => StreetKind::Main,
            StreetKindRecord::District => StreetKind::District,
            StreetKindRecord::Alley => StreetKind::Alley,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub position: [f32; 2],
    pub kind: NodeKindRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub a: NodeId,
    pub b: NodeId,
    pub kind: StreetKindRecord,
    pub width: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetGraphRecord {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub next_node_id: NodeId,
    pub next_edge_id: EdgeId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub center: [f32; 2],
    pub width: f32,
    pub depth: f32,
    pub rotation: f32,
    pub kind: String,
    pub block: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: u32,
    pub seed: String,
    pub graph: StreetGraphRecord,
    pub buildings: Vec<BuildingRecord>,
}

impl SettlementRecord {
    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_layout(self) -> Result<SettlementLayout, RecordError> {
        let graph = StreetGraph::from_record(&self.graph)?;
        let buildings = self
            .buildings
            .iter()
            .map(BuildingRecord::to_building)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SettlementLayout {
            id: SettlementId(self.id),
            seed: self.seed,
            graph,
            buildings,
        })
    }
}

impl BuildingRecord {
    pub fn from_building(building: &Building) -> Self {
        Self {
            center: building.center().to_array(),
            width: building.width(),
            depth: building.depth(),
            rotation: building.rotation(),
            kind: building.kind().name().to_string(),
            block: building.block(),
        }
    }

    pub fn to_building(&self) -> Result<Building, RecordError> {
        let kind = BuildingKind::from_name(&self.kind).ok_or_else(|| RecordError::UnknownBuildingKind(self.kind.clone()))?;
        Ok(Building::new(
            Vec2::from_array(self.center),
            self.width,
            self.depth,
            self.rotation,
            kind,
            self.block,
        ))
    }
}

impl SettlementLayout {
    pub fn to_record(&self) -> SettlementRecord {
        SettlementRecord {
            id: self.id.0,
            seed: self.seed.clone(),
            graph: self.graph.to_record(),
            buildings: self.buildings.iter().map(BuildingRecord::from_building).collect(),
        }
    }
}

impl StreetGraph {
    pub fn to_record(&self) -> StreetGraphRecord {
        StreetGraphRecord {
            nodes: self
                .nodes()
                .map(|n| NodeRecord {
                    id: n.id,
                    position: n.position.to_array(),
                    kind: n.kind.into(),
                })
                .collect(),
            edges: self
                .edges()
                .map(|e| EdgeRecord {
                    id: e.id,
                    a: e.a,
                    b: e.b,
                    kind: e.kind.into(),
                    width: e.width,
                })
                .collect(),
            next_node_id: self.next_node_id(),
            next_edge_id: self.next_edge_id(),
        }
    }

    /// Rebuilds a graph keeping every id and both counters; degrees are
    /// recomputed from the edges
    pub fn from_record(record: &StreetGraphRecord) -> Result<Self, RecordError> {
        let mut nodes: Vec<&NodeRecord> = record.nodes.iter().collect();
        nodes.sort_by_key(|n| n.id);
        let mut edges: Vec<&EdgeRecord> = record.edges.iter().collect();
        edges.sort_by_key(|e| e.id);

        if let Some(last) = nodes.last() {
            if record.next_node_id <= last.id {
                return Err(RecordError::CounterBehind { counter: record.next_node_id, existing: last.id });
            }
        }
        if let Some(last) = edges.last() {
            if record.next_edge_id <= last.id {
                return Err(RecordError::CounterBehind { counter: record.next_edge_id, existing: last.id });
            }
        }

        let mut graph = StreetGraph::new();
        for node in nodes {
            if !graph.restore_node(node.id, Vec2::from_array(node.position), node.kind.into()) {
                return Err(RecordError::DuplicateNode(node.id));
            }
        }

        for edge in edges {
            if edge.a == edge.b {
                return Err(RecordError::SelfLoop(edge.id));
            }
            for node in [edge.a, edge.b] {
                if graph.node(node).is_none() {
                    return Err(RecordError::MissingNode { edge: edge.id, node });
                }
            }
            if !graph.restore_edge(edge.id, edge.a, edge.b, edge.kind.into(), edge.width) {
                return Err(RecordError::DuplicateEdge(edge.id));
            }
        }

        graph.reserve_ids(record.next_node_id, record.next_edge_id);
        Ok(graph)
    }
}
