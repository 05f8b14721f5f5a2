// street network: the planar graph, its faces, and the growth engine that builds it

pub mod faces;
pub mod graph;
pub mod growth;

pub use faces::Face;
pub use graph::{Edge, EdgeId, EdgeKey, Node, NodeId, NodeKind, StreetGraph, StreetKind};
pub use growth::{grow_streets, GrowthPhase, StreetGrowth};
