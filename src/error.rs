//! The crate's single error type.

use thiserror::Error;

use crate::id::Id;

/// Every way a [`crate::model::Graph`] operation can fail.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("duplicate node id {0}")]
    DuplicateNodeId(Id),
    #[error("duplicate edge id {0}")]
    DuplicateEdgeId(Id),
    #[error("edge references unknown node {0}")]
    UnknownReferencedNode(Id),
    #[error("unknown node id {0}")]
    UnknownNodeId(Id),
    #[error("unknown edge id {0}")]
    UnknownEdgeId(Id),
    #[error("node {node} is not an endpoint of edge {edge}")]
    NotAnEndpoint { edge: Id, node: Id },
    #[error("no path from edge {start} to edge {end}")]
    NoPath { start: Id, end: Id },
    #[error("distance must not be negative, got {0}")]
    NegativeDistance(f64),
    #[error("cannot find closest point in a graph with no edges")]
    EmptyGraphClosestPoint,
}

pub type Result<T> = std::result::Result<T, Error>;
