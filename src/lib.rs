//! Immutable planar graphs with 2-D vertices and polyline edges.
//!
//! A [`model::Graph`] is built once from [`model::SimpleNode`]s and
//! [`model::SimpleEdge`]s and never mutated afterwards. On top of it the
//! crate answers geometric and topological queries: resolving a point partway
//! along an edge to Cartesian coordinates, finding the closest edge-point to
//! an arbitrary location, computing shortest paths between two edge-points,
//! collapsing degree-2 chains, and advancing a path forward by a distance.

pub mod astar;
pub mod coalesce;
pub mod connectivity;
pub mod error;
pub mod geom;
pub mod id;
pub mod model;
pub mod path;
pub mod polyline;
pub mod spatial;

pub use astar::get_shortest_path;
pub use error::{Error, Result};
pub use geom::{closest_point_on_segment, distance, intermediate, Location};
pub use id::Id;
pub use model::{Edge, Graph, Node, SimpleEdge, SimpleNode};
pub use path::{advance_along_locations, advance_along_path, reverse_path, EdgePoint, OrientedEdge, Path};
