//! The graph data model: nodes, edges, and the graph itself.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geom::Location;
use crate::id::Id;
use crate::path::EdgePoint;
use crate::polyline::{cumulative_distances, find_floor_index};
use crate::spatial::ClosestPointMesh;

/// A node as supplied by the caller, before derived fields are computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleNode {
    pub id: Id,
    pub location: Location,
}

/// An edge as supplied by the caller, before derived fields are computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleEdge {
    pub id: Id,
    pub start_node_id: Id,
    pub end_node_id: Id,
    #[serde(default)]
    pub inner_locations: Vec<Location>,
}

/// A node, with the ids of its incident edges in construction order.
///
/// A self-loop appears twice in `edge_ids`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: Id,
    pub location: Location,
    pub edge_ids: Vec<Id>,
}

/// An edge, with its polyline geometry fully resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: Id,
    pub start_node_id: Id,
    pub end_node_id: Id,
    pub inner_locations: Vec<Location>,
    /// `[start.location] ++ inner_locations ++ [end.location]`.
    pub locations: Vec<Location>,
    /// Cumulative distance along `locations`; same length as `locations`.
    pub location_distances: Vec<f64>,
    /// Total polyline length; equal to `location_distances`'s last element.
    pub length: f64,
}

impl Edge {
    /// The Cartesian location at `distance` along this edge's polyline.
    /// Clamps below 0 and at/above `length`, exactly like [`Graph::get_location`].
    pub fn location_at(&self, distance: f64) -> Location {
        if distance < 0.0 {
            return self.locations[0];
        }
        if distance >= self.length {
            return *self.locations.last().unwrap();
        }
        let i = find_floor_index(&self.location_distances, distance).max(0) as usize;
        crate::geom::intermediate(self.locations[i], self.locations[i + 1], distance - self.location_distances[i])
    }
}

/// An immutable planar graph of 2-D nodes connected by polyline edges.
///
/// Constructed once via [`Graph::create`] and never mutated afterwards.
/// Derived views (`coalesced`, `with_closest_point_mesh`, connected
/// components) return independent fresh instances.
#[derive(Clone, Debug)]
pub struct Graph {
    pub(crate) nodes: IndexMap<Id, Node>,
    pub(crate) edges: IndexMap<Id, Edge>,
    pub(crate) mesh: Option<ClosestPointMesh>,
}

impl Graph {
    /// Validate and construct a graph from simple nodes and edges.
    ///
    /// Fails if any node or edge id repeats, or an edge references a node id
    /// that is not present in `nodes`.
    pub fn create(nodes: Vec<SimpleNode>, edges: Vec<SimpleEdge>) -> Result<Graph> {
        let mut node_map: IndexMap<Id, Node> = IndexMap::with_capacity(nodes.len());
        for n in nodes {
            if node_map.contains_key(&n.id) {
                return Err(Error::DuplicateNodeId(n.id));
            }
            node_map.insert(
                n.id.clone(),
                Node { id: n.id, location: n.location, edge_ids: Vec::new() },
            );
        }

        let mut edge_map: IndexMap<Id, Edge> = IndexMap::with_capacity(edges.len());
        for se in edges {
            if edge_map.contains_key(&se.id) {
                return Err(Error::DuplicateEdgeId(se.id));
            }
            let start = node_map
                .get(&se.start_node_id)
                .ok_or_else(|| Error::UnknownReferencedNode(se.start_node_id.clone()))?;
            let end = node_map
                .get(&se.end_node_id)
                .ok_or_else(|| Error::UnknownReferencedNode(se.end_node_id.clone()))?;

            let mut locations = Vec::with_capacity(se.inner_locations.len() + 2);
            locations.push(start.location);
            locations.extend_from_slice(&se.inner_locations);
            locations.push(end.location);
            let location_distances = cumulative_distances(&locations);
            let length = *location_distances.last().unwrap();

            // Pushed unconditionally for both endpoints: a self-loop naturally
            // ends up with two entries since start_node_id == end_node_id.
            node_map.get_mut(&se.start_node_id).unwrap().edge_ids.push(se.id.clone());
            node_map.get_mut(&se.end_node_id).unwrap().edge_ids.push(se.id.clone());

            edge_map.insert(
                se.id.clone(),
                Edge {
                    id: se.id,
                    start_node_id: se.start_node_id,
                    end_node_id: se.end_node_id,
                    inner_locations: se.inner_locations,
                    locations,
                    location_distances,
                    length,
                },
            );
        }

        debug!("constructed graph with {} nodes and {} edges", node_map.len(), edge_map.len());
        Ok(Graph { nodes: node_map, edges: edge_map, mesh: None })
    }

    /// All nodes, in construction order.
    pub fn get_all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges, in construction order.
    pub fn get_all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Look up a node. Returns `None` for an unknown id; this is not an error.
    pub fn get_node(&self, id: &Id) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up an edge. Returns `None` for an unknown id; this is not an error.
    pub fn get_edge(&self, id: &Id) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Edges incident to a node, in the order they were added during construction.
    pub fn get_edges_of_node(&self, id: &Id) -> Result<Vec<&Edge>> {
        let node = self.get_node(id).ok_or_else(|| Error::UnknownNodeId(id.clone()))?;
        Ok(node
            .edge_ids
            .iter()
            .map(|eid| self.edges.get(eid).expect("edge_ids is internally consistent"))
            .collect())
    }

    /// The `(start, end)` nodes of an edge.
    pub fn get_endpoints_of_edge(&self, id: &Id) -> Result<(&Node, &Node)> {
        let edge = self.get_edge(id).ok_or_else(|| Error::UnknownEdgeId(id.clone()))?;
        let start = self.nodes.get(&edge.start_node_id).expect("edge references a valid start node");
        let end = self.nodes.get(&edge.end_node_id).expect("edge references a valid end node");
        Ok((start, end))
    }

    /// The endpoint of `edge_id` other than `node_id`. For a self-loop, returns the sole endpoint.
    pub fn get_other_endpoint(&self, edge_id: &Id, node_id: &Id) -> Result<&Node> {
        let edge = self.get_edge(edge_id).ok_or_else(|| Error::UnknownEdgeId(edge_id.clone()))?;
        if &edge.start_node_id == node_id {
            Ok(self.nodes.get(&edge.end_node_id).expect("edge references a valid end node"))
        } else if &edge.end_node_id == node_id {
            Ok(self.nodes.get(&edge.start_node_id).expect("edge references a valid start node"))
        } else {
            Err(Error::NotAnEndpoint { edge: edge_id.clone(), node: node_id.clone() })
        }
    }

    /// For each edge incident to `node_id`, the node at its other end.
    pub fn get_neighbors(&self, node_id: &Id) -> Result<Vec<&Node>> {
        let edges = self.get_edges_of_node(node_id)?;
        edges.into_iter().map(|e| self.get_other_endpoint(&e.id, node_id)).collect()
    }

    /// The Cartesian location of a point on an edge.
    ///
    /// Distances below 0 clamp to the start node's location; distances at or
    /// above the edge's length clamp to the end node's location (the `>=`
    /// comparison is deliberate: it guarantees exact equality with the stored
    /// node location despite floating-point accumulation in `length`).
    pub fn get_location(&self, point: &EdgePoint) -> Result<Location> {
        let edge = self.get_edge(&point.edge_id).ok_or_else(|| Error::UnknownEdgeId(point.edge_id.clone()))?;
        Ok(edge.location_at(point.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        Graph::create(
            vec![
                SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: "B".into(), location: Location::new(15.0, 0.0) },
                SimpleNode { id: "C".into(), location: Location::new(0.0, 20.0) },
            ],
            vec![
                SimpleEdge { id: "AB".into(), start_node_id: "A".into(), end_node_id: "B".into(), inner_locations: vec![] },
                SimpleEdge { id: "BC".into(), start_node_id: "B".into(), end_node_id: "C".into(), inner_locations: vec![] },
                SimpleEdge { id: "CA".into(), start_node_id: "C".into(), end_node_id: "A".into(), inner_locations: vec![] },
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_node_id_rejected() {
        let err = Graph::create(
            vec![
                SimpleNode { id: 0i64.into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: 0i64.into(), location: Location::new(0.0, 1.0) },
            ],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, Error::DuplicateNodeId(0i64.into()));
    }

    #[test]
    fn unknown_referenced_node_rejected() {
        let err = Graph::create(
            vec![SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) }],
            vec![SimpleEdge { id: "AB".into(), start_node_id: "A".into(), end_node_id: "B".into(), inner_locations: vec![] }],
        )
        .unwrap_err();
        assert_eq!(err, Error::UnknownReferencedNode("B".into()));
    }

    #[test]
    fn edge_length_with_inner_location() {
        let g = Graph::create(
            vec![
                SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: "B".into(), location: Location::new(0.0, 6.0) },
            ],
            vec![SimpleEdge {
                id: "AB".into(),
                start_node_id: "A".into(),
                end_node_id: "B".into(),
                inner_locations: vec![Location::new(4.0, 3.0)],
            }],
        )
        .unwrap();
        assert_eq!(g.get_edge(&"AB".into()).unwrap().length, 10.0);
    }

    #[test]
    fn get_location_endpoint_exact_despite_float_round_off() {
        let g = Graph::create(
            vec![
                SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: "B".into(), location: Location::new(2.0 / 3.0, 1.0 / 3.0) },
            ],
            vec![SimpleEdge {
                id: "AB".into(),
                start_node_id: "A".into(),
                end_node_id: "B".into(),
                inner_locations: vec![Location::new(2.0 / 3.0, 0.0)],
            }],
        )
        .unwrap();
        let edge = g.get_edge(&"AB".into()).unwrap();
        let loc = g.get_location(&EdgePoint { edge_id: "AB".into(), distance: edge.length }).unwrap();
        assert_eq!(loc, Location::new(2.0 / 3.0, 1.0 / 3.0));
    }

    #[test]
    fn node_edge_ids_in_construction_order() {
        let g = triangle();
        assert_eq!(
            g.get_node(&"A".into()).unwrap().edge_ids,
            vec![Id::from("AB"), Id::from("CA")]
        );
    }

    #[test]
    fn not_an_endpoint_error() {
        let g = triangle();
        let err = g.get_other_endpoint(&"AB".into(), &"C".into()).unwrap_err();
        assert!(matches!(err, Error::NotAnEndpoint { .. }));
    }

    #[test]
    fn edge_round_trips_through_json() {
        let g = triangle();
        let edge = g.get_edge(&"AB".into()).unwrap();
        let json = serde_json::to_string(edge).unwrap();
        let back: Edge = serde_json::from_str(&json).unwrap();
        assert_eq!(*edge, back);
    }

    #[test]
    fn simple_edge_defaults_missing_inner_locations() {
        let json = r#"{"id":"AB","start_node_id":"A","end_node_id":"B"}"#;
        let se: SimpleEdge = serde_json::from_str(json).unwrap();
        assert_eq!(se.inner_locations, Vec::<Location>::new());
    }
}
