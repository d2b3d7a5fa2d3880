//! R-tree-backed closest-point queries over a graph's edge polylines.

use log::{debug, warn};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::error::{Error, Result};
use crate::geom::{closest_point_on_segment, Location};
use crate::id::Id;
use crate::model::Graph;
use crate::path::EdgePoint;
use crate::polyline::find_floor_index;

#[derive(Clone, Debug)]
struct MeshPoint {
    point: [f64; 2],
    edge_id: Id,
    /// Index `i` such that the sample lies between `locations[i]` and `locations[i+1]`.
    location_index: usize,
}

impl RTreeObject for MeshPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for MeshPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// A bulk-loaded R-tree of sample points along every edge's polyline.
#[derive(Clone, Debug)]
pub struct ClosestPointMesh {
    tree: RTree<MeshPoint>,
}

impl Graph {
    /// A fresh graph with a closest-point mesh built at the given sampling
    /// precision. Calling this again on an already-meshed graph replaces the
    /// mesh with one built at the new precision.
    pub fn with_closest_point_mesh(&self, precision: f64) -> Graph {
        let mut points = Vec::new();

        for node in self.get_all_nodes() {
            if let Some(first_edge_id) = node.edge_ids.first() {
                let edge = self.get_edge(first_edge_id).expect("edge_ids is internally consistent");
                let location_index = if edge.start_node_id == node.id { 0 } else { edge.locations.len() - 2 };
                points.push(MeshPoint { point: [node.location.x, node.location.y], edge_id: first_edge_id.clone(), location_index });
            }
        }

        for edge in self.get_all_edges() {
            if edge.length <= 0.0 {
                continue;
            }
            let n = (edge.length / precision).ceil() as usize;
            if n < 1 {
                continue;
            }
            let step = edge.length / n as f64;
            for i in 1..n {
                let d = i as f64 * step;
                let loc = edge.location_at(d);
                let idx = find_floor_index(&edge.location_distances, d).max(0) as usize;
                points.push(MeshPoint { point: [loc.x, loc.y], edge_id: edge.id.clone(), location_index: idx });
            }
        }

        debug!("built closest-point mesh with {} samples at precision {}", points.len(), precision);
        let tree = RTree::bulk_load(points);
        Graph { nodes: self.nodes.clone(), edges: self.edges.clone(), mesh: Some(ClosestPointMesh { tree }) }
    }

    /// The closest point on any edge's polyline to `location`.
    ///
    /// Uses the mesh built by [`Graph::with_closest_point_mesh`] when present
    /// (approximate nearest-sample lookup refined to the exact point on the
    /// identified segment); otherwise falls back to a linear scan over every
    /// segment of every edge.
    pub fn get_closest_point(&self, location: Location) -> Result<EdgePoint> {
        match &self.mesh {
            Some(mesh) => {
                let nearest = mesh.tree.nearest_neighbor(&[location.x, location.y]).ok_or(Error::EmptyGraphClosestPoint)?;
                let edge = self.get_edge(&nearest.edge_id).expect("mesh references a valid edge");
                let a = edge.locations[nearest.location_index];
                let b = edge.locations[nearest.location_index + 1];
                let proj = closest_point_on_segment(location, a, b);
                Ok(EdgePoint {
                    edge_id: nearest.edge_id.clone(),
                    distance: edge.location_distances[nearest.location_index] + proj.distance_down_segment,
                })
            }
            None => {
                if self.edges.is_empty() {
                    return Err(Error::EmptyGraphClosestPoint);
                }
                warn!("no closest-point mesh built; falling back to a linear scan over all edges");
                let mut best: Option<(f64, Id, usize)> = None;
                for edge in self.get_all_edges() {
                    for i in 0..edge.locations.len() - 1 {
                        let proj = closest_point_on_segment(location, edge.locations[i], edge.locations[i + 1]);
                        if best.as_ref().map_or(true, |(bd, _, _)| proj.distance_from_location < *bd) {
                            best = Some((proj.distance_from_location, edge.id.clone(), i));
                        }
                    }
                }
                let (_, edge_id, i) = best.unwrap();
                let edge = self.get_edge(&edge_id).unwrap();
                let proj = closest_point_on_segment(location, edge.locations[i], edge.locations[i + 1]);
                Ok(EdgePoint { edge_id, distance: edge.location_distances[i] + proj.distance_down_segment })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SimpleEdge, SimpleNode};

    #[test]
    fn closest_point_on_angled_segment() {
        let g = Graph::create(
            vec![
                SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: "B".into(), location: Location::new(12.0, 9.0) },
            ],
            vec![SimpleEdge { id: "AB".into(), start_node_id: "A".into(), end_node_id: "B".into(), inner_locations: vec![] }],
        )
        .unwrap();
        let meshed = g.with_closest_point_mesh(0.25);
        let point = meshed.get_closest_point(Location::new(5.0, 10.0)).unwrap();
        assert_eq!(point.edge_id, Id::from("AB"));
        assert!((point.distance - 10.0).abs() < 0.5);
    }

    #[test]
    fn linear_fallback_without_mesh() {
        let g = Graph::create(
            vec![
                SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: "B".into(), location: Location::new(10.0, 0.0) },
            ],
            vec![SimpleEdge { id: "AB".into(), start_node_id: "A".into(), end_node_id: "B".into(), inner_locations: vec![] }],
        )
        .unwrap();
        let point = g.get_closest_point(Location::new(5.0, 3.0)).unwrap();
        assert_eq!(point.edge_id, Id::from("AB"));
        assert!((point.distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn empty_graph_closest_point_errors() {
        let g = Graph::create(vec![], vec![]).unwrap();
        assert!(matches!(g.get_closest_point(Location::new(0.0, 0.0)), Err(Error::EmptyGraphClosestPoint)));
    }
}
