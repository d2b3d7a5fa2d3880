//! Modified A* shortest paths between two edge-points.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use noisy_float::prelude::{n64, N64};
use priority_queue::PriorityQueue;

use crate::error::{Error, Result};
use crate::geom::distance;
use crate::id::Id;
use crate::model::{Edge, Graph};
use crate::path::{build_path_locations, canonicalize, locations_on_edge_interval, EdgePoint, OrientedEdge, Path};

impl Graph {
    /// Shortest path between two edge-points. See the free function
    /// [`get_shortest_path`] for the algorithm.
    pub fn get_shortest_path(&self, start: &EdgePoint, end: &EdgePoint) -> Result<Path> {
        get_shortest_path(self, start, end)
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum Vertex {
    Node(Id),
    /// Synthetic goal vertex reached once a candidate route to `end` beats the best known one.
    Goal,
}

/// Shortest path from `start` to `end`, both edge-points.
///
/// Runs a modified A* over the graph's vertices with `start`/`end` spliced in
/// as initial/terminal legs, then checks whether a direct traversal of a
/// shared edge beats the graph-wide result (see scenario where a detour via
/// another edge is shorter than going straight down the shared one).
pub fn get_shortest_path(graph: &Graph, start: &EdgePoint, end: &EdgePoint) -> Result<Path> {
    let start_edge = graph.get_edge(&start.edge_id).ok_or_else(|| Error::UnknownEdgeId(start.edge_id.clone()))?;
    let end_edge = graph.get_edge(&end.edge_id).ok_or_else(|| Error::UnknownEdgeId(end.edge_id.clone()))?;
    let end_location = end_edge.location_at(end.distance);

    let mut dist: HashMap<Id, f64> = HashMap::new();
    let mut came_from: HashMap<Id, Edge> = HashMap::new();
    let mut done: HashSet<Id> = HashSet::new();
    let mut queue: PriorityQueue<Vertex, N64> = PriorityQueue::new();

    let heuristic = |loc: crate::geom::Location| distance(loc, end_location);

    for (node_id, d) in [
        (start_edge.start_node_id.clone(), start.distance),
        (start_edge.end_node_id.clone(), start_edge.length - start.distance),
    ] {
        let improve = dist.get(&node_id).map_or(true, |&cur| d < cur);
        if improve {
            dist.insert(node_id.clone(), d);
            let loc = graph.get_node(&node_id).expect("edge endpoints exist").location;
            queue.push(Vertex::Node(node_id), n64(-(d + heuristic(loc))));
        }
    }

    let mut end_distance_from_start = f64::INFINITY;
    let mut end_edge_is_forward = true;

    loop {
        let (vertex, _) = match queue.pop() {
            Some(v) => v,
            None => {
                return Err(Error::NoPath { start: start.edge_id.clone(), end: end.edge_id.clone() });
            }
        };
        match vertex {
            Vertex::Goal => {
                trace!("a* reached goal at distance {}", end_distance_from_start);
                let path = reconstruct(graph, start, end, start_edge, end_edge, &came_from, end_edge_is_forward, end_distance_from_start)?;
                let path = canonicalize(path);
                return apply_same_edge_shortcut(graph, start, end, path);
            }
            Vertex::Node(node_id) => {
                if done.contains(&node_id) {
                    continue;
                }
                done.insert(node_id.clone());
                let d = *dist.get(&node_id).unwrap();

                for edge in graph.get_edges_of_node(&node_id)? {
                    let other = graph.get_other_endpoint(&edge.id, &node_id)?;
                    if done.contains(&other.id) {
                        continue;
                    }
                    let nd = d + edge.length;
                    let improve = dist.get(&other.id).map_or(true, |&cur| nd < cur);
                    if improve {
                        dist.insert(other.id.clone(), nd);
                        came_from.insert(other.id.clone(), edge.clone());
                        queue.push(Vertex::Node(other.id.clone()), n64(-(nd + heuristic(other.location))));
                    }
                }

                if node_id == end_edge.start_node_id {
                    let total = d + end.distance;
                    if total < end_distance_from_start {
                        end_distance_from_start = total;
                        end_edge_is_forward = true;
                        queue.push(Vertex::Goal, n64(-total));
                    }
                }
                if node_id == end_edge.end_node_id {
                    let total = d + (end_edge.length - end.distance);
                    if total < end_distance_from_start {
                        end_distance_from_start = total;
                        end_edge_is_forward = false;
                        queue.push(Vertex::Goal, n64(-total));
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn reconstruct(
    graph: &Graph,
    start: &EdgePoint,
    end: &EdgePoint,
    start_edge: &Edge,
    end_edge: &Edge,
    came_from: &HashMap<Id, Edge>,
    end_edge_is_forward: bool,
    length: f64,
) -> Result<Path> {
    let mut oriented_edges_rev = vec![OrientedEdge { edge: end_edge.clone(), is_forward: end_edge_is_forward }];
    let mut nodes_rev = Vec::new();

    let mut current = if end_edge_is_forward { end_edge.start_node_id.clone() } else { end_edge.end_node_id.clone() };

    while let Some(edge) = came_from.get(&current) {
        let is_forward = edge.end_node_id == current;
        nodes_rev.push(graph.get_node(&current).expect("visited node exists").clone());
        oriented_edges_rev.push(OrientedEdge { edge: edge.clone(), is_forward });
        current = if is_forward { edge.start_node_id.clone() } else { edge.end_node_id.clone() };
    }

    nodes_rev.push(graph.get_node(&current).expect("visited node exists").clone());

    let start_is_forward = if start_edge.start_node_id == start_edge.end_node_id {
        start.distance < start_edge.length / 2.0
    } else {
        current == start_edge.end_node_id
    };
    oriented_edges_rev.push(OrientedEdge { edge: start_edge.clone(), is_forward: start_is_forward });

    oriented_edges_rev.reverse();
    nodes_rev.reverse();

    let locations = build_path_locations(start, end, &oriented_edges_rev);
    Ok(Path { start: start.clone(), end: end.clone(), oriented_edges: oriented_edges_rev, nodes: nodes_rev, locations, length })
}

fn same_edge_path(graph: &Graph, start: &EdgePoint, end: &EdgePoint) -> Result<Path> {
    let edge = graph.get_edge(&start.edge_id).expect("edge checked by caller").clone();
    let is_forward = start.distance <= end.distance;
    let locations = locations_on_edge_interval(&edge, start.distance, end.distance);
    Ok(Path {
        start: start.clone(),
        end: end.clone(),
        oriented_edges: vec![OrientedEdge { edge, is_forward }],
        nodes: vec![],
        locations,
        length: (start.distance - end.distance).abs(),
    })
}

fn apply_same_edge_shortcut(graph: &Graph, start: &EdgePoint, end: &EdgePoint, astar_path: Path) -> Result<Path> {
    if start.edge_id == end.edge_id {
        let direct = (start.distance - end.distance).abs();
        if direct <= astar_path.length {
            debug!("same-edge shortcut beats a* route ({} <= {})", direct, astar_path.length);
            return same_edge_path(graph, start, end);
        }
    }
    Ok(astar_path)
}
