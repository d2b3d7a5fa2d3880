//! Collapsing maximal degree-2 chains into single polyline edges.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use crate::id::Id;
use crate::model::{Graph, Node, SimpleEdge, SimpleNode};
use crate::path::{reverse_path, OrientedEdge};
use crate::polyline::dedupe_locations;

fn degree(graph: &Graph, id: &Id) -> usize {
    graph.get_node(id).map(|n| n.edge_ids.len()).unwrap_or(0)
}

/// Walk away from `current_node`, following edges through degree-2 nodes,
/// until a non-degree-2 node is reached or the walk loops back to `stop_edge_id`.
/// Returns the extension (not including the stop edge) and whether it looped.
fn extend_chain(graph: &Graph, mut current_node: Id, mut prev_edge_id: Id, stop_edge_id: &Id) -> (Vec<OrientedEdge>, bool) {
    let mut chain = Vec::new();
    loop {
        if degree(graph, &current_node) != 2 {
            return (chain, false);
        }
        let edges = graph.get_edges_of_node(&current_node).expect("node exists");
        let next_edge = match edges.iter().find(|e| e.id != prev_edge_id) {
            Some(e) => *e,
            None => return (chain, false),
        };
        if next_edge.id == *stop_edge_id {
            return (chain, true);
        }
        let is_forward = next_edge.start_node_id == current_node;
        chain.push(OrientedEdge { edge: next_edge.clone(), is_forward });
        current_node = if is_forward { next_edge.end_node_id.clone() } else { next_edge.start_node_id.clone() };
        prev_edge_id = next_edge.id.clone();
    }
}

/// The sequence of vertices visited by `chain`, starting at its overall start node.
fn chain_vertices(chain: &[OrientedEdge]) -> Vec<Id> {
    let mut vertices = Vec::with_capacity(chain.len() + 1);
    vertices.push(if chain[0].is_forward { chain[0].edge.start_node_id.clone() } else { chain[0].edge.end_node_id.clone() });
    for oe in chain {
        vertices.push(if oe.is_forward { oe.edge.end_node_id.clone() } else { oe.edge.start_node_id.clone() });
    }
    vertices
}

fn combine_chain(chain: &[OrientedEdge]) -> SimpleEdge {
    let vertices = chain_vertices(chain);
    let start_node_id = vertices[0].clone();
    let end_node_id = vertices.last().unwrap().clone();
    let id = chain.iter().map(|oe| oe.edge.id.clone()).min().unwrap();

    let mut locations = Vec::new();
    for oe in chain {
        let mut locs = oe.edge.locations.clone();
        if !oe.is_forward {
            locs.reverse();
        }
        locations.extend(locs);
    }
    let locations = dedupe_locations(locations);
    let inner_locations = if locations.len() >= 2 { locations[1..locations.len() - 1].to_vec() } else { vec![] };

    SimpleEdge { id, start_node_id, end_node_id, inner_locations }
}

impl Graph {
    /// A topologically-equivalent graph with no interior degree-2 node except
    /// self-loops: maximal chains of degree-2 vertices collapse into single
    /// polyline edges. Isolated simple cycles collapse to one node with a
    /// self-loop edge.
    pub fn coalesced(&self) -> Graph {
        let edge_order: Vec<Id> = self.edges.keys().cloned().collect();
        let mut consumed: HashSet<Id> = HashSet::new();
        let mut removed_nodes: HashSet<Id> = HashSet::new();
        let mut new_edges: Vec<SimpleEdge> = Vec::new();

        for edge_id in edge_order {
            if consumed.contains(&edge_id) {
                continue;
            }
            let edge = self.edges.get(&edge_id).unwrap();

            let (forward_ext, looped) = extend_chain(self, edge.end_node_id.clone(), edge.id.clone(), &edge.id);
            let chain: Vec<OrientedEdge> = if looped {
                let mut c = vec![OrientedEdge { edge: edge.clone(), is_forward: true }];
                c.extend(forward_ext);
                c
            } else {
                let (backward_ext, _) = extend_chain(self, edge.start_node_id.clone(), edge.id.clone(), &edge.id);
                let mut c = reverse_path(backward_ext);
                c.push(OrientedEdge { edge: edge.clone(), is_forward: true });
                c.extend(forward_ext);
                c
            };

            if chain.len() == 1 {
                let e = &chain[0].edge;
                new_edges.push(SimpleEdge {
                    id: e.id.clone(),
                    start_node_id: e.start_node_id.clone(),
                    end_node_id: e.end_node_id.clone(),
                    inner_locations: e.inner_locations.clone(),
                });
                consumed.insert(e.id.clone());
                continue;
            }

            for oe in &chain {
                consumed.insert(oe.edge.id.clone());
            }
            let vertices = chain_vertices(&chain);
            for v in &vertices[1..vertices.len() - 1] {
                removed_nodes.insert(v.clone());
            }
            new_edges.push(combine_chain(&chain));
        }

        let mut new_nodes: IndexMap<Id, Node> = IndexMap::new();
        for (id, node) in self.nodes.iter() {
            if !removed_nodes.contains(id) {
                new_nodes.insert(id.clone(), node.clone());
            }
        }
        debug!("coalesced {} edges into {}, removed {} interior nodes", self.edges.len(), new_edges.len(), removed_nodes.len());

        let simple_nodes: Vec<SimpleNode> = new_nodes.values().map(|n| SimpleNode { id: n.id.clone(), location: n.location }).collect();
        Graph::create(simple_nodes, new_edges).expect("coalescing preserves a valid graph")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Location;
    use crate::model::SimpleEdge;

    #[test]
    fn collapses_degree_two_chain() {
        let g = Graph::create(
            vec![
                SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: "B".into(), location: Location::new(1.0, 0.0) },
                SimpleNode { id: "C".into(), location: Location::new(2.0, 0.0) },
            ],
            vec![
                SimpleEdge { id: "AB".into(), start_node_id: "A".into(), end_node_id: "B".into(), inner_locations: vec![] },
                SimpleEdge { id: "BC".into(), start_node_id: "B".into(), end_node_id: "C".into(), inner_locations: vec![] },
            ],
        )
        .unwrap();
        let c = g.coalesced();
        assert_eq!(c.get_all_nodes().count(), 2);
        assert_eq!(c.get_all_edges().count(), 1);
        let edge = c.get_all_edges().next().unwrap();
        assert_eq!(edge.id, Id::from("AB"));
        assert_eq!(edge.inner_locations, vec![Location::new(1.0, 0.0)]);
    }

    #[test]
    fn isolated_triangle_collapses_to_self_loop() {
        let g = Graph::create(
            vec![
                SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: "B".into(), location: Location::new(1.0, 0.0) },
                SimpleNode { id: "C".into(), location: Location::new(0.0, 1.0) },
            ],
            vec![
                SimpleEdge { id: "AB".into(), start_node_id: "A".into(), end_node_id: "B".into(), inner_locations: vec![] },
                SimpleEdge { id: "BC".into(), start_node_id: "B".into(), end_node_id: "C".into(), inner_locations: vec![] },
                SimpleEdge { id: "CA".into(), start_node_id: "C".into(), end_node_id: "A".into(), inner_locations: vec![] },
            ],
        )
        .unwrap();
        let c = g.coalesced();
        assert_eq!(c.get_all_nodes().count(), 1);
        assert_eq!(c.get_all_edges().count(), 1);
        let edge = c.get_all_edges().next().unwrap();
        assert_eq!(edge.start_node_id, edge.end_node_id);
        assert_eq!(edge.inner_locations, vec![Location::new(1.0, 0.0), Location::new(0.0, 1.0)]);
    }

    #[test]
    fn idempotent() {
        let g = Graph::create(
            vec![
                SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: "B".into(), location: Location::new(1.0, 0.0) },
                SimpleNode { id: "C".into(), location: Location::new(2.0, 0.0) },
                SimpleNode { id: "D".into(), location: Location::new(2.0, 5.0) },
            ],
            vec![
                SimpleEdge { id: "AB".into(), start_node_id: "A".into(), end_node_id: "B".into(), inner_locations: vec![] },
                SimpleEdge { id: "BC".into(), start_node_id: "B".into(), end_node_id: "C".into(), inner_locations: vec![] },
                SimpleEdge { id: "CD".into(), start_node_id: "C".into(), end_node_id: "D".into(), inner_locations: vec![] },
            ],
        )
        .unwrap();
        let once = g.coalesced();
        let twice = once.coalesced();
        assert_eq!(once.get_all_nodes().count(), twice.get_all_nodes().count());
        assert_eq!(once.get_all_edges().count(), twice.get_all_edges().count());
    }
}
