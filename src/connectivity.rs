//! Connected component enumeration.

use std::collections::{HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::id::Id;
use crate::model::{Graph, SimpleEdge, SimpleNode};

fn bfs(graph: &Graph, start: &Id) -> (HashSet<Id>, HashSet<Id>) {
    let mut seen_nodes = HashSet::new();
    let mut seen_edges = HashSet::new();
    let mut queue = VecDeque::new();
    seen_nodes.insert(start.clone());
    queue.push_back(start.clone());
    while let Some(node_id) = queue.pop_front() {
        for edge in graph.get_edges_of_node(&node_id).expect("node known to exist") {
            seen_edges.insert(edge.id.clone());
            let other = graph.get_other_endpoint(&edge.id, &node_id).expect("edge endpoint pair is valid");
            if seen_nodes.insert(other.id.clone()) {
                queue.push_back(other.id.clone());
            }
        }
    }
    (seen_nodes, seen_edges)
}

fn component_graph(graph: &Graph, node_ids: &HashSet<Id>, edge_ids: &HashSet<Id>) -> Graph {
    let nodes: Vec<SimpleNode> = graph
        .get_all_nodes()
        .filter(|n| node_ids.contains(&n.id))
        .map(|n| SimpleNode { id: n.id.clone(), location: n.location })
        .collect();
    let edges: Vec<SimpleEdge> = graph
        .get_all_edges()
        .filter(|e| edge_ids.contains(&e.id))
        .map(|e| SimpleEdge {
            id: e.id.clone(),
            start_node_id: e.start_node_id.clone(),
            end_node_id: e.end_node_id.clone(),
            inner_locations: e.inner_locations.clone(),
        })
        .collect();
    Graph::create(nodes, edges).expect("a connected subgraph is always a valid graph")
}

impl Graph {
    /// The connected component containing `node_id`, as a fresh graph
    /// preserving the parent's node/edge insertion order.
    pub fn get_connected_component_of_node(&self, node_id: &Id) -> Result<Graph> {
        if self.get_node(node_id).is_none() {
            return Err(Error::UnknownNodeId(node_id.clone()));
        }
        let (nodes, edges) = bfs(self, node_id);
        Ok(component_graph(self, &nodes, &edges))
    }

    /// All connected components, in order of each component's first-encountered node.
    pub fn get_connected_components(&self) -> Vec<Graph> {
        let mut seen: HashSet<Id> = HashSet::new();
        let mut components = Vec::new();
        for node in self.get_all_nodes() {
            if seen.contains(&node.id) {
                continue;
            }
            let (nodes, edges) = bfs(self, &node.id);
            seen.extend(nodes.iter().cloned());
            components.push(component_graph(self, &nodes, &edges));
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Location;

    #[test]
    fn two_disjoint_components() {
        let g = Graph::create(
            vec![
                SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) },
                SimpleNode { id: "B".into(), location: Location::new(1.0, 0.0) },
                SimpleNode { id: "C".into(), location: Location::new(10.0, 0.0) },
                SimpleNode { id: "D".into(), location: Location::new(11.0, 0.0) },
            ],
            vec![
                SimpleEdge { id: "AB".into(), start_node_id: "A".into(), end_node_id: "B".into(), inner_locations: vec![] },
                SimpleEdge { id: "CD".into(), start_node_id: "C".into(), end_node_id: "D".into(), inner_locations: vec![] },
            ],
        )
        .unwrap();
        let components = g.get_connected_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].get_all_nodes().count(), 2);
        assert_eq!(components[1].get_all_nodes().count(), 2);
    }

    #[test]
    fn unknown_node_errors() {
        let g = Graph::create(vec![SimpleNode { id: "A".into(), location: Location::new(0.0, 0.0) }], vec![]).unwrap();
        assert!(matches!(g.get_connected_component_of_node(&"Z".into()), Err(Error::UnknownNodeId(_))));
    }
}
