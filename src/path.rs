//! Points, oriented edges and paths on a graph.

use crate::error::{Error, Result};
use crate::geom::{distance, Location};
use crate::id::Id;
use crate::model::{Edge, Node};
use crate::polyline::{dedupe_locations, find_floor_index};

/// A point on an edge's polyline, parameterized by distance from its start node.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgePoint {
    pub edge_id: Id,
    pub distance: f64,
}

/// An edge together with a traversal direction. `is_forward` means start→end.
#[derive(Clone, Debug, PartialEq)]
pub struct OrientedEdge {
    pub edge: Edge,
    pub is_forward: bool,
}

/// A route through the graph from one edge-point to another.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub start: EdgePoint,
    pub end: EdgePoint,
    /// Non-empty; consecutive entries share a junction node.
    pub oriented_edges: Vec<OrientedEdge>,
    /// Interior junction nodes; `nodes.len() == oriented_edges.len() - 1`.
    pub nodes: Vec<Node>,
    pub locations: Vec<Location>,
    pub length: f64,
}

/// Reverse a sequence of oriented edges, flipping each one's direction.
pub fn reverse_path(mut oriented_edges: Vec<OrientedEdge>) -> Vec<OrientedEdge> {
    oriented_edges.reverse();
    for oe in &mut oriented_edges {
        oe.is_forward = !oe.is_forward;
    }
    oriented_edges
}

/// The sub-polyline of `edge` from distance `d1` to `d2`, in that directional order.
pub fn locations_on_edge_interval(edge: &Edge, d1: f64, d2: f64) -> Vec<Location> {
    if d1 == d2 {
        return vec![edge.location_at(d1)];
    }
    let (min, max) = if d1 < d2 { (d1, d2) } else { (d2, d1) };
    let i_min = find_floor_index(&edge.location_distances, min).max(0) as usize;
    let i_max = find_floor_index(&edge.location_distances, max).max(0) as usize;
    let mut middle: Vec<Location> = edge.locations[(i_min + 1).min(edge.locations.len())..(i_max + 1).min(edge.locations.len())].to_vec();
    if d2 < d1 {
        middle.reverse();
    }
    let mut out = Vec::with_capacity(middle.len() + 2);
    out.push(edge.location_at(d1));
    out.extend(middle);
    out.push(edge.location_at(d2));
    dedupe_locations(out)
}

/// Concatenate the directional polyline slices of a sequence of oriented
/// edges traversed from `start` to `end`.
pub(crate) fn build_path_locations(start: &EdgePoint, end: &EdgePoint, oriented_edges: &[OrientedEdge]) -> Vec<Location> {
    if oriented_edges.len() == 1 {
        return locations_on_edge_interval(&oriented_edges[0].edge, start.distance, end.distance);
    }
    let mut locs = Vec::new();
    let first = &oriented_edges[0];
    let first_far = if first.is_forward { first.edge.length } else { 0.0 };
    locs.extend(locations_on_edge_interval(&first.edge, start.distance, first_far));
    for oe in &oriented_edges[1..oriented_edges.len() - 1] {
        let mut seg = oe.edge.locations.clone();
        if !oe.is_forward {
            seg.reverse();
        }
        locs.extend(seg);
    }
    let last = &oriented_edges[oriented_edges.len() - 1];
    let last_near = if last.is_forward { 0.0 } else { last.edge.length };
    locs.extend(locations_on_edge_interval(&last.edge, last_near, end.distance));
    dedupe_locations(locs)
}

fn is_trivial_prefix(oe: &OrientedEdge, point: &EdgePoint) -> bool {
    if oe.is_forward {
        point.distance >= oe.edge.length
    } else {
        point.distance <= 0.0
    }
}

fn is_trivial_suffix(oe: &OrientedEdge, point: &EdgePoint) -> bool {
    if oe.is_forward {
        point.distance <= 0.0
    } else {
        point.distance >= oe.edge.length
    }
}

/// Strip degenerate zero-length prefix/suffix legs produced by representing a
/// vertex as an edge-point with `distance == 0` or `distance == length`.
pub(crate) fn canonicalize(path: Path) -> Path {
    if path.oriented_edges.len() < 2 {
        return path;
    }
    let first = &path.oriented_edges[0];
    let last = path.oriented_edges.last().unwrap();
    let trivial_prefix = is_trivial_prefix(first, &path.start);
    let trivial_suffix = is_trivial_suffix(last, &path.end);

    if !trivial_prefix && !trivial_suffix {
        return path;
    }

    if trivial_prefix && trivial_suffix && path.nodes.len() == 1 {
        let last_oe = path.oriented_edges.last().unwrap().clone();
        return Path {
            start: path.end.clone(),
            end: path.end,
            oriented_edges: vec![last_oe],
            nodes: vec![],
            locations: vec![path.locations.last().copied().unwrap()],
            length: 0.0,
        };
    }

    let mut oriented_edges = path.oriented_edges;
    let mut nodes = path.nodes;
    let mut start = path.start;
    let end = path.end;

    if trivial_prefix {
        oriented_edges.remove(0);
        nodes.remove(0);
        let new_first = &oriented_edges[0];
        start = EdgePoint {
            edge_id: new_first.edge.id.clone(),
            distance: if new_first.is_forward { 0.0 } else { new_first.edge.length },
        };
    }
    let mut end = end;
    if trivial_suffix {
        oriented_edges.pop();
        nodes.pop();
        let new_last = oriented_edges.last().unwrap();
        end = EdgePoint {
            edge_id: new_last.edge.id.clone(),
            distance: if new_last.is_forward { new_last.edge.length } else { 0.0 },
        };
    }

    let locations = build_path_locations(&start, &end, &oriented_edges);
    Path { start, end, oriented_edges, nodes, locations, length: path.length }
}

impl Path {
    /// Advance this path forward by `d`. See the free function [`advance_along_path`].
    pub fn advance(&self, d: f64) -> Result<Path> {
        advance_along_path(self, d)
    }
}

/// Advance a bare list of locations forward by `d`, splitting the segment it lands in.
pub fn advance_along_locations(locations: &[Location], d: f64) -> Result<Vec<Location>> {
    if d < 0.0 {
        return Err(Error::NegativeDistance(d));
    }
    if d == 0.0 {
        return Ok(locations.to_vec());
    }
    let mut remaining = d;
    for i in 0..locations.len() - 1 {
        let seg_len = distance(locations[i], locations[i + 1]);
        if remaining < seg_len {
            let split = crate::geom::intermediate(locations[i], locations[i + 1], remaining);
            let mut out = vec![split];
            out.extend_from_slice(&locations[i + 1..]);
            return Ok(out);
        }
        remaining -= seg_len;
    }
    Ok(vec![*locations.last().unwrap()])
}

/// Advance a path forward by `d` along its own length.
pub fn advance_along_path(path: &Path, d: f64) -> Result<Path> {
    if d < 0.0 {
        return Err(Error::NegativeDistance(d));
    }
    if d == 0.0 {
        return Ok(path.clone());
    }
    if d >= path.length {
        let last_oe = path.oriented_edges.last().unwrap().clone();
        return Ok(Path {
            start: path.end.clone(),
            end: path.end.clone(),
            oriented_edges: vec![last_oe],
            nodes: vec![],
            locations: vec![*path.locations.last().unwrap()],
            length: 0.0,
        });
    }

    let mut remaining = d;
    let mut oriented_edges = path.oriented_edges.clone();
    let mut nodes = path.nodes.clone();

    // Residual distance remaining on the first oriented edge, in its own traversal direction.
    let first = &oriented_edges[0];
    let residual_on_first = if first.is_forward {
        first.edge.length - path.start.distance
    } else {
        path.start.distance
    };

    let mut new_start_distance_on_first = if first.is_forward {
        path.start.distance + remaining.min(residual_on_first)
    } else {
        path.start.distance - remaining.min(residual_on_first)
    };

    if remaining < residual_on_first {
        let start = EdgePoint { edge_id: first.edge.id.clone(), distance: new_start_distance_on_first };
        let locations = advance_along_locations(&path.locations, d)?;
        return Ok(Path { start, end: path.end.clone(), oriented_edges, nodes, locations, length: path.length - d });
    }

    remaining -= residual_on_first;
    oriented_edges.remove(0);
    if !nodes.is_empty() {
        nodes.remove(0);
    }

    loop {
        let oe = &oriented_edges[0];
        if oriented_edges.len() == 1 {
            new_start_distance_on_first = if oe.is_forward { remaining } else { oe.edge.length - remaining };
            break;
        }
        if remaining < oe.edge.length {
            new_start_distance_on_first = if oe.is_forward { remaining } else { oe.edge.length - remaining };
            break;
        }
        remaining -= oe.edge.length;
        oriented_edges.remove(0);
        if !nodes.is_empty() {
            nodes.remove(0);
        }
    }

    let start = EdgePoint { edge_id: oriented_edges[0].edge.id.clone(), distance: new_start_distance_on_first };
    let locations = advance_along_locations(&path.locations, d)?;
    Ok(Path { start, end: path.end.clone(), oriented_edges, nodes, locations, length: path.length - d })
}
