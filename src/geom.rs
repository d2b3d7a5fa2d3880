//! Geometry primitives: distance, interpolation and segment projection.

use serde::{Deserialize, Serialize};

/// A 2-D Cartesian point. Equality is bitwise float equality.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<geo::Coordinate<f64>> for Location {
    fn from(c: geo::Coordinate<f64>) -> Self {
        Location::new(c.x, c.y)
    }
}

impl From<Location> for geo::Coordinate<f64> {
    fn from(loc: Location) -> Self {
        geo::Coordinate { x: loc.x, y: loc.y }
    }
}

/// Euclidean distance between two locations.
pub fn distance(a: Location, b: Location) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// The point at distance `d` from `a` along the segment `a`→`b`, clamped to
/// the segment. If `a == b` the result is `a` regardless of `d`.
pub fn intermediate(a: Location, b: Location, d: f64) -> Location {
    let l = distance(a, b);
    let t = if l == 0.0 { 0.0 } else { (d / l).clamp(0.0, 1.0) };
    Location::new((1.0 - t) * a.x + t * b.x, (1.0 - t) * a.y + t * b.y)
}

/// Projection of `p` onto the segment `a`→`b`, clamped to the segment.
///
/// Returns the distance from `a` down the segment to the projected point,
/// and the perpendicular (straight-line) distance from `p` to that point.
pub struct SegmentProjection {
    pub distance_down_segment: f64,
    pub distance_from_location: f64,
}

pub fn closest_point_on_segment(p: Location, a: Location, b: Location) -> SegmentProjection {
    let l = distance(a, b);
    if l == 0.0 {
        return SegmentProjection {
            distance_down_segment: 0.0,
            distance_from_location: distance(p, a),
        };
    }
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let apx = p.x - a.x;
    let apy = p.y - a.y;
    let t = ((apx * abx + apy * aby) / (l * l)).clamp(0.0, 1.0);
    let proj = Location::new(a.x + t * abx, a.y + t * aby);
    SegmentProjection {
        distance_down_segment: t * l,
        distance_from_location: distance(p, proj),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(Location::new(0.0, 0.0), Location::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn intermediate_clamps() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(10.0, 0.0);
        assert_eq!(intermediate(a, b, -5.0), a);
        assert_eq!(intermediate(a, b, 15.0), b);
        assert_eq!(intermediate(a, b, 5.0), Location::new(5.0, 0.0));
    }

    #[test]
    fn intermediate_zero_length() {
        let a = Location::new(1.0, 1.0);
        assert_eq!(intermediate(a, a, 5.0), a);
    }

    #[test]
    fn closest_point_clamps_to_segment() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(10.0, 0.0);
        let p = Location::new(-3.0, 4.0);
        let proj = closest_point_on_segment(p, a, b);
        assert_eq!(proj.distance_down_segment, 0.0);
        assert_eq!(proj.distance_from_location, 5.0);
    }

    #[test]
    fn closest_point_interior() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(12.0, 9.0);
        let p = Location::new(5.0, 10.0);
        let proj = closest_point_on_segment(p, a, b);
        assert!((proj.distance_down_segment - 10.0).abs() < 1e-9);
    }
}
