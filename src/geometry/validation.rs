//! Boundary validation: vertex count, area, self-intersection, finiteness

use geo::Area;
use geo_types::{Coord, Polygon};
use thiserror::Error;

use super::hex::MAX_MERCATOR_LATITUDE;

/// Area below which a ring counts as collapsed (square degrees)
const MIN_RING_AREA: f64 = 1e-12;

/// Reasons a boundary cannot be tessellated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("boundary has {count} distinct vertices, need at least 3")]
    TooFewVertices { count: usize },

    #[error("boundary encloses zero area")]
    ZeroArea,

    #[error("boundary edges {first} and {second} cross each other")]
    SelfIntersecting { first: usize, second: usize },

    #[error("boundary contains a non-finite or out-of-range coordinate")]
    NonFinite,

    #[error("circle radius {0} km must be positive and finite")]
    InvalidRadius(f64),
}

/// Validate a circular boundary's parameters
pub fn validate_circle(center: Coord<f64>, radius_km: f64) -> Result<(), GeometryError> {
    if !is_valid_lonlat(center) {
        return Err(GeometryError::NonFinite);
    }
    if !(radius_km.is_finite() && radius_km > 0.0) {
        return Err(GeometryError::InvalidRadius(radius_km));
    }
    Ok(())
}

/// Validate the exterior ring of a polygon boundary
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<(), GeometryError> {
    let coords = distinct_ring(&polygon.exterior().0);

    if coords.iter().any(|c| !is_valid_lonlat(*c)) {
        return Err(GeometryError::NonFinite);
    }

    if coords.len() < 3 {
        return Err(GeometryError::TooFewVertices {
            count: coords.len(),
        });
    }

    if let Some((first, second)) = find_self_intersection(&coords) {
        return Err(GeometryError::SelfIntersecting { first, second });
    }

    if polygon.unsigned_area() < MIN_RING_AREA {
        return Err(GeometryError::ZeroArea);
    }

    Ok(())
}

fn is_valid_lonlat(c: Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite() && c.x.abs() <= 180.0 && c.y.abs() <= MAX_MERCATOR_LATITUDE
}

/// Ring vertices without the closing duplicate and without consecutive repeats
fn distinct_ring(ring: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
    for c in ring {
        if coords.last() != Some(c) {
            coords.push(*c);
        }
    }
    while coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords
}

/// Find the first pair of non-adjacent edges that cross
fn find_self_intersection(coords: &[Coord<f64>]) -> Option<(usize, usize)> {
    let n = coords.len();
    if n < 4 {
        return None; // Triangle can't self-intersect
    }

    for i in 0..n {
        let a1 = coords[i];
        let a2 = coords[(i + 1) % n];

        for j in (i + 2)..n {
            // Skip adjacent edges
            if j == (i + n - 1) % n {
                continue;
            }

            let b1 = coords[j];
            let b2 = coords[(j + 1) % n];

            if segments_intersect(a1, a2, b1, b2) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Proper intersection of two segments (touching endpoints do not count)
fn segments_intersect(a1: Coord<f64>, a2: Coord<f64>, b1: Coord<f64>, b2: Coord<f64>) -> bool {
    let d1 = cross_product_sign(b1, b2, a1);
    let d2 = cross_product_sign(b1, b2, a2);
    let d3 = cross_product_sign(a1, a2, b1);
    let d4 = cross_product_sign(a1, a2, b2);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn cross_product_sign(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, LineString};

    #[test]
    fn test_square_is_valid() {
        let square = polygon![
            (x: 100.0, y: 13.0),
            (x: 100.01, y: 13.0),
            (x: 100.01, y: 13.01),
            (x: 100.0, y: 13.01),
        ];
        assert_eq!(validate_polygon(&square), Ok(()));
    }

    #[test]
    fn test_bowtie_is_self_intersecting() {
        let bowtie = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 0.0),
            (x: 0.0, y: 1.0),
        ];
        assert!(matches!(
            validate_polygon(&bowtie),
            Err(GeometryError::SelfIntersecting { .. })
        ));
    }

    #[test]
    fn test_collinear_ring_has_zero_area() {
        let line = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 2.0, y: 2.0),
        ];
        assert_eq!(validate_polygon(&line), Err(GeometryError::ZeroArea));
    }

    #[test]
    fn test_two_points_too_few_vertices() {
        let ring = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        let polygon = Polygon::new(ring, vec![]);
        assert_eq!(
            validate_polygon(&polygon),
            Err(GeometryError::TooFewVertices { count: 2 })
        );
    }

    #[test]
    fn test_nan_vertex_rejected() {
        let polygon = polygon![
            (x: 0.0, y: 0.0),
            (x: f64::NAN, y: 1.0),
            (x: 1.0, y: 0.0),
        ];
        assert_eq!(validate_polygon(&polygon), Err(GeometryError::NonFinite));
    }

    #[test]
    fn test_circle_radius_checks() {
        let center = Coord { x: 100.5, y: 13.7 };
        assert!(validate_circle(center, 1.2).is_ok());
        assert_eq!(validate_circle(center, 0.0), Err(GeometryError::InvalidRadius(0.0)));
        assert!(validate_circle(center, f64::INFINITY).is_err());
        assert_eq!(
            validate_circle(Coord { x: 200.0, y: 0.0 }, 1.0),
            Err(GeometryError::NonFinite)
        );
    }
}
