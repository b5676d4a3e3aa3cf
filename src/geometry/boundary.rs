//! Region boundaries: a geodesic circle or an arbitrary lon/lat polygon

use geo::HaversineDestination;
use geo_types::{Coord, LineString, Point, Polygon};

use super::validation::{validate_circle, validate_polygon, GeometryError};

/// Geographic boundary of a region, in lon/lat degrees
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    /// Circle of `radius_km` around `center` (lon, lat)
    Circle { center: Coord<f64>, radius_km: f64 },
    /// Arbitrary polygon; only the exterior ring is tessellated against
    Polygon(Polygon<f64>),
}

impl Boundary {
    pub fn circle(lon: f64, lat: f64, radius_km: f64) -> Self {
        Boundary::Circle {
            center: Coord { x: lon, y: lat },
            radius_km,
        }
    }

    /// Build a polygon boundary from a `[lon, lat]` ring (closing is optional)
    pub fn from_ring(ring: &[[f64; 2]]) -> Self {
        let coords: Vec<Coord<f64>> = ring.iter().map(|[x, y]| Coord { x: *x, y: *y }).collect();
        Boundary::Polygon(Polygon::new(LineString::new(coords), vec![]))
    }

    /// Representative point: the circle center or the ring's vertex centroid
    pub fn anchor(&self) -> Coord<f64> {
        match self {
            Boundary::Circle { center, .. } => *center,
            Boundary::Polygon(polygon) => {
                let ring = &polygon.exterior().0;
                let vertices = if ring.len() > 1 { &ring[..ring.len() - 1] } else { &ring[..] };
                if vertices.is_empty() {
                    return Coord { x: 0.0, y: 0.0 };
                }
                let n = vertices.len() as f64;
                let (sx, sy) = vertices.iter().fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
                Coord { x: sx / n, y: sy / n }
            }
        }
    }

    /// Check the boundary can be tessellated
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Boundary::Circle { center, radius_km } => validate_circle(*center, *radius_km),
            Boundary::Polygon(polygon) => validate_polygon(polygon),
        }
    }

    /// Lon/lat polygon of the boundary, validated first
    ///
    /// Circles are approximated by `steps` points placed along great-circle
    /// bearings from the center.
    pub fn to_polygon(&self, steps: usize) -> Result<Polygon<f64>, GeometryError> {
        self.validate()?;
        match self {
            Boundary::Circle { center, radius_km } => {
                let origin = Point::from(*center);
                let distance_m = radius_km * 1000.0;
                let ring: Vec<Coord<f64>> = (0..steps)
                    .map(|i| {
                        let bearing = 360.0 * i as f64 / steps as f64;
                        origin.haversine_destination(bearing, distance_m).0
                    })
                    .collect();
                Ok(Polygon::new(LineString::new(ring), vec![]))
            }
            Boundary::Polygon(polygon) => Ok(polygon.clone()),
        }
    }
}

/// Check a boundary can be tessellated without tessellating it
pub fn validate_boundary(boundary: &Boundary) -> Result<(), GeometryError> {
    boundary.validate()
}
