//! Hex lattice coordinates (axial, flat-top) over Web Mercator space
//!
//! The lattice is anchored at lon/lat (0, 0), so the same cell has the same
//! `(q, r)` no matter which region asks for it.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;
use std::str::FromStr;

use geo_types::{Coord, LineString, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// WGS84 equatorial radius used by Web Mercator (meters)
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator projection
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// Axial hex coordinate in the global lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Distance to another hex (in hex steps)
    pub fn distance(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Get the 6 neighbor coordinates
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.q, self.r)
    }
}

impl FromStr for HexCoord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(':')
            .ok_or_else(|| format!("tile id '{}' is not of the form q:r", s))?;
        let q = q.trim().parse::<i32>().map_err(|e| format!("bad q in '{}': {}", s, e))?;
        let r = r.trim().parse::<i32>().map_err(|e| format!("bad r in '{}': {}", s, e))?;
        Ok(Self::new(q, r))
    }
}

/// Project lon/lat degrees to Web Mercator meters
pub fn to_mercator(lonlat: Coord<f64>) -> Coord<f64> {
    let lat = lonlat.y.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    Coord {
        x: EARTH_RADIUS_M * lonlat.x.to_radians(),
        y: EARTH_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
    }
}

/// Inverse of [`to_mercator`]
pub fn from_mercator(meters: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (meters.x / EARTH_RADIUS_M).to_degrees(),
        y: (2.0 * (meters.y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees(),
    }
}

/// A regular flat-top hex lattice with a fixed cell size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLattice {
    /// Center-to-corner distance in Mercator meters
    size: f64,
}

impl HexLattice {
    /// Build a lattice whose cells have `cell_side_km` ground size at
    /// `reference_latitude`
    pub fn new(cell_side_km: f64, reference_latitude: f64) -> Self {
        let scale = reference_latitude.to_radians().cos();
        Self {
            size: cell_side_km * 1000.0 / scale,
        }
    }

    /// Center-to-corner distance in Mercator meters
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Mercator position of a cell center
    pub fn center(&self, coord: HexCoord) -> Coord<f64> {
        let q = coord.q as f64;
        let r = coord.r as f64;
        Coord {
            x: self.size * 1.5 * q,
            y: self.size * 3.0_f64.sqrt() * (r + q / 2.0),
        }
    }

    /// Cell containing a Mercator position
    pub fn cell_at(&self, meters: Coord<f64>) -> HexCoord {
        let q = (2.0 / 3.0 * meters.x) / self.size;
        let r = (-1.0 / 3.0 * meters.x + 3.0_f64.sqrt() / 3.0 * meters.y) / self.size;
        hex_round(q, r)
    }

    /// Hexagon of a cell as a closed lon/lat polygon (counter-clockwise)
    pub fn cell_polygon(&self, coord: HexCoord) -> Polygon<f64> {
        let center = self.center(coord);
        let mut ring: Vec<Coord<f64>> = (0..6)
            .map(|i| {
                let angle = (60.0 * i as f64).to_radians();
                from_mercator(Coord {
                    x: center.x + self.size * angle.cos(),
                    y: center.y + self.size * angle.sin(),
                })
            })
            .collect();
        ring.push(ring[0]);
        Polygon::new(LineString::new(ring), vec![])
    }

    /// Every cell that could touch a lon/lat rectangle, in (q, r) order
    ///
    /// The result over-covers by one ring of cells; callers filter with an
    /// exact intersection test.
    pub fn cells_covering(&self, bounds: Rect<f64>) -> Vec<HexCoord> {
        let min = to_mercator(bounds.min());
        let max = to_mercator(bounds.max());
        let col_width = self.size * 1.5;
        let row_height = self.size * 3.0_f64.sqrt();

        let q_min = (min.x / col_width).floor() as i32 - 1;
        let q_max = (max.x / col_width).ceil() as i32 + 1;

        let mut cells = Vec::new();
        for q in q_min..=q_max {
            let shift = q as f64 / 2.0;
            let r_min = (min.y / row_height - shift).floor() as i32 - 1;
            let r_max = (max.y / row_height - shift).ceil() as i32 + 1;
            for r in r_min..=r_max {
                cells.push(HexCoord::new(q, r));
            }
        }
        cells
    }
}

/// Round fractional hex coordinates to integer
fn hex_round(q: f64, r: f64) -> HexCoord {
    let s = -q - r;

    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    }

    HexCoord::new(rq as i32, rr as i32)
}
