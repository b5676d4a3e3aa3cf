//! Geometry: the global hex lattice, region boundaries and tessellation
//!
//! All hex cells come from one lattice anchored at lon/lat (0, 0) in Web
//! Mercator space, so neighbouring regions always agree on cell edges.

pub mod boundary;
pub mod hex;
pub mod tessellate;
pub mod validation;

pub use boundary::{validate_boundary, Boundary};
pub use hex::{from_mercator, to_mercator, HexCoord, HexLattice};
pub use tessellate::{DroppedClaim, TessellationBatch, Tessellator};
pub use validation::GeometryError;
