//! Region seed data and the region source seam

pub mod seed;
pub mod source;

pub use seed::{CenterSeed, RegionSeed, SeedDocument, TileSeed};
pub use source::{BuiltinSeed, RegionSource, SeedFile};
