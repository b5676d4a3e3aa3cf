//! Territory state: regions, the tiles they own, and the store that
//! holds both

pub mod region;
pub mod store;
pub mod tile;

pub use region::{HealthChange, Region};
pub use store::TerritoryStore;
pub use tile::{HexTile, TileId};
