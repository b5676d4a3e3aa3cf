//! Where regions come from

use std::path::Path;

use super::seed::SeedDocument;
use crate::core::error::Result;
use crate::core::types::RegionId;
use crate::territory::{HexTile, Region};

const BUILTIN_UNIVERSITIES: &str = include_str!("../../data/universities.json");

/// Persistence seam for region boundaries
pub trait RegionSource {
    /// All regions, in the order overlaps should be resolved
    fn list_regions(&self) -> Result<Vec<Region>>;

    /// Tiles computed elsewhere for a region; `None` means tessellate
    /// in-process
    fn list_tiles_by_region(&self, _id: &RegionId) -> Result<Option<Vec<HexTile>>> {
        Ok(None)
    }
}

/// Regions read from a JSON or TOML seed document
#[derive(Debug, Clone)]
pub struct SeedFile {
    document: SeedDocument,
}

impl SeedFile {
    pub fn new(document: SeedDocument) -> Self {
        Self { document }
    }

    /// Load a seed file; `.toml` is parsed as TOML, anything else as JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let document = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => SeedDocument::from_toml_str(&content)?,
            _ => SeedDocument::from_json_str(&content)?,
        };
        tracing::info!(
            "Loaded {} region seeds from {}",
            document.regions.len(),
            path.display()
        );
        Ok(Self::new(document))
    }

    pub fn document(&self) -> &SeedDocument {
        &self.document
    }
}

impl RegionSource for SeedFile {
    fn list_regions(&self) -> Result<Vec<Region>> {
        self.document
            .regions
            .iter()
            .map(|seed| {
                seed.to_region().map_err(|err| {
                    tracing::warn!("Rejected region seed {}: {}", seed.id, err);
                    err
                })
            })
            .collect()
    }

    fn list_tiles_by_region(&self, id: &RegionId) -> Result<Option<Vec<HexTile>>> {
        let tiles: Vec<HexTile> = self
            .document
            .tiles
            .iter()
            .filter(|t| t.region == id.as_str())
            .map(|t| t.to_tile())
            .collect::<Result<_>>()?;
        Ok((!tiles.is_empty()).then_some(tiles))
    }
}

/// The six Bangkok universities bundled with the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSeed;

impl BuiltinSeed {
    pub fn document() -> Result<SeedDocument> {
        SeedDocument::from_json_str(BUILTIN_UNIVERSITIES)
    }
}

impl RegionSource for BuiltinSeed {
    fn list_regions(&self) -> Result<Vec<Region>> {
        SeedFile::new(Self::document()?).list_regions()
    }
}
