use crate::errors::{
    BattleEngineError, BattleResult, MoveDataError, SpeciesDataError,
};
use schema::{Move, MoveData, Species, SpeciesData};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// The read-only rules database: every move and species the engine can see.
///
/// A `Dex` is loaded once, before any turn resolution, and passed by shared
/// reference into the engine. It is never mutated afterwards, so one instance
/// can back any number of concurrent resolutions.
#[derive(Debug, Clone)]
pub struct Dex {
    moves: HashMap<Move, MoveData>,
    species: HashMap<Species, SpeciesData>,
}

impl Dex {
    /// Build a dex from RON source strings.
    pub fn from_ron(moves_ron: &str, species_ron: &str) -> BattleResult<Self> {
        let moves: HashMap<Move, MoveData> = ron::from_str(moves_ron)
            .map_err(|e| BattleEngineError::MoveData(MoveDataError::MalformedData(e.to_string())))?;
        let species: HashMap<Species, SpeciesData> = ron::from_str(species_ron).map_err(|e| {
            BattleEngineError::SpeciesData(SpeciesDataError::MalformedData(e.to_string()))
        })?;
        Ok(Self { moves, species })
    }

    /// Build a dex from RON files on disk (`<dir>/moves.ron`, `<dir>/species.ron`).
    pub fn load(data_dir: &Path) -> BattleResult<Self> {
        let moves_ron = fs::read_to_string(data_dir.join("moves.ron")).map_err(|e| {
            BattleEngineError::MoveData(MoveDataError::MalformedData(e.to_string()))
        })?;
        let species_ron = fs::read_to_string(data_dir.join("species.ron")).map_err(|e| {
            BattleEngineError::SpeciesData(SpeciesDataError::MalformedData(e.to_string()))
        })?;
        Self::from_ron(&moves_ron, &species_ron)
    }

    /// The database bundled with the crate.
    pub fn bundled() -> Self {
        Self::from_ron(
            include_str!("../data/moves.ron"),
            include_str!("../data/species.ron"),
        )
        .expect("bundled RON databases must parse")
    }

    pub fn move_data(&self, move_: Move) -> Result<&MoveData, MoveDataError> {
        self.moves.get(&move_).ok_or(MoveDataError::MoveNotFound(move_))
    }

    pub fn species_data(&self, species: Species) -> Result<&SpeciesData, SpeciesDataError> {
        self.species
            .get(&species)
            .ok_or(SpeciesDataError::SpeciesNotFound(species))
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }
}
