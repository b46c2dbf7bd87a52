use crate::pokemon_types::PokemonType;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Species {
    Pikachu,
    Charizard,
    Blastoise,
    Venusaur,
    Jolteon,
    Gengar,
    Alakazam,
    Machamp,
    Gyarados,
    Dragonite,
    Snorlax,
    Skarmory,
    Garchomp,
    Ferrothorn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

impl BaseStats {
    /// The stats as a `[u16; 6]` vector (HP, Atk, Def, SpA, SpD, Spe).
    pub fn as_array(&self) -> [u16; 6] {
        [
            self.hp as u16,
            self.attack as u16,
            self.defense as u16,
            self.sp_attack as u16,
            self.sp_defense as u16,
            self.speed as u16,
        ]
    }
}

/// Static per-species data, loaded once from the bundled RON database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub pokedex_number: u16,
    pub types: Vec<PokemonType>,
    pub base_stats: BaseStats,
}
