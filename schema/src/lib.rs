// pokemon-foresight schema - shared type definitions.
// This crate contains the core enums and static-data structs that are shared
// between the battle engine and any tooling that produces or validates the
// RON databases, so both sides always agree on the vocabulary.

// Re-export the main types
pub use battle_data::*;
pub use move_data::*;
pub use pokemon_types::*;
pub use species_data::*;

pub mod battle_data;
pub mod move_data;
pub mod pokemon_types;
pub mod species_data;
