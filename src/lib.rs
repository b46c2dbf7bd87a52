//! pokemon-foresight
//!
//! A deterministic, probability-exact battle simulator: given one fully
//! observable battle state and a move choice per side, it enumerates every
//! reachable resulting state, each tagged with its exact probability. All
//! stochastic game events (accuracy, secondary effects, critical hits, speed
//! ties, sleep and paralysis rolls, damage variance) become weighted branches
//! instead of RNG calls, which makes the engine the natural substrate for
//! search and decision layers built on top of it.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod dex;
pub mod errors;
pub mod pokemon;
pub mod side;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Re-export all core data definitions and static enums.
pub use schema::{
    Ability,
    BaseStats,
    CritRate,
    EffectKind,
    Item,
    Move,
    MoveCategory,
    MoveData,
    MoveFlags,
    Nature,
    PokemonType,
    SecondaryEffect,
    SideCondition,
    Species,
    SpeciesData,
    Stat,
    StatusCondition,
    Target,
    Terrain,
    VolatileStatus,
    Weather,
};

// --- From this crate's modules (`src/`) ---

// Core engine entry points.
pub use battle::engine::{legal_actions, resolve_turn, validate_action, ResolveOptions};

// Branch and instruction vocabulary.
pub use battle::branch::{merge_duplicates, sample_outcome, total_probability, WeightedOutcome};
pub use battle::damage::{calculate_damage, DamagePolicy};
pub use battle::instructions::{
    apply, apply_sequence, reverse, reverse_sequence, BattleInstruction,
};

// Core runtime types for a battle.
pub use battle::state::{Action, BattleState, SideId};
pub use pokemon::{MoveInstance, PokemonInst};
pub use side::SideState;

// Static data access.
pub use dex::Dex;

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, BattleStateError, MoveDataError,
    MoveDataResult, SpeciesDataError, SpeciesDataResult,
};
