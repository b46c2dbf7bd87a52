use crate::battle::state::{BattleState, SideId};
use crate::dex::Dex;
use crate::pokemon::PokemonInst;
use crate::side::SideState;
use schema::{Ability, Item, Move, StatusCondition};
use std::sync::OnceLock;

static DEX: OnceLock<Dex> = OnceLock::new();

/// The bundled dex, loaded once for the whole test run.
pub fn dex() -> &'static Dex {
    DEX.get_or_init(Dex::bundled)
}

/// A builder for creating test Pokemon instances with common defaults.
///
/// # Example
/// ```ignore
/// let pokemon = TestPokemonBuilder::new(Species::Pikachu, 50)
///     .with_moves(vec![Move::Tackle])
///     .with_status(StatusCondition::Paralysis)
///     .build();
/// ```
pub struct TestPokemonBuilder {
    species: schema::Species,
    level: u8,
    ability: Ability,
    item: Option<Item>,
    moves: Vec<Move>,
    status: Option<StatusCondition>,
    current_hp: Option<u16>,
}

impl TestPokemonBuilder {
    pub fn new(species: schema::Species, level: u8) -> Self {
        Self {
            species,
            level,
            ability: Ability::NoAbility,
            item: None,
            moves: vec![Move::Tackle],
            status: None,
            current_hp: None,
        }
    }

    pub fn with_moves(mut self, moves: Vec<Move>) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = ability;
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn build(self) -> PokemonInst {
        let dex = dex();
        let species_data = dex
            .species_data(self.species)
            .unwrap_or_else(|e| panic!("species data for {:?}: {}", self.species, e));

        let moves = self
            .moves
            .into_iter()
            .map(|m| {
                let pp = dex
                    .move_data(m)
                    .unwrap_or_else(|e| panic!("move data for {:?}: {}", m, e))
                    .pp;
                (m, pp)
            })
            .collect();

        let mut pokemon =
            PokemonInst::new(self.species, species_data, self.level, self.ability, moves);
        pokemon.status = self.status;
        pokemon.item = self.item;
        if let Some(hp) = self.current_hp {
            pokemon.current_hp = hp.min(pokemon.max_hp);
        }
        pokemon
    }
}

/// Creates a standard 1v1 battle state for testing.
pub fn create_test_battle(user: PokemonInst, opponent: PokemonInst) -> BattleState {
    BattleState::new(SideState::new(vec![user]), SideState::new(vec![opponent]))
}

/// Creates a battle with full teams on both sides.
pub fn create_team_battle(user: Vec<PokemonInst>, opponent: Vec<PokemonInst>) -> BattleState {
    BattleState::new(SideState::new(user), SideState::new(opponent))
}

/// The single Damage edit aimed at `side` in an outcome's instruction list.
/// Panics if there is not exactly one.
pub fn single_damage_to(
    outcome: &crate::battle::branch::WeightedOutcome,
    side: SideId,
) -> u16 {
    let amounts: Vec<u16> = outcome
        .instructions
        .iter()
        .filter_map(|i| match i {
            crate::battle::instructions::BattleInstruction::Damage { side: s, amount }
                if *s == side =>
            {
                Some(*amount)
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        amounts.len(),
        1,
        "expected exactly one Damage edit to {:?}, got {:?}",
        side,
        outcome.instructions
    );
    amounts[0]
}
