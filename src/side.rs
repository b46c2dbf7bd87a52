use crate::pokemon::PokemonInst;
use schema::{Move, SideCondition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One side of the battle: the active Pokemon, the bench, and everything that
/// belongs to the side rather than to a single Pokemon.
///
/// Team slots are the stable bench identifiers; switching never reorders the
/// array, it only moves `active_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideState {
    pub team: [Option<PokemonInst>; 6],
    pub active_index: usize,
    /// Side-wide condition counters: hazard layers, screen/tailwind turns
    /// remaining, and the toxic damage multiplier. A missing key means 0.
    #[serde(default)]
    pub conditions: HashMap<SideCondition, u8>,
    /// Pending Wish: (turns remaining, heal amount). Turns at 0 means spent.
    #[serde(default)]
    pub wish: Option<(u8, u16)>,
    /// Pending Future Sight: (turns remaining, caster's team slot).
    #[serde(default)]
    pub future_sight: Option<(u8, u8)>,
    /// The last move this side's active Pokemon executed; drives choice lock.
    #[serde(default)]
    pub last_used_move: Option<Move>,
}

impl SideState {
    pub fn new(team: Vec<PokemonInst>) -> Self {
        let mut team_array = [const { None }; 6];
        for (i, pokemon) in team.into_iter().take(6).enumerate() {
            team_array[i] = Some(pokemon);
        }

        SideState {
            team: team_array,
            active_index: 0,
            conditions: HashMap::new(),
            wish: None,
            future_sight: None,
            last_used_move: None,
        }
    }

    pub fn active(&self) -> Option<&PokemonInst> {
        self.team
            .get(self.active_index)
            .and_then(|slot| slot.as_ref())
    }

    pub fn active_mut(&mut self) -> Option<&mut PokemonInst> {
        self.team
            .get_mut(self.active_index)
            .and_then(|slot| slot.as_mut())
    }

    /// Current counter for a side condition (0 if absent).
    pub fn condition(&self, condition: SideCondition) -> u8 {
        self.conditions.get(&condition).copied().unwrap_or(0)
    }

    /// Add to a side-condition counter. Entries at 0 are removed so that
    /// structural equality never depends on spent counters.
    pub fn shift_condition(&mut self, condition: SideCondition, delta: i16) {
        let next = self.condition(condition) as i16 + delta;
        debug_assert!(next >= 0, "side condition counter went negative");
        if next <= 0 {
            self.conditions.remove(&condition);
        } else {
            self.conditions.insert(condition, next as u8);
        }
    }

    /// Slots of bench Pokemon that are alive and not active.
    pub fn alive_bench_slots(&self) -> Vec<usize> {
        self.team
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(p) if i != self.active_index && !p.is_fainted() => Some(i),
                _ => None,
            })
            .collect()
    }

    pub fn has_alive_bench(&self) -> bool {
        !self.alive_bench_slots().is_empty()
    }
}
