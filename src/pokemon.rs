use schema::{
    Ability, Item, Move, Nature, PokemonType, Species, SpeciesData, Stat, StatusCondition,
    VolatileStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default effort value used when a serialized state omits EVs.
pub const DEFAULT_EV: u8 = 85;
/// Legal IV ceiling; also the default when a serialized state omits IVs.
pub const MAX_IV: u8 = 31;
pub const DEFAULT_IV: u8 = MAX_IV;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveInstance {
    pub move_: Move,
    pub pp: u8,
    pub max_pp: u8,
    #[serde(default)]
    pub disabled: bool,
}

impl MoveInstance {
    pub fn new(move_: Move, max_pp: u8) -> Self {
        MoveInstance {
            move_,
            pp: max_pp,
            max_pp,
            disabled: false,
        }
    }
}

/// One Pokemon, active or benched. Constructed once when a battle state is
/// loaded and mutated in place by the instruction layer afterwards; a fainted
/// Pokemon stays in the structure at 0 HP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonInst {
    pub species: Species,
    pub level: u8,
    pub current_hp: u16,
    pub max_hp: u16,
    pub ability: Ability,
    #[serde(default)]
    pub item: Option<Item>,
    #[serde(default)]
    pub nature: Nature,
    pub evs: [u8; 6],
    pub ivs: [u8; 6],
    /// Computed stats (HP, Atk, Def, SpA, SpD, Spe)
    pub stats: [u16; 6],
    /// Battle boost stages, -6..=+6. Absent key means stage 0.
    #[serde(default)]
    pub stat_boosts: HashMap<Stat, i8>,
    #[serde(default)]
    pub status: Option<StatusCondition>,
    #[serde(default)]
    pub volatiles: HashSet<VolatileStatus>,
    pub moves: [Option<MoveInstance>; 4],
    /// Current types. Usually the species types, but moves and abilities can
    /// rewrite these mid-battle.
    pub types: Vec<PokemonType>,
    #[serde(default)]
    pub terastallized: bool,
    /// Set while the Pokemon is committed to a multi-turn move.
    #[serde(default)]
    pub locked_move: Option<Move>,
    /// Remaining substitute HP; meaningful only while the Substitute
    /// volatile is present.
    #[serde(default)]
    pub substitute_hp: u16,
}

impl PokemonInst {
    /// Create a new Pokemon instance from species data with default spread.
    pub fn new(
        species: Species,
        species_data: &SpeciesData,
        level: u8,
        ability: Ability,
        moves: Vec<(Move, u8)>,
    ) -> Self {
        Self::with_spread(
            species,
            species_data,
            level,
            ability,
            moves,
            Nature::default(),
            [DEFAULT_EV; 6],
            [DEFAULT_IV; 6],
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_spread(
        species: Species,
        species_data: &SpeciesData,
        level: u8,
        ability: Ability,
        moves: Vec<(Move, u8)>,
        nature: Nature,
        evs: [u8; 6],
        ivs: [u8; 6],
    ) -> Self {
        let stats = calculate_stats(&species_data.base_stats.as_array(), level, &evs, &ivs, nature);

        let mut move_array = [const { None }; 4];
        for (i, (move_, pp)) in moves.into_iter().take(4).enumerate() {
            move_array[i] = Some(MoveInstance::new(move_, pp));
        }

        PokemonInst {
            species,
            level,
            current_hp: stats[0],
            max_hp: stats[0],
            ability,
            item: None,
            nature,
            evs,
            ivs,
            stats,
            stat_boosts: HashMap::new(),
            status: None,
            volatiles: HashSet::new(),
            moves: move_array,
            types: species_data.types.clone(),
            terastallized: false,
            locked_move: None,
            substitute_hp: 0,
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Current boost stage for a stat (0 if unset).
    pub fn boost(&self, stat: Stat) -> i8 {
        self.stat_boosts.get(&stat).copied().unwrap_or(0)
    }

    /// Add a (pre-clamped) delta to a boost stage. Zero stages are dropped
    /// from the map so structural equality ignores boost history.
    pub fn shift_boost(&mut self, stat: Stat, delta: i8) {
        let next = self.boost(stat) + delta;
        if next == 0 {
            self.stat_boosts.remove(&stat);
        } else {
            self.stat_boosts.insert(stat, next);
        }
    }

    pub fn has_volatile(&self, volatile: VolatileStatus) -> bool {
        self.volatiles.contains(&volatile)
    }

    pub fn knows_move(&self, move_: Move) -> bool {
        self.moves
            .iter()
            .flatten()
            .any(|inst| inst.move_ == move_)
    }

    pub fn move_slot(&self, move_: Move) -> Option<&MoveInstance> {
        self.moves
            .iter()
            .flatten()
            .find(|inst| inst.move_ == move_)
    }

    pub fn move_slot_mut(&mut self, move_: Move) -> Option<&mut MoveInstance> {
        self.moves
            .iter_mut()
            .flatten()
            .find(|inst| inst.move_ == move_)
    }

    /// Whether the Pokemon is affected by Ground moves and grounded hazards.
    pub fn is_grounded(&self) -> bool {
        !self.types.contains(&PokemonType::Flying) && self.ability != Ability::Levitate
    }
}

/// Calculate computed stats from base stats, level, EVs, IVs and nature.
///
/// Each stat is `floor((2*base + iv + floor(ev/4)) * level / 100)`, plus
/// `level + 10` for HP and `+ 5` for everything else, then the nature skew
/// (one stat x1.1, one x0.9, both floored).
pub fn calculate_stats(
    base: &[u16; 6],
    level: u8,
    evs: &[u8; 6],
    ivs: &[u8; 6],
    nature: Nature,
) -> [u16; 6] {
    let mut stats = [0u16; 6];

    for i in 0..6 {
        // EVs already live in 0..=255 by type; IVs clamp to their legal range.
        let iv = ivs[i].min(MAX_IV) as u32;
        let core = (2 * base[i] as u32 + iv + evs[i] as u32 / 4) * level as u32 / 100;
        stats[i] = if i == 0 {
            (core + level as u32 + 10) as u16
        } else {
            (core + 5) as u16
        };
    }

    let (raised, lowered) = nature.skew();
    if let Some(i) = raised {
        stats[i] = (stats[i] as u32 * 110 / 100) as u16;
    }
    if let Some(i) = lowered {
        stats[i] = (stats[i] as u32 * 90 / 100) as u16;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_calculation_neutral_nature() {
        // Base 100 across the board, level 100, EV 85, IV 31:
        // core = (200 + 31 + 21) * 100 / 100 = 252
        let base = [100u16; 6];
        let stats = calculate_stats(&base, 100, &[85; 6], &[31; 6], Nature::Hardy);
        assert_eq!(stats[0], 252 + 100 + 10);
        assert_eq!(stats[1], 252 + 5);
        assert_eq!(stats[5], 252 + 5);
    }

    #[test]
    fn test_stat_calculation_nature_skew() {
        let base = [100u16; 6];
        let stats = calculate_stats(&base, 100, &[85; 6], &[31; 6], Nature::Adamant);
        // Adamant: +Atk, -SpA
        assert_eq!(stats[1], 257 * 110 / 100);
        assert_eq!(stats[3], 257 * 90 / 100);
        assert_eq!(stats[2], 257);
    }

    #[test]
    fn test_boost_shift_drops_zero_entries() {
        let base = [100u16; 6];
        let mut pokemon = PokemonInst {
            species: Species::Pikachu,
            level: 50,
            current_hp: 100,
            max_hp: 100,
            ability: Ability::NoAbility,
            item: None,
            nature: Nature::Hardy,
            evs: [85; 6],
            ivs: [31; 6],
            stats: base,
            stat_boosts: HashMap::new(),
            status: None,
            volatiles: HashSet::new(),
            moves: [const { None }; 4],
            types: vec![PokemonType::Electric],
            terastallized: false,
            locked_move: None,
            substitute_hp: 0,
        };

        pokemon.shift_boost(Stat::Attack, 2);
        assert_eq!(pokemon.boost(Stat::Attack), 2);
        pokemon.shift_boost(Stat::Attack, -2);
        assert_eq!(pokemon.boost(Stat::Attack), 0);
        assert!(pokemon.stat_boosts.is_empty());
    }
}
