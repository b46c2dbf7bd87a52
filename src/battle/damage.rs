use crate::battle::abilities;
use crate::battle::items;
use crate::battle::state::{BattleState, SideId};
use crate::battle::stats::apply_boost;
use crate::pokemon::PokemonInst;
use schema::{
    Ability, MoveCategory, MoveData, PokemonType, SideCondition, Stat, StatusCondition, Terrain,
    Weather,
};
use serde::{Deserialize, Serialize};

/// How the 85-100% variance roll is expanded into branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DamagePolicy {
    /// One deterministic branch at the 92.5% midpoint roll.
    #[default]
    Average,
    /// Two branches: the minimum and maximum rolls, equally weighted.
    MinMax,
    /// All sixteen discrete rolls, each weighted 1/16. Equal damage values
    /// collapse into one branch.
    FullSpread,
}

/// Weighted candidate damage values for one hit of a move.
pub fn damage_rolls(
    state: &BattleState,
    attacker_side: SideId,
    move_data: &MoveData,
    is_crit: bool,
    policy: DamagePolicy,
) -> Vec<(u16, f64)> {
    let damage = raw_damage(state, attacker_side, move_data, is_crit);
    expand_rolls(damage, policy)
}

fn expand_rolls(damage: f64, policy: DamagePolicy) -> Vec<(u16, f64)> {
    if damage <= 0.0 {
        return vec![(0, 1.0)];
    }
    match policy {
        DamagePolicy::Average => vec![(roll(damage, 925), 1.0)],
        DamagePolicy::MinMax => {
            let min = roll(damage, 850);
            let max = roll(damage, 1000);
            if min == max {
                vec![(min, 1.0)]
            } else {
                vec![(min, 0.5), (max, 0.5)]
            }
        }
        DamagePolicy::FullSpread => {
            let mut grouped: Vec<(u16, f64)> = Vec::new();
            for r in 850..=1000 {
                if r % 10 != 0 {
                    continue;
                }
                let value = roll(damage, r);
                match grouped.iter_mut().find(|(v, _)| *v == value) {
                    Some((_, weight)) => *weight += 1.0 / 16.0,
                    None => grouped.push((value, 1.0 / 16.0)),
                }
            }
            grouped
        }
    }
}

/// One variance roll, in tenths of a percent (850..=1000), floored, minimum 1.
fn roll(damage: f64, tenths: u32) -> u16 {
    let value = (damage * tenths as f64 / 1000.0).floor() as u16;
    value.max(1)
}

/// The damage formula with its full fixed-order modifier chain, before the
/// variance roll:
/// `floor(floor(floor(2*level/5 + 2) * power * attack/defense) / 50) + 2`,
/// then STAB, type chart, burn, weather, screens, crit, ability/item
/// modifiers, and terrain, in that order.
fn raw_damage(
    state: &BattleState,
    attacker_side: SideId,
    move_data: &MoveData,
    is_crit: bool,
) -> f64 {
    let attacker = state
        .side(attacker_side)
        .active()
        .expect("damage requires an active attacker");
    let defender_side = attacker_side.opponent();
    let defender = state
        .side(defender_side)
        .active()
        .expect("damage requires an active defender");

    if !move_data.is_damaging() || move_data.power == 0 {
        return 0.0;
    }

    let effectiveness =
        PokemonType::effectiveness_against(move_data.move_type, &defender.types);
    if effectiveness == 0.0 {
        return 0.0;
    }

    let (attack_stat, defense_stat) = match move_data.category {
        MoveCategory::Physical => (Stat::Attack, Stat::Defense),
        MoveCategory::Special => (Stat::SpecialAttack, Stat::SpecialDefense),
        MoveCategory::Status => unreachable!("status moves are filtered above"),
    };

    // A crit ignores the attacker's unfavorable boosts and the defender's
    // favorable ones.
    let mut attack_stage = attacker.boost(attack_stat);
    let mut defense_stage = defender.boost(defense_stat);
    if is_crit {
        attack_stage = attack_stage.max(0);
        defense_stage = defense_stage.min(0);
    }

    let attack_index = attack_stat.stat_index().unwrap();
    let defense_index = defense_stat.stat_index().unwrap();
    let attack = apply_boost(attacker.stats[attack_index], attack_stage) as f64
        * items::attack_stat_modifier(attacker, move_data);
    let defense = apply_boost(defender.stats[defense_index], defense_stage) as u32;

    let power =
        (move_data.power as f64 * abilities::base_power_modifier(attacker, move_data)) as u32;

    let level_term = 2 * attacker.level as u32 / 5 + 2;
    let base = (level_term * power * attack as u32 / defense.max(1)) / 50 + 2;

    let mut damage = base as f64;

    if attacker.types.contains(&move_data.move_type) {
        damage *= abilities::stab_multiplier(attacker);
    }

    damage *= effectiveness;

    if attacker.status == Some(StatusCondition::Burn)
        && move_data.category == MoveCategory::Physical
        && attacker.ability != Ability::Guts
    {
        damage *= 0.5;
    }

    match (state.weather, move_data.move_type) {
        (Some(Weather::Rain), PokemonType::Water) | (Some(Weather::Sun), PokemonType::Fire) => {
            damage *= 1.5
        }
        (Some(Weather::Rain), PokemonType::Fire) | (Some(Weather::Sun), PokemonType::Water) => {
            damage *= 0.5
        }
        _ => {}
    }

    if !is_crit && screened(state, defender_side, move_data.category) {
        damage *= 0.5;
    }

    if is_crit {
        damage *= 1.5;
    }

    damage *= abilities::damage_modifier(attacker, defender, move_data, effectiveness);
    damage *= items::damage_modifier(attacker, effectiveness);

    if attacker.is_grounded() {
        match (state.terrain, move_data.move_type) {
            (Some(Terrain::ElectricTerrain), PokemonType::Electric)
            | (Some(Terrain::GrassyTerrain), PokemonType::Grass) => damage *= 1.3,
            _ => {}
        }
    }

    damage
}

/// Convenience single-value calculation: average roll, no crit.
pub fn calculate_damage(
    state: &BattleState,
    attacker_side: SideId,
    move_data: &MoveData,
) -> u16 {
    damage_rolls(state, attacker_side, move_data, false, DamagePolicy::Average)[0].0
}

/// Confusion self-hit: a typeless 40-power physical strike against the
/// Pokemon's own Defense, with no STAB, crit, or modifiers.
pub fn confusion_self_damage(pokemon: &PokemonInst) -> u16 {
    let attack = apply_boost(pokemon.stats[1], pokemon.boost(Stat::Attack)) as u32;
    let defense = apply_boost(pokemon.stats[2], pokemon.boost(Stat::Defense)).max(1) as u32;
    let level_term = 2 * pokemon.level as u32 / 5 + 2;
    let base = (level_term * 40 * attack / defense) / 50 + 2;
    ((base as f64 * 0.925).floor() as u16).max(1)
}

fn screened(state: &BattleState, defender_side: SideId, category: MoveCategory) -> bool {
    let side = state.side(defender_side);
    if side.condition(SideCondition::AuroraVeil) > 0 {
        return true;
    }
    match category {
        MoveCategory::Physical => side.condition(SideCondition::Reflect) > 0,
        MoveCategory::Special => side.condition(SideCondition::LightScreen) > 0,
        MoveCategory::Status => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_spread_weights_sum_to_one() {
        let rolls = expand_rolls(100.0, DamagePolicy::FullSpread);
        let total: f64 = rolls.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
        // 16 rolls over 85..100% of 100 damage: 85..=100, all distinct
        assert_eq!(rolls.len(), 16);
    }

    #[test]
    fn test_min_max_collapses_when_equal() {
        // Tiny damage values floor to the same number on both rolls.
        let rolls = expand_rolls(1.1, DamagePolicy::MinMax);
        assert_eq!(rolls, vec![(1, 1.0)]);
    }

    #[test]
    fn test_zero_damage_is_single_zero_roll() {
        assert_eq!(expand_rolls(0.0, DamagePolicy::Average), vec![(0, 1.0)]);
    }
}
