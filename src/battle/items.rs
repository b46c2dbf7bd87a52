use crate::pokemon::PokemonInst;
use schema::{Item, MoveCategory, MoveData, PokemonType};

/// Attacker stat multiplier from the held item, applied to the attacking
/// stat inside the damage formula.
pub fn attack_stat_modifier(attacker: &PokemonInst, move_data: &MoveData) -> f64 {
    match (attacker.item, move_data.category) {
        (Some(Item::ChoiceBand), MoveCategory::Physical) => 1.5,
        (Some(Item::ChoiceSpecs), MoveCategory::Special) => 1.5,
        _ => 1.0,
    }
}

/// Final damage multiplier from the attacker's item.
pub fn damage_modifier(attacker: &PokemonInst, effectiveness: f64) -> f64 {
    match attacker.item {
        Some(Item::LifeOrb) => 1.3,
        Some(Item::ExpertBelt) if effectiveness > 1.0 => 1.2,
        _ => 1.0,
    }
}

/// Life Orb costs 1/10 max HP after a successful damaging hit.
pub fn post_move_recoil_fraction(attacker: &PokemonInst) -> Option<(u16, u16)> {
    match attacker.item {
        Some(Item::LifeOrb) => Some((1, 10)),
        _ => None,
    }
}

/// Contact damage dealt back to the attacker, as a fraction of the
/// attacker's max HP.
pub fn contact_damage_fraction(defender: &PokemonInst) -> Option<(u16, u16)> {
    match defender.item {
        Some(Item::RockyHelmet) => Some((1, 6)),
        _ => None,
    }
}

/// Whether entry hazards are ignored entirely on switch-in.
pub fn blocks_hazards(pokemon: &PokemonInst) -> bool {
    pokemon.item == Some(Item::HeavyDutyBoots)
}

/// End-of-turn item effect: positive = heal, negative = damage, both as
/// fractions of max HP.
pub fn residual_fraction(pokemon: &PokemonInst) -> Option<(i16, u16)> {
    match pokemon.item {
        Some(Item::Leftovers) => Some((1, 16)),
        Some(Item::BlackSludge) => {
            if pokemon.types.contains(&PokemonType::Poison) {
                Some((1, 16))
            } else {
                Some((-1, 8))
            }
        }
        _ => None,
    }
}
