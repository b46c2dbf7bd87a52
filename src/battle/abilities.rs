use crate::pokemon::PokemonInst;
use schema::{Ability, MoveCategory, MoveData, PokemonType, StatusCondition, Weather};

/// What an ability does to an incoming move it fully absorbs or ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsorbEffect {
    /// The move simply has no effect.
    Immune,
    /// The move is absorbed and heals the defender by 1/4 max HP.
    HealQuarter,
}

/// A defender ability reaction to being hit by a contact move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactTrigger {
    /// Chance to inflict a status on the attacker.
    Status(StatusCondition, f64),
    /// Fixed fraction of the attacker's max HP dealt as damage.
    DamageFraction(u16, u16),
}

/// Ability-based full immunity to an incoming move, checked before accuracy.
pub fn absorbs_move(defender: &PokemonInst, move_data: &MoveData) -> Option<AbsorbEffect> {
    match (defender.ability, move_data.move_type) {
        (Ability::Levitate, PokemonType::Ground) => Some(AbsorbEffect::Immune),
        (Ability::VoltAbsorb, PokemonType::Electric) if move_data.is_damaging() => {
            Some(AbsorbEffect::HealQuarter)
        }
        (Ability::WaterAbsorb, PokemonType::Water) if move_data.is_damaging() => {
            Some(AbsorbEffect::HealQuarter)
        }
        (Ability::FlashFire, PokemonType::Fire) if move_data.is_damaging() => {
            Some(AbsorbEffect::Immune)
        }
        _ => None,
    }
}

/// Attacker-side base power modifier, applied before the damage formula.
pub fn base_power_modifier(attacker: &PokemonInst, move_data: &MoveData) -> f64 {
    match attacker.ability {
        Ability::Technician if move_data.power <= 60 => 1.5,
        _ => 1.0,
    }
}

/// STAB multiplier for the attacker.
pub fn stab_multiplier(attacker: &PokemonInst) -> f64 {
    match attacker.ability {
        Ability::Adaptability => 2.0,
        _ => 1.5,
    }
}

/// Final damage multiplier from both abilities, applied after the chart.
pub fn damage_modifier(
    attacker: &PokemonInst,
    defender: &PokemonInst,
    move_data: &MoveData,
    effectiveness: f64,
) -> f64 {
    let mut modifier = 1.0;

    match attacker.ability {
        Ability::TintedLens if effectiveness < 1.0 => modifier *= 2.0,
        Ability::Guts
            if attacker.status.is_some() && move_data.category == MoveCategory::Physical =>
        {
            modifier *= 1.5
        }
        _ => {}
    }

    if defender.ability == Ability::ThickFat
        && matches!(move_data.move_type, PokemonType::Fire | PokemonType::Ice)
    {
        modifier *= 0.5;
    }

    modifier
}

/// Adjust a secondary-effect chance (percent) for the abilities on both
/// sides. This runs before any branch fork so a guaranteed or negated effect
/// never produces a degenerate branch.
pub fn secondary_chance_modifier(
    attacker: &PokemonInst,
    defender: &PokemonInst,
    targets_opponent: bool,
    chance: u8,
) -> f64 {
    if targets_opponent && defender.ability == Ability::ShieldDust {
        return 0.0;
    }
    let mut chance = chance as f64;
    if attacker.ability == Ability::SereneGrace {
        chance *= 2.0;
    }
    chance.min(100.0)
}

/// Defender reactions to a contact hit.
pub fn contact_triggers(defender: &PokemonInst) -> Vec<ContactTrigger> {
    match defender.ability {
        Ability::Static => vec![ContactTrigger::Status(StatusCondition::Paralysis, 0.3)],
        Ability::FlameBody => vec![ContactTrigger::Status(StatusCondition::Burn, 0.3)],
        Ability::PoisonPoint => vec![ContactTrigger::Status(StatusCondition::Poison, 0.3)],
        Ability::RoughSkin => vec![ContactTrigger::DamageFraction(1, 8)],
        _ => vec![],
    }
}

/// Weather summoned when this ability enters the field.
pub fn switch_in_weather(ability: Ability) -> Option<Weather> {
    match ability {
        Ability::Drizzle => Some(Weather::Rain),
        Ability::Drought => Some(Weather::Sun),
        Ability::SandStream => Some(Weather::Sand),
        Ability::SnowWarning => Some(Weather::Snow),
        _ => None,
    }
}

/// Status conditions the ability makes the holder immune to.
pub fn prevents_status(ability: Ability, status: StatusCondition) -> bool {
    matches!(
        (ability, status),
        (Ability::Limber, StatusCondition::Paralysis)
            | (Ability::Insomnia, StatusCondition::Sleep)
    )
}

/// Whether this ability prevents the opposing Pokemon from switching out.
/// Ghost types are always free to leave.
pub fn traps_opponent(ability: Ability, opponent: &PokemonInst) -> bool {
    if opponent.types.contains(&PokemonType::Ghost) {
        return false;
    }
    match ability {
        Ability::ShadowTag => true,
        Ability::ArenaTrap => opponent.is_grounded(),
        _ => false,
    }
}

/// Indirect damage (weather, hazards, status, recoil items) is fully blocked
/// by Magic Guard.
pub fn blocks_indirect_damage(ability: Ability) -> bool {
    ability == Ability::MagicGuard
}
