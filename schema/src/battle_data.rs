use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Non-volatile status conditions. A Pokemon can carry at most one, and it
/// persists through switches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum StatusCondition {
    Sleep,
    Burn,
    Freeze,
    Paralysis,
    Poison,
    Toxic,
}

/// Volatile statuses attach to the active Pokemon and clear when it leaves
/// the field. Several can coexist.
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
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "kebab-case")]
pub enum VolatileStatus {
    Confusion,
    Flinch,
    LeechSeed,
    Substitute,
    Protect,
    Taunt,
    PartiallyTrapped,
    Charging,
}

/// Conditions that attach to one side of the field rather than a Pokemon.
/// Each maps to an integer counter: hazard layers, turns remaining, or the
/// toxic damage multiplier.
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
pub enum SideCondition {
    StealthRock,
    Spikes,
    ToxicSpikes,
    Reflect,
    LightScreen,
    AuroraVeil,
    Tailwind,
    ToxicCount,
}

impl SideCondition {
    /// Maximum stack height for layered hazards; unbounded counters return None.
    pub fn max_layers(&self) -> Option<u8> {
        match self {
            SideCondition::StealthRock => Some(1),
            SideCondition::Spikes => Some(3),
            SideCondition::ToxicSpikes => Some(2),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Weather {
    Sun,
    Rain,
    Sand,
    Snow,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Terrain {
    ElectricTerrain,
    GrassyTerrain,
    MistyTerrain,
    PsychicTerrain,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Ability {
    NoAbility,
    Levitate,
    Intimidate,
    SereneGrace,
    ShieldDust,
    Static,
    FlameBody,
    PoisonPoint,
    RoughSkin,
    Technician,
    TintedLens,
    Guts,
    ThickFat,
    WaterAbsorb,
    VoltAbsorb,
    FlashFire,
    Drizzle,
    Drought,
    SandStream,
    SnowWarning,
    Chlorophyll,
    SwiftSwim,
    Adaptability,
    Limber,
    Insomnia,
    ArenaTrap,
    ShadowTag,
    MagicGuard,
    SpeedBoost,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Item {
    Leftovers,
    BlackSludge,
    ChoiceBand,
    ChoiceSpecs,
    ChoiceScarf,
    LifeOrb,
    RockyHelmet,
    HeavyDutyBoots,
    ExpertBelt,
}

impl Item {
    /// Choice items lock the holder into its first selected move.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            Item::ChoiceBand | Item::ChoiceSpecs | Item::ChoiceScarf
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kebab_case_round_trip() {
        assert_eq!(SideCondition::StealthRock.to_string(), "stealth-rock");
        assert_eq!(
            SideCondition::from_str("stealth-rock").unwrap(),
            SideCondition::StealthRock
        );
        assert_eq!(Ability::SereneGrace.to_string(), "serene-grace");
        assert_eq!(Item::from_str("choice-scarf").unwrap(), Item::ChoiceScarf);
    }

    #[test]
    fn test_hazard_layer_caps() {
        assert_eq!(SideCondition::Spikes.max_layers(), Some(3));
        assert_eq!(SideCondition::ToxicSpikes.max_layers(), Some(2));
        assert_eq!(SideCondition::Reflect.max_layers(), None);
    }
}
