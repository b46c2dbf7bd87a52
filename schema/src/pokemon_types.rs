use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum PokemonType {
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
    Typeless,
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl PokemonType {
    /// Calculate type effectiveness multiplier for attacking type vs defending type
    /// Returns: 2.0 = Super Effective, 1.0 = Normal, 0.5 = Not Very Effective, 0.0 = No Effect
    pub fn type_effectiveness(attacking: PokemonType, defending: PokemonType) -> f64 {
        use PokemonType::*;

        match (attacking, defending) {
            // Typeless (Struggle, confusion self-hits) ignores the chart entirely
            (Typeless, _) | (_, Typeless) => 1.0,

            // Normal
            (Normal, Ghost) => 0.0,
            (Normal, Rock) | (Normal, Steel) => 0.5,
            (Normal, _) => 1.0,

            // Fighting
            (Fighting, Normal) | (Fighting, Rock) | (Fighting, Steel) | (Fighting, Ice)
            | (Fighting, Dark) => 2.0,
            (Fighting, Flying) | (Fighting, Poison) | (Fighting, Bug) | (Fighting, Psychic)
            | (Fighting, Fairy) => 0.5,
            (Fighting, Ghost) => 0.0,
            (Fighting, _) => 1.0,

            // Flying
            (Flying, Fighting) | (Flying, Bug) | (Flying, Grass) => 2.0,
            (Flying, Rock) | (Flying, Steel) | (Flying, Electric) => 0.5,
            (Flying, _) => 1.0,

            // Poison
            (Poison, Grass) | (Poison, Fairy) => 2.0,
            (Poison, Poison) | (Poison, Ground) | (Poison, Rock) | (Poison, Ghost) => 0.5,
            (Poison, Steel) => 0.0,
            (Poison, _) => 1.0,

            // Ground
            (Ground, Poison) | (Ground, Rock) | (Ground, Steel) | (Ground, Fire)
            | (Ground, Electric) => 2.0,
            (Ground, Bug) | (Ground, Grass) => 0.5,
            (Ground, Flying) => 0.0,
            (Ground, _) => 1.0,

            // Rock
            (Rock, Flying) | (Rock, Bug) | (Rock, Fire) | (Rock, Ice) => 2.0,
            (Rock, Fighting) | (Rock, Ground) | (Rock, Steel) => 0.5,
            (Rock, _) => 1.0,

            // Bug
            (Bug, Grass) | (Bug, Psychic) | (Bug, Dark) => 2.0,
            (Bug, Fighting) | (Bug, Flying) | (Bug, Poison) | (Bug, Ghost) | (Bug, Steel)
            | (Bug, Fire) | (Bug, Fairy) => 0.5,
            (Bug, _) => 1.0,

            // Ghost
            (Ghost, Ghost) | (Ghost, Psychic) => 2.0,
            (Ghost, Dark) => 0.5,
            (Ghost, Normal) => 0.0,
            (Ghost, _) => 1.0,

            // Steel
            (Steel, Rock) | (Steel, Ice) | (Steel, Fairy) => 2.0,
            (Steel, Steel) | (Steel, Fire) | (Steel, Water) | (Steel, Electric) => 0.5,
            (Steel, _) => 1.0,

            // Fire
            (Fire, Bug) | (Fire, Steel) | (Fire, Grass) | (Fire, Ice) => 2.0,
            (Fire, Rock) | (Fire, Fire) | (Fire, Water) | (Fire, Dragon) => 0.5,
            (Fire, _) => 1.0,

            // Water
            (Water, Ground) | (Water, Rock) | (Water, Fire) => 2.0,
            (Water, Water) | (Water, Grass) | (Water, Dragon) => 0.5,
            (Water, _) => 1.0,

            // Grass
            (Grass, Ground) | (Grass, Rock) | (Grass, Water) => 2.0,
            (Grass, Flying) | (Grass, Poison) | (Grass, Bug) | (Grass, Steel) | (Grass, Fire)
            | (Grass, Grass) | (Grass, Dragon) => 0.5,
            (Grass, _) => 1.0,

            // Electric
            (Electric, Flying) | (Electric, Water) => 2.0,
            (Electric, Grass) | (Electric, Electric) | (Electric, Dragon) => 0.5,
            (Electric, Ground) => 0.0,
            (Electric, _) => 1.0,

            // Psychic
            (Psychic, Fighting) | (Psychic, Poison) => 2.0,
            (Psychic, Steel) | (Psychic, Psychic) => 0.5,
            (Psychic, Dark) => 0.0,
            (Psychic, _) => 1.0,

            // Ice
            (Ice, Flying) | (Ice, Ground) | (Ice, Grass) | (Ice, Dragon) => 2.0,
            (Ice, Steel) | (Ice, Fire) | (Ice, Water) | (Ice, Ice) => 0.5,
            (Ice, _) => 1.0,

            // Dragon
            (Dragon, Dragon) => 2.0,
            (Dragon, Steel) => 0.5,
            (Dragon, Fairy) => 0.0,
            (Dragon, _) => 1.0,

            // Dark
            (Dark, Ghost) | (Dark, Psychic) => 2.0,
            (Dark, Fighting) | (Dark, Dark) | (Dark, Fairy) => 0.5,
            (Dark, _) => 1.0,

            // Fairy
            (Fairy, Fighting) | (Fairy, Dragon) | (Fairy, Dark) => 2.0,
            (Fairy, Poison) | (Fairy, Steel) | (Fairy, Fire) => 0.5,
            (Fairy, _) => 1.0,
        }
    }

    /// Combined effectiveness of an attacking type against a full defensive typing.
    pub fn effectiveness_against(attacking: PokemonType, defending: &[PokemonType]) -> f64 {
        defending
            .iter()
            .map(|d| Self::type_effectiveness(attacking, *d))
            .product()
    }
}

/// Stats that can carry battle boost stages. HP is intentionally absent;
/// it can never be boosted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord,
)]
pub enum Stat {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Accuracy,
    Evasion,
}

impl Stat {
    /// Index into a `[u16; 6]` computed-stat vector (HP, Atk, Def, SpA, SpD, Spe).
    /// Accuracy and Evasion have no computed stat.
    pub fn stat_index(&self) -> Option<usize> {
        match self {
            Stat::Attack => Some(1),
            Stat::Defense => Some(2),
            Stat::SpecialAttack => Some(3),
            Stat::SpecialDefense => Some(4),
            Stat::Speed => Some(5),
            Stat::Accuracy | Stat::Evasion => None,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Attack => write!(f, "Attack"),
            Stat::Defense => write!(f, "Defense"),
            Stat::SpecialAttack => write!(f, "Special Attack"),
            Stat::SpecialDefense => write!(f, "Special Defense"),
            Stat::Speed => write!(f, "Speed"),
            Stat::Accuracy => write!(f, "accuracy"),
            Stat::Evasion => write!(f, "evasiveness"),
        }
    }
}

/// Natures skew one non-HP stat up 10% and another down 10%.
/// The five "neutral" natures change nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Nature {
    #[default]
    Hardy,
    Lonely,
    Brave,
    Adamant,
    Naughty,
    Bold,
    Docile,
    Relaxed,
    Impish,
    Lax,
    Timid,
    Hasty,
    Serious,
    Jolly,
    Naive,
    Modest,
    Mild,
    Quiet,
    Bashful,
    Rash,
    Calm,
    Gentle,
    Sassy,
    Careful,
    Quirky,
}

impl Nature {
    /// Returns (raised, lowered) indices into the `[u16; 6]` stat vector,
    /// or (None, None) for neutral natures.
    pub fn skew(&self) -> (Option<usize>, Option<usize>) {
        use Nature::*;
        match self {
            Hardy | Docile | Serious | Bashful | Quirky => (None, None),
            Lonely => (Some(1), Some(2)),
            Brave => (Some(1), Some(5)),
            Adamant => (Some(1), Some(3)),
            Naughty => (Some(1), Some(4)),
            Bold => (Some(2), Some(1)),
            Relaxed => (Some(2), Some(5)),
            Impish => (Some(2), Some(3)),
            Lax => (Some(2), Some(4)),
            Timid => (Some(5), Some(1)),
            Hasty => (Some(5), Some(2)),
            Jolly => (Some(5), Some(3)),
            Naive => (Some(5), Some(4)),
            Modest => (Some(3), Some(1)),
            Mild => (Some(3), Some(2)),
            Quiet => (Some(3), Some(5)),
            Rash => (Some(3), Some(4)),
            Calm => (Some(4), Some(1)),
            Gentle => (Some(4), Some(2)),
            Sassy => (Some(4), Some(5)),
            Careful => (Some(4), Some(3)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_type_effectiveness_multiplies() {
        // Rock vs Fire/Flying is 2.0 * 2.0
        let eff = PokemonType::effectiveness_against(
            PokemonType::Rock,
            &[PokemonType::Fire, PokemonType::Flying],
        );
        assert_eq!(eff, 4.0);
    }

    #[test]
    fn test_immunity_zeroes_the_product() {
        let eff = PokemonType::effectiveness_against(
            PokemonType::Ground,
            &[PokemonType::Electric, PokemonType::Flying],
        );
        assert_eq!(eff, 0.0);
    }

    #[test]
    fn test_neutral_nature_has_no_skew() {
        assert_eq!(Nature::Serious.skew(), (None, None));
        assert_eq!(Nature::Adamant.skew(), (Some(1), Some(3)));
    }
}
