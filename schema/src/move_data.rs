use crate::battle_data::{SideCondition, StatusCondition, Terrain, VolatileStatus, Weather};
use crate::pokemon_types::{PokemonType, Stat};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

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
pub enum Move {
    Tackle,
    QuickAttack,
    BodySlam,
    HyperVoice,
    DoubleKick,
    CloseCombat,
    FocusBlast,
    HighJumpKick,
    BraveBird,
    AirSlash,
    Hurricane,
    Roost,
    Tailwind,
    Earthquake,
    StealthRock,
    Spikes,
    ToxicSpikes,
    Toxic,
    SludgeBomb,
    IcePunch,
    IceBeam,
    AuroraVeil,
    Thunderbolt,
    ThunderWave,
    Flamethrower,
    WillOWisp,
    SunnyDay,
    RainDance,
    Surf,
    HydroPump,
    GigaDrain,
    LeechSeed,
    SolarBeam,
    SleepPowder,
    Spore,
    GrassyTerrain,
    ElectricTerrain,
    Psychic,
    FutureSight,
    TrickRoom,
    ShadowBall,
    Crunch,
    Taunt,
    DragonTail,
    DragonDance,
    SwordsDance,
    NastyPlot,
    Recover,
    Wish,
    Substitute,
    Protect,
    Roar,
    Whirlwind,
    IronHead,
    Struggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Who a move payload lands on. For side conditions this names the side that
/// receives the condition (hazards go to `Opponent`, screens to `User`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Target {
    User,
    #[default]
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CritRate {
    #[default]
    Normal,
    Elevated,
}

impl CritRate {
    pub fn chance(&self) -> f64 {
        match self {
            CritRate::Normal => 1.0 / 24.0,
            CritRate::Elevated => 1.0 / 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MoveFlags {
    pub contact: bool,
    pub sound: bool,
    pub powder: bool,
    pub punch: bool,
    pub bypass_protect: bool,
    pub drag: bool,
    pub charge: bool,
    pub trick_room: bool,
    pub wish: bool,
    pub future_sight: bool,
}

/// A chance-gated extra effect of a damaging move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryEffect {
    pub chance: u8,
    #[serde(default)]
    pub target: Target,
    pub effect: EffectKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Status(StatusCondition),
    Volatile(VolatileStatus),
    Boosts(Vec<(Stat, i8)>),
}

fn default_hits() -> u8 {
    1
}

/// Static per-move data, loaded once from the bundled RON database.
///
/// `accuracy: None` marks a move that never misses. Fractions are
/// (numerator, denominator) pairs: `heal` and `crash` are relative to the
/// user's max HP, `drain` and `recoil` to the damage actually dealt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub move_type: PokemonType,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: u16,
    #[serde(default)]
    pub accuracy: Option<u8>,
    pub pp: u8,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub flags: MoveFlags,
    #[serde(default)]
    pub crit_rate: CritRate,
    #[serde(default = "default_hits")]
    pub hits: u8,
    #[serde(default)]
    pub secondaries: Vec<SecondaryEffect>,
    #[serde(default)]
    pub self_boosts: Vec<(Stat, i8)>,
    #[serde(default)]
    pub heal: Option<(u8, u8)>,
    #[serde(default)]
    pub drain: Option<(u8, u8)>,
    #[serde(default)]
    pub recoil: Option<(u8, u8)>,
    #[serde(default)]
    pub crash: Option<(u8, u8)>,
    #[serde(default)]
    pub status: Option<(Target, StatusCondition)>,
    #[serde(default)]
    pub volatile_status: Option<(Target, VolatileStatus)>,
    #[serde(default)]
    pub side_condition: Option<(Target, SideCondition)>,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default)]
    pub terrain: Option<Terrain>,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        matches!(self.category, MoveCategory::Physical | MoveCategory::Special)
    }
}
