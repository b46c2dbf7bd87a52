use crate::errors::{ActionError, BattleResult, BattleStateError};
use crate::side::SideState;
use schema::{Move, Terrain, Weather};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Perspective-relative side handle. The engine never cares which side is the
/// human player; "user" is simply the side the caller is reasoning for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideId {
    User,
    Opponent,
}

impl SideId {
    pub fn to_index(self) -> usize {
        match self {
            SideId::User => 0,
            SideId::Opponent => 1,
        }
    }

    pub fn opponent(self) -> SideId {
        match self {
            SideId::User => SideId::Opponent,
            SideId::Opponent => SideId::User,
        }
    }

    pub fn from_index(index: usize) -> SideId {
        match index {
            0 => SideId::User,
            1 => SideId::Opponent,
            _ => panic!("Invalid side index: {}", index),
        }
    }

    pub fn both() -> [SideId; 2] {
        [SideId::User, SideId::Opponent]
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideId::User => write!(f, "user"),
            SideId::Opponent => write!(f, "opponent"),
        }
    }
}

/// One complete, fully observable battle snapshot. The state exclusively owns
/// both sides, which exclusively own their Pokemon; every mutation targets
/// exactly one owned leaf, so a clone is always a fully independent graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub sides: [SideState; 2],
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default)]
    pub terrain: Option<Terrain>,
    #[serde(default)]
    pub trick_room: bool,
}

impl BattleState {
    pub fn new(user: SideState, opponent: SideState) -> Self {
        Self {
            sides: [user, opponent],
            weather: None,
            terrain: None,
            trick_room: false,
        }
    }

    pub fn side(&self, id: SideId) -> &SideState {
        &self.sides[id.to_index()]
    }

    pub fn side_mut(&mut self, id: SideId) -> &mut SideState {
        &mut self.sides[id.to_index()]
    }

    /// Decode a battle state from its external JSON representation.
    pub fn from_json(json: &str) -> BattleResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| BattleStateError::MalformedState(e.to_string()).into())
    }

    /// Encode the state into its external JSON representation. Satisfies the
    /// round-trip law: `from_json(to_json(state)) == state`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("battle state serialization cannot fail")
    }
}

/// A submitted action for one side of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move(Move),
    Switch(usize),
    /// The reserved do-nothing sentinel.
    None,
}

impl Action {
    /// Parse an external action token: a kebab-case move id, `switch <slot>`,
    /// or `none`.
    pub fn parse(token: &str) -> Result<Action, ActionError> {
        let token = token.trim();
        if token.is_empty() || token.eq_ignore_ascii_case("none") {
            return Ok(Action::None);
        }
        if let Some(rest) = token.strip_prefix("switch ") {
            let slot = rest
                .trim()
                .parse::<usize>()
                .map_err(|_| ActionError::UnparsableToken(token.to_string()))?;
            return Ok(Action::Switch(slot));
        }
        Move::from_str(token)
            .map(Action::Move)
            .map_err(|_| ActionError::UnparsableToken(token.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(move_) => write!(f, "{}", move_),
            Action::Switch(slot) => write!(f, "switch {}", slot),
            Action::None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_id_round_trip() {
        assert_eq!(SideId::from_index(SideId::User.to_index()), SideId::User);
        assert_eq!(SideId::User.opponent(), SideId::Opponent);
        assert_eq!(SideId::Opponent.opponent(), SideId::User);
    }

    #[test]
    fn test_action_token_parsing() {
        assert_eq!(Action::parse("none").unwrap(), Action::None);
        assert_eq!(Action::parse("").unwrap(), Action::None);
        assert_eq!(Action::parse("switch 3").unwrap(), Action::Switch(3));
        assert_eq!(
            Action::parse("thunderbolt").unwrap(),
            Action::Move(Move::Thunderbolt)
        );
        assert_eq!(
            Action::parse("stealth-rock").unwrap(),
            Action::Move(Move::StealthRock)
        );
        assert!(Action::parse("not-a-move").is_err());
        assert!(Action::parse("switch x").is_err());
    }

    #[test]
    fn test_action_display_matches_tokens() {
        assert_eq!(Action::Move(Move::QuickAttack).to_string(), "quick-attack");
        assert_eq!(Action::Switch(2).to_string(), "switch 2");
        assert_eq!(Action::None.to_string(), "none");
    }
}
