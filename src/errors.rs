use schema::{Move, Species};
use std::fmt;

/// Main error type for the foresight battle engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEngineError {
    /// Error related to move data lookup or processing
    MoveData(MoveDataError),
    /// Error related to species data lookup or processing
    SpeciesData(SpeciesDataError),
    /// Error related to a malformed or inconsistent battle state
    BattleState(BattleStateError),
    /// Error related to an illegal submitted action
    Action(ActionError),
}

/// Errors related to move data operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveDataError {
    /// The specified move was not found in the database
    MoveNotFound(Move),
    /// Move data is malformed or incomplete
    MalformedData(String),
}

/// Errors related to species data operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeciesDataError {
    /// The specified species was not found in the database
    SpeciesNotFound(Species),
    /// Species data is malformed or incomplete
    MalformedData(String),
}

/// Errors related to battle state validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleStateError {
    /// No active Pokemon found when one was expected
    NoActivePokemon,
    /// The serialized state could not be decoded
    MalformedState(String),
}

/// Errors related to submitted actions. These always indicate a caller bug:
/// a legitimately ineffective move is a no-op branch, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The action token could not be parsed
    UnparsableToken(String),
    /// The active Pokemon does not know the requested move
    UnknownMove(Move),
    /// The requested move has no PP left (Struggle should have been chosen)
    NoPPRemaining(Move),
    /// The requested move is disabled
    MoveDisabled(Move),
    /// Switch target slot is out of bounds or empty
    InvalidSwitchTarget(usize),
    /// Switch target has fainted
    SwitchTargetFainted(usize),
    /// Switch target is already the active Pokemon
    SwitchTargetActive(usize),
    /// The side has no legal action at all
    NoLegalActions,
}

impl fmt::Display for BattleEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEngineError::MoveData(err) => write!(f, "Move data error: {}", err),
            BattleEngineError::SpeciesData(err) => write!(f, "Species data error: {}", err),
            BattleEngineError::BattleState(err) => write!(f, "Battle state error: {}", err),
            BattleEngineError::Action(err) => write!(f, "Action error: {}", err),
        }
    }
}

impl fmt::Display for MoveDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDataError::MoveNotFound(move_) => write!(f, "Move not found: {}", move_),
            MoveDataError::MalformedData(details) => write!(f, "Malformed move data: {}", details),
        }
    }
}

impl fmt::Display for SpeciesDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeciesDataError::SpeciesNotFound(species) => {
                write!(f, "Species not found: {}", species)
            }
            SpeciesDataError::MalformedData(details) => {
                write!(f, "Malformed species data: {}", details)
            }
        }
    }
}

impl fmt::Display for BattleStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleStateError::NoActivePokemon => write!(f, "No active Pokemon found"),
            BattleStateError::MalformedState(details) => {
                write!(f, "Malformed battle state: {}", details)
            }
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::UnparsableToken(token) => write!(f, "Unparsable action token: {}", token),
            ActionError::UnknownMove(move_) => {
                write!(f, "Active Pokemon does not know {}", move_)
            }
            ActionError::NoPPRemaining(move_) => write!(f, "{} has no PP remaining", move_),
            ActionError::MoveDisabled(move_) => write!(f, "{} is disabled", move_),
            ActionError::InvalidSwitchTarget(slot) => {
                write!(f, "No Pokemon in team slot {}", slot)
            }
            ActionError::SwitchTargetFainted(slot) => {
                write!(f, "Pokemon in team slot {} has fainted", slot)
            }
            ActionError::SwitchTargetActive(slot) => {
                write!(f, "Pokemon in team slot {} is already active", slot)
            }
            ActionError::NoLegalActions => write!(f, "Side has no legal actions"),
        }
    }
}

impl std::error::Error for BattleEngineError {}
impl std::error::Error for MoveDataError {}
impl std::error::Error for SpeciesDataError {}
impl std::error::Error for BattleStateError {}
impl std::error::Error for ActionError {}

impl From<MoveDataError> for BattleEngineError {
    fn from(err: MoveDataError) -> Self {
        BattleEngineError::MoveData(err)
    }
}

impl From<SpeciesDataError> for BattleEngineError {
    fn from(err: SpeciesDataError) -> Self {
        BattleEngineError::SpeciesData(err)
    }
}

impl From<BattleStateError> for BattleEngineError {
    fn from(err: BattleStateError) -> Self {
        BattleEngineError::BattleState(err)
    }
}

impl From<ActionError> for BattleEngineError {
    fn from(err: ActionError) -> Self {
        BattleEngineError::Action(err)
    }
}

/// Convenience result types
pub type BattleResult<T> = Result<T, BattleEngineError>;
pub type MoveDataResult<T> = Result<T, MoveDataError>;
pub type SpeciesDataResult<T> = Result<T, SpeciesDataError>;
