// In: src/errors.rs

use crate::events::{NotificationKind, Source};
use thiserror::Error;

/// Failure raised from inside a notification handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("insufficient energy: needed {needed}, had {available}")]
    InsufficientEnergy { needed: u32, available: u32 },
    #[error("notification rejected: {0}")]
    Rejected(String),
    /// A handler published a follow-up notification and that publish failed.
    #[error(transparent)]
    Publish(#[from] Box<BusError>),
}

impl From<BusError> for HandlerError {
    fn from(err: BusError) -> Self {
        HandlerError::Publish(Box::new(err))
    }
}

/// Errors surfaced by `EventBus::publish`.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("handler `{handler}` failed on {kind} from {origin}: {error}")]
    HandlerFailed {
        kind: NotificationKind,
        origin: Source,
        handler: &'static str,
        #[source]
        error: HandlerError,
    },
    #[error("notification cascade exceeded depth {limit} while publishing {kind}")]
    CascadeTooDeep { kind: NotificationKind, limit: usize },
}

/// Usage errors for a single `Action`. These are programming errors, not battle flow.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action `{ability}` has already been executed")]
    AlreadyExecuted { ability: String },
    #[error("action `{ability}` has no target")]
    NoTarget { ability: String },
    #[error("action `{ability}` is not available")]
    Unavailable { ability: String },
    #[error(transparent)]
    Bus(#[from] BusError),
}

#[derive(Debug, Error)]
pub enum AbilityError {
    #[error("ability not found: {0}")]
    NotFound(String),
    #[error("{character} has not learned `{ability}`")]
    NotLearned { character: String, ability: String },
    #[error("`{ability}` is on cooldown for {remaining} more round(s)")]
    OnCooldown { ability: String, remaining: u32 },
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Errors reading RON data files (character templates, parties).
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("template `{template}` names unknown ability `{ability}`")]
    UnknownAbility { template: String, ability: String },
    #[error("template `{template}` names unknown policy `{policy}`")]
    UnknownPolicy { template: String, policy: String },
    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Main error type for running a battle.
#[derive(Debug, Error)]
pub enum BattleError {
    #[error("both parties need at least one member (players: {players}, enemies: {enemies})")]
    EmptyParty { players: usize, enemies: usize },
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Result type for notification handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Result type for publishing.
pub type BusResult<T> = Result<T, BusError>;

/// Result type for action execution.
pub type ActionResult<T> = Result<T, ActionError>;

/// Result type for ability use through a character.
pub type AbilityResult<T> = Result<T, AbilityError>;

/// Result type for battle operations. Named apart from `battle::BattleResult`,
/// the summary a finished battle produces.
pub type EngineResult<T> = Result<T, BattleError>;
