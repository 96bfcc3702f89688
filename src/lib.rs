// In: src/lib.rs

//! Party Battle Engine
//!
//! A turn-based party battle core built around a synchronous notification
//! bus. Characters keep their state in reactive properties, abilities
//! publish what they do, and the battle loop asks AI policies for one
//! decision per turn.

// --- MODULE DECLARATIONS ---
// This declares the module hierarchy for the crate.
pub mod abilities;
pub mod battle;
pub mod character;
pub mod config;
pub mod errors;
pub mod events;
pub mod prefab_parties;
pub mod session;

// --- PUBLIC API RE-EXPORTS ---
// This section defines the public-facing API of the `party-battle` crate,
// making it easy for users to import the most important types directly.

// --- From the `schema` crate ---
// Re-export the data definitions character files are parsed into.
pub use schema::{
    AbilityKind, Attribute, Attributes, CharacterTemplate, Color, DamageType, GrowthRates,
    PolicyKind,
};

// --- From this crate's modules (`src/`) ---

// Session context and configuration.
pub use config::GameConfig;
pub use session::Session;

// Notification bus.
pub use events::{
    DisplayHint, DisplayHintBuilder, EntityId, EventBus, Notification, NotificationKind, Payload,
    Priority, Source,
};

// Characters and abilities.
pub use abilities::{AbilityEffect, AbilityRegistry, Action, CooldownTracker};
pub use character::{Character, CharacterFactory, CharacterSpec};

// Battle engine.
pub use battle::{
    Battle, BattleLog, BattleOutcome, BattleResult, BattleRng, Behavior, Decision, InitiativeOrder,
    PartyOrder, PolicyRegistry, TurnOrder,
};

// Crate-specific error and result types.
pub use errors::{
    AbilityError, AbilityResult, ActionError, ActionResult, BattleError, BusError, BusResult,
    CharacterError, ConfigError, DataError, EngineResult, HandlerError, HandlerResult,
};
