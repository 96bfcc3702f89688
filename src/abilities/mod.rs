pub mod action;
pub mod builtin;
pub mod cooldowns;
pub mod manager;
pub mod registry;

pub use action::{AbilityEffect, Action, ActionState};
pub use cooldowns::CooldownTracker;
pub use manager::AbilityManager;
pub use registry::{AbilityFactory, AbilityRegistry};
