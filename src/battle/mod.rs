pub mod ai;
pub mod engine;
pub mod log;
pub mod pacing;
pub mod result;
pub mod rng;
pub mod turn_order;
pub mod turn_orchestrator;

#[cfg(test)]
mod tests;

pub use ai::{BasicEnemyAI, Behavior, Decision, HealerAI, PlayerAI, PolicyRegistry};
pub use engine::{Battle, BattlePhase};
pub use log::BattleLog;
pub use pacing::{NoPacing, Pacer, Pause, SleepPacer};
pub use result::{BattleOutcome, BattleResult, CombatantSnapshot};
pub use rng::BattleRng;
pub use turn_order::{InitiativeOrder, PartyOrder, TurnOrder};
pub use turn_orchestrator::{is_battle_over, Round};
