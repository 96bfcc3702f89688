// In: src/character/properties/mod.rs

//! Derived character state.
//!
//! Each property keeps its numbers behind an `Rc<RefCell<_>>` and subscribes
//! to the notifications of the property it depends on:
//!
//! ```text
//! Level --LevelUp--> Stats --StatsChanged--> Health, Energy, Combat
//!   ^                                          ^
//!   +--ExperienceChanged-- Experience          +--CombatChanged (defense)
//! ```
//!
//! Handlers hold weak references to their own state and never keep a borrow
//! open across a publish, so cascades can re-enter any property safely.

pub mod combat;
pub mod energy;
pub mod experience;
pub mod health;
pub mod level;
pub mod stats;

pub use combat::CombatProperty;
pub use energy::EnergyProperty;
pub use experience::ExperienceProperty;
pub use health::{resolve_damage, HealthProperty};
pub use level::LevelProperty;
pub use stats::StatProperty;

use crate::config::GameConfig;
use crate::events::{EntityId, EventBus};
use std::rc::Rc;

/// Who a property belongs to, as far as notifications and hints care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: EntityId,
    pub name: Rc<str>,
    pub is_player: bool,
}

/// Everything a property needs from its character and session.
#[derive(Debug, Clone)]
pub struct PropertyContext {
    pub bus: Rc<EventBus>,
    pub config: Rc<GameConfig>,
    pub owner: Owner,
}

/// Scales `current` from `old_max` to `new_max`, keeping the fill ratio.
pub(crate) fn rescale(current: u32, old_max: u32, new_max: u32) -> u32 {
    if old_max == 0 {
        return new_max;
    }
    let scaled = (current as f64 * new_max as f64 / old_max as f64).round() as u32;
    scaled.min(new_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(50, 100, 200, 100)]
    #[case(100, 100, 80, 80)]
    #[case(1, 3, 10, 3)]
    #[case(0, 100, 150, 0)]
    #[case(7, 0, 40, 40)]
    fn test_rescale_keeps_ratio(
        #[case] current: u32,
        #[case] old_max: u32,
        #[case] new_max: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(rescale(current, old_max, new_max), expected);
    }
}
