// In: src/abilities/cooldowns.rs

use crate::events::{EntityId, EventBus, NotificationKind, Payload, Priority, Source};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Remaining cooldown rounds per character and ability.
///
/// Entries are created from `AbilityUsed`, count down on `RoundEnded` and are
/// wiped on `BattleEnded`. A cooldown of `n` applied during round `r` blocks
/// the ability through round `r + n - 1`.
#[derive(Debug)]
pub struct CooldownTracker {
    id: EntityId,
    entries: RefCell<HashMap<EntityId, HashMap<String, u32>>>,
}

impl CooldownTracker {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Subscribes the tracker to the lifecycle notifications on `bus`.
    pub fn attach(tracker: &Rc<Self>, bus: &EventBus) {
        let weak = Rc::downgrade(tracker);
        bus.subscribe_owned(
            tracker.id,
            "cooldowns.ability_used",
            Source::Broadcast,
            NotificationKind::AbilityUsed,
            Priority::NORMAL,
            move |_, notification| {
                if let (
                    Payload::AbilityUsed {
                        character,
                        ability,
                        cooldown,
                    },
                    Some(tracker),
                ) = (notification.payload(), weak.upgrade())
                {
                    tracker.apply(*character, ability, *cooldown);
                }
                Ok(())
            },
        );

        let weak = Rc::downgrade(tracker);
        bus.subscribe_owned(
            tracker.id,
            "cooldowns.round_ended",
            Source::Broadcast,
            NotificationKind::RoundEnded,
            Priority::NORMAL,
            move |_, _| {
                if let Some(tracker) = weak.upgrade() {
                    tracker.tick();
                }
                Ok(())
            },
        );

        let weak = Rc::downgrade(tracker);
        bus.subscribe_owned(
            tracker.id,
            "cooldowns.battle_ended",
            Source::Broadcast,
            NotificationKind::BattleEnded,
            Priority::NORMAL,
            move |_, _| {
                if let Some(tracker) = weak.upgrade() {
                    tracker.clear();
                }
                Ok(())
            },
        );
    }

    /// Removes the tracker's subscriptions from `bus`.
    pub fn detach(&self, bus: &EventBus) -> usize {
        bus.unsubscribe_all_by_owner(self.id)
    }

    /// Starts (or restarts) a cooldown. A duration of 0 clears any entry.
    pub fn apply(&self, character: EntityId, ability: &str, duration: u32) {
        let mut entries = self.entries.borrow_mut();
        if duration == 0 {
            if let Some(abilities) = entries.get_mut(&character) {
                abilities.remove(ability);
                if abilities.is_empty() {
                    entries.remove(&character);
                }
            }
            return;
        }
        debug!(character = %character, ability, duration, "Cooldown applied");
        entries
            .entry(character)
            .or_default()
            .insert(ability.to_string(), duration);
    }

    pub fn is_on_cooldown(&self, character: EntityId, ability: &str) -> bool {
        self.remaining(character, ability) > 0
    }

    pub fn remaining(&self, character: EntityId, ability: &str) -> u32 {
        self.entries
            .borrow()
            .get(&character)
            .and_then(|abilities| abilities.get(ability))
            .copied()
            .unwrap_or(0)
    }

    /// The subset of `abilities` that are ready, in the given order.
    pub fn filter_ready<S: AsRef<str>>(&self, character: EntityId, abilities: &[S]) -> Vec<String> {
        let entries = self.entries.borrow();
        let cooling = entries.get(&character);
        abilities
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| cooling.map_or(true, |c| !c.contains_key(*name)))
            .map(str::to_string)
            .collect()
    }

    /// Counts every entry down by one round, dropping those that reach zero.
    pub fn tick(&self) {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|_, abilities| {
            abilities.retain(|_, remaining| {
                *remaining = remaining.saturating_sub(1);
                *remaining > 0
            });
            !abilities.is_empty()
        });
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn clear_character(&self, character: EntityId) {
        self.entries.borrow_mut().remove(&character);
    }

    /// Number of characters with at least one active cooldown.
    pub fn tracked_characters(&self) -> usize {
        self.entries.borrow().len()
    }
}
