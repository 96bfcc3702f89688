// In: src/character/properties/combat.rs

use super::{PropertyContext, StatProperty};
use crate::events::{EntityId, Notification, NotificationKind, Payload, Priority, Source};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CombatState {
    attack_power: u32,
    defense: u32,
}

/// Attack power from strength and defense from agility, scaled by the
/// combat multipliers in the config.
#[derive(Debug)]
pub struct CombatProperty {
    source: EntityId,
    state: Rc<RefCell<CombatState>>,
}

impl CombatProperty {
    pub fn new(ctx: PropertyContext, source: EntityId, stats: &StatProperty) -> Self {
        let combat = &ctx.config.combat;
        let state = Rc::new(RefCell::new(CombatState {
            attack_power: combat.attack_power(stats.strength()),
            defense: combat.defense(stats.agility()),
        }));

        let weak = Rc::downgrade(&state);
        let owner = ctx.owner.id;
        let config = Rc::clone(&ctx.config);
        ctx.bus.subscribe_owned(
            owner,
            "combat.stats",
            stats.source(),
            NotificationKind::StatsChanged,
            Priority::NORMAL,
            move |bus, notification| {
                let Payload::StatsChanged { attributes, .. } = notification.payload() else {
                    return Ok(());
                };
                let Some(state) = weak.upgrade() else {
                    return Ok(());
                };
                let next = CombatState {
                    attack_power: config.combat.attack_power(attributes.strength),
                    defense: config.combat.defense(attributes.agility),
                };
                if *state.borrow() == next {
                    return Ok(());
                }
                *state.borrow_mut() = next;
                bus.publish(&Notification::new(
                    Source::Entity(source),
                    Payload::CombatChanged {
                        character: owner,
                        attack_power: next.attack_power,
                        defense: next.defense,
                    },
                ))?;
                Ok(())
            },
        );

        Self { source, state }
    }

    pub fn source(&self) -> Source {
        Source::Entity(self.source)
    }

    pub fn attack_power(&self) -> u32 {
        self.state.borrow().attack_power
    }

    pub fn defense(&self) -> u32 {
        self.state.borrow().defense
    }
}
