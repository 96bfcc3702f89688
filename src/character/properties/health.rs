// In: src/character/properties/health.rs

use super::{rescale, CombatProperty, Owner, PropertyContext, StatProperty};
use crate::errors::BusResult;
use crate::events::{
    DisplayHintBuilder, EntityId, EventBus, Notification, NotificationKind, Payload, Priority,
    Source,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::info;

/// Damage actually taken from `incoming` against `defense`: defense absorbs
/// half its value, but any real hit deals at least 1.
pub fn resolve_damage(incoming: u32, defense: u32) -> u32 {
    if incoming == 0 {
        return 0;
    }
    incoming.saturating_sub(defense / 2).max(1)
}

#[derive(Debug)]
struct HealthState {
    current: u32,
    max: u32,
    /// Cached from `CombatChanged`.
    defense: u32,
    dead: bool,
}

/// Bounded hit points. Only damage can kill; recomputing the maximum never does.
#[derive(Debug)]
pub struct HealthProperty {
    source: EntityId,
    ctx: PropertyContext,
    state: Rc<RefCell<HealthState>>,
}

impl HealthProperty {
    pub fn new(
        ctx: PropertyContext,
        source: EntityId,
        stats: &StatProperty,
        combat: &CombatProperty,
    ) -> Self {
        let max = ctx.config.character.max_health(stats.vitality());
        let state = Rc::new(RefCell::new(HealthState {
            current: max,
            max,
            defense: combat.defense(),
            dead: false,
        }));
        let property = Self { source, ctx, state };
        property.subscribe(stats.source(), combat.source());
        property
    }

    fn subscribe(&self, stats: Source, combat: Source) {
        let bus = &self.ctx.bus;
        let owner = self.ctx.owner.clone();

        let weak = Rc::downgrade(&self.state);
        let config = Rc::clone(&self.ctx.config);
        let (id, source) = (owner.id, self.source);
        bus.subscribe_owned(
            id,
            "health.stats",
            stats,
            NotificationKind::StatsChanged,
            Priority::NORMAL,
            move |bus, notification| {
                let Payload::StatsChanged { attributes, .. } = notification.payload() else {
                    return Ok(());
                };
                let new_max = config.character.max_health(attributes.vitality);
                set_max(&weak, id, source, bus, new_max)?;
                Ok(())
            },
        );

        let weak = Rc::downgrade(&self.state);
        bus.subscribe_owned(
            id,
            "health.combat",
            combat,
            NotificationKind::CombatChanged,
            Priority::NORMAL,
            move |_, notification| {
                if let (Payload::CombatChanged { defense, .. }, Some(state)) =
                    (notification.payload(), weak.upgrade())
                {
                    state.borrow_mut().defense = *defense;
                }
                Ok(())
            },
        );

        let weak = Rc::downgrade(&self.state);
        let damage_owner = owner.clone();
        bus.subscribe_owned(
            id,
            "health.damage",
            Source::Broadcast,
            NotificationKind::Damage,
            Priority::NORMAL,
            move |bus, notification| {
                let Payload::Damage {
                    attacker,
                    target,
                    amount,
                    damage_type,
                } = notification.payload()
                else {
                    return Ok(());
                };
                if *target != damage_owner.id {
                    return Ok(());
                }
                let Some(state) = weak.upgrade() else {
                    return Ok(());
                };
                let bypass = damage_type.bypasses_defense();
                take_damage(&state, &damage_owner, source, bus, *amount, bypass, *attacker)?;
                Ok(())
            },
        );

        let weak = Rc::downgrade(&self.state);
        bus.subscribe_owned(
            id,
            "health.heal",
            Source::Broadcast,
            NotificationKind::Heal,
            Priority::NORMAL,
            move |bus, notification| {
                let Payload::Heal { target, amount, .. } = notification.payload() else {
                    return Ok(());
                };
                if *target != id {
                    return Ok(());
                }
                let Some(state) = weak.upgrade() else {
                    return Ok(());
                };
                heal(&state, id, source, bus, *amount)?;
                Ok(())
            },
        );
    }

    pub fn source(&self) -> Source {
        Source::Entity(self.source)
    }

    pub fn current(&self) -> u32 {
        self.state.borrow().current
    }

    pub fn max(&self) -> u32 {
        self.state.borrow().max
    }

    pub fn is_dead(&self) -> bool {
        self.state.borrow().dead
    }

    /// Fill ratio in `0.0..=1.0`; zero when the maximum is zero.
    pub fn ratio(&self) -> f64 {
        let state = self.state.borrow();
        if state.max == 0 {
            return 0.0;
        }
        state.current as f64 / state.max as f64
    }

    pub fn is_below(&self, threshold: f64) -> bool {
        self.max() > 0 && self.ratio() < threshold
    }

    /// Places a living character at `value` hit points (clamped to `1..=max`)
    /// without publishing. Used when setting up test scenarios.
    #[cfg(test)]
    pub(crate) fn force_current(&self, value: u32) {
        let mut state = self.state.borrow_mut();
        if !state.dead {
            state.current = value.clamp(1.min(state.max), state.max);
        }
    }
}

fn set_max(
    weak: &Weak<RefCell<HealthState>>,
    owner: EntityId,
    source: EntityId,
    bus: &EventBus,
    new_max: u32,
) -> BusResult<()> {
    let Some(state) = weak.upgrade() else {
        return Ok(());
    };
    let (old, new) = {
        let mut s = state.borrow_mut();
        if s.max == new_max {
            return Ok(());
        }
        let old = s.current;
        s.current = if s.dead {
            0
        } else {
            rescale(s.current, s.max, new_max).max(1.min(new_max))
        };
        s.max = new_max;
        (old, s.current)
    };
    publish_change(bus, owner, source, old, new, new_max)
}

fn take_damage(
    state: &RefCell<HealthState>,
    owner: &Owner,
    source: EntityId,
    bus: &EventBus,
    incoming: u32,
    bypass_defense: bool,
    attacker: Option<EntityId>,
) -> BusResult<()> {
    let (old, new, max, died) = {
        let mut s = state.borrow_mut();
        let defense = if bypass_defense { 0 } else { s.defense };
        let applied = resolve_damage(incoming, defense);
        let old = s.current;
        s.current = s.current.saturating_sub(applied);
        let died = s.current == 0 && !s.dead;
        if died {
            s.dead = true;
        }
        (old, s.current, s.max, died)
    };

    if new != old {
        publish_change(bus, owner.id, source, old, new, max)?;
    }
    if died {
        info!(character = %owner.name, "Character died");
        let hint = DisplayHintBuilder::new()
            .character_name(&owner.name, owner.is_player)
            .text(" has been defeated!")
            .build();
        bus.publish(
            &Notification::broadcast(Payload::Death {
                victim: owner.id,
                killer: attacker,
            })
            .with_hint(hint),
        )?;
    }
    Ok(())
}

fn heal(
    state: &RefCell<HealthState>,
    owner: EntityId,
    source: EntityId,
    bus: &EventBus,
    amount: u32,
) -> BusResult<()> {
    let (old, new, max) = {
        let mut s = state.borrow_mut();
        if s.dead {
            return Ok(());
        }
        let old = s.current;
        s.current = s.current.saturating_add(amount).min(s.max);
        (old, s.current, s.max)
    };
    if new != old {
        publish_change(bus, owner, source, old, new, max)?;
    }
    Ok(())
}

fn publish_change(
    bus: &EventBus,
    owner: EntityId,
    source: EntityId,
    old: u32,
    new: u32,
    max: u32,
) -> BusResult<()> {
    bus.publish(&Notification::new(
        Source::Entity(source),
        Payload::HealthChanged {
            character: owner,
            old,
            new,
            max,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(20, 0, 20)]
    #[case(20, 10, 15)]
    #[case(20, 11, 15)]
    #[case(5, 40, 1)]
    #[case(1, 0, 1)]
    #[case(0, 0, 0)]
    #[case(0, 50, 0)]
    fn test_resolve_damage(#[case] incoming: u32, #[case] defense: u32, #[case] expected: u32) {
        assert_eq!(resolve_damage(incoming, defense), expected);
    }
}
