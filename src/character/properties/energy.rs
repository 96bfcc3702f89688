// In: src/character/properties/energy.rs

use super::{rescale, PropertyContext, StatProperty};
use crate::errors::{BusResult, HandlerError};
use crate::events::{
    EntityId, EventBus, Notification, NotificationKind, Payload, Priority, RestoreAmount, Source,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
struct EnergyState {
    current: u32,
    max: u32,
}

/// Bounded resource spent by abilities.
#[derive(Debug)]
pub struct EnergyProperty {
    source: EntityId,
    ctx: PropertyContext,
    state: Rc<RefCell<EnergyState>>,
}

impl EnergyProperty {
    pub fn new(ctx: PropertyContext, source: EntityId, stats: &StatProperty) -> Self {
        let max = ctx.config.character.max_energy(stats.intelligence());
        let state = Rc::new(RefCell::new(EnergyState { current: max, max }));
        let owner = ctx.owner.id;

        let weak = Rc::downgrade(&state);
        let config = Rc::clone(&ctx.config);
        ctx.bus.subscribe_owned(
            owner,
            "energy.stats",
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
                let new_max = config.character.max_energy(attributes.intelligence);
                let (old, new) = {
                    let mut s = state.borrow_mut();
                    if s.max == new_max {
                        return Ok(());
                    }
                    let old = s.current;
                    s.current = rescale(s.current, s.max, new_max);
                    s.max = new_max;
                    (old, s.current)
                };
                publish_change(bus, owner, source, old, new, new_max)?;
                Ok(())
            },
        );

        let weak = Rc::downgrade(&state);
        ctx.bus.subscribe_owned(
            owner,
            "energy.spent",
            Source::Broadcast,
            NotificationKind::EnergySpent,
            Priority::NORMAL,
            move |bus, notification| {
                let Payload::EnergySpent {
                    character, amount, ..
                } = notification.payload()
                else {
                    return Ok(());
                };
                if *character != owner {
                    return Ok(());
                }
                let Some(state) = weak.upgrade() else {
                    return Ok(());
                };
                if !spend(&state, owner, source, bus, *amount)? {
                    return Err(HandlerError::InsufficientEnergy {
                        needed: *amount,
                        available: state.borrow().current,
                    });
                }
                Ok(())
            },
        );

        let weak = Rc::downgrade(&state);
        ctx.bus.subscribe_owned(
            owner,
            "energy.restore",
            Source::Broadcast,
            NotificationKind::EnergyRestore,
            Priority::NORMAL,
            move |bus, notification| {
                let Payload::EnergyRestore { character, amount } = notification.payload() else {
                    return Ok(());
                };
                if *character != owner {
                    return Ok(());
                }
                if let Some(state) = weak.upgrade() {
                    restore(&state, owner, source, bus, *amount)?;
                }
                Ok(())
            },
        );

        Self { source, ctx, state }
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

    pub fn can_afford(&self, amount: u32) -> bool {
        self.current() >= amount
    }

    /// Spends `amount` if there is enough. Returns false and leaves energy
    /// untouched otherwise.
    pub fn spend(&self, amount: u32) -> BusResult<bool> {
        spend(&self.state, self.ctx.owner.id, self.source, &self.ctx.bus, amount)
    }

    /// Refills energy and returns how much was actually restored.
    pub fn restore(&self, amount: RestoreAmount) -> BusResult<u32> {
        restore(&self.state, self.ctx.owner.id, self.source, &self.ctx.bus, amount)
    }
}

fn spend(
    state: &RefCell<EnergyState>,
    owner: EntityId,
    source: EntityId,
    bus: &EventBus,
    amount: u32,
) -> BusResult<bool> {
    let (old, new, max) = {
        let mut s = state.borrow_mut();
        if s.current < amount {
            return Ok(false);
        }
        let old = s.current;
        s.current -= amount;
        (old, s.current, s.max)
    };
    if new != old {
        publish_change(bus, owner, source, old, new, max)?;
    }
    Ok(true)
}

fn restore(
    state: &RefCell<EnergyState>,
    owner: EntityId,
    source: EntityId,
    bus: &EventBus,
    amount: RestoreAmount,
) -> BusResult<u32> {
    let (old, new, max) = {
        let mut s = state.borrow_mut();
        let gain = match amount {
            RestoreAmount::Absolute(value) => value,
            RestoreAmount::Percent(share) => (s.max as f64 * share.clamp(0.0, 1.0)) as u32,
            RestoreAmount::Full => s.max,
        };
        let old = s.current;
        s.current = s.current.saturating_add(gain).min(s.max);
        (old, s.current, s.max)
    };
    if new != old {
        publish_change(bus, owner, source, old, new, max)?;
    }
    Ok(new - old)
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
        Payload::EnergyChanged {
            character: owner,
            old,
            new,
            max,
        },
    ))
}
