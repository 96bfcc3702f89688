// In: src/character/properties/stats.rs

use super::{Owner, PropertyContext};
use crate::errors::BusResult;
use crate::events::{EntityId, EventBus, Notification, NotificationKind, Payload, Priority, Source};
use schema::{Attribute, Attributes, GrowthRates};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use strum::IntoEnumIterator;

#[derive(Debug)]
struct StatState {
    current: Attributes,
    base: Attributes,
    growth: GrowthRates,
}

/// Root of the dependency graph: the four primary attributes.
#[derive(Debug)]
pub struct StatProperty {
    source: EntityId,
    ctx: PropertyContext,
    state: Rc<RefCell<StatState>>,
}

impl StatProperty {
    /// `base` is the level 1 block; the starting values are grown to `level`.
    pub fn new(
        ctx: PropertyContext,
        source: EntityId,
        base: Attributes,
        growth: GrowthRates,
        level: u32,
    ) -> Self {
        let state = StatState {
            current: base.at_level(&growth, level),
            base,
            growth,
        };
        Self {
            source,
            ctx,
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Grows the attributes whenever `level` publishes a level-up.
    pub fn listen_to_level(&self, level: Source) {
        let weak = Rc::downgrade(&self.state);
        let owner = self.ctx.owner.clone();
        let source = self.source;
        self.ctx.bus.subscribe_owned(
            owner.id,
            "stats.level_up",
            level,
            NotificationKind::LevelUp,
            Priority::NORMAL,
            move |bus, notification| {
                let Payload::LevelUp {
                    old_level,
                    new_level,
                    ..
                } = notification.payload()
                else {
                    return Ok(());
                };
                grow(&weak, &owner, source, bus, *old_level, *new_level)?;
                Ok(())
            },
        );
    }

    pub fn source(&self) -> Source {
        Source::Entity(self.source)
    }

    pub fn attributes(&self) -> Attributes {
        self.state.borrow().current
    }

    pub fn get(&self, attribute: Attribute) -> u32 {
        self.state.borrow().current.get(attribute)
    }

    pub fn strength(&self) -> u32 {
        self.get(Attribute::Strength)
    }

    pub fn agility(&self) -> u32 {
        self.get(Attribute::Agility)
    }

    pub fn intelligence(&self) -> u32 {
        self.get(Attribute::Intelligence)
    }

    pub fn vitality(&self) -> u32 {
        self.get(Attribute::Vitality)
    }

    /// Batched update. Any number of writes inside `edit` publish at most one
    /// `StatsChanged`, and none if the block ends up equal to where it started.
    /// Returns whether anything changed.
    pub fn update<F>(&self, edit: F) -> BusResult<bool>
    where
        F: FnOnce(&mut Attributes),
    {
        apply_update(&self.state, &self.ctx.owner, self.source, &self.ctx.bus, edit)
    }

    pub fn set(&self, attribute: Attribute, value: u32) -> BusResult<bool> {
        self.update(|attrs| attrs.set(attribute, value))
    }

    pub fn modify(&self, attribute: Attribute, delta: i64) -> BusResult<bool> {
        self.update(|attrs| {
            let value = (attrs.get(attribute) as i64 + delta).max(0) as u32;
            attrs.set(attribute, value);
        })
    }
}

fn apply_update<F>(
    state: &RefCell<StatState>,
    owner: &Owner,
    source: EntityId,
    bus: &EventBus,
    edit: F,
) -> BusResult<bool>
where
    F: FnOnce(&mut Attributes),
{
    let before = state.borrow().current;
    let mut after = before;
    edit(&mut after);
    if after == before {
        return Ok(false);
    }
    state.borrow_mut().current = after;

    bus.publish(&Notification::new(
        Source::Entity(source),
        Payload::StatsChanged {
            character: owner.id,
            attributes: after,
        },
    ))?;
    Ok(true)
}

fn grow(
    weak: &Weak<RefCell<StatState>>,
    owner: &Owner,
    source: EntityId,
    bus: &EventBus,
    old_level: u32,
    new_level: u32,
) -> BusResult<bool> {
    let Some(state) = weak.upgrade() else {
        return Ok(false);
    };
    let (before, after) = {
        let s = state.borrow();
        (
            s.base.at_level(&s.growth, old_level),
            s.base.at_level(&s.growth, new_level),
        )
    };
    apply_update(&state, owner, source, bus, |attrs| {
        for attribute in Attribute::iter() {
            let gained = after.get(attribute).saturating_sub(before.get(attribute));
            attrs.set(attribute, attrs.get(attribute) + gained);
        }
    })
}
