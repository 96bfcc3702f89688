// In: src/character/properties/level.rs

use super::{Owner, PropertyContext};
use crate::errors::BusResult;
use crate::events::{
    DisplayHintBuilder, EntityId, EventBus, Notification, NotificationKind, Payload, Priority,
    Source,
};
use std::cell::Cell;
use std::rc::Rc;
use tracing::info;

#[derive(Debug)]
pub struct LevelProperty {
    source: EntityId,
    ctx: PropertyContext,
    level: Rc<Cell<u32>>,
}

impl LevelProperty {
    pub fn new(ctx: PropertyContext, source: EntityId, level: u32) -> Self {
        Self {
            source,
            ctx,
            level: Rc::new(Cell::new(level.max(1))),
        }
    }

    /// Raises the level each time `experience` reports a total at or above
    /// its threshold. The experience side answers every level-up with a
    /// lower total. Level-ups reported while one is in flight are queued and
    /// run one after another, so any number of them stays at a fixed bus depth.
    pub fn listen_to_experience(&self, experience: Source) {
        let weak = Rc::downgrade(&self.level);
        let owner = self.ctx.owner.clone();
        let source = self.source;
        let raising = Cell::new(false);
        let pending = Cell::new(false);
        self.ctx.bus.subscribe_owned(
            owner.id,
            "level.experience",
            experience,
            NotificationKind::ExperienceChanged,
            Priority::NORMAL,
            move |bus, notification| {
                let Payload::ExperienceChanged {
                    current, required, ..
                } = notification.payload()
                else {
                    return Ok(());
                };
                if current < required {
                    return Ok(());
                }
                if raising.get() {
                    pending.set(true);
                    return Ok(());
                }
                let Some(level) = weak.upgrade() else {
                    return Ok(());
                };
                raising.set(true);
                let result = raise_while_pending(&level, &owner, source, bus, &pending);
                raising.set(false);
                pending.set(false);
                result?;
                Ok(())
            },
        );
    }

    pub fn source(&self) -> Source {
        Source::Entity(self.source)
    }

    pub fn level(&self) -> u32 {
        self.level.get()
    }

    /// Raises the level by one outside of the experience flow.
    pub fn level_up(&self) -> BusResult<u32> {
        raise(&self.level, &self.ctx.owner, self.source, &self.ctx.bus)
    }
}

fn raise_while_pending(
    level: &Cell<u32>,
    owner: &Owner,
    source: EntityId,
    bus: &EventBus,
    pending: &Cell<bool>,
) -> BusResult<()> {
    loop {
        pending.set(false);
        raise(level, owner, source, bus)?;
        if !pending.get() {
            return Ok(());
        }
    }
}

fn raise(level: &Cell<u32>, owner: &Owner, source: EntityId, bus: &EventBus) -> BusResult<u32> {
    let old_level = level.get();
    let new_level = old_level + 1;
    level.set(new_level);
    info!(character = %owner.name, level = new_level, "Level up");

    let hint = DisplayHintBuilder::new()
        .character_name(&owner.name, owner.is_player)
        .text(" reached level ")
        .exp_value(new_level)
        .text("!")
        .build();
    bus.publish(
        &Notification::new(
            Source::Entity(source),
            Payload::LevelUp {
                character: owner.id,
                old_level,
                new_level,
            },
        )
        .with_hint(hint),
    )?;
    Ok(new_level)
}
