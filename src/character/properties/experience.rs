// In: src/character/properties/experience.rs

use super::PropertyContext;
use crate::errors::BusResult;
use crate::events::{EntityId, EventBus, Notification, NotificationKind, Payload, Priority, Source};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy)]
struct ExperienceState {
    current: u32,
    required: u32,
}

/// Experience toward the next level. Gains arrive as broadcast
/// `ExperienceGained` notifications; each level-up consumes the threshold
/// and raises the next one by the configured multiplier.
#[derive(Debug)]
pub struct ExperienceProperty {
    source: EntityId,
    ctx: PropertyContext,
    state: Rc<RefCell<ExperienceState>>,
}

impl ExperienceProperty {
    pub fn new(ctx: PropertyContext, source: EntityId, level: Source, starting_level: u32) -> Self {
        let state = Rc::new(RefCell::new(ExperienceState {
            current: 0,
            required: ctx.config.experience.required_for(starting_level),
        }));
        let owner = ctx.owner.id;

        let weak = Rc::downgrade(&state);
        ctx.bus.subscribe_owned(
            owner,
            "experience.gained",
            Source::Broadcast,
            NotificationKind::ExperienceGained,
            Priority::NORMAL,
            move |bus, notification| {
                let Payload::ExperienceGained { character, amount } = notification.payload() else {
                    return Ok(());
                };
                if *character != owner {
                    return Ok(());
                }
                let Some(state) = weak.upgrade() else {
                    return Ok(());
                };
                let snapshot = {
                    let mut s = state.borrow_mut();
                    s.current = s.current.saturating_add(*amount);
                    *s
                };
                publish_change(bus, owner, source, snapshot)?;
                Ok(())
            },
        );

        // LOW so the stat growth for this level lands before the next level-up.
        let weak = Rc::downgrade(&state);
        let config = Rc::clone(&ctx.config);
        ctx.bus.subscribe_owned(
            owner,
            "experience.level_up",
            level,
            NotificationKind::LevelUp,
            Priority::LOW,
            move |bus, _| {
                let Some(state) = weak.upgrade() else {
                    return Ok(());
                };
                let snapshot = {
                    let mut s = state.borrow_mut();
                    s.current = s.current.saturating_sub(s.required);
                    s.required = config.experience.next_threshold(s.required);
                    *s
                };
                publish_change(bus, owner, source, snapshot)?;
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

    pub fn required(&self) -> u32 {
        self.state.borrow().required
    }

    /// Requests a gain of `amount`. Goes through the bus like any other gain.
    pub fn gain(&self, amount: u32) -> BusResult<()> {
        self.ctx
            .bus
            .publish(&Notification::broadcast(Payload::ExperienceGained {
                character: self.ctx.owner.id,
                amount,
            }))
    }
}

fn publish_change(
    bus: &EventBus,
    owner: EntityId,
    source: EntityId,
    state: ExperienceState,
) -> BusResult<()> {
    bus.publish(&Notification::new(
        Source::Entity(source),
        Payload::ExperienceChanged {
            character: owner,
            current: state.current,
            required: state.required,
        },
    ))
}
