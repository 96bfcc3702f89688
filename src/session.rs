// In: src/session.rs

use crate::abilities::{AbilityRegistry, CooldownTracker};
use crate::battle::ai::PolicyRegistry;
use crate::config::GameConfig;
use crate::events::{EntityId, EventBus, IdAllocator};
use std::cell::RefCell;
use std::rc::Rc;

/// One game session: the bus, the registries and the cooldown tracker that
/// every character and battle in it shares. Sessions never share state with
/// each other. Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct Session {
    bus: Rc<EventBus>,
    config: Rc<GameConfig>,
    abilities: Rc<RefCell<AbilityRegistry>>,
    policies: Rc<RefCell<PolicyRegistry>>,
    cooldowns: Rc<CooldownTracker>,
    ids: Rc<IdAllocator>,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        let bus = Rc::new(EventBus::with_max_depth(config.bus.max_depth));
        let ids = Rc::new(IdAllocator::new());
        let cooldowns = Rc::new(CooldownTracker::new(ids.next_id()));
        CooldownTracker::attach(&cooldowns, &bus);

        Self {
            bus,
            config: Rc::new(config),
            abilities: Rc::new(RefCell::new(AbilityRegistry::with_builtins())),
            policies: Rc::new(RefCell::new(PolicyRegistry::with_builtins())),
            cooldowns,
            ids,
        }
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn config(&self) -> &Rc<GameConfig> {
        &self.config
    }

    pub fn abilities(&self) -> &Rc<RefCell<AbilityRegistry>> {
        &self.abilities
    }

    pub fn policies(&self) -> &Rc<RefCell<PolicyRegistry>> {
        &self.policies
    }

    pub fn cooldowns(&self) -> &Rc<CooldownTracker> {
        &self.cooldowns
    }

    pub fn next_id(&self) -> EntityId {
        self.ids.next_id()
    }

    pub fn reset_cooldowns(&self) {
        self.cooldowns.clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("bus", &self.bus)
            .field("cooldowns", &self.cooldowns)
            .finish_non_exhaustive()
    }
}
