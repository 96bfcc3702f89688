// In: src/character/mod.rs

pub mod factory;
pub mod properties;

pub use factory::CharacterFactory;

use crate::abilities::AbilityManager;
use crate::battle::ai::Behavior;
use crate::battle::result::CombatantSnapshot;
use crate::errors::{AbilityResult, BusResult};
use crate::events::{EntityId, EventBus};
use crate::session::Session;
use properties::{
    CombatProperty, EnergyProperty, ExperienceProperty, HealthProperty, LevelProperty, Owner,
    PropertyContext, StatProperty,
};
use schema::{Attributes, GrowthRates};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identity and starting numbers for a new character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSpec {
    pub name: String,
    pub role: String,
    pub is_player: bool,
    pub level: u32,
    pub base_stats: Attributes,
    pub growth_rates: GrowthRates,
}

/// A battle participant. All state lives in its properties, which only change
/// in response to notifications on the session bus.
pub struct Character {
    id: EntityId,
    name: String,
    role: String,
    is_player: bool,
    level: LevelProperty,
    experience: ExperienceProperty,
    stats: StatProperty,
    combat: CombatProperty,
    health: HealthProperty,
    energy: EnergyProperty,
    abilities: AbilityManager,
    policy: RefCell<Option<Rc<dyn Behavior>>>,
    bus: Rc<EventBus>,
}

impl Character {
    pub fn new(session: &Session, spec: CharacterSpec) -> Self {
        let id = session.next_id();
        let ctx = PropertyContext {
            bus: Rc::clone(session.bus()),
            config: Rc::clone(session.config()),
            owner: Owner {
                id,
                name: Rc::from(spec.name.as_str()),
                is_player: spec.is_player,
            },
        };

        // Dependencies first; each property subscribes to the ones before it.
        let level = LevelProperty::new(ctx.clone(), session.next_id(), spec.level);
        let stats = StatProperty::new(
            ctx.clone(),
            session.next_id(),
            spec.base_stats,
            spec.growth_rates,
            level.level(),
        );
        stats.listen_to_level(level.source());
        let combat = CombatProperty::new(ctx.clone(), session.next_id(), &stats);
        let health = HealthProperty::new(ctx.clone(), session.next_id(), &stats, &combat);
        let energy = EnergyProperty::new(ctx.clone(), session.next_id(), &stats);
        let experience =
            ExperienceProperty::new(ctx, session.next_id(), level.source(), level.level());
        level.listen_to_experience(experience.source());

        Self {
            id,
            name: spec.name,
            role: spec.role,
            is_player: spec.is_player,
            level,
            experience,
            stats,
            combat,
            health,
            energy,
            abilities: AbilityManager::new(session),
            policy: RefCell::new(None),
            bus: Rc::clone(session.bus()),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn is_player(&self) -> bool {
        self.is_player
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    pub fn stats(&self) -> &StatProperty {
        &self.stats
    }

    pub fn health(&self) -> &HealthProperty {
        &self.health
    }

    pub fn energy(&self) -> &EnergyProperty {
        &self.energy
    }

    pub fn combat(&self) -> &CombatProperty {
        &self.combat
    }

    pub fn level(&self) -> &LevelProperty {
        &self.level
    }

    pub fn experience(&self) -> &ExperienceProperty {
        &self.experience
    }

    pub fn abilities(&self) -> &AbilityManager {
        &self.abilities
    }

    pub(crate) fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn policy(&self) -> Option<Rc<dyn Behavior>> {
        self.policy.borrow().clone()
    }

    pub fn set_policy(&self, policy: Option<Rc<dyn Behavior>>) {
        *self.policy.borrow_mut() = policy;
    }

    /// Available ability names, in learned order.
    pub fn available_abilities(&self) -> Vec<String> {
        self.abilities.available_abilities(self)
    }

    pub fn use_ability(
        self: &Rc<Self>,
        ability: &str,
        targets: Vec<Rc<Character>>,
    ) -> AbilityResult<()> {
        self.abilities.use_ability(self, ability, targets)
    }

    pub fn gain_experience(&self, amount: u32) -> BusResult<()> {
        self.experience.gain(amount)
    }

    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            id: self.id,
            name: self.name.clone(),
            role: self.role.clone(),
            is_player: self.is_player,
            level: self.level.level(),
            health: self.health.current(),
            max_health: self.health.max(),
            alive: self.is_alive(),
        }
    }
}

impl Drop for Character {
    fn drop(&mut self) {
        self.bus.unsubscribe_all_by_owner(self.id);
    }
}

impl fmt::Debug for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("is_player", &self.is_player)
            .field("level", &self.level.level())
            .field("health", &(self.health.current(), self.health.max()))
            .field("energy", &(self.energy.current(), self.energy.max()))
            .field("stats", &self.stats.attributes())
            .finish()
    }
}
