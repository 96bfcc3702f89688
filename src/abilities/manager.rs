// In: src/abilities/manager.rs

use super::{AbilityRegistry, CooldownTracker};
use crate::character::Character;
use crate::errors::{AbilityError, AbilityResult};
use crate::session::Session;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// A character's learned abilities and the gate every use goes through.
#[derive(Debug)]
pub struct AbilityManager {
    learned: RefCell<Vec<String>>,
    registry: Rc<RefCell<AbilityRegistry>>,
    cooldowns: Rc<CooldownTracker>,
}

impl AbilityManager {
    pub fn new(session: &Session) -> Self {
        Self {
            learned: RefCell::new(Vec::new()),
            registry: Rc::clone(session.abilities()),
            cooldowns: Rc::clone(session.cooldowns()),
        }
    }

    /// Adds `name` to the learned list. Returns false if it was already known.
    pub fn learn(&self, name: &str) -> bool {
        let mut learned = self.learned.borrow_mut();
        if learned.iter().any(|known| known == name) {
            return false;
        }
        learned.push(name.to_string());
        true
    }

    pub fn forget(&self, name: &str) -> bool {
        let mut learned = self.learned.borrow_mut();
        let before = learned.len();
        learned.retain(|known| known != name);
        learned.len() != before
    }

    pub fn knows(&self, name: &str) -> bool {
        self.learned.borrow().iter().any(|known| known == name)
    }

    pub fn learned(&self) -> Vec<String> {
        self.learned.borrow().clone()
    }

    /// Learned abilities that are registered, off cooldown and affordable.
    pub fn available_abilities(&self, character: &Character) -> Vec<String> {
        if !character.is_alive() {
            return Vec::new();
        }
        let learned = self.learned.borrow();
        let ready = self.cooldowns.filter_ready(character.id(), learned.as_slice());
        let registry = self.registry.borrow();
        ready
            .into_iter()
            .filter(|name| {
                registry
                    .get_factory(name)
                    .is_ok_and(|factory| character.energy().can_afford(factory().energy_cost()))
            })
            .collect()
    }

    /// Builds the action for `name`, binds `targets` and executes it.
    pub fn use_ability(
        &self,
        character: &Rc<Character>,
        name: &str,
        targets: Vec<Rc<Character>>,
    ) -> AbilityResult<()> {
        if !self.knows(name) {
            warn!(character = %character.name(), ability = name, "Ability not learned");
            return Err(AbilityError::NotLearned {
                character: character.name().to_string(),
                ability: name.to_string(),
            });
        }
        let remaining = self.cooldowns.remaining(character.id(), name);
        if remaining > 0 {
            return Err(AbilityError::OnCooldown {
                ability: name.to_string(),
                remaining,
            });
        }

        let mut action = self.registry.borrow().create(name, Rc::clone(character))?;
        action.set_targets(targets);
        debug!(character = %character.name(), ability = name, "Using ability");
        action.execute()?;
        Ok(())
    }
}
