// In: src/abilities/registry.rs

use super::action::{AbilityEffect, Action};
use super::builtin::effect_for;
use crate::character::Character;
use crate::errors::{AbilityError, AbilityResult};
use schema::AbilityKind;
use std::collections::HashMap;
use std::rc::Rc;
use strum::IntoEnumIterator;
use tracing::warn;

pub type AbilityFactory = Rc<dyn Fn() -> Box<dyn AbilityEffect>>;

/// Name-to-factory table. Built-ins come from `AbilityKind`, so every variant
/// is registered; extra abilities can be added at runtime.
#[derive(Default)]
pub struct AbilityRegistry {
    factories: HashMap<String, AbilityFactory>,
}

impl AbilityRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in AbilityKind::iter() {
            registry.register(kind.to_string(), move || effect_for(kind));
        }
        registry
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn AbilityEffect> + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            warn!(ability = %name, "Replacing registered ability");
        }
        self.factories.insert(name, Rc::new(factory));
    }

    pub fn get_factory(&self, name: &str) -> AbilityResult<AbilityFactory> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| AbilityError::NotFound(name.to_string()))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// A fresh, untargeted action for `source`.
    pub fn create(&self, name: &str, source: Rc<Character>) -> AbilityResult<Action> {
        let factory = self.get_factory(name)?;
        Ok(Action::new(name, factory(), source))
    }
}

impl std::fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityRegistry")
            .field("abilities", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::builtin::BasicAttack;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtins_are_preregistered() {
        let registry = AbilityRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["BasicAttack", "BasicHeal", "FireNova", "MagicMissile", "Rest"]
        );
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let registry = AbilityRegistry::with_builtins();
        assert!(!registry.is_registered("Meteor"));
        assert!(matches!(
            registry.get_factory("Meteor"),
            Err(AbilityError::NotFound(name)) if name == "Meteor"
        ));
    }

    #[test]
    fn test_register_adds_an_alias() {
        let mut registry = AbilityRegistry::new();
        registry.register("PowerStrike", || Box::new(BasicAttack));

        let factory = registry.get_factory("PowerStrike").unwrap();

        assert_eq!(factory().energy_cost(), 5);
    }
}
