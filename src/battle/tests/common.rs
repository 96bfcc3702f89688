use crate::battle::rng::BattleRng;
use crate::character::{Character, CharacterFactory};
use crate::config::GameConfig;
use crate::events::{Notification, NotificationKind, Payload};
use crate::session::Session;
use schema::{Attributes, CharacterTemplate, GrowthRates};
use std::rc::Rc;

/// A session whose max health is exactly `vitality * 10`, so test numbers
/// read directly off the stat block. Everything else uses the defaults.
pub fn test_session() -> Session {
    let mut config = GameConfig::default();
    config.character.base_health = 0;
    config.character.health_per_vitality = 10;
    Session::new(config)
}

/// Deterministic RNG replaying `outcomes` (each taken modulo the choice count).
pub fn scripted_rng(outcomes: Vec<usize>) -> BattleRng {
    BattleRng::new_for_test(outcomes)
}

/// A builder for test characters with common defaults.
///
/// # Example
/// ```ignore
/// let hero = TestCharacterBuilder::player("Hero")
///     .with_stats(10, 0, 0, 10)
///     .with_abilities(&["BasicAttack"])
///     .with_policy("PlayerAI")
///     .build(&session);
/// ```
pub struct TestCharacterBuilder {
    name: String,
    is_player: bool,
    level: u32,
    stats: Attributes,
    abilities: Vec<String>,
    policy: Option<String>,
    health: Option<u32>,
}

impl TestCharacterBuilder {
    fn new(name: &str, is_player: bool) -> Self {
        Self {
            name: name.to_string(),
            is_player,
            level: 1,
            stats: Attributes::new(10, 0, 0, 10),
            abilities: vec!["BasicAttack".to_string()],
            policy: None,
            health: None,
        }
    }

    pub fn player(name: &str) -> Self {
        Self::new(name, true)
    }

    pub fn enemy(name: &str) -> Self {
        Self::new(name, false)
    }

    /// Strength, agility, intelligence, vitality.
    pub fn with_stats(mut self, strength: u32, agility: u32, intelligence: u32, vitality: u32) -> Self {
        self.stats = Attributes::new(strength, agility, intelligence, vitality);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_abilities(mut self, abilities: &[&str]) -> Self {
        self.abilities = abilities.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_policy(mut self, policy: &str) -> Self {
        self.policy = Some(policy.to_string());
        self
    }

    /// Current health after construction. If not set, health is max.
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = Some(health);
        self
    }

    pub fn build(self, session: &Session) -> Rc<Character> {
        let template = CharacterTemplate {
            name: self.name.clone(),
            role: if self.is_player { "tester" } else { "dummy" }.to_string(),
            is_player: self.is_player,
            level: self.level,
            base_stats: self.stats,
            growth_rates: GrowthRates::default(),
            abilities: self.abilities,
            policy: self.policy,
        };
        let character = match CharacterFactory::new(session).create(&template) {
            Ok(character) => character,
            Err(err) => panic!("Failed to build test character {}: {}", self.name, err),
        };
        if let Some(health) = self.health {
            character.health().force_current(health);
        }
        character
    }
}

/// Every payload the log saw of `kind`, in order.
pub fn payloads_of(entries: &[Notification], kind: NotificationKind) -> Vec<Payload> {
    entries
        .iter()
        .filter(|n| n.kind() == kind)
        .map(|n| n.payload().clone())
        .collect()
}
