//! A module for defining AI behaviors for battle participants.
//!
//! A policy looks at the acting character, its living allies and its living
//! enemies, and names one ability plus its targets. Policies never mutate
//! anything; every random pick goes through the `BattleRng` they are handed.

use crate::battle::rng::BattleRng;
use crate::character::Character;
use schema::{AbilityKind, PolicyKind};
use std::collections::HashMap;
use std::rc::Rc;
use strum::IntoEnumIterator;
use tracing::warn;

const DAMAGE_KEYWORDS: &[&str] = &[
    "attack", "strike", "hit", "slash", "fire", "ice", "bolt", "missile",
];
const AREA_KEYWORDS: &[&str] = &["aoe", "blast", "nova", "wave", "storm", "rain"];
const STRONG_KEYWORDS: &[&str] = &["power", "strong", "heavy", "mighty", "crushing"];
const HEAL_KEYWORDS: &[&str] = &["heal", "cure", "mend", "restore", "renew"];

/// Healing strength hinted by an ability's name, checked in this order.
const HEAL_POTENTIAL: &[(&str, u32)] = &[
    ("minor", 1),
    ("lesser", 2),
    ("basic", 2),
    ("standard", 3),
    ("greater", 4),
    ("major", 5),
    ("mass", 3),
];

const FINISH_THRESHOLD: f64 = 0.2;
const CRITICAL_ALLY_THRESHOLD: f64 = 0.3;
const WOUNDED_ALLY_THRESHOLD: f64 = 0.6;
const AREA_MAX_TARGETS: usize = 3;

fn matches_any(ability: &str, keywords: &[&str]) -> bool {
    let lower = ability.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

pub fn is_damage_ability(ability: &str) -> bool {
    matches_any(ability, DAMAGE_KEYWORDS)
}

pub fn is_area_ability(ability: &str) -> bool {
    matches_any(ability, AREA_KEYWORDS)
}

pub fn is_strong_ability(ability: &str) -> bool {
    matches_any(ability, STRONG_KEYWORDS)
}

pub fn is_heal_ability(ability: &str) -> bool {
    matches_any(ability, HEAL_KEYWORDS)
}

/// Single-target heals count double; "mass" heals do not.
pub fn heal_potential(ability: &str) -> u32 {
    let lower = ability.to_lowercase();
    HEAL_POTENTIAL
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map_or(1, |(_, value)| {
            if lower.contains("mass") {
                *value
            } else {
                value * 2
            }
        })
}

/// What a policy wants to do this turn.
#[derive(Debug, Clone)]
pub struct Decision {
    pub ability: String,
    pub targets: Vec<Rc<Character>>,
}

impl Decision {
    pub fn new(ability: impl Into<String>, targets: Vec<Rc<Character>>) -> Self {
        Self {
            ability: ability.into(),
            targets,
        }
    }
}

/// A trait for any system that can decide on a battle action.
/// `allies` and `enemies` contain living characters only.
pub trait Behavior {
    fn name(&self) -> &str;

    fn decide_action(
        &self,
        actor: &Rc<Character>,
        allies: &[Rc<Character>],
        enemies: &[Rc<Character>],
        rng: &mut BattleRng,
    ) -> Option<Decision>;
}

// --- Shared rules ---

fn filter_abilities(available: &[String], keep: fn(&str) -> bool) -> Vec<String> {
    available.iter().filter(|a| keep(a)).cloned().collect()
}

/// First enemy below the finishing threshold, hit with a random damaging ability.
fn try_finish(available: &[String], enemies: &[Rc<Character>], rng: &mut BattleRng) -> Option<Decision> {
    let target = enemies
        .iter()
        .find(|e| e.health().is_below(FINISH_THRESHOLD))?;
    let finishers = filter_abilities(available, is_damage_ability);
    let ability = rng.choose(&finishers, "finishing ability")?;
    Some(Decision::new(ability.clone(), vec![Rc::clone(target)]))
}

fn try_area(available: &[String], enemies: &[Rc<Character>], rng: &mut BattleRng) -> Option<Decision> {
    if enemies.len() < 2 {
        return None;
    }
    let area = filter_abilities(available, is_area_ability);
    let ability = rng.choose(&area, "area ability")?;
    let targets = enemies.iter().take(AREA_MAX_TARGETS).cloned().collect();
    Some(Decision::new(ability.clone(), targets))
}

fn try_strong(available: &[String], enemies: &[Rc<Character>], rng: &mut BattleRng) -> Option<Decision> {
    let strong = filter_abilities(available, is_strong_ability);
    if strong.is_empty() || enemies.is_empty() {
        return None;
    }
    let target = rng.choose(enemies, "strong attack target")?;
    let ability = rng.choose(&strong, "strong ability")?;
    Some(Decision::new(ability.clone(), vec![Rc::clone(target)]))
}

fn try_basic_attack(available: &[String], enemies: &[Rc<Character>], rng: &mut BattleRng) -> Option<Decision> {
    let basic = AbilityKind::BasicAttack.to_string();
    if !available.contains(&basic) {
        return None;
    }
    let target = rng.choose(enemies, "basic attack target")?;
    Some(Decision::new(basic, vec![Rc::clone(target)]))
}

fn random_action(available: &[String], targets: &[Rc<Character>], rng: &mut BattleRng) -> Option<Decision> {
    if available.is_empty() || targets.is_empty() {
        return None;
    }
    let ability = rng.choose(available, "random ability")?;
    let target = rng.choose(targets, "random target")?;
    Some(Decision::new(ability.clone(), vec![Rc::clone(target)]))
}

// --- Policies ---

/// Offensive policy used for player characters under AI control.
#[derive(Debug, Default)]
pub struct PlayerAI;

impl Behavior for PlayerAI {
    fn name(&self) -> &str {
        "PlayerAI"
    }

    fn decide_action(
        &self,
        actor: &Rc<Character>,
        _allies: &[Rc<Character>],
        enemies: &[Rc<Character>],
        rng: &mut BattleRng,
    ) -> Option<Decision> {
        let available = actor.available_abilities();
        if available.is_empty() || enemies.is_empty() {
            return None;
        }

        try_finish(&available, enemies, rng)
            .or_else(|| try_area(&available, enemies, rng))
            .or_else(|| try_strong(&available, enemies, rng))
            .or_else(|| try_basic_attack(&available, enemies, rng))
            .or_else(|| random_action(&available, enemies, rng))
    }
}

/// Support policy: keeps allies alive first, fights second.
#[derive(Debug, Default)]
pub struct HealerAI;

impl HealerAI {
    fn try_heal_critical(available: &[String], allies: &[Rc<Character>]) -> Option<Decision> {
        let heals = filter_abilities(available, is_heal_ability);
        let target = allies
            .iter()
            .find(|a| a.health().is_below(CRITICAL_ALLY_THRESHOLD))?;
        // Strongest heal; the first one wins a tie.
        let ability = heals.iter().fold(None::<&String>, |best, heal| match best {
            Some(current) if heal_potential(current) >= heal_potential(heal) => Some(current),
            _ => Some(heal),
        })?;
        Some(Decision::new(ability.clone(), vec![Rc::clone(target)]))
    }

    fn try_heal_wounded(available: &[String], allies: &[Rc<Character>], rng: &mut BattleRng) -> Option<Decision> {
        let heals = filter_abilities(available, is_heal_ability);
        if heals.is_empty() {
            return None;
        }
        let target = allies
            .iter()
            .find(|a| a.health().is_below(WOUNDED_ALLY_THRESHOLD))?;
        let ability = rng.choose(&heals, "heal ability")?;
        Some(Decision::new(ability.clone(), vec![Rc::clone(target)]))
    }
}

impl Behavior for HealerAI {
    fn name(&self) -> &str {
        "HealerAI"
    }

    fn decide_action(
        &self,
        actor: &Rc<Character>,
        allies: &[Rc<Character>],
        enemies: &[Rc<Character>],
        rng: &mut BattleRng,
    ) -> Option<Decision> {
        let available = actor.available_abilities();
        if available.is_empty() || allies.is_empty() {
            return None;
        }

        Self::try_heal_critical(&available, allies)
            .or_else(|| try_finish(&available, enemies, rng))
            .or_else(|| Self::try_heal_wounded(&available, allies, rng))
            .or_else(|| try_basic_attack(&available, enemies, rng))
            .or_else(|| {
                if enemies.is_empty() {
                    random_action(&available, allies, rng)
                } else {
                    random_action(&available, enemies, rng)
                }
            })
    }
}

/// Attacks the first enemy; rests when it cannot afford to.
#[derive(Debug, Default)]
pub struct BasicEnemyAI;

impl Behavior for BasicEnemyAI {
    fn name(&self) -> &str {
        "BasicEnemyAI"
    }

    fn decide_action(
        &self,
        actor: &Rc<Character>,
        _allies: &[Rc<Character>],
        enemies: &[Rc<Character>],
        _rng: &mut BattleRng,
    ) -> Option<Decision> {
        let target = enemies.first()?;
        let available = actor.available_abilities();
        let attack = AbilityKind::BasicAttack.to_string();
        let rest = AbilityKind::Rest.to_string();
        if available.contains(&attack) {
            Some(Decision::new(attack, vec![Rc::clone(target)]))
        } else if available.contains(&rest) {
            Some(Decision::new(rest, vec![Rc::clone(actor)]))
        } else {
            None
        }
    }
}

/// Resolves policy names from character data to shared policy instances.
pub struct PolicyRegistry {
    policies: HashMap<String, Rc<dyn Behavior>>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in PolicyKind::iter() {
            registry.register(kind.to_string(), Self::builtin(kind));
        }
        registry
    }

    fn builtin(kind: PolicyKind) -> Rc<dyn Behavior> {
        match kind {
            PolicyKind::Player => Rc::new(PlayerAI),
            PolicyKind::Healer => Rc::new(HealerAI),
            PolicyKind::BasicEnemy => Rc::new(BasicEnemyAI),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, policy: Rc<dyn Behavior>) {
        self.policies.insert(name.into(), policy);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    /// The policy registered as `name`. Unknown names yield `None`, which the
    /// battle treats as "takes no action".
    pub fn resolve(&self, name: &str) -> Option<Rc<dyn Behavior>> {
        let policy = self.policies.get(name).cloned();
        if policy.is_none() {
            warn!(policy = name, "Unknown AI policy, character will not act");
        }
        policy
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
