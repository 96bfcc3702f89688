use crate::character::{Character, CharacterFactory};
use crate::errors::{CharacterError, DataError};
use crate::session::Session;
use schema::{AbilityKind, Attributes, CharacterTemplate, GrowthRates, PolicyKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;

/// A predefined line-up of roles for quick battles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefabParty {
    pub id: String,
    pub name: String,
    pub description: String,
    pub roles: Vec<String>,
}

fn role(
    name: &str,
    is_player: bool,
    base_stats: Attributes,
    growth_rates: GrowthRates,
    abilities: &[AbilityKind],
    policy: PolicyKind,
) -> CharacterTemplate {
    CharacterTemplate {
        name: name.to_string(),
        role: name.to_lowercase(),
        is_player,
        level: 1,
        base_stats,
        growth_rates,
        abilities: abilities.iter().map(|a| a.to_string()).collect(),
        policy: Some(policy.to_string()),
    }
}

fn growth(strength: f64, agility: f64, intelligence: f64, vitality: f64) -> GrowthRates {
    GrowthRates {
        strength,
        agility,
        intelligence,
        vitality,
    }
}

/// Every built-in role template: warrior, mage and cleric for players,
/// goblin, orc and shaman for monsters.
pub fn get_role_templates() -> Vec<CharacterTemplate> {
    use AbilityKind::*;
    vec![
        // --- Player roles ---
        role(
            "Warrior",
            true,
            Attributes::new(14, 8, 4, 14),
            growth(0.12, 0.08, 0.05, 0.12),
            &[BasicAttack, Rest],
            PolicyKind::Player,
        ),
        role(
            "Mage",
            true,
            Attributes::new(4, 8, 16, 8),
            growth(0.05, 0.08, 0.15, 0.08),
            &[MagicMissile, FireNova, BasicAttack, Rest],
            PolicyKind::Player,
        ),
        role(
            "Cleric",
            true,
            Attributes::new(6, 6, 12, 10),
            growth(0.08, 0.08, 0.12, 0.1),
            &[BasicHeal, BasicAttack, Rest],
            PolicyKind::Healer,
        ),
        // --- Monster roles ---
        role(
            "Goblin",
            false,
            Attributes::new(6, 10, 2, 5),
            GrowthRates::default(),
            &[BasicAttack, Rest],
            PolicyKind::BasicEnemy,
        ),
        role(
            "Orc",
            false,
            Attributes::new(12, 4, 2, 12),
            GrowthRates::default(),
            &[BasicAttack, Rest],
            PolicyKind::BasicEnemy,
        ),
        role(
            "Shaman",
            false,
            Attributes::new(4, 6, 12, 6),
            GrowthRates::default(),
            &[BasicHeal, MagicMissile, BasicAttack],
            PolicyKind::Healer,
        ),
    ]
}

/// The template for `role` (case-insensitive).
pub fn template_for(role: &str) -> Result<CharacterTemplate, DataError> {
    let wanted = role.to_lowercase();
    get_role_templates()
        .into_iter()
        .find(|template| template.role == wanted)
        .ok_or_else(|| DataError::UnknownRole(role.to_string()))
}

/// Get all available prefab parties.
pub fn get_prefab_parties() -> Vec<PrefabParty> {
    vec![
        PrefabParty {
            id: "adventurers".to_string(),
            name: "Adventurers".to_string(),
            description: "A balanced trio: a front-line warrior, a mage for groups and a cleric to keep them standing".to_string(),
            roles: vec!["warrior".to_string(), "mage".to_string(), "cleric".to_string()],
        },
        PrefabParty {
            id: "goblin_pack".to_string(),
            name: "Goblin Pack".to_string(),
            description: "Three quick, fragile goblins".to_string(),
            roles: vec!["goblin".to_string(), "goblin".to_string(), "goblin".to_string()],
        },
        PrefabParty {
            id: "warband".to_string(),
            name: "Orc Warband".to_string(),
            description: "Two orcs and a shaman healing them from behind".to_string(),
            roles: vec!["orc".to_string(), "orc".to_string(), "shaman".to_string()],
        },
    ]
}

pub fn get_prefab_party(party_id: &str) -> Option<PrefabParty> {
    get_prefab_parties()
        .into_iter()
        .find(|party| party.id == party_id)
}

/// Builds one character per role. Repeated roles get a numeric suffix so
/// names stay distinct within the party ("Goblin", "Goblin 2", ...).
pub fn create_party<S: AsRef<str>>(
    session: &Session,
    roles: &[S],
) -> Result<Vec<Rc<Character>>, CharacterError> {
    let templates = roles
        .iter()
        .map(|role| template_for(role.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    create_party_from_templates(session, templates)
}

/// Builds one character per template, numbering repeated roles.
pub fn create_party_from_templates(
    session: &Session,
    templates: Vec<CharacterTemplate>,
) -> Result<Vec<Rc<Character>>, CharacterError> {
    let factory = CharacterFactory::new(session);
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut party = Vec::with_capacity(templates.len());
    for mut template in templates {
        let count = seen.entry(template.role.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            template.name = format!("{} {}", template.name, count);
        }
        party.push(factory.create(&template)?);
    }
    Ok(party)
}

/// Checks that every prefab party only names known roles and that every
/// role template resolves against the built-in abilities and policies.
pub fn validate_prefab_parties(session: &Session) -> Result<(), CharacterError> {
    for party in get_prefab_parties() {
        for role in &party.roles {
            template_for(role)?;
        }
    }
    let abilities = session.abilities().borrow();
    let policies = session.policies().borrow();
    for template in get_role_templates() {
        if let Some(unknown) = template
            .abilities
            .iter()
            .find(|name| !abilities.is_registered(name))
        {
            return Err(CharacterError::UnknownAbility {
                template: template.name.clone(),
                ability: unknown.clone(),
            });
        }
        if let Some(policy) = &template.policy {
            if !policies.is_registered(policy) {
                return Err(CharacterError::UnknownPolicy {
                    template: template.name.clone(),
                    policy: policy.clone(),
                });
            }
        }
    }
    Ok(())
}
