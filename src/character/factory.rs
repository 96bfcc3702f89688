// In: src/character/factory.rs

use super::{Character, CharacterSpec};
use crate::errors::{CharacterError, DataError};
use crate::session::Session;
use schema::CharacterTemplate;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, warn};

/// Turns character templates into live characters wired into a session.
pub struct CharacterFactory<'a> {
    session: &'a Session,
}

impl<'a> CharacterFactory<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Builds a character from `template`. Every ability name must resolve in
    /// the session's registry. An unknown policy name leaves the character
    /// without a policy, so its turns are skipped.
    pub fn create(&self, template: &CharacterTemplate) -> Result<Rc<Character>, CharacterError> {
        {
            let registry = self.session.abilities().borrow();
            if let Some(unknown) = template
                .abilities
                .iter()
                .find(|name| !registry.is_registered(name))
            {
                warn!(template = %template.name, ability = %unknown, "Unknown ability in template");
                return Err(CharacterError::UnknownAbility {
                    template: template.name.clone(),
                    ability: unknown.clone(),
                });
            }
        }

        let character = Character::new(
            self.session,
            CharacterSpec {
                name: template.name.clone(),
                role: template.role.clone(),
                is_player: template.is_player,
                level: template.level,
                base_stats: template.base_stats,
                growth_rates: template.growth_rates,
            },
        );
        for ability in &template.abilities {
            character.abilities().learn(ability);
        }
        if let Some(policy) = &template.policy {
            character.set_policy(self.session.policies().borrow().resolve(policy));
        }

        debug!(
            character = %character.name(),
            role = %character.role(),
            id = %character.id(),
            "Character created"
        );
        Ok(Rc::new(character))
    }

    pub fn create_all(
        &self,
        templates: &[CharacterTemplate],
    ) -> Result<Vec<Rc<Character>>, CharacterError> {
        templates.iter().map(|t| self.create(t)).collect()
    }
}

pub fn templates_from_ron_str(source: &str) -> Result<Vec<CharacterTemplate>, DataError> {
    Ok(ron::from_str(source)?)
}

pub fn load_templates(path: impl AsRef<Path>) -> Result<Vec<CharacterTemplate>, DataError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    templates_from_ron_str(&contents)
}
