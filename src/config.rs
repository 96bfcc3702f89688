// In: src/config.rs

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the whole engine. Every section falls back to its defaults
/// when missing from a config file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub character: CharacterSettings,
    pub combat: CombatSettings,
    pub experience: ExperienceSettings,
    pub battle: BattleSettings,
    pub bus: BusSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSettings {
    pub base_health: u32,
    pub health_per_vitality: u32,
    pub base_energy: u32,
    pub energy_per_intelligence: u32,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            base_health: 100,
            health_per_vitality: 10,
            base_energy: 100,
            energy_per_intelligence: 10,
        }
    }
}

impl CharacterSettings {
    pub fn max_health(&self, vitality: u32) -> u32 {
        self.base_health + vitality * self.health_per_vitality
    }

    pub fn max_energy(&self, intelligence: u32) -> u32 {
        self.base_energy + intelligence * self.energy_per_intelligence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    pub attack_per_strength: f64,
    pub defense_per_agility: f64,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            attack_per_strength: 2.0,
            defense_per_agility: 1.0,
        }
    }
}

impl CombatSettings {
    pub fn attack_power(&self, strength: u32) -> u32 {
        (strength as f64 * self.attack_per_strength).floor() as u32
    }

    pub fn defense(&self, agility: u32) -> u32 {
        (agility as f64 * self.defense_per_agility).floor() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceSettings {
    pub formula_base: u32,
    pub formula_multiplier: f64,
}

impl Default for ExperienceSettings {
    fn default() -> Self {
        Self {
            formula_base: 100,
            formula_multiplier: 1.5,
        }
    }
}

impl ExperienceSettings {
    /// Experience needed to leave `level`.
    pub fn required_for(&self, level: u32) -> u32 {
        let steps = level.saturating_sub(1) as i32;
        (self.formula_base as f64 * self.formula_multiplier.powi(steps)).round() as u32
    }

    pub fn next_threshold(&self, required: u32) -> u32 {
        (required as f64 * self.formula_multiplier).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleSettings {
    /// Rounds after which the battle is called a draw.
    pub max_rounds: u32,
    pub turn_delay_ms: u64,
    pub round_delay_ms: u64,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            max_rounds: 100,
            turn_delay_ms: 0,
            round_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    pub max_depth: usize,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            max_depth: crate::events::bus::DEFAULT_MAX_DEPTH,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }
}
