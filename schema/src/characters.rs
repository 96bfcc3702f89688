use crate::attributes::{Attributes, GrowthRates};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Built-in decision policies, addressable by name from character data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr)]
pub enum PolicyKind {
    #[strum(serialize = "PlayerAI")]
    Player,
    #[strum(serialize = "HealerAI")]
    Healer,
    #[strum(serialize = "BasicEnemyAI")]
    BasicEnemy,
}

/// Everything needed to build one character, as loaded from a data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub is_player: bool,
    #[serde(default = "default_level")]
    pub level: u32,
    pub base_stats: Attributes,
    #[serde(default)]
    pub growth_rates: GrowthRates,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub policy: Option<String>,
}

fn default_level() -> u32 {
    1
}
