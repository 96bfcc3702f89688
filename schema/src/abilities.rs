use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Every ability the engine ships with. Registry names are the variant names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum AbilityKind {
    BasicAttack,
    BasicHeal,
    MagicMissile,
    FireNova,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DamageType {
    Physical,
    Fire,
    Ice,
    Lightning,
    Poison,
    /// Ignores the target's defense.
    True,
}

impl DamageType {
    pub fn bypasses_defense(self) -> bool {
        matches!(self, DamageType::True)
    }
}
