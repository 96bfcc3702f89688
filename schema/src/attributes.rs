use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Attribute {
    Strength,
    Agility,
    Intelligence,
    Vitality,
}

/// The four primary attributes every derived value is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: u32,
    pub agility: u32,
    pub intelligence: u32,
    pub vitality: u32,
}

impl Attributes {
    pub fn new(strength: u32, agility: u32, intelligence: u32, vitality: u32) -> Self {
        Self {
            strength,
            agility,
            intelligence,
            vitality,
        }
    }

    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Agility => self.agility,
            Attribute::Intelligence => self.intelligence,
            Attribute::Vitality => self.vitality,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: u32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Agility => self.agility = value,
            Attribute::Intelligence => self.intelligence = value,
            Attribute::Vitality => self.vitality = value,
        }
    }

    /// Attribute values at `level`, grown from `self` as the level 1 baseline.
    pub fn at_level(&self, growth: &GrowthRates, level: u32) -> Attributes {
        let steps = level.saturating_sub(1) as f64;
        let grow = |base: u32, rate: f64| (base as f64 + base as f64 * rate * steps).round() as u32;
        Attributes {
            strength: grow(self.strength, growth.strength),
            agility: grow(self.agility, growth.agility),
            intelligence: grow(self.intelligence, growth.intelligence),
            vitality: grow(self.vitality, growth.vitality),
        }
    }
}

/// Fractional growth per level, relative to the level 1 value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthRates {
    pub strength: f64,
    pub agility: f64,
    pub intelligence: f64,
    pub vitality: f64,
}

impl Default for GrowthRates {
    fn default() -> Self {
        Self {
            strength: 0.1,
            agility: 0.1,
            intelligence: 0.1,
            vitality: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_is_the_baseline() {
        let base = Attributes::new(10, 8, 6, 12);
        assert_eq!(base.at_level(&GrowthRates::default(), 1), base);
    }

    #[test]
    fn test_growth_rounds_per_attribute() {
        let base = Attributes::new(10, 8, 6, 12);
        let grown = base.at_level(&GrowthRates::default(), 3);
        assert_eq!(grown, Attributes::new(12, 10, 7, 14));
    }
}
