// In: src/abilities/builtin.rs

//! The abilities every session starts with.

use super::action::AbilityEffect;
use crate::character::Character;
use crate::errors::BusResult;
use crate::events::{DisplayHintBuilder, EventBus, Notification, Payload, RestoreAmount};
use schema::{AbilityKind, DamageType};
use std::rc::Rc;

/// The effect behind each built-in ability.
pub fn effect_for(kind: AbilityKind) -> Box<dyn AbilityEffect> {
    match kind {
        AbilityKind::BasicAttack => Box::new(BasicAttack),
        AbilityKind::BasicHeal => Box::new(BasicHeal),
        AbilityKind::MagicMissile => Box::new(MagicMissile),
        AbilityKind::FireNova => Box::new(FireNova),
        AbilityKind::Rest => Box::new(Rest),
    }
}

fn publish_damage(
    bus: &EventBus,
    source: &Character,
    target: &Character,
    amount: u32,
    damage_type: DamageType,
    verb: &str,
) -> BusResult<()> {
    let hint = DisplayHintBuilder::new()
        .character_name(source.name(), source.is_player())
        .text(verb)
        .character_name(target.name(), target.is_player())
        .text(" for ")
        .damage_value(amount)
        .text(" damage")
        .build();
    bus.publish(
        &Notification::broadcast(Payload::Damage {
            attacker: Some(source.id()),
            target: target.id(),
            amount,
            damage_type,
        })
        .with_hint(hint),
    )
}

/// Physical hit for the source's attack power.
pub struct BasicAttack;

impl AbilityEffect for BasicAttack {
    fn name(&self) -> &str {
        "BasicAttack"
    }

    fn energy_cost(&self) -> u32 {
        5
    }

    fn priority(&self) -> i32 {
        10
    }

    fn apply(&self, bus: &EventBus, source: &Character, targets: &[Rc<Character>]) -> BusResult<()> {
        let Some(target) = targets.first() else {
            return Ok(());
        };
        let damage = source.combat().attack_power();
        publish_damage(bus, source, target, damage, DamageType::Physical, " attacks ")
    }
}

pub struct BasicHeal;

impl BasicHeal {
    const BASE: u32 = 15;
}

impl AbilityEffect for BasicHeal {
    fn name(&self) -> &str {
        "BasicHeal"
    }

    fn energy_cost(&self) -> u32 {
        10
    }

    fn cooldown(&self) -> u32 {
        2
    }

    fn priority(&self) -> i32 {
        5
    }

    fn apply(&self, bus: &EventBus, source: &Character, targets: &[Rc<Character>]) -> BusResult<()> {
        let Some(target) = targets.first() else {
            return Ok(());
        };
        let amount = Self::BASE + source.stats().intelligence() / 2;
        let hint = DisplayHintBuilder::new()
            .character_name(source.name(), source.is_player())
            .text(" heals ")
            .character_name(target.name(), target.is_player())
            .text(" for ")
            .heal_value(amount)
            .text(" health")
            .build();
        bus.publish(
            &Notification::broadcast(Payload::Heal {
                healer: Some(source.id()),
                target: target.id(),
                amount,
            })
            .with_hint(hint),
        )
    }
}

pub struct MagicMissile;

impl MagicMissile {
    const BASE: u32 = 10;
}

impl AbilityEffect for MagicMissile {
    fn name(&self) -> &str {
        "MagicMissile"
    }

    fn energy_cost(&self) -> u32 {
        5
    }

    fn cooldown(&self) -> u32 {
        1
    }

    fn priority(&self) -> i32 {
        8
    }

    fn apply(&self, bus: &EventBus, source: &Character, targets: &[Rc<Character>]) -> BusResult<()> {
        let Some(target) = targets.first() else {
            return Ok(());
        };
        let damage = Self::BASE + source.stats().intelligence() / 2;
        publish_damage(bus, source, target, damage, DamageType::Fire, " casts a missile at ")
    }
}

/// Area attack against up to three targets.
pub struct FireNova;

impl FireNova {
    const BASE: u32 = 8;
    const MAX_TARGETS: usize = 3;
}

impl AbilityEffect for FireNova {
    fn name(&self) -> &str {
        "FireNova"
    }

    fn energy_cost(&self) -> u32 {
        15
    }

    fn cooldown(&self) -> u32 {
        3
    }

    fn priority(&self) -> i32 {
        7
    }

    // Fizzles only if nobody in range is still standing.
    fn is_available(&self, source: &Character, targets: &[Rc<Character>]) -> bool {
        source.is_alive()
            && source.energy().can_afford(self.energy_cost())
            && targets
                .iter()
                .take(Self::MAX_TARGETS)
                .any(|t| t.is_alive())
    }

    fn apply(&self, bus: &EventBus, source: &Character, targets: &[Rc<Character>]) -> BusResult<()> {
        let damage = Self::BASE + source.stats().intelligence() / 3;
        for target in targets.iter().take(Self::MAX_TARGETS) {
            if target.is_alive() {
                publish_damage(bus, source, target, damage, DamageType::Fire, "'s nova burns ")?;
            }
        }
        Ok(())
    }
}

/// Recovers 30% of max energy. Targets are ignored.
pub struct Rest;

impl Rest {
    const SHARE: f64 = 0.3;
}

impl AbilityEffect for Rest {
    fn name(&self) -> &str {
        "Rest"
    }

    fn energy_cost(&self) -> u32 {
        0
    }

    fn cooldown(&self) -> u32 {
        2
    }

    fn priority(&self) -> i32 {
        2
    }

    fn is_available(&self, source: &Character, _targets: &[Rc<Character>]) -> bool {
        source.is_alive()
    }

    fn apply(&self, bus: &EventBus, source: &Character, _targets: &[Rc<Character>]) -> BusResult<()> {
        let energy = source.energy();
        let missing = energy.max() - energy.current();
        let amount = ((energy.max() as f64 * Self::SHARE) as u32).max(1).min(missing);
        let hint = DisplayHintBuilder::new()
            .character_name(source.name(), source.is_player())
            .text(" rests and recovers ")
            .energy_value(amount)
            .text(" energy")
            .build();
        bus.publish(
            &Notification::broadcast(Payload::EnergyRestore {
                character: source.id(),
                amount: RestoreAmount::Absolute(amount),
            })
            .with_hint(hint),
        )
    }
}
