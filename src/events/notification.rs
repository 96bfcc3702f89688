// In: src/events/notification.rs

use crate::battle::result::BattleResult;
use crate::events::display::DisplayHint;
use chrono::{DateTime, Utc};
use schema::{Attributes, DamageType};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use strum::Display;
use uuid::Uuid;

/// Identity of anything that can publish or own subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out session-unique entity ids.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: Cell<u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> EntityId {
        let id = self.next.get() + 1;
        self.next.set(id);
        EntityId(id)
    }
}

/// Routing half of a subscription key. `Broadcast` is its own tag and only
/// matches notifications that were published as broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Broadcast,
    Entity(EntityId),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Broadcast => write!(f, "broadcast"),
            Source::Entity(id) => write!(f, "entity{}", id),
        }
    }
}

impl From<EntityId> for Source {
    fn from(id: EntityId) -> Self {
        Source::Entity(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Base route: receives every notification from the subscribed source.
    Any,
    StatsChanged,
    HealthChanged,
    EnergyChanged,
    CombatChanged,
    LevelUp,
    ExperienceGained,
    ExperienceChanged,
    Damage,
    Heal,
    EnergySpent,
    EnergyRestore,
    Death,
    AbilityUsed,
    BattleStarted,
    BattleEnded,
    RoundStarted,
    RoundEnded,
    TurnSkipped,
    LogUpdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RestoreAmount {
    Absolute(u32),
    /// Share of max energy, `0.0..=1.0`.
    Percent(f64),
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum SkipReason {
    NoPolicy,
    NoDecision,
    UnknownAbility,
    AbilityUnusable,
}

/// Typed body of a notification. Character fields carry the character's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    StatsChanged {
        character: EntityId,
        attributes: Attributes,
    },
    HealthChanged {
        character: EntityId,
        old: u32,
        new: u32,
        max: u32,
    },
    EnergyChanged {
        character: EntityId,
        old: u32,
        new: u32,
        max: u32,
    },
    CombatChanged {
        character: EntityId,
        attack_power: u32,
        defense: u32,
    },
    LevelUp {
        character: EntityId,
        old_level: u32,
        new_level: u32,
    },
    ExperienceGained {
        character: EntityId,
        amount: u32,
    },
    ExperienceChanged {
        character: EntityId,
        current: u32,
        required: u32,
    },
    Damage {
        attacker: Option<EntityId>,
        target: EntityId,
        amount: u32,
        damage_type: DamageType,
    },
    Heal {
        healer: Option<EntityId>,
        target: EntityId,
        amount: u32,
    },
    EnergySpent {
        character: EntityId,
        amount: u32,
        reason: String,
    },
    EnergyRestore {
        character: EntityId,
        amount: RestoreAmount,
    },
    Death {
        victim: EntityId,
        killer: Option<EntityId>,
    },
    AbilityUsed {
        character: EntityId,
        ability: String,
        cooldown: u32,
    },
    BattleStarted {
        battle_id: Uuid,
        players: Vec<EntityId>,
        enemies: Vec<EntityId>,
    },
    BattleEnded {
        result: Box<BattleResult>,
    },
    RoundStarted {
        round: u32,
    },
    RoundEnded {
        round: u32,
    },
    TurnSkipped {
        character: EntityId,
        reason: SkipReason,
    },
    LogUpdated,
}

impl Payload {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Payload::StatsChanged { .. } => NotificationKind::StatsChanged,
            Payload::HealthChanged { .. } => NotificationKind::HealthChanged,
            Payload::EnergyChanged { .. } => NotificationKind::EnergyChanged,
            Payload::CombatChanged { .. } => NotificationKind::CombatChanged,
            Payload::LevelUp { .. } => NotificationKind::LevelUp,
            Payload::ExperienceGained { .. } => NotificationKind::ExperienceGained,
            Payload::ExperienceChanged { .. } => NotificationKind::ExperienceChanged,
            Payload::Damage { .. } => NotificationKind::Damage,
            Payload::Heal { .. } => NotificationKind::Heal,
            Payload::EnergySpent { .. } => NotificationKind::EnergySpent,
            Payload::EnergyRestore { .. } => NotificationKind::EnergyRestore,
            Payload::Death { .. } => NotificationKind::Death,
            Payload::AbilityUsed { .. } => NotificationKind::AbilityUsed,
            Payload::BattleStarted { .. } => NotificationKind::BattleStarted,
            Payload::BattleEnded { .. } => NotificationKind::BattleEnded,
            Payload::RoundStarted { .. } => NotificationKind::RoundStarted,
            Payload::RoundEnded { .. } => NotificationKind::RoundEnded,
            Payload::TurnSkipped { .. } => NotificationKind::TurnSkipped,
            Payload::LogUpdated => NotificationKind::LogUpdated,
        }
    }
}

/// An immutable record of something that happened, delivered synchronously
/// to every matching subscriber and then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    id: Uuid,
    timestamp: DateTime<Utc>,
    source: Source,
    payload: Payload,
    hint: Option<DisplayHint>,
}

impl Notification {
    pub fn new(source: Source, payload: Payload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source,
            payload,
            hint: None,
        }
    }

    pub fn broadcast(payload: Payload) -> Self {
        Self::new(Source::Broadcast, payload)
    }

    pub fn with_hint(mut self, hint: DisplayHint) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn kind(&self) -> NotificationKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn hint(&self) -> Option<&DisplayHint> {
        self.hint.as_ref()
    }
}
