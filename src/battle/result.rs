// In: src/battle/result.rs

use crate::character::Character;
use crate::events::EntityId;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use strum::Display;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum BattleOutcome {
    /// Every enemy is dead.
    Victory,
    /// Every player is dead.
    Defeat,
    /// The round limit was reached first.
    Draw,
}

/// A character's state at the moment the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: EntityId,
    pub name: String,
    pub role: String,
    pub is_player: bool,
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
    pub alive: bool,
}

/// Summary of a finished battle. Built once, after the loop ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub battle_id: Uuid,
    pub rounds: u32,
    pub outcome: BattleOutcome,
    pub players: Vec<CombatantSnapshot>,
    pub enemies: Vec<CombatantSnapshot>,
    pub surviving_players: Vec<CombatantSnapshot>,
    pub defeated_enemies: Vec<CombatantSnapshot>,
}

impl BattleResult {
    pub fn new(
        battle_id: Uuid,
        rounds: u32,
        players: &[Rc<Character>],
        enemies: &[Rc<Character>],
    ) -> Self {
        let players: Vec<CombatantSnapshot> = players.iter().map(|c| c.snapshot()).collect();
        let enemies: Vec<CombatantSnapshot> = enemies.iter().map(|c| c.snapshot()).collect();

        let outcome = if enemies.iter().all(|e| !e.alive) {
            BattleOutcome::Victory
        } else if players.iter().all(|p| !p.alive) {
            BattleOutcome::Defeat
        } else {
            BattleOutcome::Draw
        };

        let surviving_players = players.iter().filter(|p| p.alive).cloned().collect();
        let defeated_enemies = enemies.iter().filter(|e| !e.alive).cloned().collect();

        Self {
            battle_id,
            rounds,
            outcome,
            players,
            enemies,
            surviving_players,
            defeated_enemies,
        }
    }

    pub fn is_victory(&self) -> bool {
        self.outcome == BattleOutcome::Victory
    }

    #[cfg(test)]
    pub(crate) fn empty_for_tests() -> Self {
        Self::new(Uuid::nil(), 0, &[], &[])
    }
}
