// In: src/battle/engine.rs

use crate::battle::pacing::{NoPacing, Pacer, Pause};
use crate::battle::result::BattleResult;
use crate::battle::rng::BattleRng;
use crate::battle::turn_orchestrator::{is_battle_over, Round};
use crate::battle::turn_order::{PartyOrder, TurnOrder};
use crate::character::Character;
use crate::errors::{BattleError, EngineResult};
use crate::events::{DisplayHintBuilder, Notification, Payload};
use crate::session::Session;
use schema::Color;
use std::rc::Rc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    Idle,
    Active,
    Ended,
}

/// Runs battles between two parties on a session's bus.
///
/// The battle never mutates characters directly. Each turn asks the actor's
/// policy for a decision and routes it through the actor's ability manager;
/// every state change happens in property handlers.
pub struct Battle {
    session: Session,
    phase: BattlePhase,
    round: u32,
    turn_order: Box<dyn TurnOrder>,
    pacer: Box<dyn Pacer>,
    rng: BattleRng,
    max_rounds: u32,
    last_result: Option<BattleResult>,
}

impl Battle {
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            phase: BattlePhase::Idle,
            round: 0,
            turn_order: Box::new(PartyOrder),
            pacer: Box::new(NoPacing),
            rng: BattleRng::new_random(),
            max_rounds: session.config().battle.max_rounds,
            last_result: None,
        }
    }

    pub fn with_turn_order(mut self, turn_order: impl TurnOrder + 'static) -> Self {
        self.turn_order = Box::new(turn_order);
        self
    }

    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn with_rng(mut self, rng: BattleRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Rounds played in the current or most recent battle.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn last_result(&self) -> Option<&BattleResult> {
        self.last_result.as_ref()
    }

    /// Fights until one side is wiped out or the round cap is reached, then
    /// publishes `BattleEnded` with the result.
    pub fn start(
        &mut self,
        players: &[Rc<Character>],
        enemies: &[Rc<Character>],
    ) -> EngineResult<BattleResult> {
        if players.is_empty() || enemies.is_empty() {
            return Err(BattleError::EmptyParty {
                players: players.len(),
                enemies: enemies.len(),
            });
        }

        let battle_id = Uuid::new_v4();
        self.round = 0;
        self.phase = BattlePhase::Active;
        info!(%battle_id, players = players.len(), enemies = enemies.len(), "Battle started");

        let outcome = self.run(battle_id, players, enemies);
        self.phase = BattlePhase::Ended;
        if let Err(err) = outcome {
            // No BattleEnded goes out, so its cooldown cleanup never runs.
            self.session.reset_cooldowns();
            error!(%battle_id, round = self.round, error = %err, "Battle aborted");
            return Err(err);
        }

        let result = BattleResult::new(battle_id, self.round, players, enemies);
        info!(
            %battle_id,
            rounds = result.rounds,
            outcome = %result.outcome,
            "Battle ended"
        );

        let hint = DisplayHintBuilder::new()
            .text("Battle over: ")
            .styled(result.outcome.to_string(), Color::Yellow, true, false)
            .build();
        self.session.bus().publish(
            &Notification::broadcast(Payload::BattleEnded {
                result: Box::new(result.clone()),
            })
            .with_hint(hint),
        )?;

        self.last_result = Some(result.clone());
        Ok(result)
    }

    fn run(
        &mut self,
        battle_id: Uuid,
        players: &[Rc<Character>],
        enemies: &[Rc<Character>],
    ) -> EngineResult<()> {
        let bus = Rc::clone(self.session.bus());
        bus.publish(
            &Notification::broadcast(Payload::BattleStarted {
                battle_id,
                players: players.iter().map(|p| p.id()).collect(),
                enemies: enemies.iter().map(|e| e.id()).collect(),
            })
            .with_hint(DisplayHintBuilder::new().text("The battle begins!").build()),
        )?;

        while !is_battle_over(players, enemies) {
            if self.round >= self.max_rounds {
                warn!(%battle_id, max_rounds = self.max_rounds, "Round limit reached, battle is a draw");
                break;
            }
            self.round += 1;
            let round = Round {
                number: self.round,
                bus: &bus,
                players,
                enemies,
                turn_order: self.turn_order.as_ref(),
                pacer: self.pacer.as_ref(),
            };
            round.execute(&mut self.rng)?;
            if !is_battle_over(players, enemies) {
                self.pacer.pause(Pause::AfterRound);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Battle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battle")
            .field("phase", &self.phase)
            .field("round", &self.round)
            .field("max_rounds", &self.max_rounds)
            .finish_non_exhaustive()
    }
}
