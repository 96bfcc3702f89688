// In: src/battle/turn_orchestrator.rs

use crate::battle::pacing::{Pacer, Pause};
use crate::battle::rng::BattleRng;
use crate::battle::turn_order::TurnOrder;
use crate::character::Character;
use crate::errors::{AbilityError, ActionError, BattleError, EngineResult};
use crate::events::{DisplayHintBuilder, EventBus, Notification, Payload, SkipReason};
use schema::Color;
use std::rc::Rc;
use tracing::{debug, warn};

/// True once either side has nobody left standing.
pub fn is_battle_over(players: &[Rc<Character>], enemies: &[Rc<Character>]) -> bool {
    players.iter().all(|p| !p.is_alive()) || enemies.iter().all(|e| !e.is_alive())
}

fn living(party: &[Rc<Character>]) -> Vec<Rc<Character>> {
    party.iter().filter(|c| c.is_alive()).cloned().collect()
}

/// One round of a battle: every living participant gets one turn, in the
/// order the `TurnOrder` decides, until one side is wiped out.
pub struct Round<'a> {
    pub number: u32,
    pub bus: &'a EventBus,
    pub players: &'a [Rc<Character>],
    pub enemies: &'a [Rc<Character>],
    pub turn_order: &'a dyn TurnOrder,
    pub pacer: &'a dyn Pacer,
}

impl Round<'_> {
    pub fn execute(&self, rng: &mut BattleRng) -> EngineResult<()> {
        // 1. Announce the round
        debug!(round = self.number, "Round started");
        let hint = DisplayHintBuilder::new()
            .text("[ Round ")
            .styled(self.number.to_string(), Color::Yellow, true, false)
            .text(" ]")
            .build();
        self.bus.publish(
            &Notification::broadcast(Payload::RoundStarted {
                round: self.number,
            })
            .with_hint(hint),
        )?;

        // 2. Turn order, fixed for the whole round
        let order = self.turn_order.order(self.players, self.enemies);

        // 3. Turns
        for actor in &order {
            if is_battle_over(self.players, self.enemies) {
                break;
            }
            // Killed earlier this round.
            if !actor.is_alive() {
                continue;
            }
            self.take_turn(actor, rng)?;
            self.bus
                .publish(&Notification::broadcast(Payload::LogUpdated))?;
            if !is_battle_over(self.players, self.enemies) {
                self.pacer.pause(Pause::AfterTurn);
            }
        }

        // 4. Close the round (cooldowns tick here)
        self.bus.publish(&Notification::broadcast(Payload::RoundEnded {
            round: self.number,
        }))?;
        debug!(round = self.number, "Round ended");
        Ok(())
    }

    fn take_turn(&self, actor: &Rc<Character>, rng: &mut BattleRng) -> EngineResult<()> {
        let on_player_side = self.players.iter().any(|p| Rc::ptr_eq(p, actor));
        let (allies, foes) = if on_player_side {
            (living(self.players), living(self.enemies))
        } else {
            (living(self.enemies), living(self.players))
        };

        let Some(policy) = actor.policy() else {
            return self.skip(actor, SkipReason::NoPolicy);
        };
        let Some(decision) = policy.decide_action(actor, &allies, &foes, rng) else {
            return self.skip(actor, SkipReason::NoDecision);
        };

        debug!(
            round = self.number,
            character = %actor.name(),
            policy = policy.name(),
            ability = %decision.ability,
            targets = decision.targets.len(),
            "Turn decided"
        );
        match actor.use_ability(&decision.ability, decision.targets) {
            Ok(()) => Ok(()),
            Err(AbilityError::NotFound(_) | AbilityError::NotLearned { .. }) => {
                warn!(character = %actor.name(), ability = %decision.ability, "Unknown ability, turn skipped");
                self.skip(actor, SkipReason::UnknownAbility)
            }
            Err(
                err @ (AbilityError::OnCooldown { .. }
                | AbilityError::Action(ActionError::Unavailable { .. })),
            ) => {
                warn!(character = %actor.name(), error = %err, "Ability unusable, turn skipped");
                self.skip(actor, SkipReason::AbilityUnusable)
            }
            Err(AbilityError::Action(ActionError::Bus(err))) => Err(BattleError::Bus(err)),
            Err(AbilityError::Action(err)) => Err(BattleError::Action(err)),
        }
    }

    fn skip(&self, actor: &Character, reason: SkipReason) -> EngineResult<()> {
        debug!(character = %actor.name(), reason = %reason, "Turn skipped");
        let hint = DisplayHintBuilder::new()
            .character_name(actor.name(), actor.is_player())
            .styled(" hesitates.", Color::Gray, false, true)
            .build();
        self.bus.publish(
            &Notification::broadcast(Payload::TurnSkipped {
                character: actor.id(),
                reason,
            })
            .with_hint(hint),
        )?;
        Ok(())
    }
}
