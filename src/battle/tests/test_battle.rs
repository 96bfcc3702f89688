#[cfg(test)]
mod tests {
    use crate::battle::engine::{Battle, BattlePhase};
    use crate::battle::log::BattleLog;
    use crate::battle::pacing::{Pacer, Pause};
    use crate::battle::result::BattleOutcome;
    use crate::battle::tests::common::{payloads_of, scripted_rng, test_session, TestCharacterBuilder};
    use crate::battle::turn_order::InitiativeOrder;
    use crate::errors::{BattleError, HandlerError};
    use crate::events::{NotificationKind, Payload, Priority, SkipReason, Source};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_one_on_one_ends_after_two_player_turns() {
        let session = test_session();
        let log = BattleLog::attach(session.bus());
        // 100 HP, 20 attack.
        let hero = TestCharacterBuilder::player("Hero")
            .with_stats(10, 0, 0, 10)
            .with_policy("PlayerAI")
            .build(&session);
        // 30 HP, 0 defense, 0 attack.
        let goblin = TestCharacterBuilder::enemy("Goblin")
            .with_stats(0, 0, 0, 3)
            .with_policy("BasicEnemyAI")
            .build(&session);

        let mut battle = Battle::new(&session).with_rng(scripted_rng(vec![0]));
        let result = battle
            .start(&[Rc::clone(&hero)], &[Rc::clone(&goblin)])
            .unwrap();

        assert_eq!(result.outcome, BattleOutcome::Victory);
        assert!(result.is_victory());
        assert_eq!(result.rounds, 2);
        assert!(hero.is_alive());
        assert!(!goblin.is_alive());
        assert_eq!(result.surviving_players.len(), 1);
        assert_eq!(result.defeated_enemies.len(), 1);
        assert_eq!(result.defeated_enemies[0].name, "Goblin");

        let hero_attacks = payloads_of(&log.entries(), NotificationKind::AbilityUsed)
            .into_iter()
            .filter(|p| matches!(p, Payload::AbilityUsed { character, .. } if *character == hero.id()))
            .count();
        assert_eq!(hero_attacks, 2);
        assert_eq!(log.count(NotificationKind::Death), 1);
        assert_eq!(battle.phase(), BattlePhase::Ended);
        assert_eq!(battle.last_result(), Some(&result));
    }

    #[test]
    fn test_lifecycle_notifications_frame_the_battle() {
        let session = test_session();
        let log = BattleLog::attach(session.bus());
        let hero = TestCharacterBuilder::player("Hero")
            .with_policy("PlayerAI")
            .build(&session);
        let goblin = TestCharacterBuilder::enemy("Goblin")
            .with_stats(0, 0, 0, 1)
            .build(&session);

        Battle::new(&session)
            .with_rng(scripted_rng(vec![0]))
            .start(&[hero], &[goblin])
            .unwrap();

        // The goblin dies on the first turn, so it never acts. The log listens
        // at LOW priority, so the nested Death lands before the Damage entry.
        assert_eq!(
            log.kinds(),
            vec![
                NotificationKind::BattleStarted,
                NotificationKind::RoundStarted,
                NotificationKind::EnergySpent,
                NotificationKind::Death,
                NotificationKind::Damage,
                NotificationKind::AbilityUsed,
                NotificationKind::LogUpdated,
                NotificationKind::RoundEnded,
                NotificationKind::BattleEnded,
            ]
        );
    }

    #[test]
    fn test_log_refresh_after_every_turn() {
        let session = test_session();
        let log = BattleLog::attach(session.bus());
        let hero = TestCharacterBuilder::player("Hero")
            .with_policy("PlayerAI")
            .build(&session);
        let dummy = TestCharacterBuilder::enemy("Dummy")
            .with_stats(0, 0, 0, 100)
            .with_policy("BasicEnemyAI")
            .build(&session);

        Battle::new(&session)
            .with_rng(scripted_rng(vec![0]))
            .with_max_rounds(3)
            .start(&[hero], &[dummy])
            .unwrap();

        // Two participants for three rounds.
        assert_eq!(log.count(NotificationKind::LogUpdated), 6);
        assert_eq!(log.count(NotificationKind::RoundStarted), 3);
        assert_eq!(log.count(NotificationKind::RoundEnded), 3);
    }

    #[test]
    fn test_round_limit_ends_in_a_draw() {
        let session = test_session();
        let hero = TestCharacterBuilder::player("Pacifist")
            .with_abilities(&[])
            .with_policy("PlayerAI")
            .build(&session);
        let statue = TestCharacterBuilder::enemy("Statue").build(&session);

        let result = Battle::new(&session)
            .with_max_rounds(4)
            .start(&[hero], &[statue])
            .unwrap();

        assert_eq!(result.outcome, BattleOutcome::Draw);
        assert_eq!(result.rounds, 4);
        assert!(result.defeated_enemies.is_empty());
    }

    #[test]
    fn test_defeat_when_the_players_fall() {
        let session = test_session();
        let hero = TestCharacterBuilder::player("Hero")
            .with_stats(0, 0, 0, 1)
            .with_policy("PlayerAI")
            .build(&session);
        let ogre = TestCharacterBuilder::enemy("Ogre")
            .with_stats(30, 0, 0, 50)
            .with_policy("BasicEnemyAI")
            .build(&session);

        let result = Battle::new(&session)
            .with_rng(scripted_rng(vec![0]))
            .start(&[hero], &[ogre])
            .unwrap();

        assert_eq!(result.outcome, BattleOutcome::Defeat);
        assert!(result.surviving_players.is_empty());
        assert_eq!(result.rounds, 1);
    }

    #[test]
    fn test_missing_policy_skips_the_turn() {
        let session = test_session();
        let log = BattleLog::attach(session.bus());
        let idle = TestCharacterBuilder::player("Idle").build(&session);
        let statue = TestCharacterBuilder::enemy("Statue").build(&session);

        Battle::new(&session)
            .with_max_rounds(1)
            .start(&[Rc::clone(&idle)], &[statue])
            .unwrap();

        let skips = payloads_of(&log.entries(), NotificationKind::TurnSkipped);
        assert_eq!(skips.len(), 2);
        assert_eq!(
            skips[0],
            Payload::TurnSkipped {
                character: idle.id(),
                reason: SkipReason::NoPolicy,
            }
        );
    }

    #[test]
    fn test_initiative_order_lets_the_fast_act_first() {
        let session = test_session();
        let log = BattleLog::attach(session.bus());
        let slow = TestCharacterBuilder::player("Slow")
            .with_stats(10, 1, 0, 10)
            .with_policy("PlayerAI")
            .build(&session);
        let fast = TestCharacterBuilder::enemy("Fast")
            .with_stats(10, 9, 0, 10)
            .with_policy("BasicEnemyAI")
            .build(&session);

        Battle::new(&session)
            .with_turn_order(InitiativeOrder::by_agility())
            .with_rng(scripted_rng(vec![0]))
            .with_max_rounds(1)
            .start(&[Rc::clone(&slow)], &[Rc::clone(&fast)])
            .unwrap();

        let actors: Vec<_> = payloads_of(&log.entries(), NotificationKind::AbilityUsed)
            .into_iter()
            .filter_map(|p| match p {
                Payload::AbilityUsed { character, .. } => Some(character),
                _ => None,
            })
            .collect();
        assert_eq!(actors, vec![fast.id(), slow.id()]);
    }

    #[test]
    fn test_battle_end_clears_cooldowns() {
        let session = test_session();
        let mage = TestCharacterBuilder::player("Mage")
            .with_stats(0, 0, 60, 10)
            .with_abilities(&["FireNova"])
            .with_policy("PlayerAI")
            .build(&session);
        // FireNova hits for 8 + 60 / 3 = 28.
        let goblin = TestCharacterBuilder::enemy("Goblin")
            .with_stats(0, 0, 0, 2)
            .build(&session);

        let result = Battle::new(&session)
            .with_rng(scripted_rng(vec![0]))
            .start(&[Rc::clone(&mage)], &[goblin])
            .unwrap();

        assert_eq!(result.outcome, BattleOutcome::Victory);
        assert!(!session.cooldowns().is_on_cooldown(mage.id(), "FireNova"));
        assert_eq!(session.cooldowns().tracked_characters(), 0);
    }

    #[test]
    fn test_aborted_battle_still_clears_cooldowns() {
        let session = test_session();
        let mage = TestCharacterBuilder::player("Mage")
            .with_stats(0, 0, 60, 10)
            .with_abilities(&["FireNova"])
            .with_policy("PlayerAI")
            .build(&session);
        let dummy = TestCharacterBuilder::enemy("Dummy")
            .with_stats(0, 0, 0, 100)
            .build(&session);
        // Fails the first log refresh, right after FireNova went on cooldown.
        session.bus().subscribe(
            Source::Broadcast,
            NotificationKind::LogUpdated,
            Priority::NORMAL,
            |_, _| Err(HandlerError::Rejected("presentation went away".to_string())),
        );

        let mut battle = Battle::new(&session).with_rng(scripted_rng(vec![0]));
        let err = battle
            .start(&[Rc::clone(&mage)], &[dummy])
            .unwrap_err();

        assert!(matches!(err, BattleError::Bus(_)));
        assert_eq!(battle.phase(), BattlePhase::Ended);
        assert!(battle.last_result().is_none());
        assert!(!session.cooldowns().is_on_cooldown(mage.id(), "FireNova"));
        assert_eq!(session.cooldowns().tracked_characters(), 0);
    }

    #[test]
    fn test_empty_party_is_rejected() {
        let session = test_session();
        let hero = TestCharacterBuilder::player("Hero").build(&session);

        let mut battle = Battle::new(&session);
        let err = battle.start(&[hero], &[]).unwrap_err();

        assert!(matches!(
            err,
            BattleError::EmptyParty {
                players: 1,
                enemies: 0
            }
        ));
        assert_eq!(battle.phase(), BattlePhase::Idle);
    }

    struct Recorder(Rc<RefCell<Vec<Pause>>>);

    impl Pacer for Recorder {
        fn pause(&self, pause: Pause) {
            self.0.borrow_mut().push(pause);
        }
    }

    #[test]
    fn test_pacer_sees_turn_and_round_pauses_but_not_after_the_end() {
        let session = test_session();
        let hero = TestCharacterBuilder::player("Hero")
            .with_stats(10, 0, 0, 10)
            .with_policy("PlayerAI")
            .build(&session);
        let goblin = TestCharacterBuilder::enemy("Goblin")
            .with_stats(0, 0, 0, 3)
            .with_policy("BasicEnemyAI")
            .build(&session);
        let pauses = Rc::new(RefCell::new(Vec::new()));

        Battle::new(&session)
            .with_rng(scripted_rng(vec![0]))
            .with_pacer(Recorder(Rc::clone(&pauses)))
            .start(&[hero], &[goblin])
            .unwrap();

        assert_eq!(
            *pauses.borrow(),
            vec![Pause::AfterTurn, Pause::AfterTurn, Pause::AfterRound]
        );
    }
}
