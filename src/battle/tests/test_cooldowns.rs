#[cfg(test)]
mod tests {
    use crate::battle::ai::{Behavior, Decision};
    use crate::battle::engine::Battle;
    use crate::battle::log::BattleLog;
    use crate::battle::result::BattleOutcome;
    use crate::battle::rng::BattleRng;
    use crate::battle::tests::common::{payloads_of, scripted_rng, test_session, TestCharacterBuilder};
    use crate::character::Character;
    use crate::errors::AbilityError;
    use crate::events::{Notification, NotificationKind, Payload, SkipReason};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    /// Insists on one ability against the first enemy, cooldown or not.
    struct Insist(&'static str);

    impl Behavior for Insist {
        fn name(&self) -> &str {
            "Insist"
        }

        fn decide_action(
            &self,
            _actor: &Rc<Character>,
            _allies: &[Rc<Character>],
            enemies: &[Rc<Character>],
            _rng: &mut BattleRng,
        ) -> Option<Decision> {
            let target = enemies.first()?;
            Some(Decision::new(self.0, vec![Rc::clone(target)]))
        }
    }

    #[test]
    fn test_cooldown_blocks_for_exactly_n_rounds() {
        let session = test_session();
        let caster = TestCharacterBuilder::player("Caster")
            .with_abilities(&["FireNova", "BasicAttack"])
            .build(&session);
        let dummy = TestCharacterBuilder::enemy("Dummy")
            .with_stats(0, 0, 0, 100)
            .build(&session);

        // Round 1: cast. FireNova has a 3 round cooldown.
        caster.use_ability("FireNova", vec![Rc::clone(&dummy)]).unwrap();
        let mut ready_by_round = Vec::new();
        for round in 1..=4 {
            ready_by_round.push((round, caster.available_abilities().contains(&"FireNova".to_string())));
            session
                .bus()
                .publish(&Notification::broadcast(Payload::RoundEnded { round }))
                .unwrap();
        }

        assert_eq!(
            ready_by_round,
            vec![(1, false), (2, false), (3, false), (4, true)]
        );
    }

    #[test]
    fn test_using_an_ability_on_cooldown_is_refused() {
        let session = test_session();
        let caster = TestCharacterBuilder::player("Caster")
            .with_abilities(&["MagicMissile"])
            .build(&session);
        let dummy = TestCharacterBuilder::enemy("Dummy")
            .with_stats(0, 0, 0, 100)
            .build(&session);

        caster.use_ability("MagicMissile", vec![Rc::clone(&dummy)]).unwrap();
        let energy_after_cast = caster.energy().current();
        let err = caster
            .use_ability("MagicMissile", vec![Rc::clone(&dummy)])
            .unwrap_err();

        assert!(matches!(
            err,
            AbilityError::OnCooldown { remaining: 1, .. }
        ));
        assert_eq!(caster.energy().current(), energy_after_cast);
    }

    #[test]
    fn test_cooldowns_are_per_character() {
        let session = test_session();
        let first = TestCharacterBuilder::player("First")
            .with_abilities(&["MagicMissile"])
            .build(&session);
        let second = TestCharacterBuilder::player("Second")
            .with_abilities(&["MagicMissile"])
            .build(&session);
        let dummy = TestCharacterBuilder::enemy("Dummy")
            .with_stats(0, 0, 0, 100)
            .build(&session);

        first.use_ability("MagicMissile", vec![Rc::clone(&dummy)]).unwrap();

        assert!(session.cooldowns().is_on_cooldown(first.id(), "MagicMissile"));
        assert!(!session.cooldowns().is_on_cooldown(second.id(), "MagicMissile"));
        second.use_ability("MagicMissile", vec![Rc::clone(&dummy)]).unwrap();
    }

    #[test]
    fn test_cooldown_inside_a_battle_skips_blocked_turns() {
        let session = test_session();
        let log = BattleLog::attach(session.bus());
        let caster = TestCharacterBuilder::player("Caster")
            .with_abilities(&["FireNova"])
            .build(&session);
        caster.set_policy(Some(Rc::new(Insist("FireNova"))));
        let dummy = TestCharacterBuilder::enemy("Dummy")
            .with_stats(0, 0, 0, 100)
            .build(&session);

        let result = Battle::new(&session)
            .with_rng(scripted_rng(vec![0]))
            .with_max_rounds(5)
            .start(&[Rc::clone(&caster)], &[Rc::clone(&dummy)])
            .unwrap();

        assert_eq!(result.outcome, BattleOutcome::Draw);
        assert_eq!(result.rounds, 5);

        // Cast in rounds 1 and 4, blocked in 2, 3 and 5.
        let casts = payloads_of(&log.entries(), NotificationKind::AbilityUsed);
        assert_eq!(casts.len(), 2);
        let caster_skips: Vec<SkipReason> = payloads_of(&log.entries(), NotificationKind::TurnSkipped)
            .into_iter()
            .filter_map(|p| match p {
                Payload::TurnSkipped { character, reason } if character == caster.id() => Some(reason),
                _ => None,
            })
            .collect();
        assert_eq!(caster_skips, vec![SkipReason::AbilityUnusable; 3]);
        assert_eq!(dummy.health().current(), 1000 - 2 * 8);

        // Battle end wipes the tracker.
        assert_eq!(session.cooldowns().tracked_characters(), 0);
    }
}
