#[cfg(test)]
mod tests {
    use crate::battle::log::BattleLog;
    use crate::battle::tests::common::{payloads_of, test_session, TestCharacterBuilder};
    use crate::events::{Notification, NotificationKind, Payload};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::DamageType;

    fn damage(target: &crate::character::Character, amount: u32, damage_type: DamageType) -> Notification {
        Notification::broadcast(Payload::Damage {
            attacker: None,
            target: target.id(),
            amount,
            damage_type,
        })
    }

    #[test]
    fn test_defense_absorbs_half_its_value() {
        let session = test_session();
        // Agility 10 -> defense 10.
        let target = TestCharacterBuilder::enemy("Guard")
            .with_stats(0, 10, 0, 10)
            .build(&session);
        assert_eq!(target.combat().defense(), 10);

        session
            .bus()
            .publish(&damage(&target, 20, DamageType::Physical))
            .unwrap();

        assert_eq!(target.health().current(), 85);
    }

    #[test]
    fn test_weak_hit_still_deals_one() {
        let session = test_session();
        let target = TestCharacterBuilder::enemy("Wall")
            .with_stats(0, 40, 0, 10)
            .build(&session);

        session
            .bus()
            .publish(&damage(&target, 3, DamageType::Ice))
            .unwrap();
        assert_eq!(target.health().current(), 99);

        session
            .bus()
            .publish(&damage(&target, 0, DamageType::Physical))
            .unwrap();
        assert_eq!(target.health().current(), 99);
    }

    #[test]
    fn test_true_damage_ignores_defense() {
        let session = test_session();
        let target = TestCharacterBuilder::enemy("Wall")
            .with_stats(0, 40, 0, 10)
            .build(&session);

        session
            .bus()
            .publish(&damage(&target, 12, DamageType::True))
            .unwrap();

        assert_eq!(target.health().current(), 88);
    }

    #[test]
    fn test_damage_for_someone_else_is_ignored() {
        let session = test_session();
        let target = TestCharacterBuilder::enemy("Target").build(&session);
        let bystander = TestCharacterBuilder::enemy("Bystander").build(&session);

        session
            .bus()
            .publish(&damage(&target, 30, DamageType::Physical))
            .unwrap();

        assert_eq!(target.health().current(), 70);
        assert_eq!(bystander.health().current(), 100);
    }

    #[test]
    fn test_death_fires_exactly_once() {
        let session = test_session();
        let log = BattleLog::attach(session.bus());
        let victim = TestCharacterBuilder::enemy("Victim")
            .with_stats(0, 0, 0, 3)
            .build(&session);

        for _ in 0..3 {
            session
                .bus()
                .publish(&damage(&victim, 50, DamageType::Physical))
                .unwrap();
        }

        assert!(!victim.is_alive());
        assert_eq!(victim.health().current(), 0);
        assert_eq!(log.count(NotificationKind::Death), 1);
        assert_eq!(
            payloads_of(&log.entries(), NotificationKind::Death),
            vec![Payload::Death {
                victim: victim.id(),
                killer: None,
            }]
        );
    }

    #[test]
    fn test_heal_is_capped_and_does_not_revive() {
        let session = test_session();
        let patient = TestCharacterBuilder::player("Patient")
            .with_health(40)
            .build(&session);

        let heal = |amount| {
            Notification::broadcast(Payload::Heal {
                healer: None,
                target: patient.id(),
                amount,
            })
        };

        session.bus().publish(&heal(500)).unwrap();
        assert_eq!(patient.health().current(), 100);

        session
            .bus()
            .publish(&damage(&patient, 1000, DamageType::True))
            .unwrap();
        assert!(!patient.is_alive());

        session.bus().publish(&heal(50)).unwrap();
        assert_eq!(patient.health().current(), 0);
        assert!(!patient.is_alive());
    }

    #[rstest]
    #[case(0, 50)]
    #[case(30, 80)]
    #[case(50, 100)]
    #[case(51, 100)]
    #[case(u32::MAX, 100)]
    fn test_heal_saturates_at_max_health(#[case] amount: u32, #[case] expected: u32) {
        let session = test_session();
        let patient = TestCharacterBuilder::player("Patient")
            .with_health(50)
            .build(&session);

        session
            .bus()
            .publish(&Notification::broadcast(Payload::Heal {
                healer: None,
                target: patient.id(),
                amount,
            }))
            .unwrap();

        assert_eq!(patient.health().current(), expected);
        assert!(patient.is_alive());
    }

    #[test]
    fn test_force_current_clamps_into_living_range() {
        let session = test_session();
        let character = TestCharacterBuilder::player("Clamp")
            .with_health(0)
            .build(&session);
        assert_eq!(character.health().current(), 1);

        character.health().force_current(10_000);
        assert_eq!(character.health().current(), 100);
    }
}
