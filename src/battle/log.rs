// In: src/battle/log.rs

use crate::events::{EventBus, Notification, NotificationKind, Priority, Source, SubscriptionId};
use std::cell::RefCell;
use std::rc::Rc;

/// Collects every broadcast notification, for whoever presents the battle.
///
/// ## Usage Examples
///
/// ```rust,ignore
/// let log = BattleLog::attach(session.bus());
/// battle.start(players, enemies)?;
///
/// println!("{}", log);
/// ```
#[derive(Debug)]
pub struct BattleLog {
    entries: Rc<RefCell<Vec<Notification>>>,
    subscription: SubscriptionId,
}

impl BattleLog {
    /// Starts recording. Runs at LOW priority so entries land after the
    /// notification has been applied.
    pub fn attach(bus: &EventBus) -> Self {
        let entries = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&entries);
        let subscription = bus.subscribe(
            Source::Broadcast,
            NotificationKind::Any,
            Priority::LOW,
            move |_, notification| {
                sink.borrow_mut().push(notification.clone());
                Ok(())
            },
        );
        Self {
            entries,
            subscription,
        }
    }

    /// Stops recording. Entries collected so far are kept.
    pub fn detach(&self, bus: &EventBus) -> bool {
        bus.unsubscribe(Source::Broadcast, NotificationKind::Any, self.subscription)
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|n| n.kind() == kind)
            .count()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.entries.borrow().iter().map(Notification::kind).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl std::fmt::Display for BattleLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in self.entries.borrow().iter() {
            writeln!(f, "  {:?}", entry.payload())?;
        }
        Ok(())
    }
}
