// In: src/events/bus.rs

//! Synchronous, source-scoped publish/subscribe.
//!
//! Subscriptions are keyed by `(Source, NotificationKind)`. A publish delivers
//! to the exact route plus the `Any` route of the same source, merged and
//! ordered by priority (lower first), registration order breaking ties.
//!
//! Delivery is fail-fast: the first handler error is logged and returned, and
//! the remaining handlers for that publish are skipped. Handlers may publish
//! further notifications; nesting is bounded by `max_depth`.

use crate::errors::{BusError, BusResult, HandlerResult};
use crate::events::notification::{EntityId, Notification, NotificationKind, Source};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{error, trace};

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Dispatch priority. Lower values run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub u8);

impl Priority {
    pub const HIGH: Priority = Priority(0);
    pub const NORMAL: Priority = Priority(10);
    pub const LOW: Priority = Priority(20);
}

impl Default for Priority {
    fn default() -> Self {
        Priority::NORMAL
    }
}

/// Identity of one registered handler. Ids grow monotonically, so ordering
/// by id is registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

pub type Handler = Rc<dyn Fn(&EventBus, &Notification) -> HandlerResult>;

type RouteKey = (Source, NotificationKind);

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    priority: Priority,
    owner: Option<EntityId>,
    label: &'static str,
    handler: Handler,
}

pub struct EventBus {
    routes: RefCell<HashMap<RouteKey, Vec<Subscriber>>>,
    next_id: Cell<u64>,
    depth: Cell<usize>,
    max_depth: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("routes", &self.routes.borrow().len())
            .field("depth", &self.depth.get())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            routes: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            depth: Cell::new(0),
            max_depth,
        }
    }

    /// Registers an anonymous handler with no owner.
    pub fn subscribe<F>(
        &self,
        source: Source,
        kind: NotificationKind,
        priority: Priority,
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(&EventBus, &Notification) -> HandlerResult + 'static,
    {
        self.insert(source, kind, priority, None, "anonymous", Rc::new(handler))
    }

    /// Registers a handler bound to `owner`, removable with `unsubscribe_all_by_owner`.
    /// `label` names the handler in failure logs.
    pub fn subscribe_owned<F>(
        &self,
        owner: EntityId,
        label: &'static str,
        source: Source,
        kind: NotificationKind,
        priority: Priority,
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(&EventBus, &Notification) -> HandlerResult + 'static,
    {
        self.insert(source, kind, priority, Some(owner), label, Rc::new(handler))
    }

    fn insert(
        &self,
        source: Source,
        kind: NotificationKind,
        priority: Priority,
        owner: Option<EntityId>,
        label: &'static str,
        handler: Handler,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.routes
            .borrow_mut()
            .entry((source, kind))
            .or_default()
            .push(Subscriber {
                id,
                priority,
                owner,
                label,
                handler,
            });
        id
    }

    /// Removes one handler from one route. Returns whether it was registered there.
    pub fn unsubscribe(&self, source: Source, kind: NotificationKind, id: SubscriptionId) -> bool {
        let mut routes = self.routes.borrow_mut();
        let Some(subscribers) = routes.get_mut(&(source, kind)) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        let removed = subscribers.len() != before;
        if subscribers.is_empty() {
            routes.remove(&(source, kind));
        }
        removed
    }

    /// Removes every subscription registered on `source`, across all kinds.
    pub fn unsubscribe_all_by_source(&self, source: Source) -> usize {
        let mut routes = self.routes.borrow_mut();
        let mut removed = 0;
        routes.retain(|(route_source, _), subscribers| {
            if *route_source == source {
                removed += subscribers.len();
                false
            } else {
                true
            }
        });
        removed
    }

    /// Removes every subscription whose handler belongs to `owner`.
    pub fn unsubscribe_all_by_owner(&self, owner: EntityId) -> usize {
        let mut routes = self.routes.borrow_mut();
        let mut removed = 0;
        for subscribers in routes.values_mut() {
            let before = subscribers.len();
            subscribers.retain(|s| s.owner != Some(owner));
            removed += before - subscribers.len();
        }
        routes.retain(|_, subscribers| !subscribers.is_empty());
        removed
    }

    pub fn subscriber_count(&self, source: Source, kind: NotificationKind) -> usize {
        self.routes
            .borrow()
            .get(&(source, kind))
            .map_or(0, Vec::len)
    }

    pub fn clear(&self) {
        self.routes.borrow_mut().clear();
    }

    /// Current nesting level of `publish`; zero outside any dispatch.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn publish(&self, notification: &Notification) -> BusResult<()> {
        let kind = notification.kind();
        let origin = notification.source();

        if self.depth.get() >= self.max_depth {
            error!(
                target: "party_battle::bus",
                kind = %kind,
                origin = %origin,
                limit = self.max_depth,
                "Notification cascade too deep, aborting publish"
            );
            return Err(BusError::CascadeTooDeep {
                kind,
                limit: self.max_depth,
            });
        }

        // Snapshot the routes so handlers can (un)subscribe while we dispatch.
        let subscribers = self.collect(origin, kind);
        trace!(
            target: "party_battle::bus",
            kind = %kind,
            origin = %origin,
            handlers = subscribers.len(),
            "Dispatching notification"
        );

        let _depth = DepthGuard::enter(&self.depth);
        for subscriber in subscribers {
            if let Err(err) = (subscriber.handler)(self, notification) {
                error!(
                    target: "party_battle::bus",
                    kind = %kind,
                    origin = %origin,
                    handler = subscriber.label,
                    subscription = subscriber.id.0,
                    error = %err,
                    "Notification handler failed"
                );
                return Err(BusError::HandlerFailed {
                    kind,
                    origin,
                    handler: subscriber.label,
                    error: err,
                });
            }
        }
        Ok(())
    }

    fn collect(&self, source: Source, kind: NotificationKind) -> Vec<Subscriber> {
        let routes = self.routes.borrow();
        let mut merged: Vec<Subscriber> = routes
            .get(&(source, kind))
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        if kind != NotificationKind::Any {
            if let Some(base) = routes.get(&(source, NotificationKind::Any)) {
                merged.extend(base.iter().cloned());
            }
        }
        merged.sort_by_key(|s| (s.priority, s.id));
        merged
    }
}

struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HandlerError;
    use crate::events::notification::{IdAllocator, Payload};
    use pretty_assertions::assert_eq;

    fn recorder() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn push(log: &Rc<RefCell<Vec<&'static str>>>, entry: &'static str) -> impl Fn(&EventBus, &Notification) -> HandlerResult {
        let log = Rc::clone(log);
        move |_, _| {
            log.borrow_mut().push(entry);
            Ok(())
        }
    }

    fn round_started() -> Notification {
        Notification::broadcast(Payload::RoundStarted { round: 1 })
    }

    #[test]
    fn test_priority_order_ignores_subscription_order() {
        let bus = EventBus::new();
        let log = recorder();
        bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::LOW, push(&log, "low"));
        bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::HIGH, push(&log, "high"));

        bus.publish(&round_started()).unwrap();

        assert_eq!(*log.borrow(), vec!["high", "low"]);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let bus = EventBus::new();
        let log = recorder();
        bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::NORMAL, push(&log, "first"));
        bus.subscribe(Source::Broadcast, NotificationKind::Any, Priority::NORMAL, push(&log, "second"));
        bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::NORMAL, push(&log, "third"));

        bus.publish(&round_started()).unwrap();

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_any_route_merges_with_exact_route_by_priority() {
        let bus = EventBus::new();
        let log = recorder();
        bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::LOW, push(&log, "exact"));
        bus.subscribe(Source::Broadcast, NotificationKind::Any, Priority::HIGH, push(&log, "any"));

        bus.publish(&round_started()).unwrap();
        bus.publish(&Notification::broadcast(Payload::LogUpdated)).unwrap();

        assert_eq!(*log.borrow(), vec!["any", "exact", "any"]);
    }

    #[test]
    fn test_broadcast_is_not_a_wildcard() {
        let bus = EventBus::new();
        let ids = IdAllocator::new();
        let entity = ids.next_id();
        let log = recorder();
        bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::NORMAL, push(&log, "broadcast"));
        bus.subscribe(entity.into(), NotificationKind::RoundStarted, Priority::NORMAL, push(&log, "entity"));

        bus.publish(&Notification::new(entity.into(), Payload::RoundStarted { round: 1 }))
            .unwrap();

        assert_eq!(*log.borrow(), vec!["entity"]);
    }

    #[test]
    fn test_failing_handler_aborts_remaining_delivery() {
        let bus = EventBus::new();
        let log = recorder();
        bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::HIGH, push(&log, "before"));
        bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::NORMAL, |_, _| {
            Err(HandlerError::Rejected("nope".to_string()))
        });
        bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::LOW, push(&log, "after"));

        let result = bus.publish(&round_started());

        assert!(matches!(
            result,
            Err(BusError::HandlerFailed {
                kind: NotificationKind::RoundStarted,
                origin: Source::Broadcast,
                ..
            })
        ));
        assert_eq!(*log.borrow(), vec!["before"]);
        assert_eq!(bus.depth(), 0);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_handler() {
        let bus = EventBus::new();
        let log = recorder();
        let keep = bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::NORMAL, push(&log, "keep"));
        let dropped = bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::NORMAL, push(&log, "drop"));

        assert!(bus.unsubscribe(Source::Broadcast, NotificationKind::RoundStarted, dropped));
        assert!(!bus.unsubscribe(Source::Broadcast, NotificationKind::RoundEnded, keep));
        bus.publish(&round_started()).unwrap();

        assert_eq!(*log.borrow(), vec!["keep"]);
    }

    #[test]
    fn test_bulk_teardown_by_source_and_owner() {
        let bus = EventBus::new();
        let ids = IdAllocator::new();
        let (owner, other, property) = (ids.next_id(), ids.next_id(), ids.next_id());
        let noop = |_: &EventBus, _: &Notification| Ok(());

        bus.subscribe_owned(owner, "a", Source::Broadcast, NotificationKind::Damage, Priority::NORMAL, noop);
        bus.subscribe_owned(owner, "b", property.into(), NotificationKind::StatsChanged, Priority::NORMAL, noop);
        bus.subscribe_owned(other, "c", Source::Broadcast, NotificationKind::Damage, Priority::NORMAL, noop);
        bus.subscribe(property.into(), NotificationKind::Any, Priority::NORMAL, noop);

        assert_eq!(bus.unsubscribe_all_by_owner(owner), 2);
        assert_eq!(bus.subscriber_count(Source::Broadcast, NotificationKind::Damage), 1);
        assert_eq!(bus.unsubscribe_all_by_source(property.into()), 1);
        assert_eq!(bus.subscriber_count(property.into(), NotificationKind::Any), 0);
    }

    #[test]
    fn test_reentrant_publish_is_bounded() {
        let bus = EventBus::with_max_depth(5);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        bus.subscribe(Source::Broadcast, NotificationKind::LogUpdated, Priority::NORMAL, move |bus, n| {
            counter.set(counter.get() + 1);
            bus.publish(n)?;
            Ok(())
        });

        let result = bus.publish(&Notification::broadcast(Payload::LogUpdated));

        assert!(result.is_err());
        assert_eq!(calls.get(), 5);
        assert_eq!(bus.depth(), 0);
    }

    #[test]
    fn test_handler_may_unsubscribe_during_dispatch() {
        let bus = Rc::new(EventBus::new());
        let log = recorder();
        let slot: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let own = Rc::clone(&slot);
        let inner_log = Rc::clone(&log);
        let id = bus.subscribe(Source::Broadcast, NotificationKind::RoundStarted, Priority::NORMAL, move |bus, _| {
            inner_log.borrow_mut().push("once");
            if let Some(id) = own.get() {
                bus.unsubscribe(Source::Broadcast, NotificationKind::RoundStarted, id);
            }
            Ok(())
        });
        slot.set(Some(id));

        bus.publish(&round_started()).unwrap();
        bus.publish(&round_started()).unwrap();

        assert_eq!(*log.borrow(), vec!["once"]);
    }
}
