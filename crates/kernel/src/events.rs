//! Typed publish/subscribe.
//!
//! Listeners subscribe to one event kind and are called synchronously, in
//! registration order, with every event of that kind. Dispatch walks a
//! snapshot of the listener list taken when `fire` starts, so a listener may
//! subscribe, unsubscribe or fire further events through a shared
//! `Rc<EventBus>` without disturbing the dispatch in progress. Nested fires
//! reach every listener, including the one currently running, so listeners
//! are `Fn` and keep mutable state in `Cell`/`RefCell`.

use crate::section_plane::SectionPlaneSnapshot;
use clipview_common::ComponentId;
use glam::Vec3;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// An event payload that can be routed by kind.
pub trait Event: 'static {
    type Kind: Copy + Ord + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Token returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

type Listener<E> = Rc<dyn Fn(&E)>;

struct Subscription<E> {
    id: SubscriptionId,
    once: bool,
    listener: Listener<E>,
}

/// Synchronous, single-threaded event channel for one payload type.
pub struct EventBus<E: Event> {
    subs: RefCell<BTreeMap<E::Kind, Vec<Subscription<E>>>>,
    next_id: Cell<u64>,
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subs: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Subscribe to every future event of `kind`.
    pub fn on(&self, kind: E::Kind, listener: impl Fn(&E) + 'static) -> SubscriptionId {
        self.subscribe(kind, false, Rc::new(listener))
    }

    /// Subscribe to the next event of `kind` only.
    pub fn once(&self, kind: E::Kind, listener: impl Fn(&E) + 'static) -> SubscriptionId {
        self.subscribe(kind, true, Rc::new(listener))
    }

    fn subscribe(&self, kind: E::Kind, once: bool, listener: Listener<E>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subs
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push(Subscription { id, once, listener });
        id
    }

    /// Remove a subscription. Returns false if it was not present.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subs.borrow_mut();
        let mut removed = false;
        subs.retain(|_, list| {
            let before = list.len();
            list.retain(|s| s.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Whether anything is listening for `kind`.
    pub fn has_subs(&self, kind: E::Kind) -> bool {
        self.subs
            .borrow()
            .get(&kind)
            .is_some_and(|list| !list.is_empty())
    }

    /// Deliver `event` to the listeners subscribed to its kind. Returns how
    /// many listeners ran.
    pub fn fire(&self, event: &E) -> usize {
        let kind = event.kind();
        let snapshot: Vec<Listener<E>> = {
            let mut subs = self.subs.borrow_mut();
            let Some(list) = subs.get_mut(&kind) else {
                return 0;
            };
            let snapshot: Vec<_> = list.iter().map(|s| Rc::clone(&s.listener)).collect();
            list.retain(|s| !s.once);
            if list.is_empty() {
                subs.remove(&kind);
            }
            snapshot
        };

        tracing::trace!(?kind, listeners = snapshot.len(), "dispatching event");
        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subs = self.subs.borrow();
        let counts: BTreeMap<&E::Kind, usize> = subs.iter().map(|(k, v)| (k, v.len())).collect();
        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .finish_non_exhaustive()
    }
}

/// Events fired on an individual component.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentEvent {
    Active(bool),
    Pos(Vec3),
    Dir(Vec3),
    /// Fired once, just before the component becomes unusable.
    Destroyed(ComponentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentEventKind {
    Active,
    Pos,
    Dir,
    Destroyed,
}

impl Event for ComponentEvent {
    type Kind = ComponentEventKind;

    fn kind(&self) -> ComponentEventKind {
        match self {
            Self::Active(_) => ComponentEventKind::Active,
            Self::Pos(_) => ComponentEventKind::Pos,
            Self::Dir(_) => ComponentEventKind::Dir,
            Self::Destroyed(_) => ComponentEventKind::Destroyed,
        }
    }
}

/// Scene-wide events.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ComponentCreated(ComponentId),
    ComponentDestroyed(ComponentId),
    SectionPlaneCreated(SectionPlaneSnapshot),
    SectionPlaneUpdated(SectionPlaneSnapshot),
    SectionPlaneDestroyed(ComponentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SceneEventKind {
    ComponentCreated,
    ComponentDestroyed,
    SectionPlaneCreated,
    SectionPlaneUpdated,
    SectionPlaneDestroyed,
}

impl Event for SceneEvent {
    type Kind = SceneEventKind;

    fn kind(&self) -> SceneEventKind {
        match self {
            Self::ComponentCreated(_) => SceneEventKind::ComponentCreated,
            Self::ComponentDestroyed(_) => SceneEventKind::ComponentDestroyed,
            Self::SectionPlaneCreated(_) => SceneEventKind::SectionPlaneCreated,
            Self::SectionPlaneUpdated(_) => SceneEventKind::SectionPlaneUpdated,
            Self::SectionPlaneDestroyed(_) => SceneEventKind::SectionPlaneDestroyed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, Rc<EventBus<ComponentEvent>>) {
        (Rc::new(RefCell::new(Vec::new())), Rc::new(EventBus::new()))
    }

    #[test]
    fn fire_without_listeners_is_noop() {
        let bus: EventBus<ComponentEvent> = EventBus::new();
        assert_eq!(bus.fire(&ComponentEvent::Active(true)), 0);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let (log, bus) = recorder();
        for name in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            bus.on(ComponentEventKind::Active, move |_| log.borrow_mut().push(name.into()));
        }
        assert_eq!(bus.fire(&ComponentEvent::Active(false)), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn events_only_reach_their_kind() {
        let (log, bus) = recorder();
        let l = Rc::clone(&log);
        bus.on(ComponentEventKind::Pos, move |e| l.borrow_mut().push(format!("{e:?}")));
        bus.fire(&ComponentEvent::Dir(Vec3::X));
        assert!(log.borrow().is_empty());
        bus.fire(&ComponentEvent::Pos(Vec3::Y));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn off_removes_listener() {
        let (log, bus) = recorder();
        let l = Rc::clone(&log);
        let sub = bus.on(ComponentEventKind::Active, move |_| l.borrow_mut().push("x".into()));
        assert!(bus.has_subs(ComponentEventKind::Active));
        assert!(bus.off(sub));
        assert!(!bus.off(sub));
        assert!(!bus.has_subs(ComponentEventKind::Active));
        bus.fire(&ComponentEvent::Active(true));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn once_listener_fires_a_single_time() {
        let (log, bus) = recorder();
        let l = Rc::clone(&log);
        bus.once(ComponentEventKind::Active, move |_| l.borrow_mut().push("once".into()));
        bus.fire(&ComponentEvent::Active(true));
        bus.fire(&ComponentEvent::Active(true));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn listener_added_during_dispatch_waits_for_next_fire() {
        let (log, bus) = recorder();
        let inner_bus = Rc::clone(&bus);
        let outer_log = Rc::clone(&log);
        bus.on(ComponentEventKind::Active, move |_| {
            outer_log.borrow_mut().push("outer".into());
            let l = Rc::clone(&outer_log);
            inner_bus.on(ComponentEventKind::Active, move |_| {
                l.borrow_mut().push("late".into());
            });
        });

        assert_eq!(bus.fire(&ComponentEvent::Active(true)), 1);
        assert_eq!(*log.borrow(), vec!["outer"]);
    }

    #[test]
    fn listener_can_fire_other_kinds() {
        let (log, bus) = recorder();
        let inner_bus = Rc::clone(&bus);
        bus.on(ComponentEventKind::Active, move |_| {
            inner_bus.fire(&ComponentEvent::Pos(Vec3::ZERO));
        });
        let l = Rc::clone(&log);
        bus.on(ComponentEventKind::Pos, move |_| l.borrow_mut().push("pos".into()));

        bus.fire(&ComponentEvent::Active(true));
        assert_eq!(*log.borrow(), vec!["pos"]);
    }

    #[test]
    fn nested_fire_reaches_running_listener() {
        let (log, bus) = recorder();
        let inner_bus = Rc::clone(&bus);
        let l = Rc::clone(&log);
        bus.on(ComponentEventKind::Active, move |e| {
            l.borrow_mut().push(format!("{e:?}"));
            if *e == ComponentEvent::Active(true) {
                inner_bus.fire(&ComponentEvent::Active(false));
            }
        });
        let l = Rc::clone(&log);
        bus.on(ComponentEventKind::Active, move |e| l.borrow_mut().push(format!("second {e:?}")));

        assert_eq!(bus.fire(&ComponentEvent::Active(true)), 2);
        assert_eq!(
            *log.borrow(),
            vec![
                "Active(true)",
                "Active(false)",
                "second Active(false)",
                "second Active(true)",
            ]
        );
    }

    #[test]
    fn stateful_listener_counts_nested_calls() {
        let bus: Rc<EventBus<ComponentEvent>> = Rc::new(EventBus::new());
        let calls = Rc::new(Cell::new(0));
        let inner_bus = Rc::clone(&bus);
        let c = Rc::clone(&calls);
        bus.on(ComponentEventKind::Active, move |e| {
            c.set(c.get() + 1);
            if *e == ComponentEvent::Active(true) {
                inner_bus.fire(&ComponentEvent::Active(false));
            }
        });

        bus.fire(&ComponentEvent::Active(true));
        assert_eq!(calls.get(), 2);
    }
}
