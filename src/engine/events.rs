//! State-change notifications and the subscriber registry.
//!
//! Events are delivered synchronously, in registration order, on the same
//! turn the mutation occurred. Subscribers must not assume batching or
//! debouncing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{Difficulty, TimeScale};
use crate::engine::plant::SystemSnapshot;
use crate::engine::SimTime;

/// Why a command was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// The step's dependencies are not all completed.
    StepNotAvailable,
    /// The linked system's dependencies are not all ready.
    SystemNotReady {
        /// The system that refused to start.
        system_id: String,
    },
    /// The linked system is in the failed state.
    SystemFailed {
        /// The failed system.
        system_id: String,
    },
}

/// A state-change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A system's startup progressed or its state changed.
    SystemUpdated {
        /// Point-in-time view of the system.
        snapshot: SystemSnapshot,
    },
    /// A step began executing.
    StepStarted {
        /// The step.
        step_id: String,
        /// Session time.
        at: SimTime,
    },
    /// A step completed.
    StepCompleted {
        /// The step.
        step_id: String,
        /// Session time.
        at: SimTime,
    },
    /// A step execution was refused.
    StepRejected {
        /// The step.
        step_id: String,
        /// Why.
        reason: RejectReason,
        /// Session time.
        at: SimTime,
    },
    /// Manual parameter override applied.
    ParametersUpdated {
        /// Point-in-time view of the system.
        snapshot: SystemSnapshot,
    },
    /// The active time scale changed.
    TimeScaleChanged {
        /// New scale.
        scale: TimeScale,
    },
    /// The difficulty mode changed (also resets the time scale).
    DifficultyChanged {
        /// New difficulty.
        difficulty: Difficulty,
    },
    /// The session was reset to a cold ship.
    SessionReset,
    /// Emergency stop: all systems forced down.
    EmergencyStop {
        /// Session time.
        at: SimTime,
    },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered callbacks, notified in registration order.
#[derive(Default)]
pub struct SubscriberSet {
    next_id: u64,
    subscribers: Vec<(u64, Box<dyn FnMut(&EngineEvent)>)>,
}

impl SubscriberSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; returns the handle for unsubscribing.
    pub fn subscribe(&mut self, callback: impl FnMut(&EngineEvent) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id.0);
        self.subscribers.len() != before
    }

    /// Deliver an event to every subscriber, in registration order.
    pub fn notify(&mut self, event: &EngineEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberSet")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_in_registration_order() {
        let mut set = SubscriberSet::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            set.subscribe(move |_| order.borrow_mut().push(tag));
        }

        set.notify(&EngineEvent::SessionReset);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut set = SubscriberSet::new();
        let count = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&count);
        let id = set.subscribe(move |_| *counter.borrow_mut() += 1);

        set.notify(&EngineEvent::SessionReset);
        assert!(set.unsubscribe(id));
        set.notify(&EngineEvent::SessionReset);

        assert_eq!(*count.borrow(), 1);
        assert!(!set.unsubscribe(id)); // already removed
    }

    #[test]
    fn test_len_and_empty() {
        let mut set = SubscriberSet::new();
        assert!(set.is_empty());

        let id = set.subscribe(|_| {});
        assert_eq!(set.len(), 1);

        set.unsubscribe(id);
        assert!(set.is_empty());
    }

    #[test]
    fn test_debug_hides_closures() {
        let mut set = SubscriberSet::new();
        set.subscribe(|_| {});
        let debug = format!("{set:?}");
        assert!(debug.contains("SubscriberSet"));
        assert!(debug.contains('1'));
    }
}
