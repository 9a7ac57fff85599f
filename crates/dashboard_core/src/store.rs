//! Single-writer store. All transitions run synchronously inside `dispatch`;
//! follow-up actions returned by listeners are queued and committed after the
//! current notification round, so a reducer pass is never re-entered.

use std::collections::VecDeque;

use shared::{protocol::Action, state::State};
use tracing::debug;

use crate::{intents::Intent, reducers::root_reducer};

/// Receives every committed state, in subscription order.
pub trait StoreListener {
    /// Returns actions to dispatch once the current round has finished.
    fn on_state_change(&mut self, state: &State) -> Vec<Action>;
}

impl<F> StoreListener for F
where
    F: FnMut(&State) -> Vec<Action>,
{
    fn on_state_change(&mut self, state: &State) -> Vec<Action> {
        self(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

pub struct Store {
    state: State,
    listeners: Vec<(Subscription, Box<dyn StoreListener>)>,
    next_subscription: u64,
    pending: VecDeque<Action>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(State::default())
    }

    pub fn with_state(state: State) -> Self {
        Self {
            state,
            listeners: Vec::new(),
            next_subscription: 0,
            pending: VecDeque::new(),
        }
    }

    /// Current snapshot. Slices are shared, never the live value.
    pub fn get_state(&self) -> State {
        self.state.clone()
    }

    pub fn subscribe(&mut self, listener: impl StoreListener + 'static) -> Subscription {
        self.next_subscription += 1;
        let subscription = Subscription(self.next_subscription);
        self.listeners.push((subscription, Box::new(listener)));
        subscription
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    /// Runs `action` through the root reducer, notifies listeners, then drains
    /// any follow-up actions they returned.
    pub fn dispatch(&mut self, action: impl Into<Action>) {
        self.pending.push_back(action.into());
        while let Some(action) = self.pending.pop_front() {
            self.commit(action);
        }
    }

    /// Plans `intent` against the current state and dispatches the resulting
    /// actions in order. Returns how many actions were dispatched.
    pub fn run(&mut self, intent: &Intent) -> usize {
        let actions = intent.execute(&self.state);
        let count = actions.len();
        for action in actions {
            self.dispatch(action);
        }
        count
    }

    fn commit(&mut self, action: Action) {
        debug!(action = action.type_name(), "dispatch");
        self.state = root_reducer(Some(&self.state), &action);

        let snapshot = self.state.clone();
        for (_, listener) in self.listeners.iter_mut() {
            let follow_ups = listener.on_state_change(&snapshot);
            self.pending.extend(follow_ups);
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
