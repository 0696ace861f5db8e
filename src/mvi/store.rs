//! State container that applies intents and publishes transitions.

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::reducer::Reducer;

/// Default number of transitions buffered for each subscriber.
pub const DEFAULT_TRANSITION_CAPACITY: usize = 64;

/// Owns the current state of one screen.
///
/// Every intent goes through [`Store::dispatch`], which runs the reducer
/// under a lock so transitions are applied in dispatch order. A state that
/// differs from its predecessor is sent to all current subscribers.
pub struct Store<R: Reducer> {
    state: Mutex<R::State>,
    transitions: broadcast::Sender<R::State>,
}

impl<R: Reducer> Store<R> {
    /// Create a store holding `R::State::default()`.
    pub fn new(capacity: usize) -> Self {
        Self::with_state(R::State::default(), capacity)
    }

    pub fn with_state(initial: R::State, capacity: usize) -> Self {
        let (transitions, _) = broadcast::channel(capacity.max(1));
        Self {
            state: Mutex::new(initial),
            transitions,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> R::State {
        self.state.lock().clone()
    }

    /// Apply an intent. Returns whether the state changed.
    pub fn dispatch(&self, intent: R::Intent) -> bool {
        self.dispatch_and_read(intent, |_| ()).0
    }

    /// Apply an intent, then read the resulting state under the same lock.
    pub fn dispatch_and_read<T>(
        &self,
        intent: R::Intent,
        read: impl FnOnce(&R::State) -> T,
    ) -> (bool, T) {
        let mut guard = self.state.lock();
        let changed = R::changes(&guard, &intent);

        if changed {
            let previous = std::mem::take(&mut *guard);
            *guard = R::reduce(previous, intent);
            // No receivers is fine: nobody is observing yet.
            let _ = self.transitions.send(guard.clone());
        }

        (changed, read(&guard))
    }

    /// Receive every state published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<R::State> {
        self.transitions.subscribe()
    }
}
