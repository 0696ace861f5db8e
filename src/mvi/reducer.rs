//! Reducer trait.

use super::intent::Intent;
use super::state::UiState;

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where state transitions happen and must
/// not perform I/O.
pub trait Reducer {
    type State: UiState;
    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;

    /// Whether `reduce(state, intent)` yields a state different from `state`.
    ///
    /// The store only runs and publishes intents for which this is `true`,
    /// so it must agree exactly with `reduce`.
    fn changes(state: &Self::State, intent: &Self::Intent) -> bool;
}
