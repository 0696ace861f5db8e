//! Model-View-Intent (MVI) primitives shared by every screen.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ Store ──→ observers
//!    ↑                                           │
//!    └───────────────────────────────────────────┘
//! ```
//!
//! - **State**: value describing everything a view needs
//! - **Intent**: a submission or a service result
//! - **Reducer**: pure `(State, Intent) -> State` function
//! - **Store**: owns the current state and publishes each change

mod intent;
mod reducer;
mod state;
mod store;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
pub use store::{Store, DEFAULT_TRANSITION_CAPACITY};
