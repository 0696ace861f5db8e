//! Single-slot request lifecycle shared by the text and image screens.
//!
//! Uses MVI:
//! - `state.rs` - `RequestState`
//! - `intent.rs` - submissions and service results
//! - `reducer.rs` - state transitions
//! - `machine.rs` - runs service calls and feeds results back

mod intent;
mod machine;
mod reducer;
mod state;

pub use intent::RequestIntent;
pub use machine::{Delivery, RequestMachine};
pub use reducer::RequestReducer;
pub use state::{RequestState, EMPTY_RESPONSE_MESSAGE};
