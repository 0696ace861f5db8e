//! Base trait for intents.

/// Marker trait for intent objects.
///
/// Intents are either user submissions or results delivered by a
/// generation task. They are consumed by a [`Reducer`](super::Reducer).
pub trait Intent: Send + 'static {}
