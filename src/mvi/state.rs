//! Base trait for screen state.

/// Marker trait for state observed by the presentation layer.
///
/// `PartialEq` lets the store skip publishing a state identical to the
/// previous one; `Default` is the state a freshly built screen starts in.
pub trait UiState: Clone + PartialEq + Default + Send + Sync + 'static {}
