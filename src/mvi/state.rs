//! Base trait for state owned by a store.

/// Marker trait for state objects.
///
/// States should be:
/// - Cloneable (snapshots are handed to observers)
/// - Self-contained (all data needed to render the view)
/// - Comparable (PartialEq for detecting committed changes)
pub trait UiState: Clone + PartialEq + Send + Sync + 'static {}

/// Optional child state, as seen through a scoped store.
impl<T: UiState> UiState for Option<T> {}
