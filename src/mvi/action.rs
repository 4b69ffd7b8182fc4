//! Base trait for actions (user/system events).

use std::fmt::Debug;

/// Marker trait for action values.
///
/// Actions represent:
/// - User intents (button taps, gestures)
/// - Lifecycle events (appear)
/// - Effect results (success and failure payloads)
/// - Routing directives
///
/// Every reducer in a combined tree sees its own copy of the action, hence
/// `Clone`. Equality is what test harnesses assert on.
pub trait Action: Clone + PartialEq + Debug + Send + 'static {}
