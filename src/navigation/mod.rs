//! Declarative navigation on top of the store.
//!
//! A feature keeps `route: Option<RouteIntent<Route>>` in its state and
//! changes it only through its reducer. The [`NavigationCoordinator`]
//! observes that field and turns it into present/dismiss commands for a
//! [`ViewLayer`], guarding against stale readiness confirmations and
//! overlapping presentations.

pub mod coordinator;
pub mod machine;
pub mod route;
pub mod view;

pub use coordinator::{CoordinatorHandle, NavigationCoordinator};
pub use machine::{NavigationCommand, RouteMachine, RoutePhase};
pub use route::{
    effects, EnterIntoContext, NavigationAction, NavigationRoute, NavigationState,
    PresentationAction, RouteIntent,
};
pub use view::{Destination, PresentationStyle, ReadinessToken, ViewLayer};
