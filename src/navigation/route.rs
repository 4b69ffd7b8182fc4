//! Route intents: which destination to show, and how.

use std::fmt::Debug;
use std::hash::Hash;

use bitflags::bitflags;

use crate::mvi::Effect;

/// A closed set of destinations reachable from one navigation state.
pub trait NavigationRoute: Clone + PartialEq + Eq + Hash + Debug + Send + Sync + 'static {
    /// Stable label for logs and destination descriptors.
    fn name(&self) -> &'static str;
}

bitflags! {
    /// Flags refining a modal presentation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EnterIntoContext: u8 {
        /// Cover the whole screen instead of a partial sheet.
        const FULL_SCREEN = 1 << 0;
        /// Wrap the destination in its own push-navigation container.
        const EMBEDDED_IN_NAVIGATION = 1 << 1;
    }
}

impl Default for EnterIntoContext {
    fn default() -> Self {
        Self::EMBEDDED_IN_NAVIGATION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentationAction {
    /// Push onto the current navigation stack.
    NavigateTo,
    /// Present modally.
    EnterInto(EnterIntoContext),
}

/// A destination plus the way it should be presented.
///
/// Lives in state as `Option<RouteIntent<R>>`; `None` means nothing is
/// presented.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteIntent<R> {
    pub route: R,
    pub action: PresentationAction,
}

impl<R: NavigationRoute> RouteIntent<R> {
    pub fn new(route: R, action: PresentationAction) -> Self {
        Self { route, action }
    }

    pub fn navigate_to(route: R) -> Self {
        Self::new(route, PresentationAction::NavigateTo)
    }

    pub fn enter_into(route: R, context: EnterIntoContext) -> Self {
        Self::new(route, PresentationAction::EnterInto(context))
    }
}

/// State that owns a route intent.
pub trait NavigationState {
    type Route: NavigationRoute;

    fn route(&self) -> Option<&RouteIntent<Self::Route>>;
}

/// Action enum with a case that sets or clears the route intent.
pub trait NavigationAction: Sized + Send + 'static {
    type Route: NavigationRoute;

    /// The routing case; `None` dismisses.
    fn route(intent: Option<RouteIntent<Self::Route>>) -> Self;

    fn dismiss() -> Self {
        Self::route(None)
    }

    /// The user dismissed `intent` from the view layer.
    ///
    /// Reducers clear the route only while it still equals `intent`; a newer
    /// intent that reached the store first is kept.
    fn user_dismissed(intent: RouteIntent<Self::Route>) -> Self;

    fn navigate_to(route: Self::Route) -> Self {
        Self::route(Some(RouteIntent::navigate_to(route)))
    }

    fn enter_into(route: Self::Route, context: EnterIntoContext) -> Self {
        Self::route(Some(RouteIntent::enter_into(route, context)))
    }
}

/// Effects that emit routing actions.
pub mod effects {
    use super::*;

    pub fn dismiss<A: NavigationAction>() -> Effect<A> {
        Effect::send(A::dismiss())
    }

    pub fn navigate_to<A: NavigationAction>(route: A::Route) -> Effect<A> {
        Effect::send(A::navigate_to(route))
    }

    pub fn enter_into<A: NavigationAction>(
        route: A::Route,
        context: EnterIntoContext,
    ) -> Effect<A> {
        Effect::send(A::enter_into(route, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Screen {
        Detail,
    }

    impl NavigationRoute for Screen {
        fn name(&self) -> &'static str {
            "detail"
        }
    }

    #[derive(Debug, PartialEq)]
    enum Act {
        Route(Option<RouteIntent<Screen>>),
        Dismissed(RouteIntent<Screen>),
    }

    impl NavigationAction for Act {
        type Route = Screen;

        fn route(intent: Option<RouteIntent<Screen>>) -> Self {
            Act::Route(intent)
        }

        fn user_dismissed(intent: RouteIntent<Screen>) -> Self {
            Act::Dismissed(intent)
        }
    }

    #[test]
    fn default_context_embeds_navigation() {
        assert_eq!(
            EnterIntoContext::default(),
            EnterIntoContext::EMBEDDED_IN_NAVIGATION
        );
    }

    #[test]
    fn intents_compare_structurally() {
        let a = RouteIntent::enter_into(Screen::Detail, EnterIntoContext::FULL_SCREEN);
        let b = RouteIntent::enter_into(Screen::Detail, EnterIntoContext::FULL_SCREEN);
        let c = RouteIntent::enter_into(Screen::Detail, EnterIntoContext::default());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, RouteIntent::navigate_to(Screen::Detail));
    }

    #[test]
    fn action_helpers_build_route_case() {
        assert_eq!(Act::dismiss(), Act::Route(None));
        assert_eq!(
            Act::navigate_to(Screen::Detail),
            Act::Route(Some(RouteIntent::navigate_to(Screen::Detail)))
        );
    }
}
