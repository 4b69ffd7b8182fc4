//! The boundary between the coordinator and whatever renders screens.

use std::fmt;

use uuid::Uuid;

use super::route::{EnterIntoContext, NavigationRoute, PresentationAction, RouteIntent};

/// Identifies one observed route intent while it waits to be presented.
///
/// A readiness confirmation carrying any other token is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadinessToken(Uuid);

impl ReadinessToken {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ReadinessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationStyle {
    /// Push onto the host's navigation stack.
    Push,
    /// Partial modal sheet.
    Sheet,
    /// Modal covering the whole screen.
    FullScreen,
}

/// What the view layer needs to build a presented screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination<R> {
    pub route: R,
    pub name: &'static str,
    /// Wrap the screen in its own navigation container.
    pub embedded_in_navigation: bool,
}

impl<R: NavigationRoute> RouteIntent<R> {
    pub fn presentation_style(&self) -> PresentationStyle {
        match self.action {
            PresentationAction::NavigateTo => PresentationStyle::Push,
            PresentationAction::EnterInto(context)
                if context.contains(EnterIntoContext::FULL_SCREEN) =>
            {
                PresentationStyle::FullScreen
            }
            PresentationAction::EnterInto(_) => PresentationStyle::Sheet,
        }
    }

    pub fn destination(&self) -> Destination<R> {
        let embedded_in_navigation = match self.action {
            PresentationAction::NavigateTo => false,
            PresentationAction::EnterInto(context) => {
                context.contains(EnterIntoContext::EMBEDDED_IN_NAVIGATION)
            }
        };
        Destination {
            route: self.route.clone(),
            name: self.route.name(),
            embedded_in_navigation,
        }
    }
}

/// Commands the coordinator issues to the rendering layer.
///
/// Implementations report back through the
/// [`CoordinatorHandle`](super::CoordinatorHandle): `on_ready_to_present`
/// once the host is mounted for the requested token, `on_user_dismissed`
/// after a back gesture or swipe-down.
pub trait ViewLayer<R>: Send + 'static {
    /// A presentation is about to be requested; acknowledge `token` once the
    /// host can take it.
    fn prepare(&mut self, token: ReadinessToken) {
        let _ = token;
    }

    fn present(&mut self, destination: Destination<R>, style: PresentationStyle);

    fn dismiss(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Gallery;

    impl NavigationRoute for Gallery {
        fn name(&self) -> &'static str {
            "gallery"
        }
    }

    #[test]
    fn navigate_to_pushes_bare() {
        let intent = RouteIntent::navigate_to(Gallery);
        assert_eq!(intent.presentation_style(), PresentationStyle::Push);
        assert!(!intent.destination().embedded_in_navigation);
    }

    #[test]
    fn full_screen_flag_selects_cover() {
        let intent = RouteIntent::enter_into(Gallery, EnterIntoContext::FULL_SCREEN);
        assert_eq!(intent.presentation_style(), PresentationStyle::FullScreen);
        assert!(!intent.destination().embedded_in_navigation);
    }

    #[test]
    fn default_context_is_embedded_sheet() {
        let intent = RouteIntent::enter_into(Gallery, EnterIntoContext::default());
        assert_eq!(intent.presentation_style(), PresentationStyle::Sheet);
        let destination = intent.destination();
        assert!(destination.embedded_in_navigation);
        assert_eq!(destination.name, "gallery");
    }

    #[test]
    fn all_flags_embed_full_screen() {
        let intent = RouteIntent::enter_into(Gallery, EnterIntoContext::all());
        assert_eq!(intent.presentation_style(), PresentationStyle::FullScreen);
        assert!(intent.destination().embedded_in_navigation);
    }
}
