use crate::features::root::route::RootRoute;
use crate::features::vote::VoteAction;
use crate::mvi::Action;
use crate::navigation::{NavigationAction, RouteIntent};

#[derive(Debug, Clone, PartialEq)]
pub enum RootAction {
    OnAppear,
    /// Open the vote screen for a category.
    VoteButtonTapped(String),
    ShowSuccessToast(bool),
    SubmitVotes,
    VoteScreen(VoteAction),
    Route(Option<RouteIntent<RootRoute>>),
    /// The user closed the screen for this intent.
    RouteDismissed(RouteIntent<RootRoute>),
}

impl Action for RootAction {}

impl RootAction {
    pub fn as_vote(self) -> Option<VoteAction> {
        match self {
            RootAction::VoteScreen(action) => Some(action),
            _ => None,
        }
    }
}

impl NavigationAction for RootAction {
    type Route = RootRoute;

    fn route(intent: Option<RouteIntent<RootRoute>>) -> Self {
        RootAction::Route(intent)
    }

    fn user_dismissed(intent: RouteIntent<RootRoute>) -> Self {
        RootAction::RouteDismissed(intent)
    }
}
