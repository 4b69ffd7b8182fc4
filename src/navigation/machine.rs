//! Presentation state machine.
//!
//! Pure and synchronous: every input returns the commands to issue, and the
//! async driver in [`coordinator`](super::coordinator) only moves events in
//! and commands out.
//!
//! ```text
//!            intent set           ready(token)
//!   Idle ───────────────→ Pending ────────────→ Presenting
//!    ↑  ↖ intent cleared ──┘  ↺ newer intent      │    │
//!    │                                            │    │ user dismissed
//!    └──────────── intent cleared (Dismiss) ──────┘    ↓
//!    └──────────── intent cleared ─────────────── Dismissing
//! ```

use super::route::{NavigationRoute, RouteIntent};
use super::view::{Destination, PresentationStyle, ReadinessToken};

#[derive(Debug, Clone, PartialEq)]
pub enum RoutePhase<R> {
    /// No route intent.
    Idle,
    /// Intent observed, waiting for the host to confirm `token`.
    Pending {
        intent: RouteIntent<R>,
        token: ReadinessToken,
    },
    /// Present command issued.
    Presenting {
        intent: RouteIntent<R>,
        token: ReadinessToken,
    },
    /// The user dismissed the screen; waiting for the store to clear the
    /// intent.
    Dismissing { intent: RouteIntent<R> },
}

impl<R> RoutePhase<R> {
    pub fn name(&self) -> &'static str {
        match self {
            RoutePhase::Idle => "idle",
            RoutePhase::Pending { .. } => "pending",
            RoutePhase::Presenting { .. } => "presenting",
            RoutePhase::Dismissing { .. } => "dismissing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, RoutePhase::Idle)
    }

    pub fn pending_token(&self) -> Option<ReadinessToken> {
        match self {
            RoutePhase::Pending { token, .. } => Some(*token),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationCommand<R> {
    /// Ask the host to acknowledge `token` once it can present.
    Prepare(ReadinessToken),
    Present {
        destination: Destination<R>,
        style: PresentationStyle,
    },
    Dismiss,
    /// Report to the store that the user dismissed this intent.
    SendDismiss(RouteIntent<R>),
}

pub struct RouteMachine<R> {
    phase: RoutePhase<R>,
    observed: Option<RouteIntent<R>>,
    host_visible: bool,
}

impl<R: NavigationRoute> Default for RouteMachine<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: NavigationRoute> RouteMachine<R> {
    /// A machine whose host has not appeared yet.
    pub fn new() -> Self {
        Self {
            phase: RoutePhase::Idle,
            observed: None,
            host_visible: false,
        }
    }

    pub fn phase(&self) -> &RoutePhase<R> {
        &self.phase
    }

    pub fn host_visible(&self) -> bool {
        self.host_visible
    }

    /// Reconcile with the route intent currently held in state.
    pub fn observe(&mut self, intent: Option<RouteIntent<R>>) -> Vec<NavigationCommand<R>> {
        if intent == self.observed {
            return Vec::new();
        }
        self.observed = intent.clone();

        let previous = std::mem::replace(&mut self.phase, RoutePhase::Idle);
        let mut commands = Vec::new();

        match (previous, intent) {
            (RoutePhase::Idle, None) => {}
            (RoutePhase::Pending { intent: dropped, .. }, None) => {
                tracing::debug!(route = dropped.route.name(), "Pending presentation cancelled");
            }
            (RoutePhase::Presenting { intent: shown, .. }, None) => {
                tracing::debug!(route = shown.route.name(), "Dismissing presented route");
                commands.push(NavigationCommand::Dismiss);
            }
            (RoutePhase::Dismissing { .. }, None) => {}
            (RoutePhase::Presenting { intent: shown, .. }, Some(next)) => {
                tracing::debug!(
                    from = shown.route.name(),
                    to = next.route.name(),
                    "Replacing presented route"
                );
                commands.push(NavigationCommand::Dismiss);
                commands.extend(self.begin(next));
            }
            (RoutePhase::Pending { intent: dropped, .. }, Some(next)) => {
                tracing::debug!(
                    superseded = dropped.route.name(),
                    route = next.route.name(),
                    "Newer intent supersedes pending one"
                );
                commands.extend(self.begin(next));
            }
            (RoutePhase::Idle | RoutePhase::Dismissing { .. }, Some(next)) => {
                commands.extend(self.begin(next));
            }
        }
        commands
    }

    /// The host confirmed it can present for `token`.
    pub fn ready_to_present(&mut self, token: ReadinessToken) -> Vec<NavigationCommand<R>> {
        let matches = matches!(
            &self.phase,
            RoutePhase::Pending { token: pending, .. } if *pending == token
        );
        if !matches || !self.host_visible {
            tracing::debug!(
                %token,
                phase = self.phase.name(),
                "Discarding stale readiness confirmation"
            );
            return Vec::new();
        }

        let RoutePhase::Pending { intent, token } =
            std::mem::replace(&mut self.phase, RoutePhase::Idle)
        else {
            return Vec::new();
        };
        let command = NavigationCommand::Present {
            destination: intent.destination(),
            style: intent.presentation_style(),
        };
        tracing::debug!(route = intent.route.name(), %token, "Presenting route");
        self.phase = RoutePhase::Presenting { intent, token };
        vec![command]
    }

    /// The user dismissed the presented screen from the view layer.
    pub fn user_dismissed(&mut self) -> Vec<NavigationCommand<R>> {
        match std::mem::replace(&mut self.phase, RoutePhase::Idle) {
            RoutePhase::Presenting { intent, .. } => {
                tracing::debug!(route = intent.route.name(), "User dismissed route");
                self.phase = RoutePhase::Dismissing {
                    intent: intent.clone(),
                };
                vec![NavigationCommand::SendDismiss(intent)]
            }
            other => {
                tracing::debug!(phase = other.name(), "Ignoring user dismissal");
                self.phase = other;
                Vec::new()
            }
        }
    }

    pub fn appeared(&mut self) -> Vec<NavigationCommand<R>> {
        self.host_visible = true;
        match self.phase.pending_token() {
            Some(token) => vec![NavigationCommand::Prepare(token)],
            None => Vec::new(),
        }
    }

    pub fn disappeared(&mut self) -> Vec<NavigationCommand<R>> {
        self.host_visible = false;
        Vec::new()
    }

    fn begin(&mut self, intent: RouteIntent<R>) -> Vec<NavigationCommand<R>> {
        let token = ReadinessToken::generate();
        tracing::debug!(route = intent.route.name(), %token, "Route intent pending");
        self.phase = RoutePhase::Pending { intent, token };
        if self.host_visible {
            vec![NavigationCommand::Prepare(token)]
        } else {
            Vec::new()
        }
    }
}
