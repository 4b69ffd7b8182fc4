//! Async driver connecting a store, a [`RouteMachine`] and a [`ViewLayer`].
//!
//! Runs as a single task fed by one channel. Route changes are signalled by
//! a store subscription and read from the latest snapshot; lifecycle and
//! readiness signals come from the view layer through [`CoordinatorHandle`].
//! Commands are executed on that same task, so a view layer may call back
//! into the handle from inside a command without deadlocking.
//!
//! The task stops on [`CoordinatorHandle::shutdown`] or once every handle
//! is dropped, releasing its store clone and subscription.

use std::sync::Arc;

use futures::future::FutureExt;
use tokio::sync::{mpsc, watch};

use crate::mvi::{Action, Scheduler, Store, StoreError, UiState};

use super::machine::{NavigationCommand, RouteMachine, RoutePhase};
use super::route::{NavigationAction, NavigationRoute, NavigationState};
use super::view::{ReadinessToken, ViewLayer};

enum CoordinatorEvent {
    /// A commit happened; the route is re-read from the latest snapshot.
    RouteChanged,
    ReadyToPresent(ReadinessToken),
    UserDismissed,
    Appeared,
    Disappeared,
    Shutdown,
}

/// Inbound signals from the view layer, plus a view of the current phase.
pub struct CoordinatorHandle<R> {
    events: mpsc::UnboundedSender<CoordinatorEvent>,
    phase: watch::Receiver<RoutePhase<R>>,
}

impl<R> Clone for CoordinatorHandle<R> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            phase: self.phase.clone(),
        }
    }
}

impl<R: NavigationRoute> CoordinatorHandle<R> {
    pub fn on_ready_to_present(&self, token: ReadinessToken) {
        self.post(CoordinatorEvent::ReadyToPresent(token));
    }

    pub fn on_user_dismissed(&self) {
        self.post(CoordinatorEvent::UserDismissed);
    }

    pub fn on_appear(&self) {
        self.post(CoordinatorEvent::Appeared);
    }

    pub fn on_disappear(&self) {
        self.post(CoordinatorEvent::Disappeared);
    }

    /// Stop the coordinator and release its store subscription.
    pub fn shutdown(&self) {
        self.post(CoordinatorEvent::Shutdown);
    }

    pub fn phase(&self) -> RoutePhase<R> {
        self.phase.borrow().clone()
    }

    /// Wait until the phase satisfies `predicate`.
    ///
    /// # Errors
    /// Returns [`StoreError::Closed`] if the coordinator stopped first.
    pub async fn wait_for_phase<P>(&self, predicate: P) -> Result<RoutePhase<R>, StoreError>
    where
        P: FnMut(&RoutePhase<R>) -> bool,
    {
        let mut phase = self.phase.clone();
        let matched = phase
            .wait_for(predicate)
            .await
            .map_err(|_| StoreError::Closed)?;
        Ok(matched.clone())
    }

    fn post(&self, event: CoordinatorEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Navigation coordinator stopped; event dropped");
        }
    }
}

/// Drives presentation for one navigation state.
pub struct NavigationCoordinator;

impl NavigationCoordinator {
    /// Start coordinating `store`'s route intent against `view`.
    ///
    /// The host starts hidden; call [`CoordinatorHandle::on_appear`] once it
    /// is on screen.
    pub fn spawn<S, A, V>(
        store: Store<S, A>,
        view: V,
        scheduler: &Arc<dyn Scheduler>,
    ) -> CoordinatorHandle<S::Route>
    where
        S: UiState + NavigationState,
        A: Action + NavigationAction<Route = S::Route>,
        V: ViewLayer<S::Route>,
    {
        let (events, receiver) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(RoutePhase::Idle);

        // Weak, so only handles keep the driver alive.
        let route_events = events.downgrade();
        let subscription = store.subscribe(move |_: &S| {
            if let Some(events) = route_events.upgrade() {
                let _ = events.send(CoordinatorEvent::RouteChanged);
            }
        });
        // The channel is unbounded and never full.
        let _ = events.send(CoordinatorEvent::RouteChanged);

        let driver = Driver {
            machine: RouteMachine::new(),
            store,
            view,
            phase: phase_tx,
        };
        scheduler.spawn(
            async move {
                let _subscription = subscription;
                driver.run(receiver).await;
            }
            .boxed(),
        );

        CoordinatorHandle {
            events,
            phase: phase_rx,
        }
    }
}

struct Driver<S, A, V>
where
    S: NavigationState,
{
    machine: RouteMachine<S::Route>,
    store: Store<S, A>,
    view: V,
    phase: watch::Sender<RoutePhase<S::Route>>,
}

impl<S, A, V> Driver<S, A, V>
where
    S: UiState + NavigationState,
    A: Action + NavigationAction<Route = S::Route>,
    V: ViewLayer<S::Route>,
{
    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<CoordinatorEvent>) {
        tracing::debug!("Navigation coordinator started");
        while let Some(event) = receiver.recv().await {
            let commands = match event {
                CoordinatorEvent::RouteChanged => {
                    let intent = self.store.state().route().cloned();
                    self.machine.observe(intent)
                }
                CoordinatorEvent::ReadyToPresent(token) => self.machine.ready_to_present(token),
                CoordinatorEvent::UserDismissed => self.machine.user_dismissed(),
                CoordinatorEvent::Appeared => self.machine.appeared(),
                CoordinatorEvent::Disappeared => self.machine.disappeared(),
                CoordinatorEvent::Shutdown => break,
            };
            for command in commands {
                self.execute(command);
            }
            let phase = self.machine.phase();
            self.phase.send_if_modified(|current| {
                if *current == *phase {
                    return false;
                }
                *current = phase.clone();
                true
            });
        }
        tracing::debug!("Navigation coordinator stopped");
    }

    fn execute(&mut self, command: NavigationCommand<S::Route>) {
        match command {
            NavigationCommand::Prepare(token) => self.view.prepare(token),
            NavigationCommand::Present { destination, style } => {
                tracing::info!(route = destination.name, ?style, "Presenting");
                self.view.present(destination, style);
            }
            NavigationCommand::Dismiss => {
                tracing::info!("Dismissing");
                self.view.dismiss();
            }
            NavigationCommand::SendDismiss(intent) => {
                if let Err(err) = self.store.send(A::user_dismissed(intent)) {
                    tracing::warn!(error = %err, "Failed to dispatch dismiss");
                }
            }
        }
    }
}
