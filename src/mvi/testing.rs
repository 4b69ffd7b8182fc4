//! Synchronous harness for exercising reducers in tests.
//!
//! [`TestStore`] runs a reducer without a dispatch loop. Every `send` and
//! `receive` states the expected mutation explicitly; immediate follow-up
//! actions are queued and must be received in order, and asynchronous
//! effects only run when [`TestStore::run_effects`] is awaited.
//!
//! ```ignore
//! let mut store = TestStore::new(RootState::default(), root_reducer(), env);
//! store.send(RootAction::VoteButtonTapped("cake".into()), |s| { /* ... */ });
//! store.receive(RootAction::Route(Some(intent)), |s| s.route = Some(intent));
//! store.finish();
//! ```

use std::collections::VecDeque;
use std::fmt::Debug;

use futures::stream::{BoxStream, StreamExt};

use super::effect::{Effect, EffectId, EffectKind};
use super::reducer::Reducer;

struct PendingEffect<A> {
    id: Option<EffectId>,
    stream: BoxStream<'static, A>,
}

pub struct TestStore<R: Reducer> {
    reducer: R,
    env: R::Environment,
    state: R::State,
    received: VecDeque<R::Action>,
    pending: Vec<PendingEffect<R::Action>>,
}

impl<R> TestStore<R>
where
    R: Reducer,
    R::State: Debug,
{
    pub fn new(initial_state: R::State, reducer: R, env: R::Environment) -> Self {
        Self {
            reducer,
            env,
            state: initial_state,
            received: VecDeque::new(),
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &R::State {
        &self.state
    }

    /// Mutable access to the environment, e.g. to swap a mock between steps.
    pub fn env_mut(&mut self) -> &mut R::Environment {
        &mut self.env
    }

    /// Number of asynchronous effects started and not yet run.
    pub fn pending_effects(&self) -> usize {
        self.pending.len()
    }

    /// Send an action and assert the resulting state equals the current
    /// state with `update` applied.
    ///
    /// # Panics
    /// When follow-up actions are still waiting to be received, or when the
    /// state does not match.
    #[track_caller]
    pub fn send(
        &mut self,
        action: R::Action,
        update: impl FnOnce(&mut R::State),
    ) -> &mut Self {
        assert!(
            self.received.is_empty(),
            "Must receive {:?} before sending {:?}",
            self.received,
            action
        );
        self.step(action, update);
        self
    }

    /// Pop the next follow-up action, assert it equals `expected`, reduce it
    /// and assert the state change.
    #[track_caller]
    pub fn receive(
        &mut self,
        expected: R::Action,
        update: impl FnOnce(&mut R::State),
    ) -> &mut Self {
        let Some(action) = self.received.pop_front() else {
            panic!("Expected to receive {expected:?}, but nothing was queued");
        };
        assert_eq!(action, expected, "Received an unexpected action");
        self.step(action, update);
        self
    }

    /// Run every pending effect to completion and queue what they produce.
    pub async fn run_effects(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for effect in pending {
            let actions: Vec<R::Action> = effect.stream.collect().await;
            self.received.extend(actions);
        }
    }

    /// Assert that no follow-up action is left unreceived.
    #[track_caller]
    pub fn finish(&self) {
        assert!(
            self.received.is_empty(),
            "Unhandled follow-up actions: {:?}",
            self.received
        );
    }

    #[track_caller]
    fn step(&mut self, action: R::Action, update: impl FnOnce(&mut R::State)) {
        let mut expected = self.state.clone();
        update(&mut expected);

        let description = format!("{action:?}");
        let effect = self.reducer.reduce(&mut self.state, action, &self.env);
        assert_eq!(
            self.state, expected,
            "State after {description} does not match the expectation"
        );
        self.collect(effect, None);
    }

    fn collect(&mut self, effect: Effect<R::Action>, id: Option<EffectId>) {
        match effect.kind {
            EffectKind::None => {}
            EffectKind::Send(action) => self.received.push_back(action),
            EffectKind::Run(stream) => self.pending.push(PendingEffect { id, stream }),
            EffectKind::Merge(effects) => {
                for effect in effects {
                    self.collect(effect, id.clone());
                }
            }
            EffectKind::Cancellable { id, effect } => {
                self.cancel(&id);
                self.collect(*effect, Some(id));
            }
            EffectKind::Cancel(id) => self.cancel(&id),
        }
    }

    fn cancel(&mut self, id: &EffectId) {
        self.pending.retain(|effect| effect.id.as_ref() != Some(id));
    }
}
