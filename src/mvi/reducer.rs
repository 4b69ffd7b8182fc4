//! Reducer trait.

use super::action::Action;
use super::effect::Effect;
use super::state::UiState;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen. The
/// `&mut` state it receives is only reachable from inside the store loop,
/// so mutation from anywhere else cannot be expressed.
///
/// Reducers are total: failures are data carried by actions, never panics.
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: UiState;

    /// The action type this reducer handles.
    type Action: Action;

    /// Injected dependencies (services, configuration).
    type Environment: Send + Sync + 'static;

    /// Process an action, mutate state in place and describe follow-up work.
    ///
    /// An action the reducer does not care about must leave state untouched
    /// and return [`Effect::none`].
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effect<Self::Action>;
}

/// Type-erased reducer, the currency of [`combine`](super::combine).
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E>>;

impl<S, A, E> Reducer for BoxedReducer<S, A, E>
where
    S: UiState,
    A: Action,
    E: Send + Sync + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, env: &E) -> Effect<A> {
        (**self).reduce(state, action, env)
    }
}
