//! Reducer composition: closures, pullback and combine.
//!
//! Child features are written against their own state, action and
//! environment types and lifted into the parent with plain `fn` values:
//!
//! ```ignore
//! let root = combine(vec![
//!     VoteReducer
//!         .optional_pullback(
//!             vote_state,
//!             CasePath::new(RootAction::as_vote, RootAction::VoteScreen),
//!             RootEnvironment::vote,
//!         )
//!         .boxed(),
//!     RootReducer.boxed(),
//! ]);
//! ```

use std::marker::PhantomData;

use super::action::Action;
use super::effect::Effect;
use super::reducer::{BoxedReducer, Reducer};
use super::state::UiState;

/// Reducer built from a closure.
pub struct FnReducer<S, A, E, F> {
    f: F,
    _types: PhantomData<fn(&mut S, A, &E)>,
}

/// Lift a closure into a [`Reducer`].
pub fn reducer_fn<S, A, E, F>(f: F) -> FnReducer<S, A, E, F>
where
    F: Fn(&mut S, A, &E) -> Effect<A> + Send + Sync + 'static,
{
    FnReducer {
        f,
        _types: PhantomData,
    }
}

impl<S, A, E, F> Reducer for FnReducer<S, A, E, F>
where
    S: UiState,
    A: Action,
    E: Send + Sync + 'static,
    F: Fn(&mut S, A, &E) -> Effect<A> + Send + Sync + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, env: &E) -> Effect<A> {
        (self.f)(state, action, env)
    }
}

/// How a parent state exposes a child state.
pub enum StateFocus<P, C> {
    Required(fn(&mut P) -> &mut C),
    /// Absent child state turns the pullback into a no-op.
    Optional(fn(&mut P) -> Option<&mut C>),
}

/// One case of a parent action enum that wraps a child action.
pub struct CasePath<P, C> {
    /// Returns the child action when `P` is this case.
    pub extract: fn(P) -> Option<C>,
    /// Wraps a child action into the parent case.
    pub embed: fn(C) -> P,
}

impl<P, C> CasePath<P, C> {
    pub fn new(extract: fn(P) -> Option<C>, embed: fn(C) -> P) -> Self {
        Self { extract, embed }
    }
}

impl<P, C> Clone for CasePath<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for CasePath<P, C> {}

/// A child reducer lifted into parent state, action and environment.
pub struct Pullback<R: Reducer, PS, PA, PE> {
    child: R,
    state: StateFocus<PS, R::State>,
    action: CasePath<PA, R::Action>,
    environment: fn(&PE) -> R::Environment,
}

impl<R, PS, PA, PE> Reducer for Pullback<R, PS, PA, PE>
where
    R: Reducer,
    PS: UiState,
    PA: Action,
    PE: Send + Sync + 'static,
{
    type State = PS;
    type Action = PA;
    type Environment = PE;

    fn reduce(&self, state: &mut PS, action: PA, env: &PE) -> Effect<PA> {
        let Some(child_action) = (self.action.extract)(action) else {
            return Effect::none();
        };

        let child_state = match &self.state {
            StateFocus::Required(focus) => focus(state),
            StateFocus::Optional(focus) => match focus(state) {
                Some(child) => child,
                None => {
                    tracing::debug!(
                        action = ?child_action,
                        "Child action received while child state is absent; ignoring"
                    );
                    return Effect::none();
                }
            },
        };

        let child_env = (self.environment)(env);
        self.child
            .reduce(child_state, child_action, &child_env)
            .map(self.action.embed)
    }
}

/// Composition helpers available on every reducer.
pub trait ReducerExt: Reducer + Sized {
    /// Lift into a parent whose state always contains the child state.
    fn pullback<PS, PA, PE>(
        self,
        state: fn(&mut PS) -> &mut Self::State,
        action: CasePath<PA, Self::Action>,
        environment: fn(&PE) -> Self::Environment,
    ) -> Pullback<Self, PS, PA, PE> {
        Pullback {
            child: self,
            state: StateFocus::Required(state),
            action,
            environment,
        }
    }

    /// Lift into a parent whose child state may be absent.
    fn optional_pullback<PS, PA, PE>(
        self,
        state: fn(&mut PS) -> Option<&mut Self::State>,
        action: CasePath<PA, Self::Action>,
        environment: fn(&PE) -> Self::Environment,
    ) -> Pullback<Self, PS, PA, PE> {
        Pullback {
            child: self,
            state: StateFocus::Optional(state),
            action,
            environment,
        }
    }

    fn boxed(self) -> BoxedReducer<Self::State, Self::Action, Self::Environment> {
        Box::new(self)
    }
}

impl<R: Reducer> ReducerExt for R {}

/// Several reducers run against the same action, in declared order.
pub struct Combine<S, A, E> {
    reducers: Vec<BoxedReducer<S, A, E>>,
}

/// Run each reducer in order, threading the mutated state, and merge their
/// effects so they start concurrently.
pub fn combine<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> Combine<S, A, E> {
    Combine { reducers }
}

impl<S, A, E> Reducer for Combine<S, A, E>
where
    S: UiState,
    A: Action,
    E: Send + Sync + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, env: &E) -> Effect<A> {
        Effect::merge(
            self.reducers
                .iter()
                .map(|reducer| reducer.reduce(state, action.clone(), env))
                .collect::<Vec<_>>(),
        )
    }
}
