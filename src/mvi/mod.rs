//! Unidirectional state-management primitives.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Store ──→ Reducer ──→ State ──→ Subscribers
//!   ↑                     │
//!   └────── Effect ←──────┘
//! ```
//!
//! - **State**: value owned by exactly one [`Store`], mutated only inside reducers
//! - **Action**: user intents, lifecycle events and effect results
//! - **Reducer**: `(State, Action, Environment) -> Effect`, composable via
//!   [`pullback`](ReducerExt::pullback) and [`combine`]
//! - **Effect**: description of asynchronous work that feeds actions back
//! - **Store**: serializes dispatch through a single loop and runs effects on a
//!   [`Scheduler`]

mod action;
mod compose;
mod effect;
mod reducer;
mod scheduler;
mod state;
mod store;
pub mod testing;

pub use action::Action;
pub use compose::{
    combine, reducer_fn, CasePath, Combine, FnReducer, Pullback, ReducerExt, StateFocus,
};
pub use effect::{Effect, EffectId, EffectPanic};
pub use reducer::{BoxedReducer, Reducer};
pub use scheduler::{Scheduler, TokioScheduler};
pub use state::UiState;
pub use store::{Store, StoreError, Subscription};
