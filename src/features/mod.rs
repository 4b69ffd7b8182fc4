//! Screens of the voting app, each a state/action/reducer triple.

pub mod root;
pub mod vote;
