mod action;
mod reducer;
mod state;

pub use action::VoteAction;
pub use reducer::{page_fetch_id, VoteEnvironment, VoteReducer};
pub use state::VoteState;
