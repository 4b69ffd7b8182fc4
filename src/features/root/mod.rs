mod action;
mod reducer;
mod route;
mod state;

pub use action::RootAction;
pub use reducer::{root_reducer, RootEnvironment, RootReducer};
pub use route::RootRoute;
pub use state::RootState;
