//! Which section is active, and how explicit navigation and viewport observation agree on it.

mod controller;
mod state;

pub use controller::*;
pub use state::*;
