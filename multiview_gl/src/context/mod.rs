/// Context module - the command processor that owns all GL objects and state

pub mod config;
pub mod state;
pub mod query;
pub mod context;
mod validation;
mod pixel_ops;

pub use config::*;
pub use state::*;
pub use query::*;
pub use context::*;
