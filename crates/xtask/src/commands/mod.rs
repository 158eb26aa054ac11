//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod inspect_schema;
mod replay;

pub use inspect_schema::InspectSchema;
pub use replay::Replay;
