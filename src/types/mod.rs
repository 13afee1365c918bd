//! Type definitions

pub mod import;
pub mod messages;
pub mod task;

pub use import::*;
pub use messages::*;
pub use task::*;
