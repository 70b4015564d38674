// Public API for integration tests and the demo runner

pub mod bots;
pub mod config;
pub mod deadline;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod session;
pub mod state;
pub mod types;
