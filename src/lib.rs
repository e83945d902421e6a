// Re-export modules for the binary and for integration tests
pub mod composer;
pub mod config;
pub mod delivery;
pub mod models;
pub mod render;
pub mod seed;
pub mod selector;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use models::*;
pub use session::ChatSession;
pub use store::{ChatStore, DeliveryOutcome};
