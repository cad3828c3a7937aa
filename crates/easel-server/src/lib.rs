// Main library module for the Easel canvas lock server.

// Module declarations
pub mod api; // HTTP handlers
pub mod model; // Configuration and shared state
pub mod service; // Business services
pub mod startup; // Application startup utilities

// Re-export the state types handlers and tests build on
pub use model::common::{AppState, Configuration};
