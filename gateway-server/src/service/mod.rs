//! Service Module
//!
//! Business logic layer for the gateway.
//! Services orchestrate between the repository and artifact storage.

pub mod program;

// Re-export for convenience
pub use program as program_service;
