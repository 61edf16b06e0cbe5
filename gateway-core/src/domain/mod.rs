//! Core domain types
//!
//! This module contains the core domain structures used across the gateway.
//! These types represent the persisted business entities and are shared between
//! the server (for persistence) and the client (for display).

pub mod program;
