//! Gateway Core
//!
//! Core types and abstractions for the Program gateway.
//!
//! This crate contains:
//! - Domain types: the Program entity as it is persisted
//! - DTOs: wire representations shared by the server, client and CLI
//! - Artifact helpers: tar inspection and directory packing

pub mod artifact;
pub mod domain;
pub mod dto;
