//! Data Transfer Objects for client/server communication
//!
//! DTOs are the wire representations of domain entities. The server renders
//! them, the client and CLI decode them.

pub mod errors;
pub mod page;
pub mod program;
