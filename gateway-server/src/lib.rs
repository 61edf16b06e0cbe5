//! Program gateway server
//!
//! HTTP service that stores uploaded program archives together with their
//! metadata and serves them back through versioned endpoints.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod repository;
pub mod serializer;
pub mod service;
pub mod state;
pub mod storage;

pub use api::create_router;
pub use config::Config;
pub use state::{AppState, Pagination};
