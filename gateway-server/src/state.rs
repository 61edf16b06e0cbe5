//! Shared application state.

use std::sync::Arc;

use crate::auth::TokenTable;
use crate::repository::ProgramRepository;
use crate::storage::ArtifactStorage;

/// Page size settings for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_size: u64,
    pub max_page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_page_size: 100,
        }
    }
}

/// State cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub programs: Arc<dyn ProgramRepository>,
    pub artifacts: Arc<dyn ArtifactStorage>,
    pub tokens: Arc<TokenTable>,
    pub pagination: Pagination,
}

impl AppState {
    pub fn new(
        programs: Arc<dyn ProgramRepository>,
        artifacts: Arc<dyn ArtifactStorage>,
        tokens: TokenTable,
        pagination: Pagination,
    ) -> Self {
        Self {
            programs,
            artifacts,
            tokens: Arc::new(tokens),
            pagination,
        }
    }
}
