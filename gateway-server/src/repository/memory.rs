//! Program Repository (in-memory)
//!
//! Process-local store used by `GATEWAY_STORE=memory` and the test suite.

use async_trait::async_trait;
use gateway_core::domain::program::Program;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProgramRepository, Result};

#[derive(Debug, Default)]
pub struct MemoryProgramRepository {
    programs: RwLock<HashMap<Uuid, Program>>,
}

impl MemoryProgramRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgramRepository for MemoryProgramRepository {
    async fn insert(&self, program: &Program) -> Result<()> {
        self.programs
            .write()
            .await
            .insert(program.id, program.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Program>> {
        Ok(self.programs.read().await.get(&id).cloned())
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Program>> {
        let programs = self.programs.read().await;
        let mut all: Vec<&Program> = programs.values().collect();
        // Same order as the Postgres backend: newest first, id breaks ties
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(all.into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.programs.read().await.len() as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.programs.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::BTreeMap;

    fn program(title: &str, age_secs: i64) -> Program {
        let id = Uuid::new_v4();
        Program {
            id,
            title: title.to_string(),
            description: None,
            entrypoint: "program.py".to_string(),
            working_dir: "./".to_string(),
            version: "0.0.1".to_string(),
            artifact: Program::artifact_key(id),
            dependencies: vec![],
            env_vars: BTreeMap::new(),
            arguments: BTreeMap::new(),
            tags: vec![],
            public: false,
            owner: "test_user".to_string(),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_insert_find_delete() {
        let repo = MemoryProgramRepository::new();
        let p = program("one", 0);

        repo.insert(&p).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.find_by_id(p.id).await.unwrap(), Some(p.clone()));

        assert!(repo.delete(p.id).await.unwrap());
        assert!(!repo.delete(p.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.find_by_id(p.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_page_is_newest_first() {
        let repo = MemoryProgramRepository::new();
        for (title, age) in [("old", 30), ("new", 0), ("mid", 10)] {
            repo.insert(&program(title, age)).await.unwrap();
        }

        let titles: Vec<String> = repo
            .list_page(0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);

        let second: Vec<String> = repo
            .list_page(1, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(second, vec!["mid"]);

        assert!(repo.list_page(5, 10).await.unwrap().is_empty());
    }
}
