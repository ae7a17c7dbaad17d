//! In-memory storage implementation.

use super::{BoxFuture, ProjectStorage, StorageError, StorageResult};
use crate::model::{Project, ProjectSummary};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for tests and servers started without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    projects: RwLock<HashMap<String, Project>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl ProjectStorage for MemoryStorage {
    fn save(&self, project: &Project) -> BoxFuture<'_, StorageResult<()>> {
        let project = project.clone();
        Box::pin(async move {
            let mut projects = self.projects.write().map_err(lock_error)?;
            projects.insert(project.id.clone(), project);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>> {
        let id = id.to_string();
        Box::pin(async move {
            let projects = self.projects.read().map_err(lock_error)?;
            projects.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut projects = self.projects.write().map_err(lock_error)?;
            projects.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<ProjectSummary>>> {
        Box::pin(async move {
            let projects = self.projects.read().map_err(lock_error)?;
            let mut summaries: Vec<_> = projects.values().map(Project::summary).collect();
            summaries.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(summaries)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let projects = self.projects.read().map_err(lock_error)?;
            Ok(projects.contains_key(&id))
        })
    }
}
