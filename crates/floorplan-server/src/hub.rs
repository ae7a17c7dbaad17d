//! Authoritative project documents with optimistic-concurrency writes.
//!
//! Each project is guarded by its own async mutex. A write is accepted only
//! when its base version equals the current one; the version then grows by
//! exactly one, the document is persisted, and every subscriber is sent the
//! new document while the lock is still held, so subscribers see versions in
//! order.

use crate::registry::{ConnectionId, Outbox, SubscriberRegistry};
use dashmap::DashMap;
use floorplan_core::storage::{ProjectStorage, StorageError};
use floorplan_core::{Project, ProjectSummary, ServerMessage};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum HubError {
    #[error("project not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid request: {0}")]
    Invalid(String),
}

type Document = Arc<Mutex<Project>>;

pub struct ProjectHub {
    storage: Arc<dyn ProjectStorage>,
    /// Loaded documents; storage is only read on first access.
    documents: DashMap<String, Document>,
    registry: SubscriberRegistry,
}

impl std::fmt::Debug for ProjectHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectHub")
            .field("documents", &self.documents.len())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ProjectHub {
    pub fn new(storage: Arc<dyn ProjectStorage>) -> Self {
        Self {
            storage,
            documents: DashMap::new(),
            registry: SubscriberRegistry::new(),
        }
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    async fn document(&self, id: &str) -> Result<Document, HubError> {
        if let Some(doc) = self.documents.get(id) {
            return Ok(doc.clone());
        }
        let project = match self.storage.load(id).await {
            Ok(project) => project,
            Err(StorageError::NotFound(_)) => return Err(HubError::NotFound(id.to_string())),
            Err(e @ StorageError::InvalidId(_)) => return Err(HubError::Invalid(e.to_string())),
            Err(e) => return Err(e.into()),
        };
        // Another task may have loaded it meanwhile; keep whichever came first.
        let doc = self
            .documents
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(project)))
            .clone();
        Ok(doc)
    }

    /// Create and persist a new project at version 1.
    pub async fn create_project(&self, name: &str) -> Result<Project, HubError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HubError::Invalid("project name must not be empty".to_string()));
        }
        let project = Project::new(name);
        self.storage.save(&project).await?;
        self.documents
            .insert(project.id.clone(), Arc::new(Mutex::new(project.clone())));
        info!(project = %project.id, project_name = name, "project created");
        Ok(project)
    }

    /// Current document.
    pub async fn get(&self, id: &str) -> Result<Project, HubError> {
        let doc = self.document(id).await?;
        let project = doc.lock().await.clone();
        Ok(project)
    }

    pub async fn list(&self) -> Result<Vec<ProjectSummary>, HubError> {
        Ok(self.storage.list().await?)
    }

    /// Register `conn` for updates and queue the current document to it first.
    pub async fn subscribe(&self, project_id: &str, conn: ConnectionId, outbox: Outbox) -> Result<(), HubError> {
        let doc = self.document(project_id).await?;
        let project = doc.lock().await;
        // Holding the lock: no write can slip in between snapshot and registration.
        if outbox
            .send(ServerMessage::Snapshot {
                project: project.clone(),
            })
            .is_ok()
        {
            self.registry.add(project_id, conn, outbox);
        }
        info!(project = project_id, %conn, version = project.version, "subscribed");
        Ok(())
    }

    pub fn unsubscribe(&self, project_id: &str, conn: ConnectionId) {
        self.registry.remove(project_id, conn);
        debug!(project = project_id, %conn, "unsubscribed");
    }

    /// Forget a closed connection everywhere.
    pub fn disconnect(&self, conn: ConnectionId) {
        self.registry.remove_connection(conn);
    }

    /// Apply a write if `base_version` is current.
    ///
    /// Returns `Accepted` with the new version, or `Conflict` carrying the
    /// unchanged authoritative document. Nothing is mutated on conflict or on
    /// a storage failure.
    pub async fn write(&self, project: Project, base_version: u64) -> Result<ServerMessage, HubError> {
        if project.levels.is_empty() {
            return Err(HubError::Invalid("a project must keep at least one level".to_string()));
        }
        let doc = self.document(&project.id).await?;
        let mut current = doc.lock().await;

        if current.version != base_version {
            info!(
                project = %current.id,
                base_version,
                current = current.version,
                "write rejected: stale version"
            );
            return Ok(ServerMessage::Conflict {
                project: current.clone(),
            });
        }

        let mut next = project;
        next.version = current.version + 1;
        self.storage.save(&next).await?;
        *current = next;

        let version = current.version;
        let reached = self.registry.broadcast(
            &current.id,
            &ServerMessage::Update {
                project: current.clone(),
            },
        );
        info!(project = %current.id, version, subscribers = reached, "write accepted");
        Ok(ServerMessage::Accepted { version })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_core::grid::CellRect;
    use floorplan_core::storage::MemoryStorage;
    use floorplan_core::{FloorGeometry, Room};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    async fn hub_with_project() -> (ProjectHub, Arc<MemoryStorage>, Project) {
        let storage = Arc::new(MemoryStorage::new());
        let hub = ProjectHub::new(storage.clone());
        let project = hub.create_project("House").await.unwrap();
        (hub, storage, project)
    }

    fn with_room(project: &Project) -> Project {
        let mut edited = project.clone();
        let mut geometry = FloorGeometry::new();
        geometry.rooms.insert("r1".into(), Room::rectangle(CellRect::new(0, 0, 2, 2)));
        edited.levels[0].geometry = geometry;
        edited
    }

    #[tokio::test]
    async fn test_write_at_current_version_is_accepted() {
        let (hub, storage, project) = hub_with_project().await;
        assert_eq!(project.version, 1);

        let reply = hub.write(with_room(&project), 1).await.unwrap();
        assert_eq!(reply, ServerMessage::Accepted { version: 2 });

        let stored = storage.load(&project.id).await.unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.levels[0].geometry.rooms.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_write_returns_unmodified_document() {
        let (hub, storage, project) = hub_with_project().await;
        hub.write(project.clone(), 1).await.unwrap();
        let before = hub.get(&project.id).await.unwrap();

        let reply = hub.write(with_room(&project), 1).await.unwrap();
        assert_eq!(reply, ServerMessage::Conflict { project: before.clone() });
        assert_eq!(hub.get(&project.id).await.unwrap(), before);
        assert_eq!(storage.load(&project.id).await.unwrap(), before);

        // A client-chosen version is ignored; the server assigns it.
        let mut bogus = before.clone();
        bogus.version = 99;
        assert_eq!(hub.write(bogus, 2).await.unwrap(), ServerMessage::Accepted { version: 3 });
    }

    #[tokio::test]
    async fn test_subscriber_gets_snapshot_then_updates() {
        let (hub, _storage, project) = hub_with_project().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = Uuid::new_v4();
        hub.subscribe(&project.id, conn, tx).await.unwrap();

        assert!(matches!(rx.recv().await, Some(ServerMessage::Snapshot { project: p }) if p.version == 1));

        hub.write(with_room(&project), 1).await.unwrap();
        assert!(matches!(rx.recv().await, Some(ServerMessage::Update { project: p }) if p.version == 2));

        hub.disconnect(conn);
        assert_eq!(hub.registry().subscriber_count(&project.id), 0);
    }

    #[tokio::test]
    async fn test_unknown_project() {
        let (hub, _storage, _project) = hub_with_project().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(matches!(
            hub.subscribe("missing", Uuid::new_v4(), tx).await,
            Err(HubError::NotFound(_))
        ));
        assert!(matches!(
            hub.write(Project::with_id("missing", "X"), 1).await,
            Err(HubError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_loads_from_storage_on_first_access() {
        let storage = Arc::new(MemoryStorage::new());
        let mut stored = Project::with_id("p", "Stored");
        stored.version = 7;
        storage.save(&stored).await.unwrap();

        let hub = ProjectHub::new(storage);
        assert_eq!(hub.get("p").await.unwrap().version, 7);
        assert_eq!(hub.write(stored, 7).await.unwrap(), ServerMessage::Accepted { version: 8 });
    }

    #[tokio::test]
    async fn test_rejects_invalid_input() {
        let (hub, _storage, project) = hub_with_project().await;
        assert!(matches!(hub.create_project("  ").await, Err(HubError::Invalid(_))));

        let mut empty = project.clone();
        empty.levels.clear();
        assert!(matches!(hub.write(empty, 1).await, Err(HubError::Invalid(_))));
        assert_eq!(hub.get(&project.id).await.unwrap().version, 1);

        let list = hub.list().await.unwrap();
        assert_eq!(list, vec![project.summary()]);
    }
    #[tokio::test]
    async fn test_unsafe_project_id_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let hub = ProjectHub::new(Arc::new(floorplan_core::FileStorage::new(dir.path().to_path_buf()).unwrap()));
        assert!(matches!(hub.get("../a").await, Err(HubError::Invalid(_))));
        assert!(matches!(hub.get("a").await, Err(HubError::NotFound(_))));
    }
}
