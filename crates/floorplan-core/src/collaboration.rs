//! Client side of project synchronization.
//!
//! [`ProjectSync`] holds the local copy of a subscribed project, the version it
//! was last confirmed at, and at most one write in flight. It never talks to a
//! socket: outgoing JSON is queued for [`ProjectSync::take_outgoing`] and
//! incoming frames are fed to [`ProjectSync::handle_message`].

use crate::model::{EntityId, FloorGeometry, Project, ProjectError};
use crate::sync::{ClientMessage, ServerMessage, TransportEvent};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no project document loaded")]
    NotSubscribed,
    #[error("a write is already waiting for the server")]
    WriteInFlight,
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What the user is looking at: current level and selected room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSelection {
    pub level_id: Option<EntityId>,
    pub room_id: Option<EntityId>,
}

/// Events produced while handling transport and server traffic.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Connected,
    /// Connection lost; the local document is kept.
    Disconnected,
    /// Initial document received after subscribing.
    Loaded { version: u64 },
    /// Another write was applied locally.
    Updated { version: u64 },
    /// Our write was accepted.
    WriteAccepted { version: u64 },
    /// Our write was stale; the authoritative document replaced ours.
    Conflict { version: u64 },
    Error { message: String },
}

/// A write sent to the server and not yet answered.
#[derive(Debug, Clone)]
struct PendingWrite {
    project: Project,
    /// Version the edit was made against; retries reuse it.
    base_version: u64,
}

/// Manages one client's view of a shared, versioned project.
#[derive(Debug, Default)]
pub struct ProjectSync {
    /// Project we are subscribed to.
    project_id: Option<String>,
    /// Local document. While a write is pending this is the pending edit.
    project: Option<Project>,
    /// Last version confirmed by the server.
    version: Option<u64>,
    /// Document submitted and not yet accepted or rejected.
    pending: Option<PendingWrite>,
    /// Newest server document received while a write was pending.
    held_remote: Option<Project>,
    selection: ViewSelection,
    /// Pending outgoing messages (JSON strings).
    outgoing: Vec<String>,
}

impl ProjectSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Last server-confirmed version.
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending.is_some()
    }

    pub fn selection(&self) -> &ViewSelection {
        &self.selection
    }

    /// Select a level; ignored if the level does not exist.
    pub fn select_level(&mut self, level_id: &str) -> bool {
        let exists = self.project.as_ref().is_some_and(|p| p.level(level_id).is_some());
        if exists {
            self.selection.level_id = Some(level_id.to_string());
            self.selection.room_id = None;
        }
        exists
    }

    /// Select a room on the current level, or clear the room selection.
    pub fn select_room(&mut self, room_id: Option<&str>) -> bool {
        let Some(room_id) = room_id else {
            self.selection.room_id = None;
            return true;
        };
        let exists = self.current_geometry().is_some_and(|g| g.rooms.contains_key(room_id));
        if exists {
            self.selection.room_id = Some(room_id.to_string());
        }
        exists
    }

    /// Geometry of the selected level.
    pub fn current_geometry(&self) -> Option<&FloorGeometry> {
        let project = self.project.as_ref()?;
        let level_id = self.selection.level_id.as_deref()?;
        project.level(level_id).map(|l| &l.geometry)
    }

    // --- Subscription ---

    /// Subscribe to a project. Queues the subscribe message.
    pub fn subscribe(&mut self, project_id: &str) {
        self.project_id = Some(project_id.to_string());
        self.project = None;
        self.version = None;
        self.pending = None;
        self.held_remote = None;
        self.selection = ViewSelection::default();
        self.queue(&ClientMessage::Subscribe {
            project_id: project_id.to_string(),
        });
    }

    /// Stop following the current project. Queues the unsubscribe message.
    pub fn unsubscribe(&mut self) {
        if self.project_id.take().is_some() {
            self.queue(&ClientMessage::Unsubscribe);
        }
    }

    // --- Writes ---

    /// Replace one level's geometry in the local document and submit it.
    pub fn commit_level(&mut self, level_id: &str, geometry: FloorGeometry) -> Result<(), SyncError> {
        let mut project = self.project.clone().ok_or(SyncError::NotSubscribed)?;
        project
            .level_mut(level_id)
            .ok_or_else(|| ProjectError::LevelNotFound(level_id.to_string()))?
            .geometry = geometry;
        self.submit(project)
    }

    /// Adopt `project` locally and queue a write against the confirmed version.
    ///
    /// Only one write may be in flight; the caller must wait for acceptance or
    /// conflict before submitting again.
    pub fn submit(&mut self, project: Project) -> Result<(), SyncError> {
        if self.pending.is_some() {
            return Err(SyncError::WriteInFlight);
        }
        let base_version = self.version.ok_or(SyncError::NotSubscribed)?;
        let json = ClientMessage::Write {
            project: project.clone(),
            base_version,
        }
        .to_json()?;
        self.outgoing.push(json);
        self.project = Some(project.clone());
        self.pending = Some(PendingWrite { project, base_version });
        self.reconcile_selection();
        Ok(())
    }

    /// Re-send the pending write, e.g. after reconnecting.
    ///
    /// The write keeps the version the edit was based on, so if anyone else
    /// wrote in the meantime the server answers with a conflict.
    pub fn retry_pending(&mut self) -> Result<bool, SyncError> {
        let Some(pending) = &self.pending else {
            return Ok(false);
        };
        let json = ClientMessage::Write {
            project: pending.project.clone(),
            base_version: pending.base_version,
        }
        .to_json()?;
        self.outgoing.push(json);
        Ok(true)
    }

    /// Take pending outgoing messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing)
    }

    /// Check if there are pending outgoing messages.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    fn queue(&mut self, msg: &ClientMessage) {
        match msg.to_json() {
            Ok(json) => self.outgoing.push(json),
            Err(e) => log::warn!("failed to encode client message: {e}"),
        }
    }

    // --- Incoming ---

    /// Handle an event from the transport.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Option<SyncEvent> {
        match event {
            TransportEvent::Connected => {
                // The server forgot us; subscribe again to get a fresh snapshot.
                if let Some(id) = self.project_id.clone() {
                    self.queue(&ClientMessage::Subscribe { project_id: id });
                }
                Some(SyncEvent::Connected)
            }
            TransportEvent::Disconnected => Some(SyncEvent::Disconnected),
            TransportEvent::Message(json) => self.handle_message(&json),
            TransportEvent::Error { message } => Some(SyncEvent::Error { message }),
        }
    }

    /// Handle an incoming server message.
    /// Returns a SyncEvent describing what happened, or `None` if it was ignored.
    pub fn handle_message(&mut self, json: &str) -> Option<SyncEvent> {
        let msg: ServerMessage = match serde_json::from_str(json) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("failed to parse server message: {e}");
                return None;
            }
        };

        match msg {
            ServerMessage::Snapshot { project } => {
                let version = self.apply_remote(project)?;
                Some(SyncEvent::Loaded { version })
            }
            ServerMessage::Update { project } => {
                let version = self.apply_remote(project)?;
                Some(SyncEvent::Updated { version })
            }
            ServerMessage::Accepted { version } => {
                let pending = self.pending.take()?;
                if self.version.is_none_or(|v| version >= v) {
                    self.version = Some(version);
                }
                // A later broadcast already builds on the accepted write.
                let newer = self.held_remote.take().filter(|remote| remote.version > version);
                self.project = Some(newer.unwrap_or_else(|| {
                    let mut project = pending.project;
                    project.version = version;
                    project
                }));
                self.reconcile_selection();
                log::info!("write accepted at version {version}");
                Some(SyncEvent::WriteAccepted { version })
            }
            ServerMessage::Conflict { project } => {
                if !self.is_subscribed_to(&project) {
                    return None;
                }
                let version = project.version;
                log::info!("write rejected; adopting server version {version}");
                self.pending = None;
                self.held_remote = None;
                self.version = Some(version);
                self.project = Some(project);
                self.reconcile_selection();
                Some(SyncEvent::Conflict { version })
            }
            ServerMessage::Error { message } => Some(SyncEvent::Error { message }),
        }
    }

    fn is_subscribed_to(&self, project: &Project) -> bool {
        self.project_id.as_deref() == Some(project.id.as_str())
    }

    /// Apply a snapshot or update unless it is older than what we hold.
    fn apply_remote(&mut self, project: Project) -> Option<u64> {
        if !self.is_subscribed_to(&project) {
            log::debug!("ignoring document for project {}", project.id);
            return None;
        }
        let version = project.version;
        if let Some(local) = self.version.filter(|local| version < *local) {
            log::debug!("discarding stale version {version}, holding {local}");
            return None;
        }
        self.version = Some(version);
        if self.pending.is_some() {
            // The unanswered edit stays the local view until accepted or rejected.
            log::debug!("keeping pending edit over remote version {version}");
            self.held_remote = Some(project);
        } else {
            self.project = Some(project);
        }
        self.reconcile_selection();
        Some(version)
    }

    /// Keep the selected level and room if they still exist, otherwise fall back
    /// to the lowest level and no room.
    fn reconcile_selection(&mut self) {
        let Some(project) = &self.project else {
            self.selection = ViewSelection::default();
            return;
        };
        let level = self
            .selection
            .level_id
            .as_deref()
            .and_then(|id| project.level(id))
            .or_else(|| project.default_level());
        let Some(level) = level else {
            self.selection = ViewSelection::default();
            return;
        };
        let same_level = self.selection.level_id.as_deref() == Some(level.id.as_str());
        let room_id = self
            .selection
            .room_id
            .take()
            .filter(|id| same_level && level.geometry.rooms.contains_key(id));
        self.selection = ViewSelection {
            level_id: Some(level.id.clone()),
            room_id,
        };
    }
}
