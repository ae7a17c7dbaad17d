//! Projects and their elevation-ordered levels.

use super::{EntityId, FloorGeometry};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectError {
    #[error("a project must keep at least one level")]
    LastLevel,
    #[error("level not found: {0}")]
    LevelNotFound(String),
}

/// One floor of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: EntityId,
    pub name: String,
    /// Ordering key; larger is higher.
    pub elevation: i32,
    #[serde(default)]
    pub geometry: FloorGeometry,
}

impl Level {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, elevation: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elevation,
            geometry: FloorGeometry::new(),
        }
    }
}

/// The versioned document shared between collaborators.
///
/// `version` is owned by the server: it starts at 1 and grows by exactly one
/// per accepted write. Clients never set it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub levels: Vec<Level>,
    pub version: u64,
}

/// Listing entry returned by storage backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub version: u64,
}

impl Project {
    /// Create a project at version 1 with a single ground level.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            levels: vec![Level::new(Uuid::new_v4().to_string(), "Ground", 0)],
            version: 1,
        }
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version,
        }
    }

    pub fn level(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn level_mut(&mut self, id: &str) -> Option<&mut Level> {
        self.levels.iter_mut().find(|l| l.id == id)
    }

    /// Levels sorted by elevation, ties broken by id.
    pub fn levels_by_elevation(&self) -> Vec<&Level> {
        let mut levels: Vec<&Level> = self.levels.iter().collect();
        levels.sort_by(|a, b| a.elevation.cmp(&b.elevation).then_with(|| a.id.cmp(&b.id)));
        levels
    }

    /// The deterministic default level: lowest elevation first.
    pub fn default_level(&self) -> Option<&Level> {
        self.levels_by_elevation().into_iter().next()
    }

    pub fn add_level(&mut self, level: Level) {
        self.levels.push(level);
    }

    pub fn remove_level(&mut self, id: &str) -> Result<Level, ProjectError> {
        let index = self
            .levels
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| ProjectError::LevelNotFound(id.to_string()))?;
        if self.levels.len() == 1 {
            return Err(ProjectError::LastLevel);
        }
        Ok(self.levels.remove(index))
    }

    /// Serialize the project to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a project from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
