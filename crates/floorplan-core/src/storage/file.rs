//! File-based storage: one JSON file per project.

use super::{BoxFuture, ProjectStorage, StorageError, StorageResult};
use crate::model::{Project, ProjectSummary};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores projects as JSON files in a directory.
#[derive(Debug)]
pub struct FileStorage {
    /// Base directory for project files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Linux: `~/.local/share/floorplan/projects/`
    /// On Windows: `%LOCALAPPDATA%\floorplan\projects\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("floorplan").join("projects"))
    }

    /// File path for a project id.
    ///
    /// Ids are used verbatim as file names, so only letters, digits, `-` and
    /// `_` are accepted; two distinct ids never share a file.
    fn project_path(&self, id: &str) -> StorageResult<PathBuf> {
        let safe = !id.is_empty() && id.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.base_path.join(format!("{id}.json")))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

fn read_project(path: &Path) -> StorageResult<Project> {
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    Project::from_json(&json)
        .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e)))
}

impl ProjectStorage for FileStorage {
    fn save(&self, project: &Project) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.project_path(&project.id);
        let json = project.to_json();

        Box::pin(async move {
            let path = path?;
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            // Write then rename so a crash never leaves a truncated project.
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, json)
                .and_then(|()| fs::rename(&tmp, &path))
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>> {
        let path = self.project_path(id);
        let id = id.to_string();

        Box::pin(async move {
            let path = path?;
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            read_project(&path)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.project_path(id);

        Box::pin(async move {
            let path = path?;
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<ProjectSummary>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut summaries = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_none_or(|e| e != "json") {
                    continue;
                }
                match read_project(&path) {
                    Ok(project) => summaries.push(project.summary()),
                    Err(e) => log::warn!("skipping unreadable project file: {e}"),
                }
            }
            summaries.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(summaries)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.project_path(id);
        Box::pin(async move { Ok(path?.exists()) })
    }
}
