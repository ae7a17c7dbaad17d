//! Floor-plan Core Library
//!
//! Platform-agnostic geometry engine, interaction session and sync client for
//! the multi-level floor-plan editor.

pub mod camera;
pub mod canvas;
pub mod collaboration;
pub mod commit;
pub mod config;
pub mod geometry;
pub mod grid;
pub mod hit_test;
pub mod ids;
pub mod input;
pub mod model;
pub mod ownership;
pub mod selection;
pub mod snap;
pub mod storage;
pub mod sync;
pub mod tools;

pub use camera::{Camera, ZoomLimits};
pub use canvas::{Canvas, CanvasEvent};
pub use collaboration::{ProjectSync, SyncError, SyncEvent, ViewSelection};
pub use commit::{CommitError, CommitPipeline};
pub use config::EditorConfig;
pub use geometry::GeometryError;
pub use grid::{CellKey, CellRect, CellSet, GridPoint};
pub use ids::{IdFactory, SequentialIds, UuidIds};
pub use input::{KeyEvent, MouseButton, PointerEvent};
pub use model::{EntityId, FloorGeometry, Level, Project, ProjectError, ProjectSummary, Room, RoomShape, Stair, Wall};
pub use storage::{FileStorage, MemoryStorage, ProjectStorage, StorageError};
pub use sync::{ClientMessage, ConnectionState, NativeWebSocket, ServerMessage, TransportError, TransportEvent};
pub use tools::{ToolKind, ToolManager, ToolSettings, ToolState};
