//! Floor-plan entities and the per-level geometry container.

mod opening;
mod project;
mod room;
mod stair;
mod wall;

pub use opening::{Door, Opening, WindowOpening};
pub use project::{Level, Project, ProjectError, ProjectSummary};
pub use room::{Room, RoomShape};
pub use stair::{Stair, StairDirection, StairKind};
pub use wall::{Wall, WallKey};

use crate::grid::GridPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of any geometric entity. An empty id marks an entity that has
/// not been through the commit pipeline yet.
pub type EntityId = String;

/// All geometry on one level, keyed by entity id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FloorGeometry {
    #[serde(default)]
    pub rooms: BTreeMap<EntityId, Room>,
    #[serde(default)]
    pub walls: BTreeMap<EntityId, Wall>,
    #[serde(default)]
    pub doors: BTreeMap<EntityId, Door>,
    #[serde(default)]
    pub windows: BTreeMap<EntityId, WindowOpening>,
    #[serde(default)]
    pub stairs: BTreeMap<EntityId, Stair>,
}

impl FloorGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
            && self.walls.is_empty()
            && self.doors.is_empty()
            && self.windows.is_empty()
            && self.stairs.is_empty()
    }

    /// Find a wall by its direction-normalized endpoints.
    pub fn wall_by_key(&self, key: WallKey) -> Option<&Wall> {
        self.walls.values().find(|w| w.key() == key)
    }

    /// First room whose bounding rectangle contains the cell.
    pub fn room_at(&self, cell: GridPoint) -> Option<&Room> {
        self.rooms.values().find(|r| r.contains(cell))
    }

    /// First stair whose rectangle contains the cell.
    pub fn stair_at(&self, cell: GridPoint) -> Option<&Stair> {
        self.stairs.values().find(|s| s.contains(cell))
    }

    /// Doors and windows attached to a wall.
    pub fn openings_on(&self, wall_id: &str) -> impl Iterator<Item = &Opening> + '_ {
        let wall_id = wall_id.to_string();
        self.doors
            .values()
            .chain(self.windows.values())
            .filter(move |o| o.wall_id == wall_id)
    }

    /// Insert an entity whose id may still be empty. Empty ids are keyed by a
    /// temporary placeholder until the commit pipeline replaces them.
    pub fn insert_room(&mut self, room: Room) {
        let key = self.slot_key(&room.id, "room");
        self.rooms.insert(key, room);
    }

    pub fn insert_wall(&mut self, wall: Wall) {
        let key = self.slot_key(&wall.id, "wall");
        self.walls.insert(key, wall);
    }

    pub fn insert_door(&mut self, door: Door) {
        let key = self.slot_key(&door.id, "door");
        self.doors.insert(key, door);
    }

    pub fn insert_window(&mut self, window: WindowOpening) {
        let key = self.slot_key(&window.id, "window");
        self.windows.insert(key, window);
    }

    pub fn insert_stair(&mut self, stair: Stair) {
        let key = self.slot_key(&stair.id, "stair");
        self.stairs.insert(key, stair);
    }

    fn slot_key(&self, id: &str, kind: &str) -> EntityId {
        if !id.is_empty() {
            return id.to_string();
        }
        let taken = |key: &str| {
            self.rooms.contains_key(key)
                || self.walls.contains_key(key)
                || self.doors.contains_key(key)
                || self.windows.contains_key(key)
                || self.stairs.contains_key(key)
        };
        (0..)
            .map(|n| format!("{PENDING_PREFIX}{kind}-{n}"))
            .find(|key| !taken(key))
            .unwrap_or_default()
    }
}

/// Key prefix for entities awaiting an id from the commit pipeline.
const PENDING_PREFIX: &str = "pending:";
