//! Which walls move with a dragged room.
//!
//! Every room claims the walls of its merged perimeter. A wall claimed by a
//! single room is owned by it; walls shared with a neighbour stay put when
//! either room moves.

use crate::geometry;
use crate::model::{EntityId, FloorGeometry, Room, WallKey};
use std::collections::{BTreeSet, HashMap};

/// Count, per wall key, how many rooms' perimeters include it.
pub fn wall_claims<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> HashMap<WallKey, usize> {
    let mut claims = HashMap::new();
    for room in rooms {
        for key in geometry::perimeter_keys(&room.cells()) {
            *claims.entry(key).or_insert(0) += 1;
        }
    }
    claims
}

/// Perimeter keys of `room_id` that no other room claims.
pub fn owned_wall_keys(geometry: &FloorGeometry, room_id: &str) -> BTreeSet<WallKey> {
    let Some(room) = geometry.rooms.get(room_id) else {
        return BTreeSet::new();
    };
    let claims = wall_claims(geometry.rooms.values());
    geometry::perimeter_keys(&room.cells())
        .into_iter()
        .filter(|key| claims.get(key) == Some(&1))
        .collect()
}

/// Ids of wall entities owned by `room_id`.
pub fn owned_walls(geometry: &FloorGeometry, room_id: &str) -> Vec<EntityId> {
    let keys = owned_wall_keys(geometry, room_id);
    geometry
        .walls
        .iter()
        .filter(|(_, wall)| keys.contains(&wall.key()))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Ownership snapshot taken when a room drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMove {
    pub room_id: EntityId,
    pub owned_walls: Vec<EntityId>,
}

impl RoomMove {
    pub fn begin(geometry: &FloorGeometry, room_id: &str) -> Option<Self> {
        geometry.rooms.contains_key(room_id).then(|| Self {
            room_id: room_id.to_string(),
            owned_walls: owned_walls(geometry, room_id),
        })
    }

    /// Proposed geometry with the room and its owned walls shifted by the delta.
    ///
    /// Doors and windows are stored relative to their wall, so they travel with
    /// it. Returns `None` for a zero delta or a room that no longer exists.
    pub fn apply(&self, geometry: &FloorGeometry, dx: i32, dy: i32) -> Option<FloorGeometry> {
        if dx == 0 && dy == 0 {
            return None;
        }
        let mut proposed = geometry.clone();
        proposed.rooms.get_mut(&self.room_id)?.translate(dx, dy);
        for id in &self.owned_walls {
            if let Some(wall) = proposed.walls.get_mut(id) {
                wall.translate(dx, dy);
            }
        }
        Some(proposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellRect, GridPoint};
    use crate::model::{Opening, Wall};

    fn room(id: &str, rect: CellRect) -> Room {
        let mut r = Room::rectangle(rect);
        r.id = id.into();
        r
    }

    /// Two 1x1 rooms at (0,0) and (1,0) with their walls materialized once each.
    fn adjacent_rooms() -> FloorGeometry {
        let mut g = FloorGeometry::new();
        g.rooms.insert("a".into(), room("a", CellRect::new(0, 0, 1, 1)));
        g.rooms.insert("b".into(), room("b", CellRect::new(1, 0, 1, 1)));
        let walls = [
            ("w-top-a", (0, 0), (1, 0)),
            ("w-bottom-a", (0, 1), (1, 1)),
            ("w-left-a", (0, 0), (0, 1)),
            ("w-shared", (1, 0), (1, 1)),
            ("w-top-b", (1, 0), (2, 0)),
            ("w-bottom-b", (1, 1), (2, 1)),
            ("w-right-b", (2, 1), (2, 0)),
        ];
        for (id, a, b) in walls {
            g.walls.insert(id.into(), Wall::with_id(id, a.into(), b.into()));
        }
        g
    }

    #[test]
    fn test_shared_wall_has_two_claims() {
        let g = adjacent_rooms();
        let claims = wall_claims(g.rooms.values());
        let shared = WallKey::new(GridPoint::new(1, 0), GridPoint::new(1, 1));
        assert_eq!(claims.get(&shared), Some(&2));
    }

    #[test]
    fn test_shared_wall_owned_by_neither() {
        let g = adjacent_rooms();
        let a = owned_walls(&g, "a");
        let b = owned_walls(&g, "b");
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 3);
        assert!(!a.contains(&"w-shared".to_string()));
        assert!(!b.contains(&"w-shared".to_string()));
        // Reversed endpoints still match by key.
        assert!(b.contains(&"w-right-b".to_string()));
    }

    #[test]
    fn test_moving_room_leaves_shared_wall() {
        let g = adjacent_rooms();
        let mv = RoomMove::begin(&g, "a").unwrap();
        let moved = mv.apply(&g, 0, 1).unwrap();

        assert_eq!(moved.rooms["a"].bounds(), CellRect::new(0, 1, 1, 1));
        assert_eq!(moved.walls["w-shared"], g.walls["w-shared"]);
        assert_eq!(moved.walls["w-top-a"].start(), GridPoint::new(0, 1));
        assert_eq!(moved.walls["w-top-b"], g.walls["w-top-b"]);
    }

    #[test]
    fn test_openings_ride_along_with_owned_walls() {
        let mut g = adjacent_rooms();
        g.doors.insert("d".into(), Opening { id: "d".into(), ..Opening::new("w-left-a", 0, 1) });
        let moved = RoomMove::begin(&g, "a").unwrap().apply(&g, 3, 0).unwrap();
        assert_eq!(moved.doors["d"].wall_id, "w-left-a");
        assert_eq!(moved.walls["w-left-a"].x1, 3);
    }

    #[test]
    fn test_zero_delta_is_no_move() {
        let g = adjacent_rooms();
        let mv = RoomMove::begin(&g, "b").unwrap();
        assert!(mv.apply(&g, 0, 0).is_none());
        assert!(RoomMove::begin(&g, "missing").is_none());
    }
}
