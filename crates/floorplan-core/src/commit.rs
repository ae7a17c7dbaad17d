//! The single validated entry point for geometry changes.
//!
//! Tools never edit a level directly. They build a complete proposed
//! [`FloorGeometry`] and hand it to [`CommitPipeline::commit`], which either
//! returns the new geometry or rejects the whole change.

use crate::geometry::{self, GeometryError};
use crate::ids::{IdFactory, UuidIds};
use crate::model::{EntityId, FloorGeometry, Opening};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommitError {
    #[error("construction error: {0}")]
    Construction(#[from] GeometryError),
    #[error("room {room} overlaps existing room {existing}")]
    Overlap { room: EntityId, existing: EntityId },
    #[error("id factory produced no unused id")]
    IdsExhausted,
}

pub struct CommitPipeline {
    ids: Box<dyn IdFactory>,
}

impl Default for CommitPipeline {
    fn default() -> Self {
        Self::new(UuidIds)
    }
}

impl std::fmt::Debug for CommitPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitPipeline").finish_non_exhaustive()
    }
}

impl CommitPipeline {
    pub fn new(ids: impl IdFactory + 'static) -> Self {
        Self { ids: Box::new(ids) }
    }

    /// A fresh id outside of any commit (e.g. a stair link id).
    pub fn next_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    /// Validate `proposed` against `current` and return the accepted geometry.
    ///
    /// On success: new entities (empty id) have fresh ids, new walls that
    /// duplicate an existing wall's endpoints are dropped, and doors/windows
    /// whose wall is gone are removed. On error nothing is applied.
    pub fn commit(&mut self, current: &FloorGeometry, proposed: FloorGeometry) -> Result<FloorGeometry, CommitError> {
        let mut proposed = proposed;

        for wall in proposed.walls.values() {
            wall.validate()?;
        }
        for stair in proposed.stairs.values() {
            stair.validate()?;
        }
        for room in proposed.rooms.values() {
            room.validate()?;
        }

        check_overlaps(current, &proposed)?;

        drop_duplicate_walls(&mut proposed);
        cascade_openings(&mut proposed);
        for opening in proposed.doors.values().chain(proposed.windows.values()) {
            if let Some(wall) = proposed.walls.get(&opening.wall_id) {
                opening.validate(wall)?;
            }
        }

        self.assign_ids(&mut proposed)?;
        let committed = FloorGeometry {
            rooms: rekey(proposed.rooms, |r| r.id.clone()),
            walls: rekey(proposed.walls, |w| w.id.clone()),
            doors: rekey(proposed.doors, |d| d.id.clone()),
            windows: rekey(proposed.windows, |w| w.id.clone()),
            stairs: rekey(proposed.stairs, |s| s.id.clone()),
        };
        log::debug!(
            "committed geometry: {} rooms, {} walls, {} doors, {} windows, {} stairs",
            committed.rooms.len(),
            committed.walls.len(),
            committed.doors.len(),
            committed.windows.len(),
            committed.stairs.len()
        );
        Ok(committed)
    }
}

impl CommitPipeline {
    /// Give every uncommitted entity an id not used anywhere in `geometry`.
    fn assign_ids(&mut self, geometry: &mut FloorGeometry) -> Result<(), CommitError> {
        let mut used: HashSet<EntityId> = geometry
            .rooms
            .values()
            .map(|r| &r.id)
            .chain(geometry.walls.values().map(|w| &w.id))
            .chain(geometry.doors.values().map(|d| &d.id))
            .chain(geometry.windows.values().map(|w| &w.id))
            .chain(geometry.stairs.values().map(|s| &s.id))
            .filter(|id| !id.is_empty())
            .cloned()
            .collect();

        let unassigned = geometry
            .rooms
            .values_mut()
            .map(|r| &mut r.id)
            .chain(geometry.walls.values_mut().map(|w| &mut w.id))
            .chain(geometry.doors.values_mut().map(|d| &mut d.id))
            .chain(geometry.windows.values_mut().map(|w| &mut w.id))
            .chain(geometry.stairs.values_mut().map(|s| &mut s.id))
            .filter(|id| id.is_empty());
        for id in unassigned {
            *id = self.unused_id(&mut used)?;
        }
        Ok(())
    }

    /// An injective factory collides at most `used.len()` times.
    fn unused_id(&mut self, used: &mut HashSet<EntityId>) -> Result<EntityId, CommitError> {
        for _ in 0..=used.len() {
            let id = self.ids.next_id();
            if used.insert(id.clone()) {
                return Ok(id);
            }
            log::debug!("generated id {id} already in use");
        }
        Err(CommitError::IdsExhausted)
    }
}

/// Reject the change if any new or altered room overlaps another room.
fn check_overlaps(current: &FloorGeometry, proposed: &FloorGeometry) -> Result<(), CommitError> {
    for (key, room) in &proposed.rooms {
        if current.rooms.get(key) == Some(room) {
            continue;
        }
        let others = proposed.rooms.iter().filter(|(k, _)| *k != key).map(|(_, r)| r);
        if let Some(existing) = geometry::find_overlap(&room.bounds(), others, None) {
            log::debug!("room {key} rejected: overlaps {}", existing.id);
            return Err(CommitError::Overlap {
                room: key.clone(),
                existing: existing.id.clone(),
            });
        }
    }
    Ok(())
}

/// New walls that coincide with an existing wall are redundant.
fn drop_duplicate_walls(proposed: &mut FloorGeometry) {
    let mut seen: HashSet<_> = proposed
        .walls
        .values()
        .filter(|w| !w.id.is_empty())
        .map(|w| w.key())
        .collect();
    proposed.walls.retain(|_, w| !w.id.is_empty() || seen.insert(w.key()));
}

/// Remove doors and windows whose owning wall is not in the geometry.
fn cascade_openings(proposed: &mut FloorGeometry) {
    let walls = &proposed.walls;
    let keep = |o: &Opening| {
        let kept = walls.contains_key(&o.wall_id);
        if !kept {
            log::debug!("opening {} removed with wall {}", o.id, o.wall_id);
        }
        kept
    };
    proposed.doors.retain(|_, o| keep(o));
    proposed.windows.retain(|_, o| keep(o));
}

fn rekey<T>(map: BTreeMap<EntityId, T>, id_of: impl Fn(&T) -> EntityId) -> BTreeMap<EntityId, T> {
    map.into_values().map(|entity| (id_of(&entity), entity)).collect()
}
