//! Rooms: a bounding box plus an optional exact footprint.

use super::EntityId;
use crate::geometry::{self, GeometryError};
use crate::grid::{CellRect, CellSet, GridPoint};
use serde::{Deserialize, Serialize};

/// How a room's footprint is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomShape {
    /// The room fills its whole bounding rectangle.
    #[default]
    Rectangular,
    /// Exact footprint drawn cell by cell.
    Freeform { cells: CellSet },
    /// Footprint approximated from a circle; `cells` is the derived mask.
    Circle {
        center: GridPoint,
        radius: f64,
        cells: CellSet,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub shape: RoomShape,
    /// Presentation only.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Room {
    /// A rectangular room with no id yet.
    pub fn rectangle(rect: CellRect) -> Self {
        Self {
            id: EntityId::new(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            shape: RoomShape::Rectangular,
            name: String::new(),
            color: None,
            category: None,
        }
    }

    /// Build a room from a drafted cell set.
    ///
    /// A set that fills its bounding box becomes a rectangular room; anything
    /// else keeps the cells as an explicit mask.
    pub fn from_cells(cells: &CellSet) -> Result<Self, GeometryError> {
        let bounds = geometry::bounding_box(cells)?;
        let mut room = Self::rectangle(bounds);
        if (cells.len() as i64) != bounds.area() {
            room.shape = RoomShape::Freeform { cells: cells.clone() };
        }
        Ok(room)
    }

    /// Build a circle-derived room.
    pub fn circle(center: GridPoint, radius: f64) -> Result<Self, GeometryError> {
        let cells = geometry::circle_cells(center, radius)?;
        let bounds = geometry::bounding_box(&cells)?;
        let mut room = Self::rectangle(bounds);
        room.shape = RoomShape::Circle { center, radius, cells };
        Ok(room)
    }

    pub fn bounds(&self) -> CellRect {
        CellRect::new(self.x, self.y, self.width, self.height)
    }

    /// Explicit mask, if the room has one.
    pub fn mask(&self) -> Option<&CellSet> {
        match &self.shape {
            RoomShape::Rectangular => None,
            RoomShape::Freeform { cells } | RoomShape::Circle { cells, .. } => Some(cells),
        }
    }

    /// The room's exact footprint.
    pub fn cells(&self) -> CellSet {
        match self.mask() {
            Some(cells) => cells.clone(),
            None => self.bounds().cells().collect(),
        }
    }

    /// Bounding-rectangle containment.
    pub fn contains(&self, cell: GridPoint) -> bool {
        self.bounds().contains(cell)
    }

    /// Move the footprint and recompute the bounding box from it.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        let shift = |cells: &CellSet| -> CellSet { cells.iter().map(|c| c.offset(dx, dy)).collect() };
        match &mut self.shape {
            RoomShape::Rectangular => {}
            RoomShape::Freeform { cells } => *cells = shift(cells),
            RoomShape::Circle { center, cells, .. } => {
                *center = center.offset(dx, dy);
                *cells = shift(cells);
            }
        }
        match self.mask().map(geometry::bounding_box) {
            Some(Ok(bounds)) => self.set_bounds(bounds),
            _ => {
                self.x += dx;
                self.y += dy;
            }
        }
    }

    fn set_bounds(&mut self, bounds: CellRect) {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(GeometryError::EmptyRoom);
        }
        match &self.shape {
            RoomShape::Rectangular => Ok(()),
            RoomShape::Freeform { cells } => geometry::bounding_box(cells).map(|_| ()),
            RoomShape::Circle { radius, cells, .. } => {
                if *radius <= 0.0 {
                    return Err(GeometryError::NonPositiveRadius);
                }
                geometry::bounding_box(cells).map(|_| ())
            }
        }
    }
}
