//! Axis-aligned wall segments.

use super::EntityId;
use crate::geometry::GeometryError;
use crate::grid::GridPoint;
use serde::{Deserialize, Serialize};

/// A wall between two grid vertices.
///
/// Walls are always horizontal or vertical. Endpoint order is irrelevant to
/// everything except opening offsets, which are measured from `(x1, y1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    pub id: EntityId,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Direction-independent identity of a wall's endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallKey {
    pub a: GridPoint,
    pub b: GridPoint,
}

impl WallKey {
    pub fn new(p: GridPoint, q: GridPoint) -> Self {
        if p <= q { Self { a: p, b: q } } else { Self { a: q, b: p } }
    }
}

impl Wall {
    /// Create a wall with no id yet; the commit pipeline assigns one.
    pub fn between(start: GridPoint, end: GridPoint) -> Self {
        Self::with_id(EntityId::new(), start, end)
    }

    pub fn with_id(id: impl Into<EntityId>, start: GridPoint, end: GridPoint) -> Self {
        Self {
            id: id.into(),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        }
    }

    pub fn start(&self) -> GridPoint {
        GridPoint::new(self.x1, self.y1)
    }

    pub fn end(&self) -> GridPoint {
        GridPoint::new(self.x2, self.y2)
    }

    pub fn is_horizontal(&self) -> bool {
        self.y1 == self.y2
    }

    pub fn is_axis_aligned(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }

    /// Length in cells.
    pub fn length(&self) -> i32 {
        (self.x2 - self.x1).abs() + (self.y2 - self.y1).abs()
    }

    pub fn key(&self) -> WallKey {
        WallKey::new(self.start(), self.end())
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x1 += dx;
        self.x2 += dx;
        self.y1 += dy;
        self.y2 += dy;
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !self.is_axis_aligned() {
            return Err(GeometryError::DiagonalWall);
        }
        if self.length() == 0 {
            return Err(GeometryError::ZeroLengthWall);
        }
        Ok(())
    }
}
