//! Stairs linking one level to another.

use super::EntityId;
use crate::geometry::GeometryError;
use crate::grid::{CellRect, GridPoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StairKind {
    #[default]
    Straight,
    LShaped,
    UShaped,
    Spiral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StairDirection {
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stair {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub length: i32,
    #[serde(rename = "type")]
    pub kind: StairKind,
    pub direction: StairDirection,
    /// Shared with the counterpart stair on the target level.
    pub link_id: String,
    pub target_level_id: Option<EntityId>,
}

impl Stair {
    /// A new stair with no id yet.
    pub fn new(rect: CellRect, kind: StairKind, direction: StairDirection, link_id: String) -> Self {
        Self {
            id: EntityId::new(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            length: rect.height,
            kind,
            direction,
            link_id,
            target_level_id: None,
        }
    }

    pub fn bounds(&self) -> CellRect {
        CellRect::new(self.x, self.y, self.width, self.length)
    }

    pub fn contains(&self, cell: GridPoint) -> bool {
        self.bounds().contains(cell)
    }

    pub fn set_bounds(&mut self, rect: CellRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.length = rect.height;
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.width <= 0 || self.length <= 0 {
            return Err(GeometryError::NonPositiveStair {
                width: self.width,
                length: self.length,
            });
        }
        Ok(())
    }
}
