//! Doors and windows: segments cut into a wall.

use super::{EntityId, Wall};
use crate::geometry::GeometryError;
use serde::{Deserialize, Serialize};

/// A door or window occupying `[seg_start, seg_end)` cells along its wall,
/// measured from the wall's first endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub id: EntityId,
    pub wall_id: EntityId,
    pub seg_start: i32,
    pub seg_end: i32,
}

pub type Door = Opening;
pub type WindowOpening = Opening;

impl Opening {
    /// A new opening with no id yet.
    pub fn new(wall_id: impl Into<EntityId>, seg_start: i32, seg_end: i32) -> Self {
        Self {
            id: EntityId::new(),
            wall_id: wall_id.into(),
            seg_start,
            seg_end,
        }
    }

    /// Cells spanned along the wall.
    pub fn width(&self) -> i32 {
        self.seg_end - self.seg_start
    }

    /// Check `0 <= seg_start < seg_end <= wall length`.
    pub fn validate(&self, wall: &Wall) -> Result<(), GeometryError> {
        if self.seg_start < 0 || self.width() <= 0 || self.seg_end > wall.length() {
            return Err(GeometryError::InvalidOpening {
                seg_start: self.seg_start,
                seg_end: self.seg_end,
                wall_length: wall.length(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPoint;

    #[test]
    fn test_validate_against_wall() {
        let wall = Wall::with_id("w1", GridPoint::new(0, 0), GridPoint::new(5, 0));
        assert!(Opening::new("w1", 2, 3).validate(&wall).is_ok());
        assert!(Opening::new("w1", 0, 5).validate(&wall).is_ok());
        assert!(Opening::new("w1", 3, 3).validate(&wall).is_err());
        assert!(Opening::new("w1", 4, 6).validate(&wall).is_err());
        assert!(Opening::new("w1", -1, 2).validate(&wall).is_err());
        assert_eq!(Opening::new("w1", 1, 4).width(), 3);
    }
}
