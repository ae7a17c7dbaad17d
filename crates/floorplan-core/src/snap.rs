//! Snapping drag endpoints onto the grid axes.

use crate::grid::GridPoint;

/// Axis a wall drag snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapAxis {
    Horizontal,
    Vertical,
}

/// Result of snapping a drag end to the start's row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapResult {
    pub point: GridPoint,
    pub axis: SnapAxis,
}

/// Flatten the minor axis of `end - start` to the start's value.
///
/// Horizontal wins ties (`|dx| >= |dy|`).
pub fn snap_to_axis(start: GridPoint, end: GridPoint) -> SnapResult {
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    if dx >= dy {
        SnapResult {
            point: GridPoint::new(end.x, start.y),
            axis: SnapAxis::Horizontal,
        }
    } else {
        SnapResult {
            point: GridPoint::new(start.x, end.y),
            axis: SnapAxis::Vertical,
        }
    }
}
