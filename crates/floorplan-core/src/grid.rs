//! Integer grid addressing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An integer cell address on the floor-plan grid.
///
/// The same type doubles as a grid vertex for wall endpoints: cell `(x, y)`
/// spans the square between vertices `(x, y)` and `(x + 1, y + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by a cell delta.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for GridPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Value identity of a cell, usable as a set element.
pub type CellKey = GridPoint;

/// An ordered set of cells. Ordering keeps derived geometry deterministic.
pub type CellSet = BTreeSet<CellKey>;

/// Inclusive integer rectangle in cell units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CellRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanning two corner cells, inclusive, in either order.
    pub fn from_corners(a: GridPoint, b: GridPoint) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self {
            x: min_x,
            y: min_y,
            width: a.x.max(b.x) - min_x + 1,
            height: a.y.max(b.y) - min_y + 1,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, cell: GridPoint) -> bool {
        cell.x >= self.x && cell.x < self.right() && cell.y >= self.y && cell.y < self.bottom()
    }

    /// Open-interval intersection test: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &CellRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Every cell inside the rectangle, row by row.
    pub fn cells(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| GridPoint::new(x, y)))
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width.max(0)) * i64::from(self.height.max(0))
    }
}
