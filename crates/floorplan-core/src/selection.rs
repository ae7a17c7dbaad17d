//! Cell-selection drafting for rooms and stairs.

use crate::geometry::{self, GeometryError};
use crate::grid::{CellRect, CellSet, GridPoint};

/// Inclusive rectangle of cells between two corners, in either order.
pub fn rect_cells_between(a: GridPoint, b: GridPoint) -> CellSet {
    CellRect::from_corners(a, b).cells().collect()
}

/// Symmetric difference: cells already drafted are removed, new ones added.
pub fn xor_toggle(draft: &CellSet, rect_cells: &CellSet) -> CellSet {
    draft.symmetric_difference(rect_cells).copied().collect()
}

/// An in-progress, uncommitted cell selection owned by one tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    cells: CellSet,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &CellSet {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// XOR the rectangle between two corners into the draft.
    pub fn toggle_rect(&mut self, a: GridPoint, b: GridPoint) {
        self.cells = xor_toggle(&self.cells, &rect_cells_between(a, b));
    }

    pub fn bounds(&self) -> Result<CellRect, GeometryError> {
        geometry::bounding_box(&self.cells)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Hand the cells over and leave the draft empty.
    pub fn take(&mut self) -> CellSet {
        std::mem::take(&mut self.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_cells_between_is_symmetric() {
        let a = rect_cells_between(GridPoint::new(0, 0), GridPoint::new(2, 1));
        let b = rect_cells_between(GridPoint::new(2, 1), GridPoint::new(0, 0));
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_single_cell_rect() {
        let cells = rect_cells_between(GridPoint::new(4, 4), GridPoint::new(4, 4));
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn test_xor_is_an_involution() {
        let draft = rect_cells_between(GridPoint::new(0, 0), GridPoint::new(3, 3));
        for (a, b) in [((1, 1), (5, 2)), ((-2, -2), (0, 0)), ((10, 10), (11, 12)), ((0, 0), (3, 3))] {
            let r = rect_cells_between(a.into(), b.into());
            assert_eq!(xor_toggle(&xor_toggle(&draft, &r), &r), draft);
        }
    }

    #[test]
    fn test_drag_over_again_subtracts() {
        let mut draft = Draft::new();
        draft.toggle_rect(GridPoint::new(0, 0), GridPoint::new(2, 2));
        draft.toggle_rect(GridPoint::new(1, 1), GridPoint::new(1, 1));
        assert_eq!(draft.cells().len(), 8);
        assert!(!draft.cells().contains(&GridPoint::new(1, 1)));
        assert_eq!(draft.bounds().unwrap(), CellRect::new(0, 0, 3, 3));
    }

    #[test]
    fn test_take_clears() {
        let mut draft = Draft::new();
        draft.toggle_rect(GridPoint::new(0, 0), GridPoint::new(1, 0));
        let cells = draft.take();
        assert_eq!(cells.len(), 2);
        assert!(draft.is_empty());
        assert!(draft.bounds().is_err());
    }
}
