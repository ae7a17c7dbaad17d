//! Shape derivation: bounding boxes, perimeter walls, circle footprints.
//!
//! Perimeters are traced per cell (an edge is emitted wherever the neighbour
//! is outside the set) and then merged so that no two collinear walls touch
//! end to end. Hit testing and room-move ownership both rely on that
//! minimality.

use crate::grid::{CellRect, CellSet, GridPoint};
use crate::model::{EntityId, Room, Wall, WallKey};
use std::collections::BTreeMap;
use thiserror::Error;

/// A geometric entity could not be constructed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    #[error("wall has zero length")]
    ZeroLengthWall,
    #[error("wall is not axis-aligned")]
    DiagonalWall,
    #[error("stair must have positive size, got {width}x{length}")]
    NonPositiveStair { width: i32, length: i32 },
    #[error("circle radius must be positive")]
    NonPositiveRadius,
    #[error("circle radius {radius} exceeds the limit of {max} cells")]
    RadiusTooLarge { radius: f64, max: f64 },
    #[error("cell set is empty")]
    EmptyCellSet,
    #[error("room has no area")]
    EmptyRoom,
    #[error("opening [{seg_start}, {seg_end}) does not fit a wall of length {wall_length}")]
    InvalidOpening {
        seg_start: i32,
        seg_end: i32,
        wall_length: i32,
    },
}

/// Min/max bounding box of a non-empty cell set.
pub fn bounding_box(cells: &CellSet) -> Result<CellRect, GeometryError> {
    let first = cells.iter().next().ok_or(GeometryError::EmptyCellSet)?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for c in cells {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }
    Ok(CellRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Unit boundary edges of a cell set, before merging.
///
/// Horizontal edges are keyed by row (the grid line's y) and hold the x of
/// their left vertex; vertical edges are keyed by column and hold the y of
/// their top vertex.
#[derive(Debug, Default)]
struct BoundaryEdges {
    horizontal: BTreeMap<i32, Vec<i32>>,
    vertical: BTreeMap<i32, Vec<i32>>,
}

fn boundary_edges(cells: &CellSet) -> BoundaryEdges {
    let mut edges = BoundaryEdges::default();
    for &GridPoint { x, y } in cells {
        let outside = |dx: i32, dy: i32| !cells.contains(&GridPoint::new(x + dx, y + dy));
        if outside(0, -1) {
            edges.horizontal.entry(y).or_default().push(x);
        }
        if outside(0, 1) {
            edges.horizontal.entry(y + 1).or_default().push(x);
        }
        if outside(-1, 0) {
            edges.vertical.entry(x).or_default().push(y);
        }
        if outside(1, 0) {
            edges.vertical.entry(x + 1).or_default().push(y);
        }
    }
    edges
}

/// Merge sorted unit-edge starts into maximal `(start, end)` runs.
fn merge_runs(mut starts: Vec<i32>) -> Vec<(i32, i32)> {
    starts.sort_unstable();
    starts.dedup();
    let mut runs: Vec<(i32, i32)> = Vec::new();
    for s in starts {
        match runs.last_mut() {
            Some((_, end)) if *end == s => *end = s + 1,
            _ => runs.push((s, s + 1)),
        }
    }
    runs
}

/// The minimal merged wall set bounding a cell set, as normalized keys.
pub fn perimeter_keys(cells: &CellSet) -> Vec<WallKey> {
    let edges = boundary_edges(cells);
    let mut keys = Vec::new();
    for (y, starts) in edges.horizontal {
        for (x0, x1) in merge_runs(starts) {
            keys.push(WallKey::new(GridPoint::new(x0, y), GridPoint::new(x1, y)));
        }
    }
    for (x, starts) in edges.vertical {
        for (y0, y1) in merge_runs(starts) {
            keys.push(WallKey::new(GridPoint::new(x, y0), GridPoint::new(x, y1)));
        }
    }
    keys
}

/// The minimal merged wall set bounding a non-empty cell set. Walls carry no
/// ids; the commit pipeline assigns them.
pub fn perimeter_walls(cells: &CellSet) -> Result<Vec<Wall>, GeometryError> {
    if cells.is_empty() {
        return Err(GeometryError::EmptyCellSet);
    }
    Ok(perimeter_keys(cells)
        .into_iter()
        .map(|k| Wall::between(k.a, k.b))
        .collect())
}

/// Largest radius, in cells, a circle footprint may be derived from.
pub const MAX_CIRCLE_RADIUS: f64 = 512.0;

/// Cells whose centres lie within `radius` cells of the centre cell's centre.
///
/// Cells on the outermost row or column of the `i32` grid are left out, so
/// every neighbour and vertex of a returned cell is addressable.
pub fn circle_cells(center: GridPoint, radius: f64) -> Result<CellSet, GeometryError> {
    if radius.is_nan() || radius <= 0.0 {
        return Err(GeometryError::NonPositiveRadius);
    }
    if radius > MAX_CIRCLE_RADIUS {
        return Err(GeometryError::RadiusTooLarge {
            radius,
            max: MAX_CIRCLE_RADIUS,
        });
    }
    let reach = radius.ceil() as i64;
    let r2 = radius * radius;
    let shifted = |base: i32, d: i64| {
        i32::try_from(i64::from(base) + d)
            .ok()
            .filter(|v| *v > i32::MIN && *v < i32::MAX)
    };
    let cells: CellSet = (-reach..=reach)
        .flat_map(|dy| (-reach..=reach).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| (dx * dx + dy * dy) as f64 <= r2)
        .filter_map(|(dx, dy)| Some(GridPoint::new(shifted(center.x, dx)?, shifted(center.y, dy)?)))
        .collect();
    if cells.is_empty() {
        return Err(GeometryError::EmptyCellSet);
    }
    Ok(cells)
}

/// First room (other than `skip`) whose bounding rectangle overlaps `candidate`.
/// Rectangles that only touch along an edge never overlap.
pub fn find_overlap<'a>(
    candidate: &CellRect,
    rooms: impl IntoIterator<Item = &'a Room>,
    skip: Option<&EntityId>,
) -> Option<&'a Room> {
    rooms
        .into_iter()
        .filter(|r| skip != Some(&r.id))
        .find(|r| r.bounds().overlaps(candidate))
}
