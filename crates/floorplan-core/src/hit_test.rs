//! Pointer-to-wall projection and opening placement.

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::model::Wall;
use kurbo::Point;

/// Nearest wall found under the pointer.
#[derive(Debug, Clone, Copy)]
pub struct WallHit<'a> {
    pub wall: &'a Wall,
    /// Parametric position along the wall, from `(x1, y1)` (0) to `(x2, y2)` (1).
    pub t: f64,
    /// Pixel distance from the pointer to the wall.
    pub distance: f64,
}

/// Project a point onto segment `a`-`b`. Returns the clamped parameter and the
/// distance to the clamped point.
pub fn project_onto_segment(p: Point, a: Point, b: Point) -> (f64, f64) {
    let ab = b - a;
    let len_sq = ab.hypot2();
    let t = if len_sq <= f64::EPSILON {
        0.0
    } else {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    };
    let closest = a + ab * t;
    (t, (p - closest).hypot())
}

/// Screen-space endpoints of a wall, viewport-local.
fn wall_segment(wall: &Wall, camera: &Camera, config: &EditorConfig) -> (Point, Point) {
    (
        camera.grid_to_screen(wall.start(), config.base_cell_size),
        camera.grid_to_screen(wall.end(), config.base_cell_size),
    )
}

/// Parametric position of the pointer along one specific wall.
pub fn wall_param(pointer: Point, wall: &Wall, camera: &Camera, config: &EditorConfig) -> f64 {
    let (a, b) = wall_segment(wall, camera, config);
    project_onto_segment(pointer, a, b).0
}

/// Closest wall within the zoom-scaled tolerance of a viewport-local pointer.
pub fn wall_at_point<'a>(
    pointer: Point,
    walls: impl IntoIterator<Item = &'a Wall>,
    camera: &Camera,
    config: &EditorConfig,
) -> Option<WallHit<'a>> {
    let tolerance = config.hit_tolerance(camera.zoom);
    let mut best: Option<WallHit<'a>> = None;
    for wall in walls {
        let (a, b) = wall_segment(wall, camera, config);
        let (t, distance) = project_onto_segment(pointer, a, b);
        if distance > tolerance {
            continue;
        }
        if best.is_none_or(|hit| distance < hit.distance) {
            best = Some(WallHit { wall, t, distance });
        }
    }
    best
}

/// Convert a parametric drag along a wall into a whole-cell opening segment
/// `[start, end)`.
///
/// The pair is ordered and clamped to `[0, 1]`, scaled by the wall length,
/// and the start floored and end ceiled. A zero-width drag yields no range.
pub fn opening_segment_range(wall: &Wall, t_start: f64, t_current: f64) -> Option<(i32, i32)> {
    let lo = t_start.min(t_current).clamp(0.0, 1.0);
    let hi = t_start.max(t_current).clamp(0.0, 1.0);
    if hi - lo <= f64::EPSILON {
        return None;
    }
    let length = f64::from(wall.length());
    let start = (lo * length).floor().max(0.0) as i32;
    let end = ((hi * length).ceil() as i32).min(wall.length());
    (end > start).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPoint;

    fn config() -> EditorConfig {
        EditorConfig {
            base_cell_size: 10.0,
            base_wall_thickness: 4.0,
            hit_tolerance_factor: 1.5,
            ..EditorConfig::default()
        }
    }

    #[test]
    fn test_projection_clamps() {
        let (t, d) = project_onto_segment(Point::new(-5.0, 0.0), Point::ZERO, Point::new(10.0, 0.0));
        assert_eq!(t, 0.0);
        assert!((d - 5.0).abs() < 1e-9);

        let (t, d) = project_onto_segment(Point::new(4.0, 3.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((t - 0.4).abs() < 1e-9);
        assert!((d - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_picks_nearest_wall_within_tolerance() {
        let walls = vec![
            Wall::with_id("a", GridPoint::new(0, 0), GridPoint::new(5, 0)),
            Wall::with_id("b", GridPoint::new(0, 1), GridPoint::new(5, 1)),
        ];
        let camera = Camera::new();
        // Tolerance is 4 * 1.5 = 6px; the pointer is 3px from "b" and 7px from "a".
        let hit = wall_at_point(Point::new(25.0, 7.0), &walls, &camera, &config()).unwrap();
        assert_eq!(hit.wall.id, "b");
        assert!((hit.t - 0.5).abs() < 1e-9);

        assert!(wall_at_point(Point::new(25.0, 30.0), &walls, &camera, &config()).is_none());
    }

    #[test]
    fn test_tolerance_grows_with_zoom() {
        let walls = vec![Wall::with_id("a", GridPoint::new(0, 0), GridPoint::new(5, 0))];
        let near = Camera::new();
        let zoomed = Camera { zoom: 2.0, ..Camera::new() };
        assert!(wall_at_point(Point::new(20.0, 8.0), &walls, &near, &config()).is_none());
        assert!(wall_at_point(Point::new(20.0, 8.0), &walls, &zoomed, &config()).is_some());
    }

    #[test]
    fn test_segment_range_snaps_to_cells() {
        let wall = Wall::with_id("w", GridPoint::new(0, 0), GridPoint::new(5, 0));
        assert_eq!(opening_segment_range(&wall, 0.45, 0.55), Some((2, 3)));
        assert_eq!(opening_segment_range(&wall, 0.55, 0.45), Some((2, 3)));
        assert_eq!(opening_segment_range(&wall, -0.5, 0.1), Some((0, 1)));
        assert_eq!(opening_segment_range(&wall, 0.9, 1.7), Some((4, 5)));
    }

    #[test]
    fn test_zero_width_drag_has_no_range() {
        let wall = Wall::with_id("w", GridPoint::new(0, 0), GridPoint::new(5, 0));
        for t in [0.0, 0.3, 0.5, 1.0] {
            assert_eq!(opening_segment_range(&wall, t, t), None);
        }
        // Both ends clamp to the same point.
        assert_eq!(opening_segment_range(&wall, 1.2, 1.8), None);
    }
}
