//! Camera module for mapping grid cells to screen pixels.
//!
//! Every operation is pure: it returns a new [`Camera`] instead of mutating
//! the current one.

use crate::grid::GridPoint;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom bounds applied by [`Camera::zoom_at_point`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

/// Pan offset (pixels, relative to the viewport origin) and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub offset: Vec2,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixel size of one cell at the current zoom.
    pub fn cell_size(&self, base_cell_size: f64) -> f64 {
        base_cell_size * self.zoom
    }

    /// Cell under a screen position.
    pub fn screen_to_grid(&self, screen: Point, viewport: Rect, base_cell_size: f64) -> GridPoint {
        let size = self.cell_size(base_cell_size);
        let local_x = screen.x - viewport.x0;
        let local_y = screen.y - viewport.y0;
        GridPoint::new(
            ((local_x - self.offset.x) / size).floor() as i32,
            ((local_y - self.offset.y) / size).floor() as i32,
        )
    }

    /// Viewport-local pixel position of a grid vertex.
    pub fn grid_to_screen(&self, vertex: GridPoint, base_cell_size: f64) -> Point {
        let size = self.cell_size(base_cell_size);
        Point::new(
            self.offset.x + f64::from(vertex.x) * size,
            self.offset.y + f64::from(vertex.y) * size,
        )
    }

    /// Viewport-local pixel rectangle between two grid vertices, in either order.
    pub fn grid_to_screen_rect(&self, x1: i32, y1: i32, x2: i32, y2: i32, base_cell_size: f64) -> Rect {
        let size = self.cell_size(base_cell_size);
        let x = self.offset.x + f64::from(x1.min(x2)) * size;
        let y = self.offset.y + f64::from(y1.min(y2)) * size;
        let w = f64::from((x2 - x1).abs()) * size;
        let h = f64::from((y2 - y1).abs()) * size;
        Rect::new(x, y, x + w, y + h)
    }

    /// Zoom one step around the pointer.
    ///
    /// A negative wheel delta (scrolling up) zooms in by `step`, a positive one
    /// zooms out by `1 / step`. The world point under the pointer stays at the
    /// same pixel.
    #[must_use]
    pub fn zoom_at_point(&self, wheel_delta: f64, pointer: Point, viewport: Rect, limits: ZoomLimits, step: f64) -> Self {
        let factor = if wheel_delta < 0.0 {
            step
        } else if wheel_delta > 0.0 {
            1.0 / step
        } else {
            return *self;
        };
        let new_zoom = (self.zoom * factor).clamp(limits.min, limits.max);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return *self;
        }

        let local = Vec2::new(pointer.x - viewport.x0, pointer.y - viewport.y0);
        // World point (in base pixels) under the pointer before the zoom
        let world = (local - self.offset) / self.zoom;
        Self {
            offset: local - world * new_zoom,
            zoom: new_zoom,
        }
    }

    #[must_use]
    pub fn pan(&self, dx: f64, dy: f64) -> Self {
        Self {
            offset: self.offset + Vec2::new(dx, dy),
            zoom: self.zoom,
        }
    }
}
