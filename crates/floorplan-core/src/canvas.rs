//! Canvas session: one level's geometry plus the interaction state around it.
//!
//! The session owns the camera, the active tool and its drag, the room draft
//! and the hover cell. Pointer and key handlers are the only way in; every
//! geometry change they cause goes through the [`CommitPipeline`].

use crate::camera::{Camera, ZoomLimits};
use crate::commit::{CommitError, CommitPipeline};
use crate::config::EditorConfig;
use crate::geometry;
use crate::grid::GridPoint;
use crate::hit_test;
use crate::input::{KeyEvent, MouseButton, PointerEvent, keys};
use crate::model::{FloorGeometry, Opening, Room, Wall};
use crate::ownership::{self, RoomMove};
use crate::selection::Draft;
use crate::snap;
use crate::tools::{self, ToolKind, ToolManager, ToolState};
use kurbo::{Point, Rect};

/// Observable outcome of an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// The level geometry was replaced by a committed version.
    GeometryCommitted,
    /// A proposed change was rejected; geometry is unchanged.
    Rejected(CommitError),
    /// The room draft changed (toggled, confirmed away or cancelled).
    DraftChanged,
}

/// An interactive editing session over one level.
#[derive(Debug)]
pub struct Canvas {
    /// Committed geometry of the level being edited.
    pub geometry: FloorGeometry,
    pub camera: Camera,
    /// Canvas area in window pixels.
    pub viewport: Rect,
    pub config: EditorConfig,
    pub tools: ToolManager,
    pub draft: Draft,
    /// Cell under the pointer, if the pointer is over the canvas.
    pub hover: Option<GridPoint>,
    pipeline: CommitPipeline,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Canvas {
    /// Create an empty session with UUID ids.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_pipeline(config, CommitPipeline::default())
    }

    /// Create an empty session committing through `pipeline`.
    pub fn with_pipeline(config: EditorConfig, pipeline: CommitPipeline) -> Self {
        Self {
            geometry: FloorGeometry::new(),
            camera: Camera::new(),
            viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
            config,
            tools: ToolManager::new(),
            draft: Draft::new(),
            hover: None,
            pipeline,
        }
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Replace the level geometry wholesale, e.g. after a remote update.
    ///
    /// Any drag in progress refers to the old geometry and is dropped.
    pub fn load_geometry(&mut self, geometry: FloorGeometry) {
        self.tools.cancel();
        self.geometry = geometry;
    }

    /// Switch tools. Any drag and the draft are abandoned.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
        self.draft.clear();
    }

    fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.config.min_zoom,
            max: self.config.max_zoom,
        }
    }

    /// Grid cell under a window-pixel position.
    pub fn cell_at(&self, position: Point) -> GridPoint {
        self.camera.screen_to_grid(position, self.viewport, self.config.base_cell_size)
    }

    /// Window-pixel position relative to the viewport origin.
    fn local(&self, position: Point) -> Point {
        Point::new(position.x - self.viewport.x0, position.y - self.viewport.y0)
    }

    /// Dispatch a pointer event to the matching handler.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Option<CanvasEvent> {
        match event {
            PointerEvent::Down { position, button } => self.pointer_down(position, button),
            PointerEvent::Up { position, button } => self.pointer_up(position, button),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Scroll { position, delta } => {
                self.wheel(position, delta.y);
                None
            }
            PointerEvent::Leave => {
                self.pointer_leave();
                None
            }
        }
    }

    /// Enter confirms the draft, Escape cancels the drag and the draft.
    pub fn handle_key_event(&mut self, event: KeyEvent) -> Option<CanvasEvent> {
        let KeyEvent::Pressed(key) = event else {
            return None;
        };
        match key.as_str() {
            keys::ENTER => self.confirm_draft(),
            keys::ESCAPE => {
                self.tools.cancel();
                self.cancel_draft()
            }
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, position: Point, button: MouseButton) -> Option<CanvasEvent> {
        // A drag holds the tool until it ends.
        if self.tools.is_active() {
            return None;
        }
        if button.is_pan_button() || self.tools.current_tool == ToolKind::Pan {
            self.tools.state = ToolState::Panning { last: position, button };
            return None;
        }

        let cell = self.cell_at(position);
        self.hover = Some(cell);
        match self.tools.current_tool {
            ToolKind::Room => {
                let plan = self
                    .geometry
                    .room_at(cell)
                    .and_then(|room| RoomMove::begin(&self.geometry, &room.id));
                self.tools.state = match plan {
                    Some(plan) => ToolState::MovingRoom {
                        grab: cell,
                        current: cell,
                        plan,
                    },
                    None => ToolState::DrawingRect {
                        start: cell,
                        current: cell,
                    },
                };
                None
            }
            ToolKind::Wall => {
                self.tools.state = ToolState::DrawingWall {
                    start: cell,
                    current: cell,
                };
                None
            }
            ToolKind::Door | ToolKind::Window => {
                let local = self.local(position);
                if let Some(hit) = hit_test::wall_at_point(local, self.geometry.walls.values(), &self.camera, &self.config) {
                    self.tools.state = ToolState::PlacingOpening {
                        wall_id: hit.wall.id.clone(),
                        t_start: hit.t,
                        t_current: hit.t,
                    };
                }
                None
            }
            ToolKind::Stair => {
                self.tools.state = match self.geometry.stair_at(cell) {
                    Some(stair) => ToolState::EditingStair {
                        stair_id: stair.id.clone(),
                        grab: cell,
                        current: cell,
                        mode: tools::stair_edit_mode(stair, cell),
                    },
                    None => ToolState::DrawingRect {
                        start: cell,
                        current: cell,
                    },
                };
                None
            }
            ToolKind::Erase => {
                self.tools.state = ToolState::Erasing;
                self.erase_at(position)
            }
            ToolKind::Pan => None,
        }
    }

    pub fn pointer_move(&mut self, position: Point) -> Option<CanvasEvent> {
        let cell = self.cell_at(position);
        let local = self.local(position);
        self.hover = Some(cell);

        if matches!(self.tools.state, ToolState::Erasing) {
            return self.erase_at(position);
        }
        match &mut self.tools.state {
            ToolState::Panning { last, .. } => {
                self.camera = self.camera.pan(position.x - last.x, position.y - last.y);
                *last = position;
            }
            ToolState::DrawingRect { current, .. }
            | ToolState::DrawingWall { current, .. }
            | ToolState::MovingRoom { current, .. }
            | ToolState::EditingStair { current, .. } => *current = cell,
            ToolState::PlacingOpening { wall_id, t_current, .. } => {
                if let Some(wall) = self.geometry.walls.get(wall_id.as_str()) {
                    *t_current = hit_test::wall_param(local, wall, &self.camera, &self.config);
                }
            }
            ToolState::Idle | ToolState::Erasing => {}
        }
        None
    }

    pub fn pointer_up(&mut self, position: Point, button: MouseButton) -> Option<CanvasEvent> {
        if let ToolState::Panning { button: pan_button, .. } = self.tools.state {
            if pan_button == button {
                self.tools.cancel();
            }
            return None;
        }
        if button != MouseButton::Left {
            return None;
        }

        let cell = self.cell_at(position);
        let local = self.local(position);
        match self.tools.take() {
            ToolState::DrawingRect { start, .. } if self.tools.current_tool == ToolKind::Stair => {
                let link_id = self.pipeline.next_id();
                let stair = self.tools.new_stair(start, cell, link_id);
                let mut proposed = self.geometry.clone();
                proposed.insert_stair(stair);
                self.commit(proposed)
            }
            ToolState::DrawingRect { start, .. } => {
                self.draft.toggle_rect(start, cell);
                Some(CanvasEvent::DraftChanged)
            }
            ToolState::MovingRoom { grab, plan, .. } => {
                let proposed = plan.apply(&self.geometry, cell.x - grab.x, cell.y - grab.y)?;
                self.commit(proposed)
            }
            ToolState::DrawingWall { start, .. } => {
                if cell == start {
                    return None;
                }
                let end = snap::snap_to_axis(start, cell).point;
                let mut proposed = self.geometry.clone();
                proposed.insert_wall(Wall::between(start, end));
                self.commit(proposed)
            }
            ToolState::PlacingOpening { wall_id, t_start, .. } => {
                let wall = self.geometry.walls.get(&wall_id)?;
                let t_end = hit_test::wall_param(local, wall, &self.camera, &self.config);
                let Some((seg_start, seg_end)) = hit_test::opening_segment_range(wall, t_start, t_end) else {
                    log::debug!("opening on {wall_id} discarded: empty range");
                    return None;
                };
                let mut proposed = self.geometry.clone();
                let opening = Opening::new(wall_id, seg_start, seg_end);
                if self.tools.current_tool == ToolKind::Window {
                    proposed.insert_window(opening);
                } else {
                    proposed.insert_door(opening);
                }
                self.commit(proposed)
            }
            ToolState::EditingStair {
                stair_id, grab, mode, ..
            } => {
                let stair = self.geometry.stairs.get(&stair_id)?;
                let edited = tools::edited_stair(stair, mode, grab, cell);
                if &edited == stair {
                    return None;
                }
                let mut proposed = self.geometry.clone();
                proposed.stairs.insert(stair_id, edited);
                self.commit(proposed)
            }
            ToolState::Erasing | ToolState::Panning { .. } | ToolState::Idle => None,
        }
    }

    /// The pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        if matches!(
            self.tools.state,
            ToolState::Panning { .. } | ToolState::MovingRoom { .. } | ToolState::EditingStair { .. } | ToolState::Erasing
        ) {
            self.tools.cancel();
        }
        self.hover = None;
    }

    /// Zoom around the pointer.
    pub fn wheel(&mut self, position: Point, delta: f64) {
        self.camera = self
            .camera
            .zoom_at_point(delta, position, self.viewport, self.zoom_limits(), self.config.zoom_step);
    }

    /// Commit the draft as a room with its merged perimeter walls.
    ///
    /// The draft is consumed whether or not the commit succeeds.
    pub fn confirm_draft(&mut self) -> Option<CanvasEvent> {
        if self.draft.is_empty() {
            return None;
        }
        let cells = self.draft.take();
        let built = Room::from_cells(&cells).and_then(|room| Ok((room, geometry::perimeter_walls(&cells)?)));
        let (room, walls) = match built {
            Ok(parts) => parts,
            Err(err) => return Some(CanvasEvent::Rejected(err.into())),
        };
        let mut proposed = self.geometry.clone();
        proposed.insert_room(room);
        for wall in walls {
            proposed.insert_wall(wall);
        }
        self.commit(proposed)
    }

    pub fn cancel_draft(&mut self) -> Option<CanvasEvent> {
        if self.draft.is_empty() {
            return None;
        }
        self.draft.clear();
        Some(CanvasEvent::DraftChanged)
    }

    /// Commit a circle-derived room and its perimeter.
    pub fn place_circle_room(&mut self, center: GridPoint, radius: f64) -> Option<CanvasEvent> {
        let built = Room::circle(center, radius).and_then(|room| {
            let walls = geometry::perimeter_walls(&room.cells())?;
            Ok((room, walls))
        });
        let (room, walls) = match built {
            Ok(parts) => parts,
            Err(err) => return Some(CanvasEvent::Rejected(err.into())),
        };
        let mut proposed = self.geometry.clone();
        proposed.insert_room(room);
        for wall in walls {
            proposed.insert_wall(wall);
        }
        self.commit(proposed)
    }

    /// Viewport-local rectangle around the draft where confirm/cancel controls go.
    pub fn draft_affordance(&self) -> Option<Rect> {
        let bounds = self.draft.bounds().ok()?;
        Some(self.camera.grid_to_screen_rect(
            bounds.x,
            bounds.y,
            bounds.right(),
            bounds.bottom(),
            self.config.base_cell_size,
        ))
    }

    /// Remove the first entity under the pointer: stair, then wall, then room.
    fn erase_at(&mut self, position: Point) -> Option<CanvasEvent> {
        let cell = self.cell_at(position);
        let local = self.local(position);
        let mut proposed = self.geometry.clone();

        if let Some(stair) = self.geometry.stair_at(cell) {
            proposed.stairs.remove(&stair.id);
        } else if let Some(hit) =
            hit_test::wall_at_point(local, self.geometry.walls.values(), &self.camera, &self.config)
        {
            let cascaded = self.geometry.openings_on(&hit.wall.id).count();
            log::debug!("erasing wall {} and {cascaded} openings", hit.wall.id);
            proposed.walls.remove(&hit.wall.id);
        } else if let Some(room) = self.geometry.room_at(cell) {
            for wall_id in ownership::owned_walls(&self.geometry, &room.id) {
                proposed.walls.remove(&wall_id);
            }
            proposed.rooms.remove(&room.id);
        } else {
            return None;
        }
        self.commit(proposed)
    }

    fn commit(&mut self, proposed: FloorGeometry) -> Option<CanvasEvent> {
        match self.pipeline.commit(&self.geometry, proposed) {
            Ok(committed) => {
                self.geometry = committed;
                Some(CanvasEvent::GeometryCommitted)
            }
            Err(err) => {
                log::debug!("change rejected: {err}");
                Some(CanvasEvent::Rejected(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryError;
    use crate::grid::CellRect;
    use crate::ids::SequentialIds;
    use crate::model::WallKey;
    use kurbo::Vec2;

    const CELL: f64 = 24.0;

    fn canvas() -> Canvas {
        Canvas::with_pipeline(EditorConfig::default(), CommitPipeline::new(SequentialIds::new("id")))
    }

    /// Window position of a cell's centre with the default camera.
    fn at(x: i32, y: i32) -> Point {
        Point::new((f64::from(x) + 0.5) * CELL, (f64::from(y) + 0.5) * CELL)
    }

    fn drag(canvas: &mut Canvas, from: Point, to: Point) -> Option<CanvasEvent> {
        canvas.pointer_down(from, MouseButton::Left);
        canvas.pointer_move(to);
        canvas.pointer_up(to, MouseButton::Left)
    }

    fn draft_room(canvas: &mut Canvas, a: (i32, i32), b: (i32, i32)) -> Option<CanvasEvent> {
        canvas.set_tool(ToolKind::Room);
        drag(canvas, at(a.0, a.1), at(b.0, b.1));
        canvas.handle_key_event(KeyEvent::Pressed(keys::ENTER.into()))
    }

    fn has_wall(canvas: &Canvas, a: (i32, i32), b: (i32, i32)) -> bool {
        canvas.geometry.wall_by_key(WallKey::new(a.into(), b.into())).is_some()
    }

    #[test]
    fn test_square_draft_commits_four_walls() {
        let mut canvas = canvas();
        assert_eq!(draft_room(&mut canvas, (0, 0), (1, 1)), Some(CanvasEvent::GeometryCommitted));

        assert_eq!(canvas.geometry.rooms.len(), 1);
        assert_eq!(canvas.geometry.walls.len(), 4);
        assert!(canvas.geometry.doors.is_empty());
        assert!(canvas.geometry.windows.is_empty());
        assert!(has_wall(&canvas, (0, 0), (2, 0)));
        assert!(has_wall(&canvas, (2, 0), (2, 2)));
        assert!(canvas.draft.is_empty());
    }

    #[test]
    fn test_second_drag_subtracts_from_draft() {
        let mut canvas = canvas();
        drag(&mut canvas, at(0, 0), at(2, 2));
        assert_eq!(canvas.draft.cells().len(), 9);
        drag(&mut canvas, at(2, 2), at(2, 2));
        assert_eq!(canvas.draft.cells().len(), 8);

        let affordance = canvas.draft_affordance().unwrap();
        assert_eq!(affordance, Rect::new(0.0, 0.0, 3.0 * CELL, 3.0 * CELL));
    }

    #[test]
    fn test_escape_and_tool_switch_clear_draft() {
        let mut canvas = canvas();
        drag(&mut canvas, at(0, 0), at(1, 0));
        assert_eq!(
            canvas.handle_key_event(KeyEvent::Pressed(keys::ESCAPE.into())),
            Some(CanvasEvent::DraftChanged)
        );
        assert!(canvas.draft.is_empty());

        drag(&mut canvas, at(0, 0), at(1, 0));
        canvas.set_tool(ToolKind::Wall);
        assert!(canvas.draft.is_empty());
        assert!(canvas.geometry.is_empty());
    }

    #[test]
    fn test_overlapping_draft_is_cleared_without_change() {
        let mut canvas = canvas();
        draft_room(&mut canvas, (0, 0), (2, 2));
        let before = canvas.geometry.clone();

        let event = draft_room(&mut canvas, (5, 5), (1, 1));
        assert!(matches!(event, Some(CanvasEvent::Rejected(CommitError::Overlap { .. }))));
        assert_eq!(canvas.geometry, before);
        assert!(canvas.draft.is_empty());
        assert!(!canvas.tools.is_active());
    }

    #[test]
    fn test_wall_drag_snaps_to_axis() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Wall);
        assert_eq!(drag(&mut canvas, at(0, 0), at(5, 2)), Some(CanvasEvent::GeometryCommitted));
        assert!(has_wall(&canvas, (0, 0), (5, 0)));

        // A click without movement commits nothing.
        assert_eq!(drag(&mut canvas, at(3, 3), at(3, 3)), None);
        assert_eq!(canvas.geometry.walls.len(), 1);
    }

    #[test]
    fn test_door_snaps_to_cells_and_cascades_on_erase() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Wall);
        drag(&mut canvas, at(0, 0), at(5, 0));

        canvas.set_tool(ToolKind::Door);
        let from = Point::new(2.2 * CELL, 0.2 * CELL);
        let to = Point::new(2.8 * CELL, 0.2 * CELL);
        assert_eq!(drag(&mut canvas, from, to), Some(CanvasEvent::GeometryCommitted));
        let door = canvas.geometry.doors.values().next().unwrap();
        assert_eq!((door.seg_start, door.seg_end), (2, 3));

        // A press away from any wall starts nothing.
        assert_eq!(drag(&mut canvas, at(2, 6), at(3, 6)), None);

        canvas.set_tool(ToolKind::Erase);
        canvas.pointer_down(Point::new(1.0 * CELL, 2.0), MouseButton::Left);
        canvas.pointer_up(Point::new(1.0 * CELL, 2.0), MouseButton::Left);
        assert!(canvas.geometry.walls.is_empty());
        assert!(canvas.geometry.doors.is_empty());
    }

    #[test]
    fn test_zero_width_window_drag_is_discarded() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Wall);
        drag(&mut canvas, at(0, 0), at(4, 0));
        canvas.set_tool(ToolKind::Window);
        let p = Point::new(1.5 * CELL, 0.2 * CELL);
        assert_eq!(drag(&mut canvas, p, p), None);
        assert!(canvas.geometry.windows.is_empty());
    }

    #[test]
    fn test_moving_room_leaves_shared_wall() {
        let mut canvas = canvas();
        draft_room(&mut canvas, (0, 0), (0, 0));
        draft_room(&mut canvas, (1, 0), (1, 0));
        assert_eq!(canvas.geometry.walls.len(), 7);

        canvas.set_tool(ToolKind::Room);
        assert_eq!(drag(&mut canvas, at(0, 0), at(0, 1)), Some(CanvasEvent::GeometryCommitted));

        let moved = canvas.geometry.room_at(GridPoint::new(0, 1)).unwrap();
        assert_eq!(moved.bounds(), CellRect::new(0, 1, 1, 1));
        assert!(has_wall(&canvas, (1, 0), (1, 1)));
        assert!(has_wall(&canvas, (0, 2), (1, 2)));
        assert!(!has_wall(&canvas, (0, 0), (0, 1)));
        assert!(canvas.draft.is_empty());
    }

    #[test]
    fn test_leave_cancels_room_move() {
        let mut canvas = canvas();
        draft_room(&mut canvas, (0, 0), (1, 1));
        let before = canvas.geometry.clone();

        canvas.pointer_down(at(0, 0), MouseButton::Left);
        canvas.pointer_move(at(4, 4));
        canvas.handle_pointer_event(PointerEvent::Leave);
        assert!(canvas.hover.is_none());
        assert_eq!(canvas.pointer_up(at(4, 4), MouseButton::Left), None);
        assert_eq!(canvas.geometry, before);
    }

    #[test]
    fn test_leave_cancels_stair_edit() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Stair);
        drag(&mut canvas, at(0, 0), at(1, 1));
        let before = canvas.geometry.clone();

        canvas.pointer_down(at(0, 0), MouseButton::Left);
        canvas.pointer_move(at(3, 3));
        canvas.pointer_leave();
        assert!(!canvas.tools.is_active());
        assert!(canvas.hover.is_none());
        assert_eq!(canvas.pointer_up(at(3, 3), MouseButton::Left), None);
        assert_eq!(canvas.geometry, before);
    }

    #[test]
    fn test_leave_ends_pan() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Pan);
        canvas.pointer_down(Point::new(0.0, 0.0), MouseButton::Left);
        canvas.pointer_move(Point::new(10.0, 0.0));
        canvas.pointer_leave();
        assert!(!canvas.tools.is_active());

        canvas.pointer_move(Point::new(50.0, 20.0));
        assert_eq!(canvas.camera.offset, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_leave_stops_erase_sweep() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Stair);
        drag(&mut canvas, at(0, 0), at(0, 0));
        drag(&mut canvas, at(3, 0), at(3, 0));

        canvas.set_tool(ToolKind::Erase);
        canvas.pointer_down(at(0, 0), MouseButton::Left);
        assert_eq!(canvas.geometry.stairs.len(), 1);
        canvas.pointer_leave();
        canvas.pointer_move(at(3, 0));
        assert_eq!(canvas.geometry.stairs.len(), 1);
    }

    #[test]
    fn test_middle_button_pans_over_any_tool() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Wall);
        canvas.pointer_down(Point::new(10.0, 10.0), MouseButton::Middle);
        canvas.pointer_move(Point::new(30.0, 5.0));
        canvas.pointer_up(Point::new(30.0, 5.0), MouseButton::Middle);
        assert_eq!(canvas.camera.offset, Vec2::new(20.0, -5.0));
        assert!(canvas.geometry.walls.is_empty());
        assert!(!canvas.tools.is_active());
    }

    #[test]
    fn test_pan_tool_with_left_button() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Pan);
        drag(&mut canvas, Point::new(0.0, 0.0), Point::new(-12.0, 8.0));
        assert_eq!(canvas.camera.offset, Vec2::new(-12.0, 8.0));
    }

    #[test]
    fn test_scroll_zooms_in() {
        let mut canvas = canvas();
        canvas.handle_pointer_event(PointerEvent::Scroll {
            position: Point::new(100.0, 100.0),
            delta: Vec2::new(0.0, -1.0),
        });
        assert!((canvas.camera.zoom - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_stair_draw_then_move_keeps_identity() {
        let mut canvas = canvas();
        canvas.tools.settings.target_level_id = Some("upper".into());
        canvas.set_tool(ToolKind::Stair);
        assert_eq!(drag(&mut canvas, at(1, 2), at(0, 0)), Some(CanvasEvent::GeometryCommitted));

        let stair = canvas.geometry.stairs.values().next().unwrap().clone();
        assert_eq!(stair.bounds(), CellRect::new(0, 0, 2, 3));
        assert!(!stair.link_id.is_empty());
        assert_eq!(stair.target_level_id.as_deref(), Some("upper"));

        drag(&mut canvas, at(0, 0), at(3, 0));
        let moved = &canvas.geometry.stairs[&stair.id];
        assert_eq!(moved.bounds(), CellRect::new(3, 0, 2, 3));
        assert_eq!(moved.link_id, stair.link_id);
    }

    #[test]
    fn test_stair_resize_to_nothing_is_rejected() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Stair);
        drag(&mut canvas, at(0, 0), at(1, 1));
        let before = canvas.geometry.clone();

        let event = drag(&mut canvas, at(1, 1), at(-1, 1));
        assert!(matches!(
            event,
            Some(CanvasEvent::Rejected(CommitError::Construction(GeometryError::NonPositiveStair { .. })))
        ));
        assert_eq!(canvas.geometry, before);
    }

    #[test]
    fn test_erase_priority_stair_then_room() {
        let mut canvas = canvas();
        draft_room(&mut canvas, (0, 0), (3, 3));
        canvas.set_tool(ToolKind::Stair);
        drag(&mut canvas, at(1, 1), at(1, 1));
        assert_eq!(canvas.geometry.stairs.len(), 1);

        canvas.set_tool(ToolKind::Erase);
        canvas.pointer_down(at(1, 1), MouseButton::Left);
        canvas.pointer_up(at(1, 1), MouseButton::Left);
        assert!(canvas.geometry.stairs.is_empty());
        assert_eq!(canvas.geometry.rooms.len(), 1);

        canvas.pointer_down(at(1, 1), MouseButton::Left);
        canvas.pointer_up(at(1, 1), MouseButton::Left);
        assert!(canvas.geometry.rooms.is_empty());
        assert!(canvas.geometry.walls.is_empty());
    }

    #[test]
    fn test_erase_sweeps_while_held() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Stair);
        drag(&mut canvas, at(0, 0), at(0, 0));
        drag(&mut canvas, at(3, 0), at(3, 0));

        canvas.set_tool(ToolKind::Erase);
        canvas.pointer_down(at(0, 0), MouseButton::Left);
        canvas.pointer_move(at(3, 0));
        canvas.pointer_up(at(3, 0), MouseButton::Left);
        assert!(canvas.geometry.stairs.is_empty());

        // Moving without the button held erases nothing.
        canvas.set_tool(ToolKind::Stair);
        drag(&mut canvas, at(5, 5), at(5, 5));
        canvas.set_tool(ToolKind::Erase);
        canvas.pointer_move(at(5, 5));
        assert_eq!(canvas.geometry.stairs.len(), 1);
    }

    #[test]
    fn test_circle_room_placement() {
        let mut canvas = canvas();
        assert_eq!(
            canvas.place_circle_room(GridPoint::new(0, 0), 2.0),
            Some(CanvasEvent::GeometryCommitted)
        );
        let room = canvas.geometry.rooms.values().next().unwrap();
        assert_eq!(room.cells().len(), 13);
        assert!(!canvas.geometry.walls.is_empty());

        assert_eq!(
            canvas.place_circle_room(GridPoint::new(10, 10), 0.0),
            Some(CanvasEvent::Rejected(CommitError::Construction(GeometryError::NonPositiveRadius)))
        );
        assert!(matches!(
            canvas.place_circle_room(GridPoint::new(0, 0), 50_000.0),
            Some(CanvasEvent::Rejected(CommitError::Construction(GeometryError::RadiusTooLarge { .. })))
        ));
        assert_eq!(canvas.geometry.rooms.len(), 1);
    }

    #[test]
    fn test_drawn_wall_keeps_loaded_ids() {
        let mut canvas = canvas();
        let mut loaded = FloorGeometry::new();
        loaded.insert_wall(Wall::with_id("id1", (0, 5).into(), (4, 5).into()));
        canvas.load_geometry(loaded);

        canvas.set_tool(ToolKind::Wall);
        assert_eq!(drag(&mut canvas, at(0, 0), at(3, 0)), Some(CanvasEvent::GeometryCommitted));
        assert_eq!(canvas.geometry.walls.len(), 2);
        assert!(has_wall(&canvas, (0, 5), (4, 5)));
        assert_eq!(canvas.geometry.walls["id1"].end(), GridPoint::new(4, 5));
        assert!(has_wall(&canvas, (0, 0), (3, 0)));
    }
}
