//! Tool system for the floor-plan canvas.
//!
//! Exactly one tool is active at a time. Each drag moves through
//! `Idle -> (drag state) -> Idle`; the canvas decides whether the end of a drag
//! commits or cancels.

use crate::grid::{CellRect, GridPoint};
use crate::input::MouseButton;
use crate::model::{EntityId, Stair, StairDirection, StairKind};
use crate::ownership::RoomMove;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Room,
    Wall,
    Door,
    Window,
    Stair,
    Erase,
    Pan,
}

/// Whether a stair drag repositions or resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StairEditMode {
    Move,
    /// Dragging the far corner cell; the near corner stays fixed.
    Resize,
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// Camera pan driven by `button`.
    Panning { last: Point, button: MouseButton },
    /// Rectangle drag for the room draft or a new stair.
    DrawingRect { start: GridPoint, current: GridPoint },
    /// Dragging an existing room with its owned walls.
    MovingRoom {
        grab: GridPoint,
        current: GridPoint,
        plan: RoomMove,
    },
    DrawingWall { start: GridPoint, current: GridPoint },
    /// Door/window drag anchored to one wall.
    PlacingOpening {
        wall_id: EntityId,
        t_start: f64,
        t_current: f64,
    },
    EditingStair {
        stair_id: EntityId,
        grab: GridPoint,
        current: GridPoint,
        mode: StairEditMode,
    },
    /// Erase button held down.
    Erasing,
}

/// Settings applied to newly placed stairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub stair_kind: StairKind,
    pub stair_direction: StairDirection,
    pub target_level_id: Option<EntityId>,
}

/// Manages the current tool and its state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    pub settings: ToolSettings,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, abandoning any drag.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    /// Check if a drag is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }

    /// End the current interaction, returning its final state.
    pub fn take(&mut self) -> ToolState {
        std::mem::take(&mut self.state)
    }

    /// Build a new stair from two drag corners with the configured settings.
    pub fn new_stair(&self, a: GridPoint, b: GridPoint, link_id: String) -> Stair {
        let mut stair = Stair::new(
            CellRect::from_corners(a, b),
            self.settings.stair_kind,
            self.settings.stair_direction,
            link_id,
        );
        stair.target_level_id = self.settings.target_level_id.clone();
        stair
    }
}

/// Pick the edit mode for a press on `cell` inside `stair`'s rectangle.
pub fn stair_edit_mode(stair: &Stair, cell: GridPoint) -> StairEditMode {
    let far = GridPoint::new(stair.x + stair.width - 1, stair.y + stair.length - 1);
    if cell == far && (stair.width > 1 || stair.length > 1) {
        StairEditMode::Resize
    } else {
        StairEditMode::Move
    }
}

/// Stair after an edit drag from `grab` to `current`; id and link are kept.
pub fn edited_stair(stair: &Stair, mode: StairEditMode, grab: GridPoint, current: GridPoint) -> Stair {
    let mut edited = stair.clone();
    let dx = current.x - grab.x;
    let dy = current.y - grab.y;
    match mode {
        StairEditMode::Move => {
            edited.x += dx;
            edited.y += dy;
        }
        StairEditMode::Resize => {
            edited.width += dx;
            edited.length += dy;
        }
    }
    edited
}
