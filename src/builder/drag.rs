//! Drag-to-trash state machine
//!
//! Transitions:
//!
//! ```text
//! Idle --pointer_down(id)--> Dragging{id}
//! Dragging{id} --pointer_move(inside trash)--> OverTrash{id}
//! OverTrash{id} --pointer_move(outside trash)--> Dragging{id}
//! OverTrash{id} --drop--> Idle, yields id for deletion
//! Dragging{id} --drop--> Idle
//! * --cancel--> Idle
//! ```

/// Pointer position in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box of the trash drop zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Edge-inclusive containment.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// Where a card drag currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { id: String },
    OverTrash { id: String },
}

impl DragState {
    /// Starts dragging `id`. Ignored unless idle.
    pub fn pointer_down(&mut self, id: impl Into<String>) {
        if matches!(self, DragState::Idle) {
            *self = DragState::Dragging { id: id.into() };
        }
    }

    /// Tracks the pointer against the trash zone. No effect while idle.
    pub fn pointer_move(&mut self, point: Point, trash: Rect) {
        let over = trash.contains(point);
        let next = match std::mem::take(self) {
            DragState::Dragging { id } | DragState::OverTrash { id } if over => {
                DragState::OverTrash { id }
            }
            DragState::Dragging { id } | DragState::OverTrash { id } => DragState::Dragging { id },
            DragState::Idle => DragState::Idle,
        };
        *self = next;
    }

    /// Ends the drag. Returns the id to delete when released over the trash.
    pub fn drop(&mut self) -> Option<String> {
        match std::mem::take(self) {
            DragState::OverTrash { id } => Some(id),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    pub fn dragging_id(&self) -> Option<&str> {
        match self {
            DragState::Dragging { id } | DragState::OverTrash { id } => Some(id),
            DragState::Idle => None,
        }
    }

    pub fn is_over_trash(&self) -> bool {
        matches!(self, DragState::OverTrash { .. })
    }
}
