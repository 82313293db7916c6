//! Draw command definitions.

use crate::widgets::{Color, Rect};

/// A single draw operation in window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Restrict subsequent commands to `rect` (intersected with any
    /// enclosing clip).
    PushClip { rect: Rect },
    /// Undo the matching `PushClip`.
    PopClip,
    /// Fill a rectangle with a solid color.
    FillRect { rect: Rect, color: Color },
    /// Draw a single line of text inside `rect`.
    Text {
        rect: Rect,
        text: String,
        color: Color,
    },
}

impl DrawCommand {
    /// Rectangle the command touches, if it draws anything.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            DrawCommand::FillRect { rect, .. } | DrawCommand::Text { rect, .. } => Some(*rect),
            DrawCommand::PushClip { .. } | DrawCommand::PopClip => None,
        }
    }
}
