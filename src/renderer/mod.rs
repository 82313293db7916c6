//! Drawing seam.
//!
//! Widgets never talk to a graphics backend; they emit commands into a
//! [`Canvas`]. Backends implement the trait, tests record into a
//! [`DrawList`].

mod commands;
mod text_metrics;

pub use commands::DrawCommand;
pub use text_metrics::{FixedMetrics, TextMetrics};

use crate::widgets::{Color, Rect};

pub trait Canvas {
    fn push_clip(&mut self, rect: Rect);
    fn pop_clip(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_text(&mut self, rect: Rect, text: &str, color: Color);
}

/// A canvas that records commands in order.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Text runs drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for DrawList {
    fn push_clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::PushClip { rect });
    }

    fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn draw_text(&mut self, rect: Rect, text: &str, color: Color) {
        if text.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::Text {
            rect,
            text: text.to_string(),
            color,
        });
    }
}
