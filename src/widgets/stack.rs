use crate::layout::{stack_best_size, stack_children, Axis, Point, Size};
use crate::renderer::Canvas;
use crate::tree::{Tree, WidgetId};
use crate::window::Window;

use super::widget::{Color, Widget, WidgetKind};

/// A container that lines its children up along one axis.
///
/// Invisible and floating children take no room.
#[derive(Debug, Clone)]
pub struct Stack {
    axis: Axis,
    spacing: i32,
    background: Option<Color>,
}

impl Stack {
    pub fn vertical() -> Self {
        Self {
            axis: Axis::Vertical,
            spacing: 0,
            background: None,
        }
    }

    pub fn horizontal() -> Self {
        Self {
            axis: Axis::Horizontal,
            ..Self::vertical()
        }
    }

    pub fn spacing(mut self, spacing: i32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }
}

impl Widget for Stack {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Stack
    }

    fn best_size(&self, tree: &Tree, id: WidgetId) -> Size {
        stack_best_size(tree, &tree.get_children(id), self.axis, self.spacing)
    }

    fn place(&mut self, win: &mut Window, id: WidgetId, origin: Point, size: Size) {
        win.tree_mut().place_base(id, origin, size);
        let rect = win.tree().rect(id);
        let children = win.tree().get_children(id);
        stack_children(
            win,
            &children,
            self.axis,
            rect.origin(),
            rect.size(),
            self.spacing,
        );
    }

    fn draw_background(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        if let Some(color) = self.background {
            canvas.fill_rect(tree.rect(id), color);
        }
    }
}

super::impl_widget_type!(Stack, WidgetKind::Stack);
