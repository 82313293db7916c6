use std::rc::Rc;

use crate::layout::Size;
use crate::renderer::{Canvas, TextMetrics};
use crate::tree::{Tree, WidgetId};
use crate::window::Window;

use super::widget::{Color, Widget, WidgetKind};

/// A single line of text.
///
/// Measured with the window's text metrics when registered and whenever the
/// text changes.
pub struct Label {
    text: String,
    color: Color,
    padding: i32,
    metrics: Option<Rc<dyn TextMetrics>>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::BLACK,
            padding: 0,
            metrics: None,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn padding(mut self, padding: i32) -> Self {
        self.padding = padding;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, win: &mut Window, id: WidgetId, text: impl Into<String>) {
        let text = text.into();
        if text == self.text {
            return;
        }
        self.text = text;
        win.tree_mut().set_dirty(id);
        win.tree_mut().mark_needs_layout(id);
    }
}

impl Widget for Label {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Label
    }

    fn best_size(&self, _tree: &Tree, _id: WidgetId) -> Size {
        let text = match &self.metrics {
            Some(metrics) => metrics.measure(&self.text),
            None => Size::zero(),
        };
        Size::new(
            text.width + self.padding * 2,
            text.height + self.padding * 2,
        )
    }

    fn register_children(&mut self, win: &mut Window, _id: WidgetId) {
        self.metrics = Some(Rc::clone(&win.settings().metrics));
    }

    fn draw_foreground(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        let rect = tree.rect(id);
        let inner = rect.offset(self.padding, self.padding);
        canvas.draw_text(inner, &self.text, self.color);
    }
}

super::impl_widget_type!(Label, WidgetKind::Label);
