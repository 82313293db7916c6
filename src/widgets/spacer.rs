use crate::layout::Size;
use crate::tree::{Tree, WidgetId};

use super::widget::{Widget, WidgetKind};

/// An empty widget with a fixed best size.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spacer {
    size: Size,
}

impl Spacer {
    pub fn new(size: Size) -> Self {
        Self { size }
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

impl Widget for Spacer {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Spacer
    }

    fn best_size(&self, _tree: &Tree, _id: WidgetId) -> Size {
        self.size
    }
}

super::impl_widget_type!(Spacer, WidgetKind::Spacer);
