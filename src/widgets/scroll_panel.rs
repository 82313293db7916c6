use crate::layout::{Point, Size};
use crate::timer::TimerId;
use crate::tree::{Tree, WidgetId};
use crate::window::Window;

use super::scroll::{Orientation, ScrollbarMode};
use super::scroll_container::{PlainContent, ScrollContainer};
use super::stack::Stack;
use super::widget::{Event, EventResponse, Widget, WidgetKind};

/// A viewport over a vertical stack of arbitrary widgets.
///
/// Add children to [`ScrollPanel::grid`]. With `scroll_to_end` set the panel
/// follows the bottom of its content as it grows, like a log view.
pub struct ScrollPanel {
    sc: ScrollContainer,
    hooks: PlainContent,
    scroll_to_end: bool,
}

impl ScrollPanel {
    pub fn new(viewport: Size) -> Self {
        Self {
            sc: ScrollContainer::new(viewport),
            hooks: PlainContent,
            scroll_to_end: false,
        }
    }

    pub fn grid(&self) -> WidgetId {
        self.sc.grid()
    }

    pub fn container(&self) -> &ScrollContainer {
        &self.sc
    }

    pub fn container_mut(&mut self) -> &mut ScrollContainer {
        &mut self.sc
    }

    pub fn scroll_to_end(&self) -> bool {
        self.scroll_to_end
    }

    pub fn set_scroll_to_end(&mut self, scroll_to_end: bool) {
        self.scroll_to_end = scroll_to_end;
    }

    pub fn set_vertical_scrollbar_mode(&mut self, win: &mut Window, mode: ScrollbarMode) {
        self.sc.set_vertical_scrollbar_mode(win, mode);
    }

    pub fn set_horizontal_scrollbar_mode(&mut self, win: &mut Window, mode: ScrollbarMode) {
        self.sc.set_horizontal_scrollbar_mode(win, mode);
    }

    /// Jump to a vertical offset and move the content there.
    pub fn set_vertical_position(&mut self, win: &mut Window, position: u32) {
        self.sc.vertical_set_item_position(win, position);
        self.sc.scrollbar_moved(&mut self.hooks, win, false);
    }

    pub fn set_horizontal_position(&mut self, win: &mut Window, position: u32) {
        self.sc.horizontal_set_item_position(win, position);
        self.sc.scrollbar_moved(&mut self.hooks, win, false);
    }

    pub fn vertical_position(&self, tree: &Tree) -> u32 {
        self.sc.item_position(tree, Orientation::Vertical)
    }

    fn follow_end(&mut self, win: &mut Window) {
        if self.scroll_to_end {
            self.sc.scroll_to_end(&mut self.hooks, win);
        }
    }
}

impl Widget for ScrollPanel {
    fn kind(&self) -> WidgetKind {
        WidgetKind::ScrollPanel
    }

    fn best_size(&self, _tree: &Tree, _id: WidgetId) -> Size {
        self.sc.best_size()
    }

    fn register_children(&mut self, win: &mut Window, id: WidgetId) {
        self.sc.register(win, id, Box::new(Stack::vertical()));
    }

    fn place(&mut self, win: &mut Window, _id: WidgetId, origin: Point, size: Size) {
        self.sc.place(&mut self.hooks, win, origin, size);
        self.follow_end(win);
    }

    fn layout_children(&mut self, win: &mut Window, _id: WidgetId) {
        self.sc.layout_children(&mut self.hooks, win);
        self.follow_end(win);
    }

    fn event(&mut self, win: &mut Window, _id: WidgetId, event: &Event) -> EventResponse {
        self.sc.handle_event(&mut self.hooks, win, event)
    }

    fn on_timer(&mut self, win: &mut Window, _id: WidgetId, timer: TimerId) {
        self.sc.on_timer(&mut self.hooks, win, timer);
    }

    fn scrollbar_moved(&mut self, win: &mut Window, _id: WidgetId, orientation: Orientation) {
        self.sc.floating_moved(&mut self.hooks, win, orientation);
    }

    fn reset_scrollbar(&mut self, win: &mut Window, _id: WidgetId) {
        if self.sc.is_floating_bound() {
            self.sc.reset_scrollbar(win);
        }
    }

    fn popup_new_window(&mut self, win: &mut Window, _id: WidgetId) {
        self.sc.popup_new_window(win);
    }

    fn destroying(&mut self, win: &mut Window, _id: WidgetId) {
        self.sc.destroying(win);
    }
}

super::impl_widget_type!(ScrollPanel, WidgetKind::ScrollPanel);
