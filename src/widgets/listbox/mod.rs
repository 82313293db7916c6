//! A selectable list of template rows.
//!
//! Rows are [`ToggledPanel`]s stacked in the content grid of a
//! [`ScrollContainer`]. Only the rows near the viewport are materialized;
//! see [`gc`].

pub(crate) mod gc;

use std::cmp::Ordering;
use std::rc::Rc;

use crate::layout::{Point, Size};
use crate::lock::ReentryLock;
use crate::timer::TimerId;
use crate::tree::{Tree, WidgetId};
use crate::window::Window;

use super::panel::{RowData, RowTemplate, ToggledPanel};
use super::scroll::{Orientation, ScrollbarMode};
use super::scroll_container::{ScrollContainer, ScrollContent};
use super::stack::Stack;
use super::widget::{Event, EventResponse, Key, MouseButton, Widget, WidgetKind};

/// Callbacks from a [`ListBox`]. Every method defaults to a no-op.
///
/// The list itself is out of the tree while these run, so they may use the
/// window freely but cannot reach the list through it.
pub trait ListObserver {
    fn row_focus_changed(&mut self, win: &mut Window, list: WidgetId, focused: bool) {
        let _ = (win, list, focused);
    }

    /// Return false to keep the current selection.
    fn row_pre_change(
        &mut self,
        win: &mut Window,
        list: WidgetId,
        from: Option<usize>,
        to: usize,
    ) -> bool {
        let _ = (win, list, from, to);
        true
    }

    fn row_changed(&mut self, win: &mut Window, list: WidgetId, row: usize) {
        let _ = (win, list, row);
    }

    fn double_click(&mut self, win: &mut Window, list: WidgetId, row: usize) {
        let _ = (win, list, row);
    }

    fn right_click(&mut self, win: &mut Window, list: WidgetId, row: usize) {
        let _ = (win, list, row);
    }

    /// `row` got its member widgets.
    fn allocated_gc(&mut self, win: &mut Window, list: WidgetId, row: usize) {
        let _ = (win, list, row);
    }

    /// The materialized window reached the last row.
    fn more_rows_gc(&mut self, win: &mut Window, list: WidgetId) {
        let _ = (win, list);
    }
}

/// Row bookkeeping, kept apart from the container so both can be borrowed
/// at once.
struct ListRows {
    id: WidgetId,
    template: Rc<RowTemplate>,
    panels: Vec<WidgetId>,
    cursel: Option<usize>,
    gc_window: Option<(usize, usize)>,
    observer: Option<Box<dyn ListObserver>>,
    select_lock: ReentryLock,
    gc_lock: ReentryLock,
    enable_select: bool,
}

impl ListRows {
    fn panel<'a>(&self, tree: &'a Tree, at: usize) -> Option<&'a ToggledPanel> {
        tree.downcast_ref::<ToggledPanel>(*self.panels.get(at)?)
    }

    fn selectable(&self, tree: &Tree, at: usize) -> bool {
        self.panels
            .get(at)
            .is_some_and(|&panel| tree.takes_space(panel))
            && self.panel(tree, at).is_some_and(|p| p.is_active())
    }
}

impl ScrollContent for ListRows {
    fn content_grid_size(
        &mut self,
        win: &mut Window,
        sc: &mut ScrollContainer,
        _content_origin: Point,
        _content_size: Size,
    ) -> Size {
        let _guard = self.gc_lock.acquire();
        win.tree().best_size(sc.grid())
    }

    fn handle_gc(
        &mut self,
        win: &mut Window,
        sc: &mut ScrollContainer,
        _x_offset: u32,
        y_offset: u32,
    ) -> u32 {
        let margin = win.settings().gc_margin_rows;
        let outcome = gc::handle_gc(win, sc, &self.panels, margin, y_offset);
        self.gc_window = outcome.window;
        if let Some(observer) = self.observer.as_mut() {
            for &row in &outcome.allocated {
                observer.allocated_gc(win, self.id, row);
            }
            if outcome.reached_end && !outcome.allocated.is_empty() {
                observer.more_rows_gc(win, self.id);
            }
        }
        outcome.y_offset
    }
}

pub struct ListBox {
    sc: ScrollContainer,
    rows: ListRows,
}

impl ListBox {
    pub fn new(template: RowTemplate, viewport: Size) -> Self {
        Self {
            sc: ScrollContainer::new(viewport),
            rows: ListRows {
                id: WidgetId::placeholder(),
                template: Rc::new(template),
                panels: Vec::new(),
                cursel: None,
                gc_window: None,
                observer: None,
                select_lock: ReentryLock::new("ExplicitSelectLock"),
                gc_lock: ReentryLock::new("GcBestSizeLock"),
                enable_select: true,
            },
        }
    }

    pub fn observer(mut self, observer: impl ListObserver + 'static) -> Self {
        self.rows.observer = Some(Box::new(observer));
        self
    }

    pub fn set_observer(&mut self, observer: Option<Box<dyn ListObserver>>) {
        self.rows.observer = observer;
    }

    pub fn container(&self) -> &ScrollContainer {
        &self.sc
    }

    pub fn container_mut(&mut self) -> &mut ScrollContainer {
        &mut self.sc
    }

    pub fn template(&self) -> &RowTemplate {
        &self.rows.template
    }

    pub fn rows(&self) -> usize {
        self.rows.panels.len()
    }

    pub fn row_panel(&self, at: usize) -> Option<WidgetId> {
        self.rows.panels.get(at).copied()
    }

    pub fn cursel(&self) -> Option<usize> {
        self.rows.cursel
    }

    pub fn cookie(&self, tree: &Tree, at: usize) -> Option<u64> {
        self.rows.panel(tree, at).map(|p| p.cookie())
    }

    pub fn row_value<'a>(&self, tree: &'a Tree, at: usize, member: &str) -> Option<&'a str> {
        self.rows.panel(tree, at)?.value(member)
    }

    /// Rows currently keeping their member widgets.
    pub fn gc_window(&self) -> Option<(usize, usize)> {
        self.rows.gc_window
    }

    pub fn is_select_enabled(&self) -> bool {
        self.rows.enable_select
    }

    pub fn enable_select(&mut self, enable: bool) {
        self.rows.enable_select = enable;
    }

    pub fn vertical_position(&self, tree: &Tree) -> u32 {
        self.sc.item_position(tree, Orientation::Vertical)
    }

    pub fn set_vertical_scrollbar_mode(&mut self, win: &mut Window, mode: ScrollbarMode) {
        self.sc.set_vertical_scrollbar_mode(win, mode);
    }

    pub fn set_horizontal_scrollbar_mode(&mut self, win: &mut Window, mode: ScrollbarMode) {
        self.sc.set_horizontal_scrollbar_mode(win, mode);
    }

    /// Add a row built from `data` at `at` (the end when `None` or past
    /// it). Returns the row index.
    pub fn insert_row(&mut self, win: &mut Window, data: &RowData, at: Option<usize>) -> usize {
        let len = self.rows.panels.len();
        let at = at.map_or(len, |at| at.min(len));
        let panel = ToggledPanel::new(Rc::clone(&self.rows.template), data);
        let panel = win.add_at(self.sc.grid(), panel, Some(at));
        self.rows.panels.insert(at, panel);

        if let Some(cursel) = self.rows.cursel.as_mut() {
            if *cursel >= at {
                *cursel += 1;
            }
        }
        self.sc.invalidate_layout(win);
        at
    }

    /// Remove the row at `at`. A selected row hands the selection to the
    /// next selectable row, else the previous one.
    pub fn erase_row(&mut self, win: &mut Window, at: usize) -> bool {
        if at >= self.rows.panels.len() {
            return false;
        }
        let was_selected = self.rows.cursel == Some(at);
        let panel = self.rows.panels.remove(at);
        win.destroy(panel);

        self.rows.cursel = match self.rows.cursel {
            Some(cursel) if cursel > at => Some(cursel - 1),
            Some(cursel) if cursel == at => None,
            other => other,
        };
        self.rows.gc_window = None;
        self.sc.invalidate_layout(win);

        if was_selected {
            let tree = win.tree();
            let next = (at..self.rows.panels.len())
                .find(|&i| self.rows.selectable(tree, i))
                .or_else(|| (0..at).rev().find(|&i| self.rows.selectable(tree, i)));
            if let Some(next) = next {
                self.select_row(win, next);
            }
        }
        true
    }

    pub fn clear(&mut self, win: &mut Window) {
        for panel in std::mem::take(&mut self.rows.panels) {
            win.destroy(panel);
        }
        self.rows.cursel = None;
        self.rows.gc_window = None;
        self.sc.invalidate_layout(win);
    }

    /// Select the row at `at`. The observer may refuse the change, in which
    /// case nothing is modified.
    pub fn select_row(&mut self, win: &mut Window, at: usize) -> bool {
        if !self.rows.enable_select || !self.rows.selectable(win.tree(), at) {
            return false;
        }
        if self.rows.cursel == Some(at) {
            return true;
        }
        let _guard = self.rows.select_lock.acquire();

        let id = self.rows.id;
        let from = self.rows.cursel;
        if let Some(observer) = self.rows.observer.as_mut() {
            if !observer.row_pre_change(win, id, from, at) {
                log::debug!("{:?} selection change {:?} -> {} refused", id, from, at);
                return false;
            }
        }

        if let Some(old) = from.and_then(|i| self.rows.panels.get(i).copied()) {
            win.with::<ToggledPanel, _>(old, |panel, win| panel.set_selected(win, old, false));
        }
        let new = self.rows.panels[at];
        win.with::<ToggledPanel, _>(new, |panel, win| panel.set_selected(win, new, true));
        self.rows.cursel = Some(at);

        if let Some(observer) = self.rows.observer.as_mut() {
            observer.row_changed(win, id, at);
        }
        true
    }

    /// Stable reorder of the rows. The selection follows its row.
    pub fn sort(
        &mut self,
        win: &mut Window,
        mut cmp: impl FnMut(&ToggledPanel, &ToggledPanel) -> Ordering,
    ) {
        let selected = self.rows.cursel.map(|at| self.rows.panels[at]);
        let tree = win.tree();
        self.rows.panels.sort_by(|&a, &b| {
            match (
                tree.downcast_ref::<ToggledPanel>(a),
                tree.downcast_ref::<ToggledPanel>(b),
            ) {
                (Some(a), Some(b)) => cmp(a, b),
                _ => Ordering::Equal,
            }
        });
        win.tree_mut()
            .set_children_order(self.sc.grid(), self.rows.panels.clone());
        self.rows.cursel =
            selected.and_then(|panel| self.rows.panels.iter().position(|&p| p == panel));
        self.rows.gc_window = None;
        self.sc.invalidate_layout(win);
    }

    /// Make the row at `at` fully visible with the least movement.
    pub fn scroll_to_row(&mut self, win: &mut Window, at: usize) {
        let Some(&panel) = self.rows.panels.get(at) else {
            return;
        };
        if !win.tree().takes_space(panel) {
            return;
        }
        let grid = win.tree().rect(self.sc.grid());
        let row = win.tree().rect(panel).offset(-grid.x, -grid.y);
        self.sc.show_content_rect(win, row);
        self.sc.scrollbar_moved(&mut self.rows, win, false);
    }

    pub fn set_row_active(&mut self, win: &mut Window, at: usize, active: bool) {
        if let Some(&panel) = self.rows.panels.get(at) {
            win.with::<ToggledPanel, _>(panel, |p, win| p.set_active(win, panel, active));
        }
    }

    pub fn set_row_label(&mut self, win: &mut Window, at: usize, member: &str, text: &str) -> bool {
        let Some(&panel) = self.rows.panels.get(at) else {
            return false;
        };
        let changed = win
            .with::<ToggledPanel, _>(panel, |p, win| p.set_value(win, panel, member, text))
            .unwrap_or(false);
        if changed {
            self.sc.invalidate_layout(win);
        }
        changed
    }

    /// Closest selectable row after (or before) `from`.
    pub fn next_selectable(&self, tree: &Tree, from: Option<usize>, forward: bool) -> Option<usize> {
        let len = self.rows.panels.len();
        if forward {
            let start = from.map_or(0, |at| at + 1);
            (start..len).find(|&i| self.rows.selectable(tree, i))
        } else {
            let end = from.unwrap_or(len);
            (0..end).rev().find(|&i| self.rows.selectable(tree, i))
        }
    }

    /// Row under window coordinate `y`.
    pub fn row_at(&self, tree: &Tree, y: i32) -> Option<usize> {
        let content = self.sc.content_rect(tree);
        if y < content.y || y >= content.bottom() {
            return None;
        }
        self.rows.panels.iter().position(|&panel| {
            let rect = tree.rect(panel);
            tree.takes_space(panel) && y >= rect.y && y < rect.bottom()
        })
    }

    fn notify_row(&mut self, win: &mut Window, y: i32, double: bool) {
        let Some(row) = self.row_at(win.tree(), y) else {
            return;
        };
        let id = self.rows.id;
        if let Some(observer) = self.rows.observer.as_mut() {
            if double {
                observer.double_click(win, id, row);
            } else {
                observer.right_click(win, id, row);
            }
        }
    }
}

impl Widget for ListBox {
    fn kind(&self) -> WidgetKind {
        WidgetKind::ListBox
    }

    fn best_size(&self, _tree: &Tree, _id: WidgetId) -> Size {
        self.sc.best_size()
    }

    fn register_children(&mut self, win: &mut Window, id: WidgetId) {
        self.rows.id = id;
        self.sc.register(win, id, Box::new(Stack::vertical()));
    }

    fn place(&mut self, win: &mut Window, _id: WidgetId, origin: Point, size: Size) {
        self.sc.place(&mut self.rows, win, origin, size);
    }

    fn layout_children(&mut self, win: &mut Window, _id: WidgetId) {
        self.sc.layout_children(&mut self.rows, win);
    }

    fn event(&mut self, win: &mut Window, id: WidgetId, event: &Event) -> EventResponse {
        match *event {
            Event::KeyDown {
                key: key @ (Key::Up | Key::Down),
                ..
            } if self.rows.enable_select => {
                let next = self.next_selectable(win.tree(), self.rows.cursel, key == Key::Down);
                if let Some(next) = next {
                    if self.select_row(win, next) {
                        self.scroll_to_row(win, next);
                    }
                }
                EventResponse::Handled
            }
            Event::Click { y, .. } => {
                if let Some(row) = self.row_at(win.tree(), y) {
                    self.select_row(win, row);
                }
                EventResponse::Handled
            }
            Event::DoubleClick { y, .. } => {
                self.notify_row(win, y, true);
                EventResponse::Handled
            }
            Event::MouseDown {
                y,
                button: MouseButton::Right,
                ..
            } => {
                self.notify_row(win, y, false);
                EventResponse::Handled
            }
            Event::FocusIn | Event::FocusOut => {
                let focused = *event == Event::FocusIn;
                if let Some(observer) = self.rows.observer.as_mut() {
                    observer.row_focus_changed(win, id, focused);
                }
                EventResponse::Handled
            }
            _ => self.sc.handle_event(&mut self.rows, win, event),
        }
    }

    fn on_timer(&mut self, win: &mut Window, _id: WidgetId, timer: TimerId) {
        self.sc.on_timer(&mut self.rows, win, timer);
    }

    fn scrollbar_moved(&mut self, win: &mut Window, _id: WidgetId, orientation: Orientation) {
        self.sc.floating_moved(&mut self.rows, win, orientation);
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

super::impl_widget_type!(ListBox, WidgetKind::ListBox);
