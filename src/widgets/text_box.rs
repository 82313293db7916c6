//! Single-line text editing.
//!
//! The TextBox handles:
//! - Editing with a maximum length
//! - Cursor blinking while focused
//! - Selection with mouse and keyboard
//! - Copy, cut and paste through the clipboard
//!
//! On mobile settings a selection shows the window's edit bubble and a drag
//! shows the magnifier.

use std::rc::Rc;

use crate::clipboard::{clipboard_copy, clipboard_paste};
use crate::layout::{Point, Size};
use crate::renderer::{Canvas, TextMetrics};
use crate::timer::TimerId;
use crate::tree::{Tree, WidgetId};
use crate::window::{EditCommand, FloatKind, Window};

use super::float::FloatWidget;
use super::widget::{
    Color, Event, EventResponse, Key, Modifiers, MouseButton, Rect, Widget, WidgetKind,
};

const BACKGROUND: Color = Color::WHITE;
const TEXT_COLOR: Color = Color::BLACK;
const CURSOR_COLOR: Color = Color::rgb(0.1, 0.3, 0.9);
const SELECTION_COLOR: Color = Color::rgba(0.4, 0.6, 1.0, 0.4);
const BUBBLE_WIDTH: i32 = 96;

/// Selection state tracking anchor and cursor positions, in chars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection started
    pub anchor: usize,
    pub cursor: usize,
}

impl Selection {
    /// Cursor at `pos` with nothing selected.
    pub fn new(pos: usize) -> Self {
        Self {
            anchor: pos,
            cursor: pos,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.cursor
    }

    /// Start and end of the selection, ordered.
    pub fn range(&self) -> (usize, usize) {
        if self.anchor <= self.cursor {
            (self.anchor, self.cursor)
        } else {
            (self.cursor, self.anchor)
        }
    }

    pub fn collapse(&mut self) {
        self.anchor = self.cursor;
    }
}

/// Callbacks from a [`TextBox`]. Every method defaults to a no-op.
pub trait TextObserver {
    fn text_changed(&mut self, win: &mut Window, text_box: WidgetId, text: &str) {
        let _ = (win, text_box, text);
    }

    /// Enter was pressed.
    fn submit(&mut self, win: &mut Window, text_box: WidgetId, text: &str) {
        let _ = (win, text_box, text);
    }
}

pub struct TextBox {
    id: WidgetId,
    label: String,
    maximum_chars: Option<usize>,
    selection: Selection,
    focused: bool,
    cursor_visible: bool,
    blink_timer: Option<TimerId>,
    dragging: bool,
    width: i32,
    padding: i32,
    metrics: Option<Rc<dyn TextMetrics>>,
    observer: Option<Box<dyn TextObserver>>,
}

impl TextBox {
    pub fn new(text: impl Into<String>) -> Self {
        let label = text.into();
        let end = label.chars().count();
        Self {
            id: WidgetId::placeholder(),
            label,
            maximum_chars: None,
            selection: Selection::new(end),
            focused: false,
            cursor_visible: false,
            blink_timer: None,
            dragging: false,
            width: 160,
            padding: 4,
            metrics: None,
            observer: None,
        }
    }

    pub fn maximum_chars(mut self, max: usize) -> Self {
        self.maximum_chars = Some(max);
        self.label = truncate_chars(&self.label, max).to_string();
        let end = self.char_count();
        self.selection = Selection::new(self.selection.cursor.min(end));
        self
    }

    pub fn width(mut self, width: i32) -> Self {
        self.width = width;
        self
    }

    pub fn padding(mut self, padding: i32) -> Self {
        self.padding = padding;
        self
    }

    pub fn observer(mut self, observer: impl TextObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_text(&self) -> &str {
        let (start, end) = self.selection.range();
        &self.label[self.byte_index(start)..self.byte_index(end)]
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.focused && self.cursor_visible
    }

    fn char_count(&self) -> usize {
        self.label.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.label
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.label.len())
    }

    fn notify_change(&mut self, win: &mut Window) {
        win.tree_mut().set_dirty(self.id);
        let id = self.id;
        if let Some(observer) = self.observer.as_mut() {
            observer.text_changed(win, id, &self.label);
        }
    }

    /// Replace the whole text, cut to the maximum length.
    pub fn set_label(&mut self, win: &mut Window, text: &str) {
        let text = match self.maximum_chars {
            Some(max) => truncate_chars(text, max),
            None => text,
        };
        if text == self.label {
            return;
        }
        self.label = text.to_string();
        self.selection = Selection::new(self.char_count());
        self.notify_change(win);
        self.selection_changed(win);
    }

    /// Insert at the cursor, replacing the selection. Only as much of
    /// `text` as the maximum length allows goes in.
    pub fn insert_str(&mut self, win: &mut Window, text: &str) {
        let (start, end) = self.selection.range();
        let kept = self.char_count() - (end - start);
        let text = match self.maximum_chars {
            Some(max) => truncate_chars(text, max.saturating_sub(kept)),
            None => text,
        };
        if text.is_empty() && start == end {
            return;
        }

        let (byte_start, byte_end) = (self.byte_index(start), self.byte_index(end));
        self.label.replace_range(byte_start..byte_end, text);
        self.selection = Selection::new(start + text.chars().count());
        self.reset_cursor_blink();
        self.notify_change(win);
        self.selection_changed(win);
    }

    /// Remove the selected text. Returns false when nothing was selected.
    pub fn delete_selection(&mut self, win: &mut Window) -> bool {
        if !self.selection.has_selection() {
            return false;
        }
        self.insert_str(win, "");
        true
    }

    /// Delete the selection, or one char before (backspace) or after the
    /// cursor.
    pub fn delete_char(&mut self, win: &mut Window, before: bool) {
        if self.delete_selection(win) {
            return;
        }
        let cursor = self.selection.cursor;
        let range = if before {
            if cursor == 0 {
                return;
            }
            (cursor - 1, cursor)
        } else {
            if cursor >= self.char_count() {
                return;
            }
            (cursor, cursor + 1)
        };
        self.selection = Selection {
            anchor: range.0,
            cursor: range.1,
        };
        self.insert_str(win, "");
    }

    /// Put the selected text on the clipboard.
    pub fn copy_selection(&self) -> bool {
        if !self.selection.has_selection() {
            return false;
        }
        clipboard_copy(self.selected_text());
        true
    }

    pub fn cut_selection(&mut self, win: &mut Window) -> bool {
        self.copy_selection() && self.delete_selection(win)
    }

    /// Insert the clipboard text. An empty clipboard changes nothing.
    pub fn paste_selection(&mut self, win: &mut Window) -> bool {
        match clipboard_paste() {
            Some(text) if !text.is_empty() => {
                self.insert_str(win, &text);
                true
            }
            _ => false,
        }
    }

    pub fn select_all(&mut self, win: &mut Window) {
        self.selection = Selection {
            anchor: 0,
            cursor: self.char_count(),
        };
        self.reset_cursor_blink();
        self.selection_changed(win);
    }

    /// Move the cursor to `pos`, extending the selection when `select`.
    pub fn set_cursor(&mut self, win: &mut Window, pos: usize, select: bool) {
        self.selection.cursor = pos.min(self.char_count());
        if !select {
            self.selection.collapse();
        }
        self.reset_cursor_blink();
        self.selection_changed(win);
    }

    pub fn goto_start(&mut self, win: &mut Window, select: bool) {
        self.set_cursor(win, 0, select);
    }

    pub fn goto_end(&mut self, win: &mut Window, select: bool) {
        let end = self.char_count();
        self.set_cursor(win, end, select);
    }

    fn reset_cursor_blink(&mut self) {
        self.cursor_visible = true;
    }

    /// Repaint, and keep the edit bubble in step with the selection.
    fn selection_changed(&mut self, win: &mut Window) {
        win.tree_mut().set_dirty(self.id);
        if !win.settings().mobile {
            return;
        }
        if self.selection.has_selection() && !self.dragging {
            let rect = win.tree().rect(self.id);
            let height = win.settings().line_height() + 2 * self.padding;
            let bubble = Rect::new(rect.x, (rect.y - height).max(0), BUBBLE_WIDTH, height);
            win.show_float(FloatKind::EditBubble, self.id, bubble);
        } else {
            self.hide_float(win, FloatKind::EditBubble);
        }
    }

    fn hide_float(&self, win: &mut Window, kind: FloatKind) {
        if win.float_owner(kind) == Some(self.id) {
            win.hide_float(kind);
        }
    }

    fn char_at(&self, tree: &Tree, x: i32) -> usize {
        let rect = tree.rect(self.id);
        match &self.metrics {
            Some(metrics) => metrics.char_from_x(&self.label, x - rect.x - self.padding),
            None => 0,
        }
    }

    fn show_magnifier(&self, win: &mut Window, point: Point) {
        if !win.settings().mobile {
            return;
        }
        let height = win.settings().line_height() + 2 * self.padding;
        let rect = Rect::new(
            point.x - BUBBLE_WIDTH / 2,
            (point.y - 2 * height).max(0),
            BUBBLE_WIDTH,
            height,
        );
        win.show_float(FloatKind::Magnifier, self.id, rect);
        if let Some(float) = win.find_float_widget(FloatKind::Magnifier) {
            if let Some(magnifier) = win.tree_mut().downcast_mut::<FloatWidget>(float) {
                magnifier.set_text(self.label.clone());
            }
        }
    }

    fn handle_key(&mut self, win: &mut Window, key: Key, modifiers: Modifiers) -> EventResponse {
        let shift = modifiers.contains(Modifiers::SHIFT);
        let ctrl = modifiers.contains(Modifiers::CTRL);
        match key {
            Key::Backspace => self.delete_char(win, true),
            Key::Delete => self.delete_char(win, false),
            Key::Enter => {
                let id = self.id;
                if let Some(observer) = self.observer.as_mut() {
                    observer.submit(win, id, &self.label);
                }
            }
            Key::Left => {
                if !shift && self.selection.has_selection() {
                    let (start, _) = self.selection.range();
                    self.set_cursor(win, start, false);
                } else {
                    let pos = self.selection.cursor.saturating_sub(1);
                    self.set_cursor(win, pos, shift);
                }
            }
            Key::Right => {
                if !shift && self.selection.has_selection() {
                    let (_, end) = self.selection.range();
                    self.set_cursor(win, end, false);
                } else {
                    let pos = self.selection.cursor + 1;
                    self.set_cursor(win, pos, shift);
                }
            }
            Key::Home => self.goto_start(win, shift),
            Key::End => self.goto_end(win, shift),
            Key::Char(c) if ctrl => match c.to_ascii_lowercase() {
                'a' => self.goto_start(win, shift),
                'e' => self.goto_end(win, shift),
                'u' => self.set_label(win, ""),
                'c' => {
                    self.copy_selection();
                }
                'x' => {
                    self.cut_selection(win);
                }
                'v' => {
                    self.paste_selection(win);
                }
                _ => return EventResponse::Ignored,
            },
            Key::Char(c) if !c.is_control() => {
                let mut buf = [0; 4];
                self.insert_str(win, c.encode_utf8(&mut buf));
            }
            _ => return EventResponse::Ignored,
        }
        EventResponse::Handled
    }

    fn focus_in(&mut self, win: &mut Window) {
        self.focused = true;
        self.cursor_visible = true;
        if self.blink_timer.is_none() {
            let period = win.settings().cursor_blink_ms;
            self.blink_timer = Some(win.add_timer(self.id, period));
        }
        win.tree_mut().set_dirty(self.id);
    }

    fn focus_out(&mut self, win: &mut Window) {
        self.focused = false;
        self.dragging = false;
        self.selection.collapse();
        if let Some(timer) = self.blink_timer.take() {
            win.remove_timer(timer);
        }
        self.hide_float(win, FloatKind::EditBubble);
        self.hide_float(win, FloatKind::Magnifier);
        win.tree_mut().set_dirty(self.id);
    }
}

/// The first `max` chars of `text`.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

impl Widget for TextBox {
    fn kind(&self) -> WidgetKind {
        WidgetKind::TextBox
    }

    fn best_size(&self, _tree: &Tree, _id: WidgetId) -> Size {
        let line = self
            .metrics
            .as_ref()
            .map(|m| m.measure("").height)
            .unwrap_or(0);
        Size::new(self.width, line + 2 * self.padding)
    }

    fn register_children(&mut self, win: &mut Window, id: WidgetId) {
        self.id = id;
        self.metrics = Some(Rc::clone(&win.settings().metrics));
    }

    fn event(&mut self, win: &mut Window, id: WidgetId, event: &Event) -> EventResponse {
        match *event {
            Event::KeyDown { key, modifiers } => self.handle_key(win, key, modifiers),
            Event::FocusIn => {
                self.focus_in(win);
                EventResponse::Handled
            }
            Event::FocusOut => {
                self.focus_out(win);
                EventResponse::Handled
            }
            Event::MouseDown {
                x,
                y,
                button: MouseButton::Left,
            } => {
                win.keyboard_capture(Some(id));
                win.mouse_capture(Some(id));
                self.dragging = true;
                let pos = self.char_at(win.tree(), x);
                self.set_cursor(win, pos, false);
                self.show_magnifier(win, Point::new(x, y));
                EventResponse::Handled
            }
            Event::MouseMove { x, y } if self.dragging => {
                let pos = self.char_at(win.tree(), x);
                self.set_cursor(win, pos, true);
                self.show_magnifier(win, Point::new(x, y));
                EventResponse::Handled
            }
            Event::MouseUp {
                button: MouseButton::Left,
                ..
            } if self.dragging => {
                self.dragging = false;
                self.hide_float(win, FloatKind::Magnifier);
                self.selection_changed(win);
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn on_timer(&mut self, win: &mut Window, id: WidgetId, timer: TimerId) {
        if self.blink_timer != Some(timer) {
            return;
        }
        self.cursor_visible = !self.cursor_visible;
        win.tree_mut().set_dirty(id);
    }

    fn edit_command(&mut self, win: &mut Window, _id: WidgetId, command: EditCommand) {
        log::trace!("{:?} edit command {:?}", self.id, command);
        match command {
            EditCommand::Copy => {
                self.copy_selection();
            }
            EditCommand::Cut => {
                self.cut_selection(win);
            }
            EditCommand::Paste => {
                self.paste_selection(win);
            }
            EditCommand::SelectAll => self.select_all(win),
        }
    }

    fn popup_new_window(&mut self, _win: &mut Window, _id: WidgetId) {
        self.dragging = false;
    }

    fn destroying(&mut self, win: &mut Window, _id: WidgetId) {
        self.hide_float(win, FloatKind::EditBubble);
        self.hide_float(win, FloatKind::Magnifier);
    }

    fn draw_background(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        let rect = tree.rect(id);
        canvas.fill_rect(rect, BACKGROUND);
        let Some(metrics) = &self.metrics else {
            return;
        };
        if self.selection.has_selection() {
            let (start, end) = self.selection.range();
            let x0 = metrics.measure_to_char(&self.label, start);
            let x1 = metrics.measure_to_char(&self.label, end);
            let highlight = Rect::new(
                rect.x + self.padding + x0,
                rect.y + self.padding,
                x1 - x0,
                rect.height - 2 * self.padding,
            );
            canvas.fill_rect(highlight, SELECTION_COLOR);
        }
    }

    fn draw_foreground(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        let rect = tree.rect(id);
        let inner = rect.offset(self.padding, self.padding);
        canvas.draw_text(inner, &self.label, TEXT_COLOR);

        if let (true, Some(metrics)) = (self.is_cursor_visible(), &self.metrics) {
            let x = metrics.measure_to_char(&self.label, self.selection.cursor);
            let cursor = Rect::new(
                rect.x + self.padding + x,
                rect.y + self.padding,
                2,
                rect.height - 2 * self.padding,
            );
            canvas.fill_rect(cursor, CURSOR_COLOR);
        }
    }
}

super::impl_widget_type!(TextBox, WidgetKind::TextBox);
