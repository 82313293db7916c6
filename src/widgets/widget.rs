use std::any::Any;

use bitflags::bitflags;

use crate::error::validate;
use crate::layout::{Point, Size};
use crate::renderer::Canvas;
use crate::timer::TimerId;
use crate::tree::{Tree, WidgetId};
use crate::widgets::scroll::Orientation;
use crate::window::{EditCommand, Window};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Axis-aligned rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Overlap of two rectangles. Disjoint rectangles yield the empty
    /// rectangle at the origin so results compare equal.
    pub fn intersect(&self, other: &Rect) -> Rect {
        if !self.intersects(other) {
            return Rect::default();
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Rect::new(
            x,
            y,
            self.right().min(other.right()) - x,
            self.bottom().min(other.bottom()) - y,
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Visibility of a widget.
///
/// `Hidden` keeps its space in layout, `Invisible` gives it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Invisible,
}

/// How much of a widget survives the clip of its visible area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingAction {
    #[default]
    Drawn,
    PartlyDrawn,
    NotDrawn,
}

/// Geometry and draw state every widget carries.
///
/// Lives in the tree next to the widget so containers can walk their
/// subtree without extracting children.
#[derive(Debug, Clone)]
pub struct WidgetBase {
    rect: Rect,
    visibility: Visibility,
    drawing_action: DrawingAction,
    clip: Rect,
    dirty: bool,
    redraw: bool,
    fix_size: Option<Size>,
    clips_children: bool,
    floating: bool,
}

impl Default for WidgetBase {
    fn default() -> Self {
        Self {
            rect: Rect::default(),
            visibility: Visibility::Visible,
            drawing_action: DrawingAction::Drawn,
            clip: Rect::default(),
            dirty: true,
            redraw: false,
            fix_size: None,
            clips_children: false,
            floating: false,
        }
    }
}

impl WidgetBase {
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn origin(&self) -> Point {
        self.rect.origin()
    }

    pub fn size(&self) -> Size {
        self.rect.size()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Zero-area widgets are never drawn, whatever their clip says.
    pub fn drawing_action(&self) -> DrawingAction {
        if self.rect.width == 0 || self.rect.height == 0 {
            DrawingAction::NotDrawn
        } else {
            self.drawing_action
        }
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    pub fn fix_size(&self) -> Option<Size> {
        self.fix_size
    }

    pub fn clips_children(&self) -> bool {
        self.clips_children
    }

    pub fn is_floating(&self) -> bool {
        self.floating
    }

    pub(crate) fn set_fix_size(&mut self, size: Option<Size>) {
        if let Some(size) = size {
            validate!(!size.is_negative(), "fixed size {:?} is negative", size);
        }
        self.fix_size = size;
    }

    pub(crate) fn set_clips_children(&mut self, clips: bool) {
        self.clips_children = clips;
    }

    pub(crate) fn set_floating(&mut self, floating: bool) {
        self.floating = floating;
    }

    /// Origin may be negative (scrolled grids); size may not.
    pub(crate) fn place(&mut self, origin: Point, size: Size) {
        validate!(!size.is_negative(), "place with negative size {:?}", size);
        let size = self.fix_size.unwrap_or(size);
        self.rect = Rect::from_origin_size(origin, size);
        self.dirty = true;
    }

    /// Returns true when the origin actually changed.
    pub(crate) fn move_to(&mut self, origin: Point) -> bool {
        if origin == self.rect.origin() {
            return false;
        }
        self.rect.x = origin.x;
        self.rect.y = origin.y;
        self.redraw = true;
        true
    }

    pub(crate) fn set_visible_area(&mut self, area: Rect) {
        let previous_clip = self.clip;
        let previous_action = self.drawing_action;

        self.clip = area.intersect(&self.rect);
        self.drawing_action = if self.clip == self.rect {
            DrawingAction::Drawn
        } else if self.clip.is_empty() {
            DrawingAction::NotDrawn
        } else {
            DrawingAction::PartlyDrawn
        };

        if !self.redraw && self.drawing_action != DrawingAction::NotDrawn {
            if self.drawing_action != previous_action
                || (self.drawing_action == DrawingAction::PartlyDrawn && previous_clip != self.clip)
            {
                self.redraw = true;
            }
        }
    }

    /// Returns true when the switch goes to or from `Invisible`, which
    /// changes layout.
    pub(crate) fn set_visibility(&mut self, visibility: Visibility) -> bool {
        if visibility == self.visibility {
            return false;
        }
        let needs_layout =
            self.visibility == Visibility::Invisible || visibility == Visibility::Invisible;
        self.visibility = visibility;
        self.redraw = true;
        needs_layout
    }

    pub(crate) fn set_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_redraw(&mut self) {
        self.redraw = true;
    }

    pub(crate) fn clear_draw_flags(&mut self) {
        self.dirty = false;
        self.redraw = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Scroll source - discrete (mouse wheel) or smooth (touchpad/touchscreen)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSource {
    /// Mouse wheel notches, scaled by the wheel regime
    Wheel,
    /// Finger swipe, scaled by the precision regime
    Finger,
    /// Continuous scrolling (e.g., kinetic/momentum)
    Continuous,
}

bitflags! {
    /// Keyboard modifier state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const CTRL  = 0b0001;
        const ALT   = 0b0010;
        const SHIFT = 0b0100;
        const LOGO  = 0b1000;
    }
}

/// Named keys for special keyboard keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    /// Character input (includes letters for Ctrl shortcuts)
    Char(char),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MouseMove { x: i32, y: i32 },
    MouseDown { x: i32, y: i32, button: MouseButton },
    MouseUp { x: i32, y: i32, button: MouseButton },
    /// Synthesized after a press and release on the same widget that no
    /// drag has cancelled.
    Click { x: i32, y: i32 },
    DoubleClick { x: i32, y: i32 },
    /// Pointer entered the widget's subtree
    MouseEnter { x: i32, y: i32 },
    /// Pointer left the widget's subtree
    MouseLeave { x: i32, y: i32 },
    Scroll {
        x: i32,
        y: i32,
        /// Horizontal delta (positive = toward the end)
        delta_x: i32,
        /// Vertical delta (positive = toward the end)
        delta_y: i32,
        source: ScrollSource,
    },
    KeyDown { key: Key, modifiers: Modifiers },
    FocusIn,
    FocusOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}

impl Event {
    /// Get the coordinates from this event, if any
    pub fn coords(&self) -> Option<Point> {
        match self {
            Event::MouseMove { x, y }
            | Event::MouseDown { x, y, .. }
            | Event::MouseUp { x, y, .. }
            | Event::Click { x, y }
            | Event::DoubleClick { x, y }
            | Event::MouseEnter { x, y }
            | Event::MouseLeave { x, y }
            | Event::Scroll { x, y, .. } => Some(Point::new(*x, *y)),
            Event::KeyDown { .. } | Event::FocusIn | Event::FocusOut => None,
        }
    }
}

/// Concrete widget kinds, used by the typed registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Stack,
    Spacer,
    Label,
    Panel,
    Scrollbar,
    ScrollPanel,
    ListBox,
    TreeView,
    TextBox,
    Float,
    Placeholder,
}

/// Upcasting support so the tree can hand out concrete widget types.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A widget type the typed registry can resolve.
pub trait WidgetType: Widget + Sized {
    const KIND: WidgetKind;
}

pub trait Widget: AsAny {
    fn kind(&self) -> WidgetKind;

    /// Natural size before any fixed-size override is applied.
    fn best_size(&self, tree: &Tree, id: WidgetId) -> Size;

    /// Register this widget's own children with the window.
    ///
    /// Called once, right after the widget itself is registered.
    fn register_children(&mut self, win: &mut Window, id: WidgetId) {
        let _ = (win, id);
    }

    fn place(&mut self, win: &mut Window, id: WidgetId, origin: Point, size: Size) {
        win.tree_mut().place_base(id, origin, size);
    }

    /// Re-run layout for a relayout boundary without moving it.
    fn layout_children(&mut self, win: &mut Window, id: WidgetId) {
        let rect = win.tree().rect(id);
        self.place(win, id, rect.origin(), rect.size());
    }

    fn event(&mut self, win: &mut Window, id: WidgetId, event: &Event) -> EventResponse {
        let _ = (win, id, event);
        EventResponse::Ignored
    }

    fn on_timer(&mut self, win: &mut Window, id: WidgetId, timer: TimerId) {
        let _ = (win, id, timer);
    }

    /// A floating scrollbar lent to this widget was dragged.
    fn scrollbar_moved(&mut self, win: &mut Window, id: WidgetId, orientation: Orientation) {
        let _ = (win, id, orientation);
    }

    /// Give back the floating scrollbars, if this widget holds them.
    fn reset_scrollbar(&mut self, win: &mut Window, id: WidgetId) {
        let _ = (win, id);
    }

    /// A new window is about to cover this one.
    fn popup_new_window(&mut self, win: &mut Window, id: WidgetId) {
        let _ = (win, id);
    }

    /// One of the window's floating edit widgets was clicked on behalf of
    /// this widget.
    fn edit_command(&mut self, win: &mut Window, id: WidgetId, command: EditCommand) {
        let _ = (win, id, command);
    }

    /// Called before the widget leaves the tree.
    fn destroying(&mut self, win: &mut Window, id: WidgetId) {
        let _ = (win, id);
    }

    fn draw_background(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        let _ = (tree, id, canvas);
    }

    fn draw_foreground(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        let _ = (tree, id, canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let color = Color::from_hex(0xFF0000);
        assert_eq!(color, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::default(), Color::TRANSPARENT);
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 80, 100, 100);
        assert_eq!(a.intersect(&b), Rect::new(50, 80, 50, 20));

        let far = Rect::new(500, 500, 10, 10);
        assert_eq!(a.intersect(&far), Rect::default());
        assert!(a.intersect(&far).is_empty());
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10, 20, 100, 50);
        assert!(rect.contains(50, 40));
        assert!(rect.contains(10, 20));
        assert!(!rect.contains(110, 70));
        assert!(!rect.contains(5, 40));
    }

    #[test]
    fn test_base_place_fix_size_overrides() {
        let mut base = WidgetBase::default();
        base.set_fix_size(Some(Size::new(40, 12)));
        base.place(Point::new(3, 4), Size::new(200, 200));
        assert_eq!(base.rect(), Rect::new(3, 4, 40, 12));
        assert!(base.is_dirty());
    }

    #[test]
    #[should_panic(expected = "negative size")]
    fn test_base_place_negative_size() {
        let mut base = WidgetBase::default();
        base.place(Point::zero(), Size::new(-1, 10));
    }

    #[test]
    fn test_base_zero_area_never_drawn() {
        let mut base = WidgetBase::default();
        base.place(Point::zero(), Size::new(0, 10));
        base.set_visible_area(Rect::new(0, 0, 100, 100));
        assert_eq!(base.drawing_action(), DrawingAction::NotDrawn);
    }

    #[test]
    fn test_base_visible_area_actions() {
        let mut base = WidgetBase::default();
        base.place(Point::new(0, 0), Size::new(10, 10));
        base.clear_draw_flags();

        base.set_visible_area(Rect::new(0, 0, 100, 100));
        assert_eq!(base.drawing_action(), DrawingAction::Drawn);
        assert!(!base.needs_redraw());

        base.set_visible_area(Rect::new(5, 0, 100, 100));
        assert_eq!(base.drawing_action(), DrawingAction::PartlyDrawn);
        assert_eq!(base.clip(), Rect::new(5, 0, 5, 10));
        assert!(base.needs_redraw());

        base.clear_draw_flags();
        base.set_visible_area(Rect::new(6, 0, 100, 100));
        assert!(base.needs_redraw(), "clip change while partly drawn");

        base.clear_draw_flags();
        base.set_visible_area(Rect::new(50, 50, 10, 10));
        assert_eq!(base.drawing_action(), DrawingAction::NotDrawn);
        assert!(!base.needs_redraw());
    }

    #[test]
    fn test_base_visibility_layout_switch() {
        let mut base = WidgetBase::default();
        assert!(!base.set_visibility(Visibility::Hidden));
        assert!(base.needs_redraw());
        assert!(base.set_visibility(Visibility::Invisible));
        assert!(base.set_visibility(Visibility::Visible));
        assert!(!base.set_visibility(Visibility::Visible));
    }

    #[test]
    fn test_base_move_sets_redraw() {
        let mut base = WidgetBase::default();
        base.clear_draw_flags();
        assert!(!base.move_to(Point::zero()));
        assert!(base.move_to(Point::new(1, 2)));
        assert!(base.needs_redraw());
    }

    #[test]
    fn test_event_coords() {
        let event = Event::Scroll {
            x: 3,
            y: 4,
            delta_x: 0,
            delta_y: 10,
            source: ScrollSource::Wheel,
        };
        assert_eq!(event.coords(), Some(Point::new(3, 4)));
        assert_eq!(Event::FocusIn.coords(), None);
    }
}
