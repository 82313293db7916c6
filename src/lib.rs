pub mod clipboard;
pub mod dialog;
pub mod error;
pub mod jobs;
pub mod layout;
pub mod lock;
pub mod renderer;
pub mod timer;
pub mod tree;
pub mod widgets;
pub mod window;

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use layout::Size;
use renderer::{FixedMetrics, TextMetrics};

pub mod prelude {
    pub use crate::dialog::{Dialog, DialogStack, LayoutInspector, ShowOutcome};
    pub use crate::error::LayoutError;
    pub use crate::layout::{Point, Size};
    pub use crate::renderer::{Canvas, DrawCommand, DrawList, FixedMetrics, TextMetrics};
    pub use crate::tree::{Tree, WidgetId};
    pub use crate::widgets::{
        Color, Event, EventResponse, Key, Label, ListBox, ListObserver, MemberTemplate,
        Modifiers, MouseButton, NodeId, Orientation, Rect, RowData, RowTemplate, ScrollContainer,
        ScrollPanel, ScrollSource, ScrollbarMode, Spacer, Stack, TextBox, TextObserver,
        ToggledPanel, TreeObserver, TreeView, Visibility, Widget,
    };
    pub use crate::window::{EditCommand, FloatKind, Handle, Window};
    pub use crate::{ChangeFlags, Settings};
}

bitflags! {
    /// Pending work on a window
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChangeFlags: u8 {
        /// The whole tree must be placed again
        const NEEDS_LAYOUT = 0b01;
        /// Something was marked dirty since the last draw
        const NEEDS_PAINT  = 0b10;
    }
}

/// Toolkit-wide settings shared by every window of a dialog stack.
#[derive(Clone)]
pub struct Settings {
    /// Integer scale for high-density screens
    pub hdpi_scale: i32,
    /// Touch-first behavior: vertical drag scrolling, edit bubble, magnifier
    pub mobile: bool,
    pub window_size: Size,
    /// Period of the repeat-scroll and hide-check timer
    pub scroll_timer_ms: u64,
    /// Delay before a floating scrollbar is handed back after the pointer
    /// leaves its container
    pub scrollbar_hide_ms: u64,
    pub cursor_blink_ms: u64,
    /// Scroll levels above this gap come from a wheel
    pub wheel_level_gap: i32,
    /// Level at which one scroll moves a whole page
    pub max_normal_level: i32,
    pub scrollbar_thickness: i32,
    pub min_handle_size: i32,
    /// Pixels moved by one arrow-key step
    pub item_step: u32,
    /// Drag distance that cancels a pending click
    pub click_threshold: i32,
    /// Horizontal indent per tree-view level
    pub indentation_step: i32,
    /// Rows kept materialized on either side of the visible list window
    pub gc_margin_rows: usize,
    pub metrics: Rc<dyn TextMetrics>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hdpi_scale: 1,
            mobile: false,
            window_size: Size::new(800, 600),
            scroll_timer_ms: 200,
            scrollbar_hide_ms: 1000,
            cursor_blink_ms: 500,
            wheel_level_gap: 1000,
            max_normal_level: 100,
            scrollbar_thickness: 8,
            min_handle_size: 16,
            item_step: 16,
            click_threshold: 2,
            indentation_step: 16,
            gc_margin_rows: 4,
            metrics: Rc::new(FixedMetrics::default()),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("hdpi_scale", &self.hdpi_scale)
            .field("mobile", &self.mobile)
            .field("window_size", &self.window_size)
            .field("scroll_timer_ms", &self.scroll_timer_ms)
            .field("scrollbar_hide_ms", &self.scrollbar_hide_ms)
            .field("cursor_blink_ms", &self.cursor_blink_ms)
            .field("wheel_level_gap", &self.wheel_level_gap)
            .field("max_normal_level", &self.max_normal_level)
            .finish_non_exhaustive()
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale pixel constants; the click threshold follows the scale.
    pub fn hdpi_scale(mut self, scale: i32) -> Self {
        let scale = scale.max(1);
        self.hdpi_scale = scale;
        self.click_threshold = 2 * scale;
        self
    }

    pub fn mobile(mut self, mobile: bool) -> Self {
        self.mobile = mobile;
        self
    }

    pub fn window_size(mut self, width: i32, height: i32) -> Self {
        self.window_size = Size::new(width, height);
        self
    }

    pub fn scroll_timer_ms(mut self, ms: u64) -> Self {
        self.scroll_timer_ms = ms;
        self
    }

    pub fn scrollbar_hide_ms(mut self, ms: u64) -> Self {
        self.scrollbar_hide_ms = ms;
        self
    }

    pub fn cursor_blink_ms(mut self, ms: u64) -> Self {
        self.cursor_blink_ms = ms;
        self
    }

    pub fn wheel_levels(mut self, gap: i32, max_normal: i32) -> Self {
        self.wheel_level_gap = gap;
        self.max_normal_level = max_normal.max(1);
        self
    }

    pub fn item_step(mut self, step: u32) -> Self {
        self.item_step = step;
        self
    }

    pub fn indentation_step(mut self, step: i32) -> Self {
        self.indentation_step = step;
        self
    }

    pub fn gc_margin_rows(mut self, rows: usize) -> Self {
        self.gc_margin_rows = rows;
        self
    }

    pub fn metrics(mut self, metrics: impl TextMetrics + 'static) -> Self {
        self.metrics = Rc::new(metrics);
        self
    }

    /// Line height reported by the text metrics.
    pub fn line_height(&self) -> i32 {
        self.metrics.measure("").height
    }
}
