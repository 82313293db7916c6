//! Scrollbar position state shared by floating scrollbars and the private
//! dummies every scroll container keeps.

use super::widget::Rect;

/// Axis a scrollbar controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// When the scrollbar is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollbarMode {
    /// Shown even when the content fits
    AlwaysVisible,
    /// Never shown; the content still scrolls
    AlwaysInvisible,
    /// Shown only while the content overflows
    #[default]
    AutoVisible,
}

impl ScrollbarMode {
    /// Whether a bar in this mode is shown for the given range.
    pub fn shows(self, item_count: u32, visible_items: u32) -> bool {
        match self {
            ScrollbarMode::AlwaysVisible => true,
            ScrollbarMode::AlwaysInvisible => false,
            ScrollbarMode::AutoVisible => item_count > visible_items,
        }
    }
}

/// Discrete scroll steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    Begin,
    End,
    ItemBackwards,
    ItemForward,
    JumpBackwards,
    JumpForward,
}

/// Range and position of one scrollbar, in pixels.
///
/// `item_position` always stays within `0..=item_count - visible_items`
/// (zero when everything fits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollbarState {
    item_count: u32,
    visible_items: u32,
    item_position: u32,
    step: u32,
}

impl Default for ScrollbarState {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ScrollbarState {
    pub fn new(step: u32) -> Self {
        Self {
            item_count: 0,
            visible_items: 0,
            item_position: 0,
            step: step.max(1),
        }
    }

    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    pub fn visible_items(&self) -> u32 {
        self.visible_items
    }

    pub fn item_position(&self) -> u32 {
        self.item_position
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Largest valid position.
    pub fn max_position(&self) -> u32 {
        self.item_count.saturating_sub(self.visible_items)
    }

    pub fn at_begin(&self) -> bool {
        self.item_position == 0
    }

    pub fn at_end(&self) -> bool {
        self.item_position == self.max_position()
    }

    /// Does not re-clamp; callers re-set the position afterwards.
    pub fn set_item_count(&mut self, count: u32) {
        self.item_count = count;
    }

    pub fn set_visible_items(&mut self, visible: u32) {
        self.visible_items = visible;
    }

    pub fn set_item_position(&mut self, position: u32) {
        self.item_position = position.min(self.max_position());
    }

    /// Copy range and position from another bar.
    pub fn mirror(&mut self, other: &ScrollbarState) {
        self.item_count = other.item_count;
        self.visible_items = other.visible_items;
        self.item_position = other.item_position;
    }

    pub fn scroll(&mut self, command: ScrollCommand) {
        let position = match command {
            ScrollCommand::Begin => 0,
            ScrollCommand::End => self.max_position(),
            ScrollCommand::ItemBackwards => self.item_position.saturating_sub(self.step),
            ScrollCommand::ItemForward => self.item_position.saturating_add(self.step),
            ScrollCommand::JumpBackwards => self.item_position.saturating_sub(self.visible_items),
            ScrollCommand::JumpForward => self.item_position.saturating_add(self.visible_items),
        };
        self.set_item_position(position);
    }

    /// Track rectangle inside `bounds` for a bar of `thickness` hugging the
    /// right (vertical) or bottom (horizontal) edge.
    pub fn track_rect(orientation: Orientation, bounds: Rect, thickness: i32) -> Rect {
        match orientation {
            Orientation::Vertical => Rect::new(
                bounds.right() - thickness,
                bounds.y,
                thickness,
                bounds.height,
            ),
            Orientation::Horizontal => Rect::new(
                bounds.x,
                bounds.bottom() - thickness,
                bounds.width,
                thickness,
            ),
        }
    }

    /// Handle length along a track of `track_size`.
    pub fn handle_size(&self, track_size: i32, min_handle: i32) -> i32 {
        if self.item_count <= self.visible_items || self.item_count == 0 {
            return track_size;
        }
        let size = (track_size as i64 * self.visible_items as i64 / self.item_count as i64) as i32;
        size.max(min_handle).min(track_size)
    }

    /// Handle offset from the track start.
    pub fn handle_offset(&self, track_size: i32, handle_size: i32) -> i32 {
        let max = self.max_position();
        if max == 0 {
            return 0;
        }
        let travel = (track_size - handle_size).max(0) as i64;
        (self.item_position as i64 * travel / max as i64) as i32
    }

    pub fn handle_rect(&self, orientation: Orientation, track: Rect, min_handle: i32) -> Rect {
        match orientation {
            Orientation::Vertical => {
                let size = self.handle_size(track.height, min_handle);
                let offset = self.handle_offset(track.height, size);
                Rect::new(track.x, track.y + offset, track.width, size)
            }
            Orientation::Horizontal => {
                let size = self.handle_size(track.width, min_handle);
                let offset = self.handle_offset(track.width, size);
                Rect::new(track.x + offset, track.y, size, track.height)
            }
        }
    }

    /// Position reached by dragging the handle `delta` pixels along the
    /// track from `start_position`.
    pub fn position_for_drag(
        &self,
        start_position: u32,
        delta: i32,
        track_size: i32,
        min_handle: i32,
    ) -> u32 {
        let handle = self.handle_size(track_size, min_handle);
        let travel = (track_size - handle).max(1) as i64;
        let moved = delta as i64 * self.max_position() as i64 / travel;
        (start_position as i64 + moved).clamp(0, self.max_position() as i64) as u32
    }
}
