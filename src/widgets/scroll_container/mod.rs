//! The scroll container engine.
//!
//! A scroll container owns a `content` viewport spacer and a `content_grid`
//! that is usually larger than it. Two scrollbar roles (vertical and
//! horizontal) hold the grid offset. Each role is bound to a private dummy
//! [`ScrollbarState`] or, while the pointer is over the container, to one of
//! the window's floating [`Scrollbar`] widgets through a [`FloatingLease`].
//! The dummy mirrors the floating bar so the position survives the handoff.
//!
//! `ScrollContainer` is embedded by the widgets that scroll ([`ScrollPanel`],
//! `ListBox`, `TreeView`). They forward their widget methods here and
//! customize the engine through [`ScrollContent`].
//!
//! [`ScrollPanel`]: crate::widgets::ScrollPanel

mod floating;

pub use floating::{FloatingLease, FloatingScrollbars};

use crate::error::validate;
use crate::layout::{Point, Size};
use crate::timer::TimerId;
use crate::tree::{Tree, WidgetId};
use crate::widgets::scroll::{Orientation, ScrollCommand, ScrollbarMode, ScrollbarState};
use crate::widgets::scrollbar::Scrollbar;
use crate::widgets::spacer::Spacer;
use crate::widgets::widget::{
    Event, EventResponse, Key, MouseButton, Rect, ScrollSource, Visibility, Widget,
};
use crate::window::Window;

const ORIENTATIONS: [Orientation; 2] = [Orientation::Vertical, Orientation::Horizontal];

/// Hooks a scrolling widget uses to shape the engine.
///
/// Every method has a default matching a plain grid of widgets.
pub trait ScrollContent {
    /// Size the content grid wants inside a viewport of `content_size`.
    fn content_grid_size(
        &mut self,
        win: &mut Window,
        sc: &mut ScrollContainer,
        content_origin: Point,
        content_size: Size,
    ) -> Size {
        let _ = (content_origin, content_size);
        win.tree().best_size(sc.grid())
    }

    /// Materialize what the offsets make visible and return the vertical
    /// offset to use, which may differ from `y_offset`.
    fn handle_gc(
        &mut self,
        win: &mut Window,
        sc: &mut ScrollContainer,
        x_offset: u32,
        y_offset: u32,
    ) -> u32 {
        let _ = (win, sc, x_offset);
        y_offset
    }

    fn set_content_grid_origin(&mut self, win: &mut Window, sc: &mut ScrollContainer, origin: Point) {
        win.tree_mut().set_origin(sc.grid(), origin);
    }

    fn set_content_grid_visible_area(
        &mut self,
        win: &mut Window,
        sc: &mut ScrollContainer,
        area: Rect,
    ) {
        win.tree_mut().set_visible_area(sc.grid(), area);
    }

    /// Final say on the offsets before the grid moves.
    fn adjust_offset(
        &mut self,
        win: &mut Window,
        sc: &mut ScrollContainer,
        x_offset: &mut u32,
        y_offset: &mut u32,
    ) {
        let _ = (win, sc, x_offset, y_offset);
    }

    fn mouse_down(&mut self, win: &mut Window, sc: &mut ScrollContainer, first: Point) {
        let _ = (win, sc, first);
    }

    /// Return false to keep the drag from scrolling.
    fn mouse_motion(
        &mut self,
        win: &mut Window,
        sc: &mut ScrollContainer,
        first: Point,
        last: Point,
    ) -> bool {
        let _ = (win, sc, first, last);
        true
    }

    fn mouse_leave(&mut self, win: &mut Window, sc: &mut ScrollContainer, first: Point, last: Point) {
        let _ = (win, sc, first, last);
    }

    fn wheel(&mut self, win: &mut Window, sc: &mut ScrollContainer) {
        let _ = (win, sc);
    }
}

/// Hooks for a grid with no special behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainContent;

impl ScrollContent for PlainContent {}

pub struct ScrollContainer {
    id: WidgetId,
    content: WidgetId,
    content_grid: WidgetId,
    /// Best size reported for the whole container
    viewport: Size,
    vertical_mode: ScrollbarMode,
    horizontal_mode: ScrollbarMode,
    dummy_vertical: ScrollbarState,
    dummy_horizontal: ScrollbarState,
    lease: Option<FloatingLease>,
    content_visible_area: Rect,
    need_layout: bool,
    /// Repeat scrolls planned and done since the last precise scroll
    scroll_elapse: (u32, u32),
    repeat: Option<(Orientation, bool, i32)>,
    hide_deadline: Option<u64>,
    scroll_timer: Option<TimerId>,
    first_coordinate: Option<Point>,
    last_coordinate: Option<Point>,
    require_capture: bool,
}

impl ScrollContainer {
    pub fn new(viewport: Size) -> Self {
        let placeholder = WidgetId::placeholder();
        Self {
            id: placeholder,
            content: placeholder,
            content_grid: placeholder,
            viewport,
            vertical_mode: ScrollbarMode::default(),
            horizontal_mode: ScrollbarMode::default(),
            dummy_vertical: ScrollbarState::default(),
            dummy_horizontal: ScrollbarState::default(),
            lease: None,
            content_visible_area: Rect::default(),
            need_layout: false,
            scroll_elapse: (0, 0),
            repeat: None,
            hide_deadline: None,
            scroll_timer: None,
            first_coordinate: None,
            last_coordinate: None,
            require_capture: true,
        }
    }

    /// Create the content spacer and attach `grid` under the host widget.
    pub fn register(&mut self, win: &mut Window, id: WidgetId, grid: Box<dyn Widget>) {
        self.id = id;
        let step = win.settings().item_step;
        self.dummy_vertical = ScrollbarState::new(step);
        self.dummy_horizontal = ScrollbarState::new(step);

        if let Some(base) = win.tree_mut().base_mut(id) {
            base.set_clips_children(true);
        }
        win.tree_mut().set_relayout_boundary(id, true);
        self.content = win.add(id, Spacer::default());
        self.content_grid = win.add_boxed_at(id, grid, None);
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn content(&self) -> WidgetId {
        self.content
    }

    pub fn grid(&self) -> WidgetId {
        self.content_grid
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn content_rect(&self, tree: &Tree) -> Rect {
        tree.rect(self.content)
    }

    pub fn set_require_capture(&mut self, require: bool) {
        self.require_capture = require;
    }

    pub fn is_floating_bound(&self) -> bool {
        self.lease.is_some()
    }

    pub fn scroll_timer(&self) -> Option<TimerId> {
        self.scroll_timer
    }

    pub fn hide_deadline(&self) -> Option<u64> {
        self.hide_deadline
    }

    pub fn is_dragging(&self) -> bool {
        self.first_coordinate.is_some()
    }

    pub fn mode(&self, orientation: Orientation) -> ScrollbarMode {
        match orientation {
            Orientation::Vertical => self.vertical_mode,
            Orientation::Horizontal => self.horizontal_mode,
        }
    }

    // Scrollbar bindings

    fn floating_bar(&self, orientation: Orientation) -> Option<WidgetId> {
        self.lease.as_ref().map(|lease| lease.bar(orientation))
    }

    pub fn dummy(&self, orientation: Orientation) -> &ScrollbarState {
        match orientation {
            Orientation::Vertical => &self.dummy_vertical,
            Orientation::Horizontal => &self.dummy_horizontal,
        }
    }

    fn dummy_mut(&mut self, orientation: Orientation) -> &mut ScrollbarState {
        match orientation {
            Orientation::Vertical => &mut self.dummy_vertical,
            Orientation::Horizontal => &mut self.dummy_horizontal,
        }
    }

    /// State of the bar currently bound to `orientation`.
    pub fn active(&self, tree: &Tree, orientation: Orientation) -> ScrollbarState {
        if let Some(bar) = self.floating_bar(orientation) {
            if let Some(scrollbar) = tree.downcast_ref::<Scrollbar>(bar) {
                return *scrollbar.state();
            }
        }
        *self.dummy(orientation)
    }

    pub fn active_mut<'a>(
        &'a mut self,
        tree: &'a mut Tree,
        orientation: Orientation,
    ) -> &'a mut ScrollbarState {
        if let Some(bar) = self.floating_bar(orientation) {
            if let Some(scrollbar) = tree.downcast_mut::<Scrollbar>(bar) {
                return scrollbar.state_mut();
            }
        }
        self.dummy_mut(orientation)
    }

    pub fn item_position(&self, tree: &Tree, orientation: Orientation) -> u32 {
        self.active(tree, orientation).item_position()
    }

    /// Copy the floating bar's range and position into the dummy.
    fn sync_dummy(&mut self, tree: &Tree, orientation: Orientation) {
        if self.lease.is_some() {
            let state = self.active(tree, orientation);
            self.dummy_mut(orientation).mirror(&state);
        }
    }

    fn set_range(state: &mut ScrollbarState, item_count: u32, visible_items: u32) {
        state.set_item_count(item_count);
        state.set_visible_items(visible_items);
        // the old position may overflow the new range
        if state.item_position() != 0 {
            let position = state.item_position();
            state.set_item_position(position);
        }
    }

    fn set_scrollbar_mode(
        &mut self,
        win: &mut Window,
        orientation: Orientation,
        item_count: u32,
        visible_items: u32,
    ) {
        Self::set_range(
            self.active_mut(win.tree_mut(), orientation),
            item_count,
            visible_items,
        );
        if let Some(bar) = self.floating_bar(orientation) {
            Self::set_range(self.dummy_mut(orientation), item_count, visible_items);
            let visibility = if self.mode(orientation).shows(item_count, visible_items) {
                Visibility::Visible
            } else {
                Visibility::Invisible
            };
            win.set_visible(bar, visibility);
        }
    }

    /// Change one axis' range after the grid was resized outside `place`.
    pub fn set_item_count(&mut self, win: &mut Window, orientation: Orientation, item_count: u32) {
        let visible_items = self.dummy(orientation).visible_items();
        self.set_scrollbar_mode(win, orientation, item_count, visible_items);
    }

    pub fn set_vertical_scrollbar_mode(&mut self, win: &mut Window, mode: ScrollbarMode) {
        self.vertical_mode = mode;
        self.invalidate_layout(win);
    }

    pub fn set_horizontal_scrollbar_mode(&mut self, win: &mut Window, mode: ScrollbarMode) {
        self.horizontal_mode = mode;
        self.invalidate_layout(win);
    }

    // Layout

    /// Ask for the container to be placed again on the next layout pass.
    pub fn invalidate_layout(&mut self, win: &mut Window) {
        self.need_layout = true;
        win.tree_mut().mark_needs_layout(self.id);
    }

    pub fn needs_layout(&self) -> bool {
        self.need_layout
    }

    pub fn best_size(&self) -> Size {
        self.viewport
    }

    pub fn place<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        origin: Point,
        size: Size,
    ) {
        self.need_layout = false;
        win.tree_mut().place_base(self.id, origin, size);
        win.tree_mut().place_base(self.content, origin, size);
        if size.width == 0 || size.height == 0 {
            return;
        }

        let content = win.tree().rect(self.content);
        let mut grid_size = hooks.content_grid_size(win, self, content.origin(), content.size());
        grid_size.width = grid_size.width.max(content.width);

        win.place_widget(self.content_grid, content.origin(), grid_size);
        let grid_size = win.tree().rect(self.content_grid).size();

        self.set_scrollbar_mode(
            win,
            Orientation::Vertical,
            grid_size.height.max(0) as u32,
            content.height as u32,
        );
        self.set_scrollbar_mode(
            win,
            Orientation::Horizontal,
            grid_size.width.max(0) as u32,
            content.width as u32,
        );

        let horizontal = self.active(win.tree(), Orientation::Horizontal);
        let vertical = self.active(win.tree(), Orientation::Vertical);
        if grid_size.width >= content.width {
            validate!(
                horizontal.item_position() + horizontal.visible_items() <= horizontal.item_count(),
                "horizontal offset {} overflows {:?}",
                horizontal.item_position(),
                horizontal
            );
        }
        if grid_size.height >= content.height {
            validate!(
                vertical.item_position() + vertical.visible_items() <= vertical.item_count(),
                "vertical offset {} overflows {:?}",
                vertical.item_position(),
                vertical
            );
        }

        let x_offset = horizontal.item_position();
        let y_offset = hooks.handle_gc(win, self, x_offset, vertical.item_position());
        log::trace!("{:?} placed, offsets ({}, {})", self.id, x_offset, y_offset);

        let grid_origin = content.origin().offset(-(x_offset as i32), -(y_offset as i32));
        hooks.set_content_grid_origin(win, self, grid_origin);

        self.content_visible_area = content;
        hooks.set_content_grid_visible_area(win, self, content);

        self.place_floating_bars(win);
    }

    /// Re-place an invalidated container where it is; otherwise just repaint.
    pub fn layout_children<C: ScrollContent + ?Sized>(&mut self, hooks: &mut C, win: &mut Window) {
        if self.need_layout || win.tree().needs_layout(self.id) {
            let rect = win.tree().rect(self.id);
            self.place(hooks, win, rect.origin(), rect.size());
        }
        win.tree_mut().set_dirty(self.id);
    }

    fn place_floating_bars(&self, win: &mut Window) {
        let Some(lease) = &self.lease else {
            return;
        };
        let content = win.tree().rect(self.content);
        let grid = win.tree().rect(self.content_grid);
        let visible_area = win
            .tree()
            .base(self.id)
            .map(|b| b.clip())
            .filter(|clip| !clip.is_empty())
            .unwrap_or(content);
        for orientation in ORIENTATIONS {
            let bar = lease.bar(orientation);
            let thickness = win
                .tree()
                .downcast_ref::<Scrollbar>(bar)
                .map(|s| s.thickness())
                .unwrap_or(0);
            let track = ScrollbarState::track_rect(
                orientation,
                self.float_widget_ref_rect(content, grid),
                thickness,
            );
            win.tree_mut().place_base(bar, track.origin(), track.size());
            win.tree_mut().set_visible_area(bar, visible_area);
        }
    }

    /// Rect the floating bars hug: the viewport, capped to a shorter grid.
    fn float_widget_ref_rect(&self, content: Rect, grid: Rect) -> Rect {
        Rect::new(
            content.x,
            content.y,
            content.width.min(grid.width.max(0)),
            content.height.min(grid.height.max(0)),
        )
    }

    // Offsets

    /// Apply the scrollbar positions to the content grid.
    pub fn scrollbar_moved<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        gc_handled: bool,
    ) {
        let mut x_offset = self.item_position(win.tree(), Orientation::Horizontal);
        let mut y_offset = self.item_position(win.tree(), Orientation::Vertical);
        if !gc_handled {
            y_offset = hooks.handle_gc(win, self, x_offset, y_offset);
        }
        let before = (x_offset, y_offset);
        hooks.adjust_offset(win, self, &mut x_offset, &mut y_offset);
        if before.0 != x_offset {
            self.horizontal_set_item_position(win, x_offset);
        }
        if before.1 != y_offset {
            self.vertical_set_item_position(win, y_offset);
        }

        let content = win.tree().rect(self.content);
        let grid_origin = content.origin().offset(-(x_offset as i32), -(y_offset as i32));
        log::trace!("{:?} grid moved to {:?}", self.id, grid_origin);
        hooks.set_content_grid_origin(win, self, grid_origin);

        if let Some(clip) = win.tree().base(self.id).map(|b| b.clip()) {
            self.content_visible_area = clip.intersect(&content);
        }
        let area = self.content_visible_area;
        hooks.set_content_grid_visible_area(win, self, area);
        win.tree_mut().set_dirty(self.id);
    }

    /// A leased floating bar was dragged.
    pub fn floating_moved<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        orientation: Orientation,
    ) {
        if self.lease.is_none() {
            // the bar was handed back before the job ran
            return;
        }
        validate!(
            win.tree().is_visible(self.id),
            "hidden scroll container {:?} got a scrollbar move",
            self.id
        );
        self.scrollbar_moved(hooks, win, false);
        self.sync_dummy(win.tree(), orientation);
    }

    pub fn vertical_set_item_position(&mut self, win: &mut Window, position: u32) {
        self.active_mut(win.tree_mut(), Orientation::Vertical)
            .set_item_position(position);
        self.sync_dummy(win.tree(), Orientation::Vertical);
    }

    pub fn horizontal_set_item_position(&mut self, win: &mut Window, position: u32) {
        self.active_mut(win.tree_mut(), Orientation::Horizontal)
            .set_item_position(position);
        self.sync_dummy(win.tree(), Orientation::Horizontal);
    }

    /// Move the vertical position the least needed to show `rect`, given
    /// relative to the content grid. The grid itself is not moved.
    pub fn show_content_rect(&mut self, win: &mut Window, rect: Rect) {
        let content_height = win.tree().rect(self.content).height;
        if win.tree().rect(self.content_grid).height <= content_height {
            return;
        }
        validate!(rect.y >= 0, "content rect above the grid: {:?}", rect);

        let position = self.item_position(win.tree(), Orientation::Vertical) as i32;
        let distance = rect.bottom() - (position + content_height);
        if distance > 0 {
            self.vertical_set_item_position(win, (position + distance) as u32);
        }
        if rect.y < self.item_position(win.tree(), Orientation::Vertical) as i32 {
            self.vertical_set_item_position(win, rect.y as u32);
        }
    }

    /// Scroll to the end of the vertical range.
    pub fn scroll_to_end<C: ScrollContent + ?Sized>(&mut self, hooks: &mut C, win: &mut Window) {
        self.active_mut(win.tree_mut(), Orientation::Vertical)
            .scroll(ScrollCommand::End);
        self.sync_dummy(win.tree(), Orientation::Vertical);
        self.scrollbar_moved(hooks, win, false);
    }

    /// Scroll one axis by `level`.
    ///
    /// Levels above the wheel gap come from a wheel and move once. Lower
    /// levels are precise; the first such scroll arms a timer repeating it
    /// a few more times.
    pub fn scroll(
        &mut self,
        win: &mut Window,
        orientation: Orientation,
        up: bool,
        level: i32,
        first: bool,
    ) -> bool {
        validate!(level > 0, "scroll level must be positive, got {}", level);
        let gap = win.settings().wheel_level_gap;
        let max_normal = win.settings().max_normal_level.max(1);

        let wheel = level > gap;
        let level2 = if wheel { level - gap } else { level };
        let state = self.active(win.tree(), orientation);
        let offset = (level2 as i64 * state.visible_items() as i64 / max_normal as i64).max(1) as u32;

        let position = state.item_position();
        let target = if up {
            position.saturating_add(offset).min(state.max_position())
        } else {
            position.saturating_sub(offset)
        };
        if target == position {
            return false;
        }
        self.active_mut(win.tree_mut(), orientation)
            .set_item_position(target);
        log::trace!("{:?} scrolled {:?} to {}", self.id, orientation, target);

        if !wheel && first {
            let times = 3 + 7 * level2 / max_normal;
            self.scroll_elapse = (times.max(0) as u32, 0);
            self.repeat = Some((orientation, up, level));
            if let Some(timer) = self.scroll_timer.take() {
                win.remove_timer(timer);
            }
            let period = win.settings().scroll_timer_ms;
            self.scroll_timer = Some(win.add_timer(self.id, period));
        }
        self.sync_dummy(win.tree(), orientation);
        true
    }

    /// Handle the repeat-scroll and hide-check timer. Returns false when
    /// `timer` is not this container's.
    pub fn on_timer<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        timer: TimerId,
    ) -> bool {
        if self.scroll_timer != Some(timer) {
            return false;
        }

        if self.scroll_elapse.0 != self.scroll_elapse.1 {
            validate!(self.scroll_elapse.0 > self.scroll_elapse.1);
            let scrolled = match self.repeat {
                Some((orientation, up, level)) => self.scroll(win, orientation, up, level, false),
                None => false,
            };
            if scrolled {
                self.scrollbar_moved(hooks, win, false);
                self.scroll_elapse.1 += 1;
            } else {
                self.scroll_elapse.0 = self.scroll_elapse.1;
            }
        }

        if let Some(deadline) = self.hide_deadline {
            if win.now() >= deadline && self.lease.is_some() {
                self.reset_scrollbar(win);
            }
        }

        if self.scroll_elapse.0 == self.scroll_elapse.1 && self.hide_deadline.is_none() {
            log::trace!("{:?} scroll timer done", self.id);
            if let Some(timer) = self.scroll_timer.take() {
                win.remove_timer(timer);
            }
            self.repeat = None;
        }
        true
    }

    // Input

    pub fn handle_key<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        key: Key,
    ) -> EventResponse {
        let moves: &[(Orientation, ScrollCommand)] = match key {
            Key::Home => &[
                (Orientation::Vertical, ScrollCommand::Begin),
                (Orientation::Horizontal, ScrollCommand::Begin),
            ],
            Key::End => &[(Orientation::Vertical, ScrollCommand::End)],
            Key::PageUp => &[(Orientation::Vertical, ScrollCommand::JumpBackwards)],
            Key::PageDown => &[(Orientation::Vertical, ScrollCommand::JumpForward)],
            Key::Up => &[(Orientation::Vertical, ScrollCommand::ItemBackwards)],
            Key::Down => &[(Orientation::Vertical, ScrollCommand::ItemForward)],
            Key::Left => &[(Orientation::Horizontal, ScrollCommand::ItemBackwards)],
            Key::Right => &[(Orientation::Horizontal, ScrollCommand::ItemForward)],
            _ => return EventResponse::Ignored,
        };
        for &(orientation, command) in moves {
            self.active_mut(win.tree_mut(), orientation).scroll(command);
            self.sync_dummy(win.tree(), orientation);
        }
        self.scrollbar_moved(hooks, win, false);
        EventResponse::Handled
    }

    /// Route an event reaching the host widget through the engine.
    pub fn handle_event<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        event: &Event,
    ) -> EventResponse {
        match *event {
            Event::Scroll {
                delta_x,
                delta_y,
                source,
                ..
            } => {
                hooks.wheel(win, self);
                for (orientation, delta) in [
                    (Orientation::Vertical, delta_y),
                    (Orientation::Horizontal, delta_x),
                ] {
                    if delta == 0 {
                        continue;
                    }
                    let level = self.scroll_level(win, delta, source);
                    if self.scroll(win, orientation, delta > 0, level, true) {
                        self.scrollbar_moved(hooks, win, false);
                    }
                }
                EventResponse::Handled
            }
            Event::MouseDown {
                x,
                y,
                button: MouseButton::Left,
            } => self.mouse_down(hooks, win, Point::new(x, y)),
            Event::MouseMove { x, y } => self.mouse_motion(hooks, win, Point::new(x, y)),
            Event::MouseUp {
                x,
                y,
                button: MouseButton::Left,
            } => self.left_button_up(hooks, win, Point::new(x, y)),
            Event::MouseEnter { .. } => {
                self.mouse_enter(win);
                EventResponse::Ignored
            }
            Event::MouseLeave { x, y } => {
                self.mouse_leave(hooks, win, Point::new(x, y));
                EventResponse::Ignored
            }
            Event::KeyDown { key, .. } => self.handle_key(hooks, win, key),
            _ => EventResponse::Ignored,
        }
    }

    fn scroll_level(&self, win: &Window, delta: i32, source: ScrollSource) -> i32 {
        let settings = win.settings();
        let level = delta.abs().clamp(1, settings.max_normal_level.max(1));
        match source {
            ScrollSource::Wheel => settings.wheel_level_gap + level,
            ScrollSource::Finger | ScrollSource::Continuous => level,
        }
    }

    fn mouse_down<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        point: Point,
    ) -> EventResponse {
        if self.require_capture {
            win.keyboard_capture(Some(self.id));
        }
        let content = win.tree().rect(self.content);
        validate!(
            content.contains(point.x, point.y),
            "press at {:?} outside the content {:?}",
            point,
            content
        );
        if self.scroll_timer.is_some() {
            self.scroll_elapse = (0, 0);
        }

        validate!(
            self.first_coordinate.is_none(),
            "{:?} pressed again while dragging",
            self.id
        );
        self.first_coordinate = Some(point);
        self.last_coordinate = Some(point);
        if self.require_capture {
            win.mouse_capture(Some(self.id));
        }
        hooks.mouse_down(win, self, point);
        EventResponse::Handled
    }

    fn mouse_motion<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        point: Point,
    ) -> EventResponse {
        let Some(first) = self.first_coordinate else {
            return EventResponse::Ignored;
        };
        let last = self.last_coordinate.unwrap_or(first);
        self.last_coordinate = Some(point);

        let threshold = win.settings().click_threshold;
        if win.mouse_click_pending().is_some()
            && ((point.x - first.x).abs() >= threshold || (point.y - first.y).abs() >= threshold)
        {
            win.clear_mouse_click();
        }

        if !hooks.mouse_motion(win, self, first, point) {
            return EventResponse::Handled;
        }

        let (dx, dy) = (point.x - last.x, point.y - last.y);
        let mut abs_x = dx.unsigned_abs();
        let mut abs_y = if win.settings().mobile {
            dy.unsigned_abs()
        } else {
            0
        };
        if abs_y >= abs_x {
            abs_x = 0;
        } else {
            abs_y = 0;
        }

        // dragging up or left reveals what lies further on
        if abs_y != 0 {
            let position = self.item_position(win.tree(), Orientation::Vertical);
            let position = if dy < 0 {
                position.saturating_add(abs_y)
            } else {
                position.saturating_sub(abs_y)
            };
            self.vertical_set_item_position(win, position);
        }
        if abs_x != 0 {
            let position = self.item_position(win.tree(), Orientation::Horizontal);
            let position = if dx < 0 {
                position.saturating_add(abs_x)
            } else {
                position.saturating_sub(abs_x)
            };
            self.horizontal_set_item_position(win, position);
        }

        if dx != 0 || dy != 0 {
            self.scrollbar_moved(hooks, win, false);
        }
        EventResponse::Handled
    }

    fn left_button_up<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        point: Point,
    ) -> EventResponse {
        let Some(first) = self.first_coordinate.take() else {
            return EventResponse::Ignored;
        };
        self.last_coordinate = None;
        hooks.mouse_leave(win, self, first, point);
        EventResponse::Handled
    }

    /// Take the floating scrollbars over from whoever holds them.
    pub fn mouse_enter(&mut self, win: &mut Window) {
        self.hide_deadline = None;
        if self.lease.is_some() {
            return;
        }

        let pool = win.floating_scrollbars().clone();
        if let Some(holder) = pool.holder() {
            validate!(holder != self.id, "{:?} holds the floating scrollbars twice", holder);
            win.evict_floating(holder);
        }
        win.reclaim_floating();

        let lease = pool.acquire(self.id);
        for orientation in ORIENTATIONS {
            let bar = lease.bar(orientation);
            let dummy = *self.dummy(orientation);
            win.tree_mut().reparent(bar, self.content_grid);
            if let Some(scrollbar) = win.tree_mut().downcast_mut::<Scrollbar>(bar) {
                scrollbar.state_mut().mirror(&dummy);
                scrollbar.set_target(Some(self.id));
            }
            let visibility = if self
                .mode(orientation)
                .shows(dummy.item_count(), dummy.visible_items())
            {
                Visibility::Visible
            } else {
                Visibility::Invisible
            };
            win.set_visible(bar, visibility);
        }
        self.lease = Some(lease);
        self.place_floating_bars(win);
        win.tree_mut().set_dirty(self.id);
    }

    fn mouse_leave<C: ScrollContent + ?Sized>(
        &mut self,
        hooks: &mut C,
        win: &mut Window,
        point: Point,
    ) {
        let content = win.tree().rect(self.content);
        if self.lease.is_some() && !content.contains(point.x, point.y) {
            self.hide_deadline = Some(win.now() + win.settings().scrollbar_hide_ms);
            if self.scroll_timer.is_none() {
                let period = win.settings().scroll_timer_ms;
                self.scroll_timer = Some(win.add_timer(self.id, period));
            }
        }

        if win.mouse_captured() == Some(self.id) {
            return;
        }
        if let Some(first) = self.first_coordinate.take() {
            self.last_coordinate = None;
            hooks.mouse_leave(win, self, first, point);
        }
    }

    /// Hand the floating scrollbars back to the window and fall back to the
    /// dummies.
    pub fn reset_scrollbar(&mut self, win: &mut Window) {
        validate!(
            self.lease.is_some(),
            "{:?} does not hold the floating scrollbars",
            self.id
        );
        if let Some(lease) = self.lease.take() {
            for orientation in ORIENTATIONS {
                let state = win
                    .tree()
                    .downcast_ref::<Scrollbar>(lease.bar(orientation))
                    .map(|s| *s.state());
                if let Some(state) = state {
                    self.dummy_mut(orientation).mirror(&state);
                }
            }
            for bar in lease.bars() {
                win.park_scrollbar(bar);
            }
            lease.release();
        }
        self.hide_deadline = None;
        win.tree_mut().set_dirty(self.id);
    }

    pub fn popup_new_window(&mut self, win: &mut Window) {
        if self.lease.is_some() {
            self.reset_scrollbar(win);
        }
        self.first_coordinate = None;
        self.last_coordinate = None;
    }

    pub fn destroying(&mut self, win: &mut Window) {
        if self.lease.is_some() {
            self.reset_scrollbar(win);
        }
        if let Some(timer) = self.scroll_timer.take() {
            win.remove_timer(timer);
        }
    }
}
