//! A window: the widget tree plus everything shared by its widgets.
//!
//! The window owns the arena [`Tree`], the floating scrollbar pool, the
//! contextual float widgets, timers, input capture, the typed name registry
//! and the deferred job queue. Widgets are extracted from the tree while
//! one of their methods runs, so every method receives `&mut Window` and can
//! reach any other widget through it.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::error::{validate, LayoutError};
use crate::jobs::{JobQueue, JobType};
use crate::layout::{Point, Size};
use crate::renderer::Canvas;
use crate::timer::{TimerId, Timers};
use crate::tree::{Tree, WidgetId};
use crate::widgets::float::FloatWidget;
use crate::widgets::scroll::Orientation;
use crate::widgets::scroll_container::FloatingScrollbars;
use crate::widgets::widget::{
    DrawingAction, Event, EventResponse, MouseButton, Rect, Visibility, Widget, WidgetKind,
    WidgetType,
};
use crate::widgets::{Scrollbar, Stack};
use crate::{ChangeFlags, Settings};

/// Contextual widgets a window keeps floating above its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    /// Copy/paste bubble shown over a text selection
    EditBubble,
    /// Enlarged view of the text under a dragging finger
    Magnifier,
}

/// Command sent by the edit bubble to the widget it serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditCommand {
    Copy,
    Cut,
    Paste,
    SelectAll,
}

/// Typed reference to a named widget.
pub struct Handle<T> {
    id: WidgetId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(id: WidgetId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handle").field(&self.id).finish()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> From<Handle<T>> for WidgetId {
    fn from(handle: Handle<T>) -> Self {
        handle.id
    }
}

pub struct Window {
    settings: Settings,
    tree: Tree,
    root: WidgetId,
    floating: FloatingScrollbars,
    floats: HashMap<FloatKind, WidgetId>,
    timers: Timers,
    jobs: JobQueue,
    registry: HashMap<String, (WidgetId, WidgetKind)>,
    change_flags: ChangeFlags,
    now: u64,
    /// Widgets under the pointer, outermost first
    hovered: Vec<WidgetId>,
    mouse_capture: Option<WidgetId>,
    keyboard_focus: Option<WidgetId>,
    /// Target of the last left press, until released or cleared by a drag
    click_pending: Option<WidgetId>,
}

impl Window {
    pub fn new(settings: Settings) -> Self {
        let mut tree = Tree::new();
        let root = tree.register(Box::new(Stack::vertical()));
        if let Some(base) = tree.base_mut(root) {
            base.set_clips_children(true);
        }

        let placeholder = WidgetId::placeholder();
        let mut win = Self {
            settings,
            tree,
            root,
            floating: FloatingScrollbars::new(placeholder, placeholder),
            floats: HashMap::new(),
            timers: Timers::new(),
            jobs: JobQueue::new(),
            registry: HashMap::new(),
            change_flags: ChangeFlags::NEEDS_LAYOUT,
            now: 0,
            hovered: Vec::new(),
            mouse_capture: None,
            keyboard_focus: None,
            click_pending: None,
        };

        let vertical = Scrollbar::new(Orientation::Vertical, &win.settings);
        let horizontal = Scrollbar::new(Orientation::Horizontal, &win.settings);
        let vertical = win.add_floating(vertical);
        let horizontal = win.add_floating(horizontal);
        win.floating = FloatingScrollbars::new(vertical, horizontal);

        for kind in [FloatKind::EditBubble, FloatKind::Magnifier] {
            let id = win.add_floating(FloatWidget::new(kind));
            win.floats.insert(kind, id);
        }
        win
    }

    fn add_floating(&mut self, widget: impl Widget + 'static) -> WidgetId {
        let id = self.tree.register(Box::new(widget));
        self.tree.set_parent(id, self.root);
        if let Some(base) = self.tree.base_mut(id) {
            base.set_floating(true);
        }
        self.tree.set_visible(id, Visibility::Invisible);
        id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn rect(&self) -> Rect {
        Rect::from_size(self.settings.window_size)
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn change_flags(&self) -> ChangeFlags {
        self.change_flags
    }

    // Building

    /// Register `widget` as the last child of `parent`.
    pub fn add(&mut self, parent: WidgetId, widget: impl Widget + 'static) -> WidgetId {
        self.add_boxed_at(parent, Box::new(widget), None)
    }

    pub fn add_at(
        &mut self,
        parent: WidgetId,
        widget: impl Widget + 'static,
        at: Option<usize>,
    ) -> WidgetId {
        self.add_boxed_at(parent, Box::new(widget), at)
    }

    pub fn add_boxed_at(
        &mut self,
        parent: WidgetId,
        widget: Box<dyn Widget>,
        at: Option<usize>,
    ) -> WidgetId {
        let id = self.tree.register(widget);
        self.tree.insert_child(parent, id, at);
        self.with_widget_mut(id, |widget, win| widget.register_children(win, id));
        self.tree.mark_needs_layout(parent);
        self.change_flags |= ChangeFlags::NEEDS_PAINT;
        id
    }

    /// Register a widget under a name that `find` resolves later.
    pub fn add_named<T: WidgetType + 'static>(
        &mut self,
        parent: WidgetId,
        name: impl Into<String>,
        widget: T,
    ) -> Handle<T> {
        let id = self.add(parent, widget);
        self.registry.insert(name.into(), (id, T::KIND));
        Handle::new(id)
    }

    pub fn find<T: WidgetType + 'static>(&self, name: &str) -> Option<Handle<T>> {
        let &(id, kind) = self.registry.get(name)?;
        (kind == T::KIND && self.tree.contains(id)).then(|| Handle::new(id))
    }

    pub fn name_of(&self, id: WidgetId) -> Option<&str> {
        self.registry
            .iter()
            .find(|(_, (wid, _))| *wid == id)
            .map(|(name, _)| name.as_str())
    }

    pub fn get<T: Widget + 'static>(&self, id: impl Into<WidgetId>) -> Option<&T> {
        self.tree.downcast_ref::<T>(id.into())
    }

    /// Run `f` on a widget taken out of the tree, so it may use the window
    /// freely. Returns `None` for unknown ids.
    pub fn with_widget_mut<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut dyn Widget, &mut Window) -> R,
    ) -> Option<R> {
        let mut widget = self.tree.take_widget(id)?;
        let result = f(&mut *widget, self);
        self.tree.restore_widget(id, widget);
        Some(result)
    }

    /// Like `with_widget_mut`, for a widget of known type.
    pub fn with<T: Widget + 'static, R>(
        &mut self,
        id: impl Into<WidgetId>,
        f: impl FnOnce(&mut T, &mut Window) -> R,
    ) -> Option<R> {
        let id = id.into();
        let mut widget = self.tree.take_widget(id)?;
        let result = (*widget)
            .as_any_mut()
            .downcast_mut::<T>()
            .map(|typed| f(typed, self));
        self.tree.restore_widget(id, widget);
        result
    }

    /// Remove a widget and its subtree.
    pub fn destroy(&mut self, id: WidgetId) {
        validate!(id != self.root, "the window root cannot be destroyed");
        if !self.tree.contains(id) {
            return;
        }

        let mut doomed = vec![id];
        doomed.extend(self.tree.descendants(id));
        for &widget_id in &doomed {
            self.with_widget_mut(widget_id, |widget, win| widget.destroying(win, widget_id));
        }

        // Bars still lent into the subtree go home before it disappears
        for bar in self.floating.bars() {
            if self.tree.is_ancestor(id, bar) {
                self.park_scrollbar(bar);
            }
        }

        if let Some(parent) = self.tree.get_parent(id) {
            self.tree.mark_needs_layout(parent);
            self.tree.dirty_under_rect(self.root, self.tree.rect(id));
        }

        let mut doomed = vec![id];
        doomed.extend(self.tree.descendants(id));
        for &widget_id in doomed.iter().rev() {
            self.timers.remove_owned_by(widget_id);
            self.jobs.discard_for(widget_id);
            self.registry.retain(|_, (wid, _)| *wid != widget_id);
            self.hovered.retain(|w| *w != widget_id);
            if self.keyboard_focus == Some(widget_id) {
                self.keyboard_focus = None;
            }
            if self.mouse_capture == Some(widget_id) {
                self.mouse_capture = None;
            }
            if self.click_pending == Some(widget_id) {
                self.click_pending = None;
            }
            self.tree.unregister(widget_id);
        }
        self.change_flags |= ChangeFlags::NEEDS_PAINT;
    }

    // Visibility and invalidation

    /// Change visibility. Giving up or taking back space invalidates the
    /// window layout; floating widgets never do.
    pub fn set_visible(&mut self, id: WidgetId, visibility: Visibility) {
        let Some(base) = self.tree.base(id) else {
            return;
        };
        let floating = base.is_floating();
        let rect = base.rect();
        if self.tree.set_visible(id, visibility) && !floating {
            self.invalidate_layout();
        }
        if visibility != Visibility::Visible {
            self.tree.dirty_under_rect(self.root, rect);
        }
        self.change_flags |= ChangeFlags::NEEDS_PAINT;
    }

    pub fn invalidate_layout(&mut self) {
        self.change_flags |= ChangeFlags::NEEDS_LAYOUT;
    }

    // Layout

    pub fn place_widget(&mut self, id: WidgetId, origin: Point, size: Size) {
        self.with_widget_mut(id, |widget, win| widget.place(win, id, origin, size));
    }

    /// Lay out whatever changed since the last pass.
    ///
    /// An invalidated window is placed from the root, failing when the root
    /// does not fit the window. Otherwise only queued relayout boundaries
    /// are re-laid out in place.
    pub fn layout(&mut self) -> Result<(), LayoutError> {
        self.reclaim_floating();

        let roots = self.tree.take_layout_roots();
        if self.change_flags.contains(ChangeFlags::NEEDS_LAYOUT) || roots.contains(&self.root) {
            let available = self.settings.window_size;
            let required = self.tree.best_size(self.root);
            if !available.contains(required) {
                let widget = self.layout_offender(available);
                log::debug!("layout of {} failed: {:?} > {:?}", widget, required, available);
                self.change_flags |= ChangeFlags::NEEDS_LAYOUT;
                return Err(LayoutError::TooLarge {
                    widget,
                    required,
                    available,
                });
            }

            log::debug!("full layout at {:?}", available);
            self.place_widget(self.root, Point::zero(), available);
            self.tree.set_visible_area(self.root, self.rect());
            self.tree.clear_needs_layout(self.root);
            // widgets created while placing are already laid out
            self.tree.take_layout_roots();
            self.change_flags.remove(ChangeFlags::NEEDS_LAYOUT);
        } else {
            if roots.is_empty() {
                return Ok(());
            }
            for boundary in roots {
                log::trace!("relayout boundary {:?}", boundary);
                self.with_widget_mut(boundary, |widget, win| {
                    widget.layout_children(win, boundary)
                });
                self.tree.clear_needs_layout(boundary);
            }
            self.tree.take_layout_roots();
            self.tree.set_visible_area(self.root, self.rect());
        }
        self.change_flags |= ChangeFlags::NEEDS_PAINT;
        Ok(())
    }

    /// Name of the widget blamed for a failed layout.
    fn layout_offender(&self, available: Size) -> String {
        let offender = self
            .tree
            .descendants(self.root)
            .into_iter()
            .filter(|&id| self.tree.takes_space(id))
            .filter(|&id| !available.contains(self.tree.best_size(id)))
            .last()
            .unwrap_or(self.root);
        self.describe(offender)
    }

    pub fn describe(&self, id: WidgetId) -> String {
        match self.name_of(id) {
            Some(name) => name.to_string(),
            None => match self.tree.kind(id) {
                Some(kind) => format!("{:?}", kind),
                None => "window".to_string(),
            },
        }
    }

    // Drawing

    /// Repaint what changed and return the number of repainted subtrees.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) -> usize {
        let dirty = self.tree.populate_dirty_list(self.root);
        for call_stack in &dirty {
            if let Some(&top) = call_stack.last() {
                self.draw_subtree(top, canvas);
            }
        }
        self.tree.clear_draw_flags(self.root);
        self.change_flags.remove(ChangeFlags::NEEDS_PAINT);
        dirty.len()
    }

    fn draw_subtree(&self, id: WidgetId, canvas: &mut dyn Canvas) {
        let Some(base) = self.tree.base(id) else {
            return;
        };
        if base.visibility() != Visibility::Visible
            || base.drawing_action() == DrawingAction::NotDrawn
        {
            return;
        }
        canvas.push_clip(base.clip());
        self.tree
            .with_widget(id, |widget| widget.draw_background(&self.tree, id, canvas));

        let (floating, regular): (Vec<WidgetId>, Vec<WidgetId>) = self
            .tree
            .get_children(id)
            .into_iter()
            .partition(|&c| self.tree.base(c).is_some_and(|b| b.is_floating()));
        for child in regular.into_iter().chain(floating) {
            self.draw_subtree(child, canvas);
        }

        self.tree
            .with_widget(id, |widget| widget.draw_foreground(&self.tree, id, canvas));
        canvas.pop_clip();
    }

    // Timers

    pub fn add_timer(&mut self, owner: WidgetId, interval_ms: u64) -> TimerId {
        self.timers.add(owner, interval_ms, self.now)
    }

    pub fn remove_timer(&mut self, timer: TimerId) -> bool {
        self.timers.remove(timer)
    }

    pub fn has_timer(&self, timer: TimerId) -> bool {
        self.timers.contains(timer)
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock to `now_ms` and fire due timers.
    pub fn advance(&mut self, now_ms: u64) {
        self.now = self.now.max(now_ms);
        self.reclaim_floating();
        for (timer, owner) in self.timers.due(self.now) {
            // an earlier handler may have cancelled it
            if !self.timers.contains(timer) {
                continue;
            }
            self.with_widget_mut(owner, |widget, win| widget.on_timer(win, owner, timer));
        }
        self.run_jobs();
    }

    // Jobs

    pub fn queue_job(&mut self, widget_id: WidgetId, job_type: JobType) {
        self.jobs.push(widget_id, job_type);
    }

    /// Deliver deferred notifications until the queue settles.
    pub fn run_jobs(&mut self) {
        let mut rounds = 0;
        while self.jobs.has_pending() {
            rounds += 1;
            if rounds > 16 {
                log::warn!("job queue did not settle, dropping the rest");
                self.jobs.drain();
                break;
            }
            for job in self.jobs.drain() {
                let id = job.widget_id;
                match job.job_type {
                    JobType::ScrollbarMoved(orientation) => {
                        self.with_widget_mut(id, |widget, win| {
                            widget.scrollbar_moved(win, id, orientation)
                        });
                    }
                    JobType::Focus(gained) => {
                        let event = if gained {
                            Event::FocusIn
                        } else {
                            Event::FocusOut
                        };
                        self.deliver(id, &event);
                    }
                    JobType::Edit(command) => {
                        self.with_widget_mut(id, |widget, win| {
                            widget.edit_command(win, id, command)
                        });
                    }
                }
            }
        }
    }

    // Input

    pub fn keyboard_focus(&self) -> Option<WidgetId> {
        self.keyboard_focus
    }

    /// Move keyboard focus. The widgets involved hear about it once the
    /// current dispatch finishes.
    pub fn keyboard_capture(&mut self, id: Option<WidgetId>) {
        if id == self.keyboard_focus {
            return;
        }
        if let Some(old) = self.keyboard_focus {
            self.jobs.push(old, JobType::Focus(false));
        }
        if let Some(new) = id {
            self.jobs.push(new, JobType::Focus(true));
        }
        self.keyboard_focus = id;
    }

    pub fn mouse_captured(&self) -> Option<WidgetId> {
        self.mouse_capture
    }

    /// Route pointer events to `id` until the left button is released.
    pub fn mouse_capture(&mut self, id: Option<WidgetId>) {
        self.mouse_capture = id;
    }

    pub fn mouse_click_pending(&self) -> Option<WidgetId> {
        self.click_pending
    }

    /// Forget the pending click, so releasing the button does not click.
    pub fn clear_mouse_click(&mut self) {
        if self.click_pending.take().is_some() {
            log::trace!("pending click cleared");
        }
    }

    pub fn hovered(&self) -> &[WidgetId] {
        &self.hovered
    }

    pub fn dispatch(&mut self, event: Event) -> EventResponse {
        self.reclaim_floating();
        let response = match &event {
            Event::KeyDown { .. } => match self.keyboard_focus {
                Some(focus) => self.bubble(focus, &event),
                None => EventResponse::Ignored,
            },
            Event::FocusIn | Event::FocusOut => match self.keyboard_focus {
                Some(focus) => self.deliver(focus, &event),
                None => EventResponse::Ignored,
            },
            Event::MouseLeave { x, y } => {
                // pointer left the window
                self.update_hover(None, Point::new(*x, *y));
                EventResponse::Ignored
            }
            _ => self.dispatch_pointer(&event),
        };
        self.run_jobs();
        response
    }

    fn dispatch_pointer(&mut self, event: &Event) -> EventResponse {
        let Some(point) = event.coords() else {
            return EventResponse::Ignored;
        };
        let hit = self.tree.find_at(self.root, point.x, point.y);
        self.update_hover(hit, point);

        let target = self
            .mouse_capture
            .filter(|&c| self.tree.contains(c))
            .or(hit);
        let Some(target) = target else {
            return EventResponse::Ignored;
        };

        if let Event::MouseDown {
            button: MouseButton::Left,
            ..
        } = event
        {
            self.click_pending = hit;
        }

        let response = self.bubble(target, event);

        if let Event::MouseUp {
            x,
            y,
            button: MouseButton::Left,
        } = *event
        {
            self.mouse_capture = None;
            if let Some(pending) = self.click_pending.take() {
                let inside = hit.is_some_and(|h| h == pending || self.tree.is_ancestor(pending, h));
                if inside {
                    self.bubble(pending, &Event::Click { x, y });
                }
            }
        }
        response
    }

    fn update_hover(&mut self, hit: Option<WidgetId>, point: Point) {
        let chain = match hit {
            Some(hit) => {
                let mut chain = self.tree.ancestors(hit);
                chain.reverse();
                chain.push(hit);
                chain
            }
            None => Vec::new(),
        };
        let old = std::mem::take(&mut self.hovered);
        let (x, y) = (point.x, point.y);
        for &left in old.iter().rev() {
            if !chain.contains(&left) && self.tree.contains(left) {
                self.deliver(left, &Event::MouseLeave { x, y });
            }
        }
        for &entered in &chain {
            if !old.contains(&entered) && self.tree.contains(entered) {
                self.deliver(entered, &Event::MouseEnter { x, y });
            }
        }
        self.hovered = chain;
    }

    /// Send an event to one widget.
    pub fn deliver(&mut self, id: WidgetId, event: &Event) -> EventResponse {
        self.with_widget_mut(id, |widget, win| widget.event(win, id, event))
            .unwrap_or(EventResponse::Ignored)
    }

    /// Send an event to `id`, then up its parents until one handles it.
    pub fn bubble(&mut self, id: WidgetId, event: &Event) -> EventResponse {
        let mut current = Some(id);
        while let Some(widget_id) = current {
            if self.deliver(widget_id, event) == EventResponse::Handled {
                return EventResponse::Handled;
            }
            current = self.tree.get_parent(widget_id);
        }
        EventResponse::Ignored
    }

    // Floating scrollbars

    pub fn floating_scrollbars(&self) -> &FloatingScrollbars {
        &self.floating
    }

    /// Make a container give the floating bars back.
    pub fn evict_floating(&mut self, holder: WidgetId) {
        log::debug!("evicting floating scrollbars from {:?}", holder);
        self.with_widget_mut(holder, |widget, win| widget.reset_scrollbar(win, holder));
        self.reclaim_floating();
    }

    /// Return a floating bar to the root, hidden and unbound.
    pub(crate) fn park_scrollbar(&mut self, bar: WidgetId) {
        self.tree.reparent(bar, self.root);
        if let Some(scrollbar) = self.tree.downcast_mut::<Scrollbar>(bar) {
            scrollbar.set_target(None);
        }
        self.set_visible(bar, Visibility::Invisible);
    }

    /// Park bars whose lease was dropped without being returned.
    pub fn reclaim_floating(&mut self) {
        if !self.floating.take_orphaned() || !self.floating.is_free() {
            return;
        }
        log::debug!("reclaiming orphaned floating scrollbars");
        for bar in self.floating.bars() {
            self.park_scrollbar(bar);
        }
    }

    /// Tell every widget a new window is about to cover this one.
    pub fn popup_new_window(&mut self) {
        let mut all = vec![self.root];
        all.extend(self.tree.descendants(self.root));
        for id in all {
            if self.tree.contains(id) {
                self.with_widget_mut(id, |widget, win| widget.popup_new_window(win, id));
            }
        }
        for kind in [FloatKind::EditBubble, FloatKind::Magnifier] {
            self.hide_float(kind);
        }
        self.reclaim_floating();
        // the covering window owns the pointer until it closes
        self.hovered.clear();
        self.mouse_capture = None;
        self.click_pending = None;
    }

    // Floats

    pub fn find_float_widget(&self, kind: FloatKind) -> Option<WidgetId> {
        self.floats.get(&kind).copied()
    }

    /// Show a float at `rect` on behalf of `owner`.
    pub fn show_float(&mut self, kind: FloatKind, owner: WidgetId, rect: Rect) {
        let Some(id) = self.find_float_widget(kind) else {
            return;
        };
        if let Some(float) = self.tree.downcast_mut::<FloatWidget>(id) {
            float.set_owner(Some(owner));
        }
        self.tree.place_base(id, rect.origin(), rect.size());
        self.set_visible(id, Visibility::Visible);
        self.tree.set_visible_area(id, self.rect());
    }

    pub fn hide_float(&mut self, kind: FloatKind) {
        let Some(id) = self.find_float_widget(kind) else {
            return;
        };
        if !self.tree.is_visible(id) {
            return;
        }
        if let Some(float) = self.tree.downcast_mut::<FloatWidget>(id) {
            float.set_owner(None);
        }
        self.set_visible(id, Visibility::Invisible);
    }

    pub fn float_owner(&self, kind: FloatKind) -> Option<WidgetId> {
        let id = self.find_float_widget(kind)?;
        if !self.tree.is_visible(id) {
            return None;
        }
        self.tree.downcast_ref::<FloatWidget>(id)?.owner()
    }
}
