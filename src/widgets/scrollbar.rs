//! The floating scrollbar widget.
//!
//! A window owns one vertical and one horizontal instance. While leased they
//! hang under the holder's content grid and report drags back through the
//! job queue; otherwise they sit invisible under the window root.

use crate::jobs::JobType;
use crate::layout::Size;
use crate::renderer::Canvas;
use crate::tree::{Tree, WidgetId};
use crate::window::Window;
use crate::Settings;

use super::scroll::{Orientation, ScrollCommand, ScrollbarState};
use super::widget::{Color, Event, EventResponse, MouseButton, Widget, WidgetKind};

const TRACK_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 0.08);
const HANDLE_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 0.45);

pub struct Scrollbar {
    orientation: Orientation,
    state: ScrollbarState,
    /// Container notified when the user moves the bar
    target: Option<WidgetId>,
    /// Pointer coordinate and position when a handle drag started
    drag: Option<(i32, u32)>,
    thickness: i32,
    min_handle: i32,
}

impl Scrollbar {
    pub fn new(orientation: Orientation, settings: &Settings) -> Self {
        Self {
            orientation,
            state: ScrollbarState::new(settings.item_step),
            target: None,
            drag: None,
            thickness: settings.scrollbar_thickness * settings.hdpi_scale,
            min_handle: settings.min_handle_size * settings.hdpi_scale,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn state(&self) -> &ScrollbarState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ScrollbarState {
        &mut self.state
    }

    pub fn target(&self) -> Option<WidgetId> {
        self.target
    }

    pub(crate) fn set_target(&mut self, target: Option<WidgetId>) {
        self.target = target;
        self.drag = None;
    }

    pub fn thickness(&self) -> i32 {
        self.thickness
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn along(&self, x: i32, y: i32) -> i32 {
        match self.orientation {
            Orientation::Vertical => y,
            Orientation::Horizontal => x,
        }
    }

    fn moved(&self, win: &mut Window, id: WidgetId) {
        win.tree_mut().set_dirty(id);
        if let Some(target) = self.target {
            win.queue_job(target, JobType::ScrollbarMoved(self.orientation));
        }
    }
}

impl Widget for Scrollbar {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Scrollbar
    }

    fn best_size(&self, _tree: &Tree, _id: WidgetId) -> Size {
        Size::new(self.thickness, self.thickness)
    }

    fn event(&mut self, win: &mut Window, id: WidgetId, event: &Event) -> EventResponse {
        let track = win.tree().rect(id);
        match *event {
            Event::MouseDown {
                x,
                y,
                button: MouseButton::Left,
            } => {
                let handle = self.state.handle_rect(self.orientation, track, self.min_handle);
                let coord = self.along(x, y);
                if handle.contains(x, y) {
                    self.drag = Some((coord, self.state.item_position()));
                    win.mouse_capture(Some(id));
                } else {
                    let handle_start = self.along(handle.x, handle.y);
                    let before = self.state.item_position();
                    self.state.scroll(if coord < handle_start {
                        ScrollCommand::JumpBackwards
                    } else {
                        ScrollCommand::JumpForward
                    });
                    if self.state.item_position() != before {
                        self.moved(win, id);
                    }
                }
                EventResponse::Handled
            }
            Event::MouseMove { x, y } => {
                let Some((start, start_position)) = self.drag else {
                    return EventResponse::Ignored;
                };
                let track_size = self.along(track.width, track.height);
                let position = self.state.position_for_drag(
                    start_position,
                    self.along(x, y) - start,
                    track_size,
                    self.min_handle,
                );
                if position != self.state.item_position() {
                    self.state.set_item_position(position);
                    self.moved(win, id);
                }
                EventResponse::Handled
            }
            Event::MouseUp {
                button: MouseButton::Left,
                ..
            } => {
                if self.drag.take().is_some() {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            Event::Click { .. } => EventResponse::Handled,
            _ => EventResponse::Ignored,
        }
    }

    fn draw_background(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        let track = tree.rect(id);
        canvas.fill_rect(track, TRACK_COLOR);
        canvas.fill_rect(
            self.state.handle_rect(self.orientation, track, self.min_handle),
            HANDLE_COLOR,
        );
    }
}

super::impl_widget_type!(Scrollbar, WidgetKind::Scrollbar);
