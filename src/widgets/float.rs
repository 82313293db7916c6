//! Window-owned contextual widgets that float above the tree: the edit
//! bubble offering copy and paste, and the drag magnifier.

use crate::jobs::JobType;
use crate::layout::Size;
use crate::renderer::Canvas;
use crate::tree::{Tree, WidgetId};
use crate::window::{EditCommand, FloatKind, Window};

use super::widget::{Color, Event, EventResponse, Rect, Widget, WidgetKind};

const BUBBLE_COLOR: Color = Color::rgb(0.2, 0.2, 0.25);
const BUBBLE_TEXT: Color = Color::WHITE;

pub struct FloatWidget {
    float_kind: FloatKind,
    /// Widget the float currently acts for
    owner: Option<WidgetId>,
    /// Magnified text, unused by the bubble
    text: String,
}

impl FloatWidget {
    pub fn new(float_kind: FloatKind) -> Self {
        Self {
            float_kind,
            owner: None,
            text: String::new(),
        }
    }

    pub fn float_kind(&self) -> FloatKind {
        self.float_kind
    }

    pub fn owner(&self) -> Option<WidgetId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<WidgetId>) {
        self.owner = owner;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    fn bubble_halves(rect: Rect) -> (Rect, Rect) {
        let half = rect.width / 2;
        (
            Rect::new(rect.x, rect.y, half, rect.height),
            Rect::new(rect.x + half, rect.y, rect.width - half, rect.height),
        )
    }
}

impl Widget for FloatWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Float
    }

    fn best_size(&self, _tree: &Tree, _id: WidgetId) -> Size {
        Size::zero()
    }

    fn event(&mut self, win: &mut Window, id: WidgetId, event: &Event) -> EventResponse {
        match (self.float_kind, event) {
            (FloatKind::EditBubble, Event::Click { x, .. }) => {
                let Some(owner) = self.owner else {
                    return EventResponse::Ignored;
                };
                let (copy, _) = Self::bubble_halves(win.tree().rect(id));
                let command = if *x < copy.right() {
                    EditCommand::Copy
                } else {
                    EditCommand::Paste
                };
                log::trace!("edit bubble {:?} for {:?}", command, owner);
                win.queue_job(owner, JobType::Edit(command));
                EventResponse::Handled
            }
            (FloatKind::EditBubble, Event::MouseDown { .. } | Event::MouseUp { .. }) => {
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn draw_background(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        canvas.fill_rect(tree.rect(id), BUBBLE_COLOR);
    }

    fn draw_foreground(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        let rect = tree.rect(id);
        match self.float_kind {
            FloatKind::EditBubble => {
                let (copy, paste) = Self::bubble_halves(rect);
                canvas.draw_text(copy, "Copy", BUBBLE_TEXT);
                canvas.draw_text(paste, "Paste", BUBBLE_TEXT);
            }
            FloatKind::Magnifier => canvas.draw_text(rect, &self.text, BUBBLE_TEXT),
        }
    }
}

super::impl_widget_type!(FloatWidget, WidgetKind::Float);
