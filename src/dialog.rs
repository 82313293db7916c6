//! Stack of modal dialogs and the show loop.
//!
//! Showing a dialog builds a fresh [`Window`], lays it out and pushes it on
//! the stack. The window underneath is told it is being covered first, so
//! it hands back floating scrollbars and hides its floats. A dialog too large
//! for its window is not shown; a [`LayoutInspector`] describing the failure
//! takes its place.

use crate::error::LayoutError;
use crate::layout::Size;
use crate::renderer::Canvas;
use crate::widgets::{Event, EventResponse, Label, ScrollPanel};
use crate::window::Window;
use crate::Settings;

/// Something that fills a window with widgets.
pub trait Dialog {
    /// Name used in logs and by the layout inspector.
    fn id(&self) -> &str;

    /// Create the widget tree under `win.root()`.
    fn build(&mut self, win: &mut Window);

    /// Called once the window laid out successfully.
    fn post_show(&mut self, win: &mut Window) {
        let _ = win;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowOutcome {
    Shown,
    /// The dialog did not fit and the inspector was shown instead
    LayoutFailed(LayoutError),
}

/// Dialog listing why another dialog could not be laid out.
#[derive(Debug, Clone)]
pub struct LayoutInspector {
    dialog: String,
    error: LayoutError,
}

impl LayoutInspector {
    pub const ID: &'static str = "layout_inspector";

    pub fn new(dialog: impl Into<String>, error: LayoutError) -> Self {
        Self {
            dialog: dialog.into(),
            error,
        }
    }

    pub fn error(&self) -> &LayoutError {
        &self.error
    }

    /// Lines shown by the inspector.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Layout of `{}` failed", self.dialog)];
        match &self.error {
            LayoutError::TooLarge {
                widget,
                required,
                available,
            } => {
                lines.push(format!("widget: {}", widget));
                lines.push(format!("required: {}x{}", required.width, required.height));
                lines.push(format!("available: {}x{}", available.width, available.height));
            }
            LayoutError::Empty => lines.push(self.error.to_string()),
        }
        lines
    }
}

impl Dialog for LayoutInspector {
    fn id(&self) -> &str {
        Self::ID
    }

    fn build(&mut self, win: &mut Window) {
        // The report scrolls, so it always fits whatever window it gets.
        let root = win.root();
        let viewport = win.settings().window_size;
        let panel = win.add_named(root, "inspector", ScrollPanel::new(viewport));
        let grid = win.get::<ScrollPanel>(panel).map(|p| p.grid()).unwrap_or(root);
        for (i, line) in self.lines().into_iter().enumerate() {
            win.add_named(grid, format!("inspector_line_{}", i), Label::new(line).padding(2));
        }
    }
}

/// The windows of an application, topmost last.
pub struct DialogStack {
    settings: Settings,
    windows: Vec<(String, Window)>,
}

impl DialogStack {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            windows: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn top(&self) -> Option<&Window> {
        self.windows.last().map(|(_, win)| win)
    }

    pub fn top_mut(&mut self) -> Option<&mut Window> {
        self.windows.last_mut().map(|(_, win)| win)
    }

    pub fn top_id(&self) -> Option<&str> {
        self.windows.last().map(|(id, _)| id.as_str())
    }

    pub fn window(&self, id: &str) -> Option<&Window> {
        self.windows
            .iter()
            .find(|(wid, _)| wid == id)
            .map(|(_, win)| win)
    }

    /// Build, lay out and push `dialog`.
    ///
    /// A layout failure is logged and reported; the failed window is dropped
    /// and a [`LayoutInspector`] is pushed in its place.
    pub fn show(&mut self, dialog: &mut dyn Dialog) -> ShowOutcome {
        match self.try_show(dialog) {
            Ok(()) => ShowOutcome::Shown,
            Err(err) => {
                log::warn!("dialog `{}` could not be shown: {}", dialog.id(), err);
                let mut inspector = LayoutInspector::new(dialog.id(), err.clone());
                if let Err(inspector_err) = self.try_show(&mut inspector) {
                    log::error!("layout inspector failed too: {}", inspector_err);
                }
                ShowOutcome::LayoutFailed(err)
            }
        }
    }

    fn try_show(&mut self, dialog: &mut dyn Dialog) -> Result<(), LayoutError> {
        if let Some((covered, win)) = self.windows.last_mut() {
            log::debug!("`{}` covered by `{}`", covered, dialog.id());
            win.popup_new_window();
        }

        let mut win = Window::new(self.settings.clone());
        dialog.build(&mut win);
        win.layout()?;
        dialog.post_show(&mut win);
        win.run_jobs();

        log::debug!("dialog `{}` shown", dialog.id());
        self.windows.push((dialog.id().to_string(), win));
        Ok(())
    }

    /// Pop the topmost window.
    pub fn close(&mut self) -> Option<Window> {
        let (id, win) = self.windows.pop()?;
        log::debug!("dialog `{}` closed", id);
        Some(win)
    }

    /// Send an event to the topmost window.
    pub fn dispatch(&mut self, event: Event) -> EventResponse {
        match self.top_mut() {
            Some(win) => win.dispatch(event),
            None => EventResponse::Ignored,
        }
    }

    /// Advance the clock of every window.
    pub fn advance(&mut self, now_ms: u64) {
        for (_, win) in &mut self.windows {
            win.advance(now_ms);
        }
    }

    /// Lay out and draw the topmost window. Returns the widgets drawn.
    pub fn frame(&mut self, canvas: &mut dyn Canvas) -> Result<usize, LayoutError> {
        let Some(win) = self.top_mut() else {
            return Ok(0);
        };
        win.layout()?;
        Ok(win.draw(canvas))
    }

    /// Available space for dialog contents.
    pub fn window_size(&self) -> Size {
        self.settings.window_size
    }
}
