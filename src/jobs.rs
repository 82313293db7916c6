// ============================================================================
// Deferred Widget Notifications
// ============================================================================

use crate::tree::WidgetId;
use crate::widgets::scroll::Orientation;
use crate::window::EditCommand;

/// Notifications that cannot be delivered while the sender is extracted
/// from the tree, so they wait for the window to drain them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobType {
    /// A floating scrollbar leased to the widget was moved
    ScrollbarMoved(Orientation),
    /// Keyboard focus was gained (`true`) or lost
    Focus(bool),
    /// A floating edit widget was used on behalf of the widget
    Edit(EditCommand),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Job {
    pub widget_id: WidgetId,
    pub job_type: JobType,
}

/// Per-window job queue.
///
/// Keeps arrival order; duplicates (same widget and job type) are ignored.
#[derive(Debug, Default)]
pub struct JobQueue {
    pending: Vec<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, widget_id: WidgetId, job_type: JobType) {
        let job = Job {
            widget_id,
            job_type,
        };
        if !self.pending.contains(&job) {
            self.pending.push(job);
        }
    }

    /// Take every pending job, oldest first.
    pub fn drain(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Forget jobs addressed to a destroyed widget.
    pub fn discard_for(&mut self, widget_id: WidgetId) {
        self.pending.retain(|job| job.widget_id != widget_id);
    }
}
