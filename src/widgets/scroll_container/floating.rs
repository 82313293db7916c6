//! The per-window pair of floating scrollbars and the lease that lends them
//! to one scroll container at a time.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::validate;
use crate::tree::WidgetId;
use crate::widgets::scroll::Orientation;

#[derive(Debug, Default)]
struct PoolState {
    holder: Option<WidgetId>,
    /// A lease was dropped without being returned; the bars still hang
    /// under the old holder's grid.
    orphaned: bool,
}

/// Handle to the window's floating scrollbar widgets.
#[derive(Debug, Clone)]
pub struct FloatingScrollbars {
    state: Rc<RefCell<PoolState>>,
    vertical: WidgetId,
    horizontal: WidgetId,
}

impl FloatingScrollbars {
    pub(crate) fn new(vertical: WidgetId, horizontal: WidgetId) -> Self {
        Self {
            state: Rc::new(RefCell::new(PoolState::default())),
            vertical,
            horizontal,
        }
    }

    pub fn holder(&self) -> Option<WidgetId> {
        self.state.borrow().holder
    }

    pub fn is_free(&self) -> bool {
        self.holder().is_none()
    }

    pub fn bar(&self, orientation: Orientation) -> WidgetId {
        match orientation {
            Orientation::Vertical => self.vertical,
            Orientation::Horizontal => self.horizontal,
        }
    }

    pub fn bars(&self) -> [WidgetId; 2] {
        [self.vertical, self.horizontal]
    }

    /// Lend both bars to `holder`. The pool must be free.
    pub(crate) fn acquire(&self, holder: WidgetId) -> FloatingLease {
        {
            let mut state = self.state.borrow_mut();
            validate!(
                state.holder.is_none(),
                "floating scrollbars already held by {:?}",
                state.holder
            );
            state.holder = Some(holder);
        }
        log::debug!("floating scrollbars leased to {:?}", holder);
        FloatingLease {
            state: Rc::clone(&self.state),
            holder,
            vertical: self.vertical,
            horizontal: self.horizontal,
            returned: false,
        }
    }

    /// Clear the orphan mark, reporting whether it was set.
    pub(crate) fn take_orphaned(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().orphaned)
    }
}

/// Exclusive use of the floating scrollbars.
///
/// Returning it with [`FloatingLease::release`] frees the pool. Dropping it
/// unreturned frees the pool too but marks the bars orphaned, so the window
/// moves them back before its next layout or dispatch.
#[derive(Debug)]
pub struct FloatingLease {
    state: Rc<RefCell<PoolState>>,
    holder: WidgetId,
    vertical: WidgetId,
    horizontal: WidgetId,
    returned: bool,
}

impl FloatingLease {
    pub fn holder(&self) -> WidgetId {
        self.holder
    }

    pub fn bar(&self, orientation: Orientation) -> WidgetId {
        match orientation {
            Orientation::Vertical => self.vertical,
            Orientation::Horizontal => self.horizontal,
        }
    }

    pub fn bars(&self) -> [WidgetId; 2] {
        [self.vertical, self.horizontal]
    }

    /// Hand the bars back after they were detached from the holder.
    pub(crate) fn release(mut self) {
        self.state.borrow_mut().holder = None;
        self.returned = true;
        log::debug!("floating scrollbars returned by {:?}", self.holder);
    }
}

impl Drop for FloatingLease {
    fn drop(&mut self) {
        if self.returned {
            return;
        }
        let mut state = self.state.borrow_mut();
        if state.holder == Some(self.holder) {
            state.holder = None;
        }
        state.orphaned = true;
        log::debug!("floating scrollbar lease of {:?} dropped unreturned", self.holder);
    }
}
