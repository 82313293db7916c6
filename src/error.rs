//! Error types and invariant checks.
//!
//! Two tiers are used across the crate:
//!
//! - Contract violations (negative sizes, reentrant locks, out-of-range
//!   offsets, a floating scrollbar acquired twice) go through [`validate!`],
//!   which logs and panics. Nothing downstream tries to recover from them.
//! - Layout failures surface as [`LayoutError`] from `Window::layout` and are
//!   recovered by the dialog show loop.

use thiserror::Error;

use crate::layout::Size;

/// A window could not be laid out inside its available area.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("`{widget}` needs {required:?} but the window only offers {available:?}")]
    TooLarge {
        widget: String,
        required: Size,
        available: Size,
    },
    #[error("window has no root content to lay out")]
    Empty,
}

impl LayoutError {
    /// Name of the widget that triggered the failure, if any.
    pub fn widget(&self) -> Option<&str> {
        match self {
            LayoutError::TooLarge { widget, .. } => Some(widget),
            LayoutError::Empty => None,
        }
    }
}

/// Log and abort on a broken invariant.
macro_rules! validation_failed {
    ($($arg:tt)+) => {{
        log::error!("validate failed: {}", format_args!($($arg)+));
        panic!("validate failed: {}", format_args!($($arg)+))
    }};
}
pub(crate) use validation_failed;

/// Check an invariant; on failure log it and panic.
macro_rules! validate {
    ($cond:expr $(,)?) => {
        if !$cond {
            $crate::error::validation_failed!("{}", stringify!($cond));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::error::validation_failed!($($arg)+);
        }
    };
}
pub(crate) use validate;
