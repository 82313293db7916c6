//! Scoped reentrancy guards.
//!
//! A [`ReentryLock`] is a named boolean that is set while a [`LockGuard`]
//! lives. Taking it again before the guard drops is a broken invariant and
//! fails validation.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::validate;

#[derive(Debug, Clone)]
pub struct ReentryLock {
    name: &'static str,
    held: Rc<Cell<bool>>,
}

impl ReentryLock {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            held: Rc::new(Cell::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_held(&self) -> bool {
        self.held.get()
    }

    /// Take the lock until the returned guard drops.
    pub fn acquire(&self) -> LockGuard {
        validate!(!self.held.get(), "{} taken while already held", self.name);
        self.held.set(true);
        LockGuard {
            held: Rc::clone(&self.held),
        }
    }
}

/// Releases its lock when dropped, on every exit path.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard drops"]
pub struct LockGuard {
    held: Rc<Cell<bool>>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.held.set(false);
    }
}
