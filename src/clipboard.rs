//! Clipboard support for text copy/paste operations.
//!
//! A thread-local buffer shared by every window on the UI thread.

use std::cell::RefCell;

thread_local! {
    static CLIPBOARD: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Copy text to the clipboard
pub fn clipboard_copy(text: &str) {
    CLIPBOARD.with(|c| {
        *c.borrow_mut() = Some(text.to_string());
    });
}

/// Paste text from the clipboard
pub fn clipboard_paste() -> Option<String> {
    CLIPBOARD.with(|c| c.borrow().clone())
}

/// Check if clipboard has content
pub fn clipboard_has_content() -> bool {
    CLIPBOARD.with(|c| c.borrow().as_ref().is_some_and(|s| !s.is_empty()))
}

/// Wipe the clipboard buffer.
pub fn reset_clipboard() {
    CLIPBOARD.with(|c| *c.borrow_mut() = None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipboard_copy_paste() {
        reset_clipboard();
        assert!(!clipboard_has_content());
        assert_eq!(clipboard_paste(), None);

        clipboard_copy("hello");
        assert!(clipboard_has_content());
        assert_eq!(clipboard_paste().as_deref(), Some("hello"));

        clipboard_copy("");
        assert!(!clipboard_has_content());
        reset_clipboard();
    }
}
