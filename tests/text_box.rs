use std::cell::RefCell;
use std::rc::Rc;

use trellis::clipboard::{clipboard_copy, clipboard_paste, reset_clipboard};
use trellis::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
    reset_clipboard();
}

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder(Log);

impl TextObserver for Recorder {
    fn text_changed(&mut self, _win: &mut Window, _text_box: WidgetId, text: &str) {
        self.0.borrow_mut().push(format!("changed {}", text));
    }

    fn submit(&mut self, _win: &mut Window, _text_box: WidgetId, text: &str) {
        self.0.borrow_mut().push(format!("submit {}", text));
    }
}

/// A text box 40px below the top of the window, which leaves room for the
/// edit bubble above it.
fn setup(settings: Settings, text_box: TextBox) -> (Window, WidgetId) {
    let mut win = Window::new(settings.window_size(300, 200));
    let root = win.root();
    win.add(root, Spacer::new(Size::new(300, 40)));
    let id = win.add(root, text_box);
    win.layout().unwrap();
    (win, id)
}

fn text_box(win: &Window, id: WidgetId) -> &TextBox {
    win.get::<TextBox>(id).unwrap()
}

fn press(win: &mut Window, key: Key, modifiers: Modifiers) {
    win.dispatch(Event::KeyDown { key, modifiers });
}

fn type_str(win: &mut Window, text: &str) {
    for c in text.chars() {
        press(win, Key::Char(c), Modifiers::empty());
    }
}

fn drag(win: &mut Window, from_x: i32, to_x: i32) {
    win.dispatch(Event::MouseDown {
        x: from_x,
        y: 50,
        button: MouseButton::Left,
    });
    win.dispatch(Event::MouseMove { x: to_x, y: 50 });
}

fn release(win: &mut Window, x: i32) {
    win.dispatch(Event::MouseUp {
        x,
        y: 50,
        button: MouseButton::Left,
    });
}

fn click(win: &mut Window, x: i32, y: i32) {
    win.dispatch(Event::MouseDown {
        x,
        y,
        button: MouseButton::Left,
    });
    win.dispatch(Event::MouseUp {
        x,
        y,
        button: MouseButton::Left,
    });
}

#[test]
fn test_editing_keys() {
    init();
    let log = Log::default();
    let (mut win, id) = setup(
        Settings::default(),
        TextBox::new("").observer(Recorder(Rc::clone(&log))),
    );
    win.keyboard_capture(Some(id));

    type_str(&mut win, "hello");
    assert_eq!(text_box(&win, id).label(), "hello");

    press(&mut win, Key::Left, Modifiers::SHIFT);
    press(&mut win, Key::Left, Modifiers::SHIFT);
    assert_eq!(text_box(&win, id).selected_text(), "lo");

    press(&mut win, Key::Char('c'), Modifiers::CTRL);
    assert_eq!(clipboard_paste().as_deref(), Some("lo"));

    press(&mut win, Key::End, Modifiers::empty());
    press(&mut win, Key::Char('v'), Modifiers::CTRL);
    assert_eq!(text_box(&win, id).label(), "hellolo");

    press(&mut win, Key::Backspace, Modifiers::empty());
    press(&mut win, Key::Char('a'), Modifiers::CTRL);
    press(&mut win, Key::Delete, Modifiers::empty());
    assert_eq!(text_box(&win, id).label(), "ellol");
    assert_eq!(text_box(&win, id).selection().cursor, 0);

    press(&mut win, Key::Char('e'), Modifiers::CTRL | Modifiers::SHIFT);
    press(&mut win, Key::Char('x'), Modifiers::CTRL);
    assert_eq!(text_box(&win, id).label(), "");
    assert_eq!(clipboard_paste().as_deref(), Some("ellol"));

    type_str(&mut win, "ok");
    press(&mut win, Key::Enter, Modifiers::empty());
    press(&mut win, Key::Char('u'), Modifiers::CTRL);
    assert_eq!(text_box(&win, id).label(), "");

    let log = log.borrow();
    assert_eq!(log.first().map(String::as_str), Some("changed h"));
    assert!(log.contains(&"submit ok".to_string()));
    assert_eq!(log.last().map(String::as_str), Some("changed "));
}

#[test]
fn test_left_right_collapse_selection() {
    init();
    let (mut win, id) = setup(Settings::default(), TextBox::new("abcdef"));
    win.keyboard_capture(Some(id));
    press(&mut win, Key::Home, Modifiers::empty());
    press(&mut win, Key::Right, Modifiers::empty());
    press(&mut win, Key::Right, Modifiers::SHIFT);
    press(&mut win, Key::Right, Modifiers::SHIFT);
    assert_eq!(text_box(&win, id).selection().range(), (1, 3));

    press(&mut win, Key::Left, Modifiers::empty());
    assert_eq!(text_box(&win, id).selection().range(), (1, 1));
    press(&mut win, Key::Right, Modifiers::empty());
    press(&mut win, Key::Right, Modifiers::empty());
    press(&mut win, Key::Right, Modifiers::empty());
    press(&mut win, Key::Right, Modifiers::empty());
    press(&mut win, Key::Right, Modifiers::empty());
    press(&mut win, Key::Right, Modifiers::empty());
    assert_eq!(text_box(&win, id).selection().cursor, 6);
}

#[test]
fn test_maximum_chars_limits_input() {
    init();
    let (mut win, id) = setup(Settings::default(), TextBox::new("").maximum_chars(5));
    win.keyboard_capture(Some(id));
    clipboard_copy("abcdefgh");
    press(&mut win, Key::Char('v'), Modifiers::CTRL);
    assert_eq!(text_box(&win, id).label(), "abcde");

    type_str(&mut win, "z");
    assert_eq!(text_box(&win, id).label(), "abcde");

    press(&mut win, Key::Backspace, Modifiers::empty());
    type_str(&mut win, "yz");
    assert_eq!(text_box(&win, id).label(), "abcdy");
}

#[test]
fn test_cursor_blinks_while_focused() {
    init();
    let (mut win, id) = setup(Settings::default(), TextBox::new("blink"));
    assert_eq!(win.timer_count(), 0);

    win.keyboard_capture(Some(id));
    win.run_jobs();
    assert!(text_box(&win, id).is_focused());
    assert!(text_box(&win, id).is_cursor_visible());
    assert_eq!(win.timer_count(), 1);

    win.advance(500);
    assert!(!text_box(&win, id).is_cursor_visible());
    win.advance(1000);
    assert!(text_box(&win, id).is_cursor_visible());

    // typing shows the cursor right away
    win.advance(1500);
    type_str(&mut win, "!");
    assert!(text_box(&win, id).is_cursor_visible());

    win.keyboard_capture(None);
    win.run_jobs();
    assert!(!text_box(&win, id).is_focused());
    assert!(!text_box(&win, id).is_cursor_visible());
    assert_eq!(win.timer_count(), 0);
}

#[test]
fn test_drag_selects_text() {
    init();
    let (mut win, id) = setup(Settings::default(), TextBox::new("hello world"));

    // padding 4, 8px per char
    drag(&mut win, 20, 44);
    release(&mut win, 44);
    assert_eq!(text_box(&win, id).selected_text(), "llo");
    assert_eq!(win.keyboard_focus(), Some(id));
    assert!(text_box(&win, id).is_focused());
    assert_eq!(win.float_owner(FloatKind::EditBubble), None);
    assert_eq!(win.float_owner(FloatKind::Magnifier), None);
}

#[test]
fn test_mobile_magnifier_and_edit_bubble() {
    init();
    let (mut win, id) = setup(Settings::default().mobile(true), TextBox::new("hello world"));

    drag(&mut win, 20, 44);
    assert_eq!(win.float_owner(FloatKind::Magnifier), Some(id));
    // no bubble while the finger is down
    assert_eq!(win.float_owner(FloatKind::EditBubble), None);

    release(&mut win, 44);
    assert_eq!(win.float_owner(FloatKind::Magnifier), None);
    assert_eq!(win.float_owner(FloatKind::EditBubble), Some(id));

    // the bubble sits right above the box: copy on the left, paste on the right
    let bubble = win.find_float_widget(FloatKind::EditBubble).unwrap();
    assert_eq!(win.tree().rect(bubble), Rect::new(0, 16, 96, 24));
    click(&mut win, 10, 20);
    assert_eq!(clipboard_paste().as_deref(), Some("llo"));

    clipboard_copy("LLO");
    click(&mut win, 80, 20);
    assert_eq!(text_box(&win, id).label(), "heLLO world");
    assert_eq!(win.float_owner(FloatKind::EditBubble), None);
}

#[test]
fn test_focus_out_hides_bubble() {
    init();
    let (mut win, id) = setup(Settings::default().mobile(true), TextBox::new("hello"));
    win.keyboard_capture(Some(id));
    win.run_jobs();
    win.queue_job(id, trellis::jobs::JobType::Edit(EditCommand::SelectAll));
    win.run_jobs();
    assert_eq!(text_box(&win, id).selected_text(), "hello");
    assert_eq!(win.float_owner(FloatKind::EditBubble), Some(id));

    win.keyboard_capture(None);
    win.run_jobs();
    assert_eq!(win.float_owner(FloatKind::EditBubble), None);
    assert!(!text_box(&win, id).selection().has_selection());
}

#[test]
fn test_covering_window_hides_floats() {
    init();
    let (mut win, id) = setup(Settings::default().mobile(true), TextBox::new("hello world"));
    drag(&mut win, 20, 44);
    assert_eq!(win.float_owner(FloatKind::Magnifier), Some(id));

    win.popup_new_window();
    assert_eq!(win.float_owner(FloatKind::Magnifier), None);
    assert_eq!(win.mouse_captured(), None);
}
