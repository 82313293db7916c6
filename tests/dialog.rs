use trellis::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A dialog holding one scroll panel named `list` over tall content.
struct Browser;

impl Dialog for Browser {
    fn id(&self) -> &str {
        "browser"
    }

    fn build(&mut self, win: &mut Window) {
        let root = win.root();
        let panel = win.add_named(root, "list", ScrollPanel::new(Size::new(150, 100)));
        let grid = win.get::<ScrollPanel>(panel).map(|p| p.grid()).unwrap_or(root);
        win.add(grid, Spacer::new(Size::new(100, 400)));
    }

    fn post_show(&mut self, win: &mut Window) {
        if let Some(panel) = win.find::<ScrollPanel>("list") {
            win.with::<ScrollPanel, _>(panel, |p, win| p.set_vertical_position(win, 50));
        }
    }
}

/// A dialog whose body cannot fit any reasonable window.
struct Oversized;

impl Dialog for Oversized {
    fn id(&self) -> &str {
        "oversized"
    }

    fn build(&mut self, win: &mut Window) {
        let root = win.root();
        win.add_named(root, "header", Label::new("Header"));
        win.add_named(root, "body", Spacer::new(Size::new(100, 5000)));
    }
}

fn stack() -> DialogStack {
    DialogStack::new(Settings::default().window_size(200, 200))
}

#[test]
fn test_show_runs_post_show_after_layout() {
    init();
    let mut stack = stack();
    assert_eq!(stack.show(&mut Browser), ShowOutcome::Shown);

    let win = stack.top().unwrap();
    let panel = win.find::<ScrollPanel>("list").unwrap();
    let panel = win.get::<ScrollPanel>(panel).unwrap();
    assert_eq!(panel.vertical_position(win.tree()), 50);
}

#[test]
fn test_layout_failure_shows_inspector() {
    init();
    let mut stack = stack();
    let outcome = stack.show(&mut Oversized);
    let ShowOutcome::LayoutFailed(err) = outcome else {
        panic!("oversized dialog was shown");
    };
    assert_eq!(
        err,
        LayoutError::TooLarge {
            widget: "body".into(),
            required: Size::new(100, 5016),
            available: Size::new(200, 200),
        }
    );
    assert_eq!(stack.top_id(), Some(LayoutInspector::ID));

    let mut canvas = DrawList::new();
    assert!(stack.frame(&mut canvas).unwrap() > 0);
    let texts = canvas.texts();
    assert!(texts.contains(&"Layout of `oversized` failed"));
    assert!(texts.contains(&"widget: body"));
    assert!(texts.contains(&"required: 100x5016"));

    let win = stack.top().unwrap();
    assert!(win.find::<ScrollPanel>("inspector").is_some());
    let line = win.find::<Label>("inspector_line_3").unwrap();
    assert_eq!(win.get::<Label>(line).unwrap().text(), "available: 200x200");
}

#[test]
fn test_covering_window_returns_floating_bars() {
    init();
    let mut stack = stack();
    stack.show(&mut Browser);
    stack.dispatch(Event::MouseMove { x: 20, y: 20 });
    let browser = stack.top().unwrap();
    let panel = browser.find::<ScrollPanel>("list").unwrap().id();
    assert_eq!(browser.floating_scrollbars().holder(), Some(panel));

    stack.show(&mut Oversized);
    assert_eq!(stack.len(), 2);
    let browser = stack.window("browser").unwrap();
    assert!(browser.floating_scrollbars().is_free());

    // events go to the topmost window only
    stack.dispatch(Event::MouseMove { x: 20, y: 20 });
    assert!(stack.window("browser").unwrap().floating_scrollbars().is_free());

    stack.close();
    assert_eq!(stack.top_id(), Some("browser"));
    stack.dispatch(Event::MouseMove { x: 20, y: 20 });
    let browser = stack.top().unwrap();
    assert_eq!(browser.floating_scrollbars().holder(), Some(panel));
}

#[test]
fn test_advance_reaches_covered_windows() {
    init();
    let mut stack = stack();
    stack.show(&mut Browser);
    stack.dispatch(Event::Scroll {
        x: 20,
        y: 20,
        delta_x: 0,
        delta_y: 10,
        source: ScrollSource::Finger,
    });
    assert_eq!(stack.top().unwrap().timer_count(), 1);

    stack.show(&mut Oversized);
    for now in (200..=2000).step_by(200) {
        stack.advance(now);
    }
    assert_eq!(stack.window("browser").unwrap().timer_count(), 0);
    assert!(stack.close().is_some());
    assert!(stack.close().is_some());
    assert!(stack.close().is_none());
    assert!(stack.is_empty());
}
