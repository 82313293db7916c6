use trellis::prelude::*;
use trellis::widgets::{ScrollbarMode, Scrollbar};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two 100px panels stacked at the top of a 200x300 window, each over
/// 400px of content.
fn two_panels() -> (Window, WidgetId, WidgetId) {
    let mut win = Window::new(Settings::default().window_size(200, 300));
    let root = win.root();
    let mut panels = Vec::new();
    for _ in 0..2 {
        let panel = win.add(root, ScrollPanel::new(Size::new(100, 100)));
        let grid = win.get::<ScrollPanel>(panel).unwrap().grid();
        win.add(grid, Spacer::new(Size::new(100, 400)));
        panels.push(panel);
    }
    win.layout().unwrap();
    (win, panels[0], panels[1])
}

fn container(win: &Window, panel: WidgetId) -> &ScrollContainer {
    win.get::<ScrollPanel>(panel).unwrap().container()
}

fn vertical(win: &Window, panel: WidgetId) -> u32 {
    container(win, panel).item_position(win.tree(), Orientation::Vertical)
}

fn hover(win: &mut Window, x: i32, y: i32) {
    win.dispatch(Event::MouseMove { x, y });
}

fn wheel(win: &mut Window, x: i32, y: i32, delta_y: i32) {
    win.dispatch(Event::Scroll {
        x,
        y,
        delta_x: 0,
        delta_y,
        source: ScrollSource::Wheel,
    });
}

#[test]
fn test_place_clamps_position_to_shrunk_grid() {
    init();
    let mut win = Window::new(Settings::default().window_size(200, 200));
    let root = win.root();
    let panel = win.add(root, ScrollPanel::new(Size::new(100, 100)));
    let grid = win.get::<ScrollPanel>(panel).unwrap().grid();
    let top = win.add(grid, Spacer::new(Size::new(100, 200)));
    let bottom = win.add(grid, Spacer::new(Size::new(100, 200)));
    win.layout().unwrap();

    win.with::<ScrollPanel, _>(panel, |p, win| p.set_vertical_position(win, 300));
    assert_eq!(vertical(&win, panel), 300);

    win.set_visible(bottom, Visibility::Invisible);
    win.layout().unwrap();

    let dummy = *container(&win, panel).dummy(Orientation::Vertical);
    assert_eq!(dummy.item_count(), 200);
    assert_eq!(dummy.item_position(), 100);
    assert_eq!(win.tree().rect(top).y, -100);
}

#[test]
fn test_place_twice_is_stable() {
    init();
    let (mut win, a, _) = two_panels();
    win.with::<ScrollPanel, _>(a, |p, win| p.set_vertical_position(win, 120));
    let grid = win.get::<ScrollPanel>(a).unwrap().grid();
    let before = (win.tree().rect(grid), vertical(&win, a));

    win.invalidate_layout();
    win.layout().unwrap();
    let once = (win.tree().rect(grid), vertical(&win, a));
    win.invalidate_layout();
    win.layout().unwrap();
    let twice = (win.tree().rect(grid), vertical(&win, a));

    assert_eq!(before, once);
    assert_eq!(once, twice);
    assert_eq!(once.0.y, -120);
}

#[test]
fn test_one_holder_at_a_time() {
    init();
    let (mut win, a, b) = two_panels();
    assert!(win.floating_scrollbars().is_free());

    hover(&mut win, 50, 50);
    assert_eq!(win.floating_scrollbars().holder(), Some(a));
    assert!(container(&win, a).is_floating_bound());

    hover(&mut win, 50, 150);
    assert_eq!(win.floating_scrollbars().holder(), Some(b));
    assert!(!container(&win, a).is_floating_bound());
    assert!(container(&win, b).is_floating_bound());

    let bar = win.floating_scrollbars().bar(Orientation::Vertical);
    let grid = win.get::<ScrollPanel>(b).unwrap().grid();
    assert_eq!(win.tree().get_parent(bar), Some(grid));
    assert_eq!(win.tree().downcast_ref::<Scrollbar>(bar).unwrap().target(), Some(b));
}

#[test]
fn test_handoff_keeps_each_position() {
    init();
    let (mut win, a, b) = two_panels();
    win.with::<ScrollPanel, _>(a, |p, win| p.set_vertical_position(win, 30));
    win.with::<ScrollPanel, _>(b, |p, win| p.set_vertical_position(win, 70));

    hover(&mut win, 50, 50);
    assert_eq!(vertical(&win, a), 30);
    hover(&mut win, 50, 150);

    let bar = win.floating_scrollbars().bar(Orientation::Vertical);
    let state = *win.tree().downcast_ref::<Scrollbar>(bar).unwrap().state();
    assert_eq!(state.item_position(), 70);
    assert_eq!(state.item_count(), 400);
    assert_eq!(container(&win, a).dummy(Orientation::Vertical).item_position(), 30);

    wheel(&mut win, 50, 150, 1);
    assert_eq!(vertical(&win, b), 71);
    assert_eq!(container(&win, b).dummy(Orientation::Vertical).item_position(), 71);
    assert_eq!(vertical(&win, a), 30);
}

#[test]
fn test_horizontal_bar_hidden_when_content_fits() {
    init();
    let (mut win, a, _) = two_panels();
    hover(&mut win, 50, 50);
    let pool = win.floating_scrollbars().clone();
    assert!(win.tree().is_visible(pool.bar(Orientation::Vertical)));
    assert!(!win.tree().is_visible(pool.bar(Orientation::Horizontal)));

    win.with::<ScrollPanel, _>(a, |p, win| {
        p.set_vertical_scrollbar_mode(win, ScrollbarMode::AlwaysInvisible)
    });
    win.layout().unwrap();
    assert!(!win.tree().is_visible(pool.bar(Orientation::Vertical)));
}

#[test]
fn test_hide_timer_hands_bars_back() {
    init();
    let (mut win, _, b) = two_panels();
    win.with::<ScrollPanel, _>(b, |p, win| p.set_vertical_position(win, 70));
    hover(&mut win, 50, 150);
    wheel(&mut win, 50, 150, 1);
    assert_eq!(win.timer_count(), 0);

    win.dispatch(Event::MouseLeave { x: -1, y: -1 });
    assert_eq!(container(&win, b).hide_deadline(), Some(1000));
    assert_eq!(win.timer_count(), 1);

    win.advance(500);
    assert_eq!(win.floating_scrollbars().holder(), Some(b));

    win.advance(1200);
    assert!(win.floating_scrollbars().is_free());
    assert!(!container(&win, b).is_floating_bound());
    assert_eq!(container(&win, b).dummy(Orientation::Vertical).item_position(), 71);
    assert_eq!(win.timer_count(), 0);

    let bar = win.floating_scrollbars().bar(Orientation::Vertical);
    assert_eq!(win.tree().get_parent(bar), Some(win.root()));
    assert!(!win.tree().is_visible(bar));
}

#[test]
fn test_reenter_cancels_hide() {
    init();
    let (mut win, a, _) = two_panels();
    hover(&mut win, 50, 50);
    win.dispatch(Event::MouseLeave { x: -1, y: -1 });
    assert!(container(&win, a).hide_deadline().is_some());

    hover(&mut win, 60, 60);
    assert_eq!(container(&win, a).hide_deadline(), None);
    win.advance(2000);
    assert_eq!(win.floating_scrollbars().holder(), Some(a));
    assert_eq!(win.timer_count(), 0);
}

#[test]
fn test_dragging_floating_bar_moves_grid() {
    init();
    let (mut win, _, b) = two_panels();
    win.with::<ScrollPanel, _>(b, |p, win| p.set_vertical_position(win, 70));
    hover(&mut win, 50, 150);

    // handle is 25px long and starts 17px down the track
    win.dispatch(Event::MouseDown {
        x: 196,
        y: 120,
        button: MouseButton::Left,
    });
    win.dispatch(Event::MouseMove { x: 196, y: 150 });
    win.dispatch(Event::MouseUp {
        x: 196,
        y: 150,
        button: MouseButton::Left,
    });

    assert_eq!(vertical(&win, b), 190);
    assert_eq!(container(&win, b).dummy(Orientation::Vertical).item_position(), 190);
    let grid = win.get::<ScrollPanel>(b).unwrap().grid();
    assert_eq!(win.tree().rect(grid).y, 100 - 190);
}

#[test]
fn test_scroll_stays_in_range_at_every_level() {
    init();
    let (mut win, a, _) = two_panels();
    for level in (1..=100).chain([1001, 1050, 1100]) {
        win.with::<ScrollPanel, _>(a, |p, win| {
            let sc = p.container_mut();
            while sc.scroll(win, Orientation::Vertical, true, level, false) {}
            assert_eq!(sc.item_position(win.tree(), Orientation::Vertical), 300);
            while sc.scroll(win, Orientation::Vertical, false, level, false) {}
            assert_eq!(sc.item_position(win.tree(), Orientation::Vertical), 0);
        });
    }
    assert_eq!(win.timer_count(), 0);
}

#[test]
fn test_precise_scroll_repeats_on_timer() {
    init();
    let (mut win, a, _) = two_panels();
    // level 10 of 100 moves a tenth of the viewport, then repeats three times
    win.dispatch(Event::Scroll {
        x: 50,
        y: 50,
        delta_x: 0,
        delta_y: 10,
        source: ScrollSource::Finger,
    });
    assert_eq!(vertical(&win, a), 10);
    assert_eq!(win.timer_count(), 1);

    let mut now = 0;
    for _ in 0..3 {
        now += 200;
        win.advance(now);
    }
    assert_eq!(vertical(&win, a), 40);

    for _ in 0..10 {
        now += 200;
        win.advance(now);
    }
    assert_eq!(win.timer_count(), 0);
    assert!(container(&win, a).scroll_timer().is_none());
}

#[test]
fn test_popup_returns_bars() {
    init();
    let (mut win, a, _) = two_panels();
    hover(&mut win, 50, 50);
    assert!(container(&win, a).is_floating_bound());

    win.popup_new_window();
    assert!(win.floating_scrollbars().is_free());
    assert!(!container(&win, a).is_floating_bound());
}

#[test]
fn test_destroying_holder_frees_bars() {
    init();
    let (mut win, a, b) = two_panels();
    hover(&mut win, 50, 50);
    win.destroy(a);
    win.layout().unwrap();
    assert!(win.floating_scrollbars().is_free());

    hover(&mut win, 50, 50);
    // b moved up into the freed space
    assert_eq!(win.floating_scrollbars().holder(), Some(b));
}
