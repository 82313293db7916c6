use std::cell::RefCell;
use std::rc::Rc;

use trellis::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder(Log);

impl TreeObserver for Recorder {
    fn item_changed(&mut self, _win: &mut Window, _view: WidgetId, node: NodeId) {
        self.0.borrow_mut().push(format!("changed {:?}", node));
    }

    fn item_folded(&mut self, _win: &mut Window, _view: WidgetId, node: NodeId, folded: bool) {
        self.0.borrow_mut().push(format!("folded {:?} {}", node, folded));
    }

    fn right_click(&mut self, _win: &mut Window, _view: WidgetId, node: NodeId) {
        self.0.borrow_mut().push(format!("right {:?}", node));
    }
}

fn add_view(win: &mut Window, view: TreeView) -> WidgetId {
    let root = win.root();
    win.add(root, view)
}

fn new_view() -> TreeView {
    let template = RowTemplate::new(vec![MemberTemplate::new("text")]);
    TreeView::new(template, Size::new(200, 100))
}

fn view(win: &Window, id: WidgetId) -> &TreeView {
    win.get::<TreeView>(id).unwrap()
}

fn row_y(win: &Window, id: WidgetId, node: NodeId) -> i32 {
    let panel = view(win, id).panel(node).unwrap();
    win.tree().rect(panel).y
}

/// a > a1 > a11, then b
fn sample(win: &mut Window, id: WidgetId) -> [NodeId; 4] {
    let nodes = win
        .with::<TreeView, _>(id, |t, win| {
            let a = t.add_node(win, &RowData::broadcast("a"));
            let a1 = t.add_child(win, a, &RowData::broadcast("a1"), None);
            let a11 = t.add_child(win, a1, &RowData::broadcast("a11"), None);
            let b = t.add_node(win, &RowData::broadcast("b"));
            [a, a1, a11, b]
        })
        .unwrap();
    win.layout().unwrap();
    nodes
}

#[test]
fn test_rows_are_indented_and_stacked() {
    init();
    let mut win = Window::new(Settings::default().window_size(300, 300));
    let id = add_view(&mut win, new_view());
    let [a, a1, a11, b] = sample(&mut win, id);

    assert_eq!(row_y(&win, id, a), 0);
    assert_eq!(row_y(&win, id, a1), 20);
    assert_eq!(row_y(&win, id, a11), 40);
    assert_eq!(row_y(&win, id, b), 60);

    let panel = view(&win, id).panel(a11).unwrap();
    assert_eq!(win.get::<ToggledPanel>(panel).unwrap().indent(), 32);
    let label = win.tree().get_children(panel)[0];
    assert_eq!(win.tree().rect(label).x, 32);
    assert_eq!(view(&win, id).value(win.tree(), a11, "text"), Some("a11"));
}

#[test]
fn test_fold_and_unfold_children() {
    init();
    let mut win = Window::new(Settings::default().window_size(300, 300));
    let id = add_view(&mut win, new_view());
    let [a, a1, a11, b] = sample(&mut win, id);

    win.with::<TreeView, _>(id, |t, win| t.fold_children(win, a));
    win.layout().unwrap();
    assert!(view(&win, id).is_folded(a1));
    assert!(!view(&win, id).is_shown(a1));
    assert!(!view(&win, id).is_shown(a11));
    assert_eq!(row_y(&win, id, b), 20);

    win.with::<TreeView, _>(id, |t, win| t.unfold_children(win, a));
    win.layout().unwrap();
    assert!(!view(&win, id).is_folded(a1));
    assert!(view(&win, id).is_shown(a11));
    assert_eq!(row_y(&win, id, a11), 40);
    assert_eq!(row_y(&win, id, b), 60);
}

#[test]
fn test_double_click_toggles_fold() {
    init();
    let log = Log::default();
    let mut win = Window::new(Settings::default().window_size(300, 300));
    let id = add_view(&mut win, new_view().observer(Recorder(Rc::clone(&log))));
    let [a, _, _, b] = sample(&mut win, id);

    win.dispatch(Event::DoubleClick { x: 10, y: 5 });
    win.layout().unwrap();
    assert!(view(&win, id).is_folded(a));
    assert_eq!(row_y(&win, id, b), 20);

    // a leaf has nothing to fold
    win.dispatch(Event::DoubleClick { x: 10, y: 25 });
    assert!(!view(&win, id).is_folded(b));

    win.dispatch(Event::DoubleClick { x: 10, y: 5 });
    win.layout().unwrap();
    assert_eq!(row_y(&win, id, b), 60);
    assert_eq!(
        *log.borrow(),
        vec![format!("folded {:?} true", a), format!("folded {:?} false", a)]
    );
}

#[test]
fn test_click_and_right_click_report_node() {
    init();
    let log = Log::default();
    let mut win = Window::new(Settings::default().window_size(300, 300));
    let id = add_view(&mut win, new_view().observer(Recorder(Rc::clone(&log))));
    let [_, a1, _, b] = sample(&mut win, id);

    win.dispatch(Event::MouseDown {
        x: 40,
        y: 25,
        button: MouseButton::Left,
    });
    win.dispatch(Event::MouseUp {
        x: 40,
        y: 25,
        button: MouseButton::Left,
    });
    assert_eq!(view(&win, id).cursel(), Some(a1));

    win.dispatch(Event::MouseDown {
        x: 40,
        y: 65,
        button: MouseButton::Right,
    });
    assert_eq!(
        *log.borrow(),
        vec![format!("changed {:?}", a1), format!("right {:?}", b)]
    );
}

#[test]
fn test_left_align_snaps_to_row_tops() {
    init();
    let mut win = Window::new(Settings::default().window_size(300, 300));
    let id = add_view(&mut win, new_view().left_align(true));
    win.with::<TreeView, _>(id, |t, win| {
        for i in 0..30 {
            t.add_node(win, &RowData::broadcast(format!("node {}", i)));
        }
    });
    win.layout().unwrap();

    win.dispatch(Event::Scroll {
        x: 50,
        y: 50,
        delta_x: 0,
        delta_y: 25,
        source: ScrollSource::Finger,
    });
    let position = |win: &Window| {
        view(win, id)
            .container()
            .item_position(win.tree(), Orientation::Vertical)
    };
    // 25px lands inside the second row and rounds up to the third
    assert_eq!(position(&win), 40);

    win.keyboard_capture(Some(id));
    win.dispatch(Event::KeyDown {
        key: Key::PageDown,
        modifiers: Modifiers::empty(),
    });
    assert_eq!(position(&win), 140);

    win.dispatch(Event::KeyDown {
        key: Key::End,
        modifiers: Modifiers::empty(),
    });
    assert_eq!(position(&win), 500);
}

fn left_aligned_rows(win: &mut Window, count: usize) -> WidgetId {
    let id = add_view(win, new_view().left_align(true));
    win.with::<TreeView, _>(id, |t, win| {
        for i in 0..count {
            t.add_node(win, &RowData::broadcast(format!("node {}", i)));
        }
    });
    win.layout().unwrap();
    id
}

fn tree_position(win: &Window, id: WidgetId) -> u32 {
    view(win, id)
        .container()
        .item_position(win.tree(), Orientation::Vertical)
}

#[test]
fn test_left_align_small_steps_move_forward() {
    init();
    let mut win = Window::new(Settings::default().window_size(300, 300));
    let id = left_aligned_rows(&mut win, 30);

    for _ in 0..3 {
        win.dispatch(Event::Scroll {
            x: 50,
            y: 50,
            delta_x: 0,
            delta_y: 1,
            source: ScrollSource::Wheel,
        });
    }
    assert_eq!(tree_position(&win, id), 60);

    // 50 notches reach the end and stay there
    for _ in 0..50 {
        win.dispatch(Event::Scroll {
            x: 50,
            y: 50,
            delta_x: 0,
            delta_y: 1,
            source: ScrollSource::Wheel,
        });
    }
    assert_eq!(tree_position(&win, id), 500);

    win.keyboard_capture(Some(id));
    win.dispatch(Event::KeyDown {
        key: Key::Home,
        modifiers: Modifiers::empty(),
    });
    assert_eq!(tree_position(&win, id), 0);
    for _ in 0..10 {
        win.dispatch(Event::KeyDown {
            key: Key::Down,
            modifiers: Modifiers::empty(),
        });
    }
    // each 16px step rounds up to the next 20px row
    assert_eq!(tree_position(&win, id), 200);

    win.dispatch(Event::KeyDown {
        key: Key::Up,
        modifiers: Modifiers::empty(),
    });
    assert_eq!(tree_position(&win, id), 180);
}

#[test]
fn test_fold_first_of_root_children_then_unfold_all() {
    init();
    let mut win = Window::new(Settings::default().window_size(300, 300));
    let id = add_view(&mut win, new_view());
    let (first, second, third, leaf) = win
        .with::<TreeView, _>(id, |t, win| {
            let first = t.add_node(win, &RowData::broadcast("first"));
            let leaf = t.add_child(win, first, &RowData::broadcast("leaf"), None);
            let second = t.add_node(win, &RowData::broadcast("second"));
            let third = t.add_node(win, &RowData::broadcast("third"));
            (first, second, third, leaf)
        })
        .unwrap();
    win.layout().unwrap();
    assert_eq!(view(&win, id).children(NodeId::ROOT), &[first, second, third]);

    win.with::<TreeView, _>(id, |t, win| t.fold(win, first));
    win.layout().unwrap();
    assert!(!view(&win, id).is_shown(leaf));
    assert_eq!(row_y(&win, id, second), 20);

    win.with::<TreeView, _>(id, |t, win| t.unfold_children(win, NodeId::ROOT));
    win.layout().unwrap();
    for node in [first, second, third] {
        assert!(!view(&win, id).is_folded(node));
    }
    assert!(view(&win, id).is_shown(leaf));
    assert_eq!(row_y(&win, id, leaf), 20);
    assert_eq!(row_y(&win, id, second), 40);
    assert_eq!(row_y(&win, id, third), 60);
}

#[test]
fn test_sort_and_remove_keep_preorder() {
    init();
    let mut win = Window::new(Settings::default().window_size(300, 300));
    let id = add_view(&mut win, new_view());
    let [a, a1, a11, b] = sample(&mut win, id);

    win.with::<TreeView, _>(id, |t, win| {
        t.sort_children(win, NodeId::ROOT, |x, y| {
            y.value("text").cmp(&x.value("text"))
        });
        assert_eq!(t.children(NodeId::ROOT), &[b, a]);
    });
    win.layout().unwrap();
    assert_eq!(row_y(&win, id, b), 0);
    assert_eq!(row_y(&win, id, a), 20);
    assert_eq!(row_y(&win, id, a11), 60);
    assert_eq!(view(&win, id).node_at(win.tree(), 45), Some(a1));

    win.with::<TreeView, _>(id, |t, win| {
        t.remove_node(win, a1);
        assert_eq!(t.node_count(), 2);
        t.empty(win);
        assert_eq!(t.node_count(), 0);
    });
    win.layout().unwrap();
    assert_eq!(view(&win, id).node_at(win.tree(), 5), None);
}
