//! Linear stacking shared by containers, list grids and panel rows.

use super::{Point, Size};
use crate::tree::{Tree, WidgetId};
use crate::window::Window;

/// Direction children are stacked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn main(self, size: Size) -> i32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    fn cross(self, size: Size) -> i32 {
        match self {
            Axis::Horizontal => size.height,
            Axis::Vertical => size.width,
        }
    }

    fn size(self, main: i32, cross: i32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }
}

/// Best size of `children` stacked along `axis`.
///
/// Invisible children take no space; hidden ones still do.
pub fn stack_best_size(tree: &Tree, children: &[WidgetId], axis: Axis, spacing: i32) -> Size {
    let mut main = 0;
    let mut cross = 0;
    let mut count = 0;
    for &child in children {
        if !tree.takes_space(child) {
            continue;
        }
        let best = tree.best_size(child);
        main += axis.main(best);
        cross = cross.max(axis.cross(best));
        count += 1;
    }
    if count > 1 {
        main += spacing * (count - 1);
    }
    axis.size(main, cross)
}

/// Place `children` one after another starting at `origin`.
///
/// Every child gets its best extent on the main axis and the full `size`
/// extent on the cross axis. Returns the main-axis extent consumed.
pub fn stack_children(
    win: &mut Window,
    children: &[WidgetId],
    axis: Axis,
    origin: Point,
    size: Size,
    spacing: i32,
) -> i32 {
    let cross = axis.cross(size);
    let mut cursor = 0;
    let mut placed = 0;
    for &child in children {
        if !win.tree().takes_space(child) {
            continue;
        }
        if placed > 0 {
            cursor += spacing;
        }
        let best = win.tree().best_size(child);
        let main = axis.main(best);
        let child_origin = match axis {
            Axis::Horizontal => origin.offset(cursor, 0),
            Axis::Vertical => origin.offset(0, cursor),
        };
        win.place_widget(child, child_origin, axis.size(main, cross));
        cursor += main;
        placed += 1;
    }
    cursor
}
