//! Lazy materialization of row panels.
//!
//! Only rows near the visible part of a list keep their member labels. The
//! rest are collapsed to a bare panel that remembers its last measured
//! height, or an estimate when it was never shown.

use crate::layout::Size;
use crate::tree::WidgetId;
use crate::widgets::panel::ToggledPanel;
use crate::widgets::scroll::Orientation;
use crate::widgets::scroll_container::ScrollContainer;
use crate::window::Window;

/// Result of one gc pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GcOutcome {
    /// Vertical offset keeping the first visible row in place
    pub y_offset: u32,
    /// Indexes into the row slice materialized by this pass
    pub allocated: Vec<usize>,
    /// First and last row index kept materialized
    pub window: Option<(usize, usize)>,
    /// Whether the window reaches the last displayed row
    pub reached_end: bool,
}

/// Materialize the rows around `y_offset` and release the others.
///
/// `rows` lists every row panel in display order; rows that take no space
/// (folded tree nodes) are never materialized. When heights above the
/// first visible row change, the returned offset is shifted by the same
/// amount and the grid is placed again.
pub(crate) fn handle_gc(
    win: &mut Window,
    sc: &mut ScrollContainer,
    rows: &[WidgetId],
    margin: usize,
    y_offset: u32,
) -> GcOutcome {
    let displayed: Vec<usize> = (0..rows.len())
        .filter(|&i| win.tree().takes_space(rows[i]))
        .collect();
    let content = sc.content_rect(win.tree());

    let mut outcome = GcOutcome {
        y_offset,
        ..GcOutcome::default()
    };
    if displayed.is_empty() || content.height <= 0 {
        let mut changed = false;
        for &row in rows {
            changed |= release(win, row);
        }
        if changed {
            replace_grid(win, sc);
        }
        outcome.y_offset = 0;
        return outcome;
    }

    let heights: Vec<i32> = displayed
        .iter()
        .map(|&i| win.tree().best_size(rows[i]).height)
        .collect();
    let y = y_offset as i32;
    let first = row_at(&heights, y);
    let last = row_at(&heights, y + content.height - 1).max(first);
    let top_before: i32 = heights[..first].iter().sum();

    let lo = first.saturating_sub(margin);
    let hi = (last + margin).min(displayed.len() - 1);
    log::debug!(
        "{:?} gc window rows {}..={} (visible {}..={})",
        sc.id(),
        displayed[lo],
        displayed[hi],
        displayed[first],
        displayed[last]
    );

    let mut keep = vec![false; rows.len()];
    for &i in &displayed[lo..=hi] {
        keep[i] = true;
    }

    let mut changed = false;
    for (i, &row) in rows.iter().enumerate() {
        if keep[i] {
            if materialize(win, row) {
                outcome.allocated.push(i);
                changed = true;
            }
        } else {
            changed |= release(win, row);
        }
    }
    outcome.window = Some((displayed[lo], displayed[hi]));
    outcome.reached_end = hi == displayed.len() - 1;

    if changed {
        let top_after: i32 = displayed[..first]
            .iter()
            .map(|&i| win.tree().best_size(rows[i]).height)
            .sum();
        let grid_height = replace_grid(win, sc);
        let max = (grid_height - content.height).max(0);
        let shifted = (y + top_after - top_before).clamp(0, max) as u32;
        if shifted != y_offset {
            log::trace!("{:?} gc shifted offset {} -> {}", sc.id(), y_offset, shifted);
        }
        sc.vertical_set_item_position(win, shifted);
        outcome.y_offset = shifted;
    }
    outcome
}

/// Index of the row covering pixel `y`, clamped to the last row.
fn row_at(heights: &[i32], y: i32) -> usize {
    let mut top = 0;
    for (i, &height) in heights.iter().enumerate() {
        top += height;
        if y < top {
            return i;
        }
    }
    heights.len().saturating_sub(1)
}

fn materialize(win: &mut Window, row: WidgetId) -> bool {
    win.with::<ToggledPanel, _>(row, |panel, win| {
        if panel.is_materialized() {
            false
        } else {
            panel.materialize(win, row);
            true
        }
    })
    .unwrap_or(false)
}

fn release(win: &mut Window, row: WidgetId) -> bool {
    win.with::<ToggledPanel, _>(row, |panel, win| {
        if panel.is_materialized() {
            panel.release(win, row);
            true
        } else {
            false
        }
    })
    .unwrap_or(false)
}

/// Place the grid again at the content origin and refresh the vertical
/// range. Returns the new grid height.
fn replace_grid(win: &mut Window, sc: &mut ScrollContainer) -> i32 {
    let content = sc.content_rect(win.tree());
    let best = win.tree().best_size(sc.grid());
    let width = best.width.max(content.width);
    win.place_widget(
        sc.grid(),
        content.origin(),
        Size::new(width, best.height),
    );
    sc.set_item_count(win, Orientation::Vertical, best.height.max(0) as u32);
    sc.set_item_count(win, Orientation::Horizontal, width.max(0) as u32);
    best.height
}
