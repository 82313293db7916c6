//! Hierarchical rows with folding.
//!
//! Nodes live in a slab owned by the view. Every node but the root owns a
//! [`ToggledPanel`] row in the content grid; rows are kept in pre-order and
//! indented by their level. Folding hides rows without destroying them.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::error::{validate, validation_failed};
use crate::layout::{Point, Size};
use crate::timer::TimerId;
use crate::tree::{Tree, WidgetId};
use crate::window::Window;

use super::listbox::gc;
use super::panel::{RowData, RowTemplate, ToggledPanel};
use super::scroll::Orientation;
use super::scroll_container::{ScrollContainer, ScrollContent};
use super::stack::Stack;
use super::widget::{Event, EventResponse, MouseButton, Visibility, Widget, WidgetKind};

/// Slab index of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The invisible root every other node hangs from.
    pub const ROOT: NodeId = NodeId(0);
}

/// Callbacks from a [`TreeView`]. Every method defaults to a no-op.
pub trait TreeObserver {
    /// The selection was changed by the user.
    fn item_changed(&mut self, win: &mut Window, view: WidgetId, node: NodeId) {
        let _ = (win, view, node);
    }

    fn item_folded(&mut self, win: &mut Window, view: WidgetId, node: NodeId, folded: bool) {
        let _ = (win, view, node, folded);
    }

    fn right_click(&mut self, win: &mut Window, view: WidgetId, node: NodeId) {
        let _ = (win, view, node);
    }
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    folded: bool,
    panel: Option<WidgetId>,
    level: usize,
}

struct TreeRows {
    id: WidgetId,
    template: Rc<RowTemplate>,
    nodes: Vec<Option<Node>>,
    /// Row panels in pre-order
    order: Vec<WidgetId>,
    cursel: Option<NodeId>,
    left_align: bool,
    /// Last offset handed out by the left-align snap
    snapped_y: u32,
    observer: Option<Box<dyn TreeObserver>>,
}

impl TreeRows {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)?.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)?.as_mut()
    }

    /// `id` and everything below it, in pre-order.
    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    fn node_of_panel(&self, panel: WidgetId) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.as_ref().is_some_and(|n| n.panel == Some(panel)))
            .map(NodeId)
    }

    /// Whether a node's row would be shown: no ancestor is folded.
    fn is_shown(&self, id: NodeId) -> bool {
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(ancestor) = current {
            let Some(node) = self.node(ancestor) else {
                return false;
            };
            if node.folded {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Rebuild the pre-order row list and reorder the grid to match.
    fn sync_order(&mut self, win: &mut Window, grid: WidgetId) {
        self.order = self
            .subtree(NodeId::ROOT)
            .into_iter()
            .filter_map(|id| self.node(id).and_then(|n| n.panel))
            .collect();
        win.tree_mut().set_children_order(grid, self.order.clone());
    }

    /// Show or hide the rows below `id` according to the fold flags.
    fn apply_folding(&self, win: &mut Window, id: NodeId) {
        let shown = self.is_shown(id) && self.node(id).is_some_and(|n| !n.folded);
        let Some(node) = self.node(id) else {
            return;
        };
        for &child in &node.children {
            if let Some(panel) = self.node(child).and_then(|n| n.panel) {
                let visibility = if shown {
                    Visibility::Visible
                } else {
                    Visibility::Invisible
                };
                win.tree_mut().set_visible(panel, visibility);
            }
            self.apply_folding(win, child);
        }
    }
}

impl ScrollContent for TreeRows {
    fn handle_gc(
        &mut self,
        win: &mut Window,
        sc: &mut ScrollContainer,
        _x_offset: u32,
        y_offset: u32,
    ) -> u32 {
        let margin = win.settings().gc_margin_rows;
        gc::handle_gc(win, sc, &self.order, margin, y_offset).y_offset
    }

    fn adjust_offset(
        &mut self,
        win: &mut Window,
        sc: &mut ScrollContainer,
        _x_offset: &mut u32,
        y_offset: &mut u32,
    ) {
        if !self.left_align || *y_offset == 0 {
            self.snapped_y = *y_offset;
            return;
        }
        // forward moves round up to the next row top, backward moves down
        let forward = *y_offset > self.snapped_y;
        let mut top = 0;
        for &panel in &self.order {
            if !win.tree().takes_space(panel) {
                continue;
            }
            let height = win.tree().rect(panel).height.max(0) as u32;
            if *y_offset < top + height {
                if *y_offset != top {
                    *y_offset = if forward { top + height } else { top };
                }
                break;
            }
            top += height;
        }
        let max = sc.active(win.tree(), Orientation::Vertical).max_position();
        *y_offset = (*y_offset).min(max);
        self.snapped_y = *y_offset;
    }
}

pub struct TreeView {
    sc: ScrollContainer,
    rows: TreeRows,
}

impl TreeView {
    pub fn new(template: RowTemplate, viewport: Size) -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            folded: false,
            panel: None,
            level: 0,
        };
        Self {
            sc: ScrollContainer::new(viewport),
            rows: TreeRows {
                id: WidgetId::placeholder(),
                template: Rc::new(template),
                nodes: vec![Some(root)],
                order: Vec::new(),
                cursel: None,
                left_align: false,
                snapped_y: 0,
                observer: None,
            },
        }
    }

    pub fn observer(mut self, observer: impl TreeObserver + 'static) -> Self {
        self.rows.observer = Some(Box::new(observer));
        self
    }

    /// Snap the vertical offset to whole rows.
    pub fn left_align(mut self, left_align: bool) -> Self {
        self.rows.left_align = left_align;
        self
    }

    pub fn container(&self) -> &ScrollContainer {
        &self.sc
    }

    pub fn container_mut(&mut self) -> &mut ScrollContainer {
        &mut self.sc
    }

    pub fn cursel(&self) -> Option<NodeId> {
        self.rows.cursel
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.rows.node(node).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.rows.nodes.iter().filter(|n| n.is_some()).count() - 1
    }

    pub fn panel(&self, node: NodeId) -> Option<WidgetId> {
        self.rows.node(node)?.panel
    }

    pub fn cookie(&self, tree: &Tree, node: NodeId) -> Option<u64> {
        tree.downcast_ref::<ToggledPanel>(self.panel(node)?)
            .map(|p| p.cookie())
    }

    pub fn value<'a>(&self, tree: &'a Tree, node: NodeId, member: &str) -> Option<&'a str> {
        tree.downcast_ref::<ToggledPanel>(self.panel(node)?)?
            .value(member)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.rows.node(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.rows
            .node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Nesting depth; nodes added under the root are at level 0.
    pub fn indentation_level(&self, node: NodeId) -> usize {
        self.rows.node(node).map(|n| n.level).unwrap_or(0)
    }

    pub fn is_folded(&self, node: NodeId) -> bool {
        self.rows.node(node).is_some_and(|n| n.folded)
    }

    /// Whether `ancestor` lies strictly above `node`.
    pub fn is_child_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether the node's row is shown, i.e. no ancestor is folded.
    pub fn is_shown(&self, node: NodeId) -> bool {
        node != NodeId::ROOT && self.contains(node) && self.rows.is_shown(node)
    }

    pub fn add_node(&mut self, win: &mut Window, data: &RowData) -> NodeId {
        self.add_child(win, NodeId::ROOT, data, None)
    }

    /// Add a node under `parent` at child index `at` (the end when `None`).
    pub fn add_child(
        &mut self,
        win: &mut Window,
        parent: NodeId,
        data: &RowData,
        at: Option<usize>,
    ) -> NodeId {
        let level = match self.rows.node(parent) {
            Some(node) if parent == NodeId::ROOT => node.level,
            Some(node) => node.level + 1,
            None => validation_failed!("{:?} is not a node of this tree", parent),
        };

        let mut panel = ToggledPanel::new(Rc::clone(&self.rows.template), data);
        panel.set_indent(level as i32 * win.settings().indentation_step);
        let panel = win.add(self.sc.grid(), panel);

        let id = NodeId(self.rows.nodes.len());
        self.rows.nodes.push(Some(Node {
            parent: Some(parent),
            children: Vec::new(),
            folded: false,
            panel: Some(panel),
            level,
        }));
        if let Some(node) = self.rows.node_mut(parent) {
            let at = at.map_or(node.children.len(), |at| at.min(node.children.len()));
            node.children.insert(at, id);
        }

        if !self.rows.is_shown(id) {
            win.tree_mut().set_visible(panel, Visibility::Invisible);
        }
        self.rows.sync_order(win, self.sc.grid());
        self.sc.invalidate_layout(win);
        id
    }

    /// Remove a node and its whole subtree.
    pub fn remove_node(&mut self, win: &mut Window, node: NodeId) {
        validate!(node != NodeId::ROOT, "the tree root cannot be removed");
        let parent = self.parent(node);
        validate!(parent.is_some(), "{:?} has no parent", node);

        for id in self.rows.subtree(node) {
            if let Some(panel) = self.rows.nodes[id.0].take().and_then(|n| n.panel) {
                win.destroy(panel);
            }
            if self.rows.cursel == Some(id) {
                self.rows.cursel = None;
            }
        }
        if let Some(parent) = parent.and_then(|p| self.rows.node_mut(p)) {
            parent.children.retain(|&c| c != node);
        }
        self.rows.sync_order(win, self.sc.grid());
        self.sc.invalidate_layout(win);
    }

    /// Remove every child of `node`.
    pub fn clear(&mut self, win: &mut Window, node: NodeId) {
        for child in self.children(node).to_vec() {
            self.remove_node(win, child);
        }
    }

    /// Remove every node but the root.
    pub fn empty(&mut self, win: &mut Window) {
        self.clear(win, NodeId::ROOT);
    }

    fn set_folded(&mut self, win: &mut Window, node: NodeId, folded: bool) {
        match self.rows.node_mut(node) {
            Some(n) if n.folded != folded => n.folded = folded,
            _ => return,
        }
        self.rows.apply_folding(win, node);
        self.sc.invalidate_layout(win);
        let id = self.rows.id;
        if let Some(observer) = self.rows.observer.as_mut() {
            observer.item_folded(win, id, node, folded);
        }
    }

    /// Hide the rows below `node`.
    pub fn fold(&mut self, win: &mut Window, node: NodeId) {
        self.set_folded(win, node, true);
    }

    /// Show the rows below `node` that no folded node hides.
    pub fn unfold(&mut self, win: &mut Window, node: NodeId) {
        self.set_folded(win, node, false);
    }

    /// Fold `node` and every node below it.
    pub fn fold_children(&mut self, win: &mut Window, node: NodeId) {
        self.set_subtree_folded(win, node, true);
    }

    /// Unfold `node` and every node below it.
    pub fn unfold_children(&mut self, win: &mut Window, node: NodeId) {
        self.set_subtree_folded(win, node, false);
    }

    fn set_subtree_folded(&mut self, win: &mut Window, node: NodeId, folded: bool) {
        for id in self.rows.subtree(node) {
            if let Some(n) = self.rows.node_mut(id) {
                n.folded = folded;
            }
        }
        self.rows.apply_folding(win, node);
        self.sc.invalidate_layout(win);
    }

    /// Select `node`. Returns false when it already was selected or cannot
    /// be. Observers hear only about changes made by the user.
    pub fn set_select_item(&mut self, win: &mut Window, node: NodeId, from_ui: bool) -> bool {
        if node == NodeId::ROOT || !self.contains(node) || self.rows.cursel == Some(node) {
            return false;
        }
        if let Some(old) = self.rows.cursel.and_then(|n| self.panel(n)) {
            win.with::<ToggledPanel, _>(old, |p, win| p.set_selected(win, old, false));
        }
        if let Some(new) = self.panel(node) {
            win.with::<ToggledPanel, _>(new, |p, win| p.set_selected(win, new, true));
        }
        self.rows.cursel = Some(node);

        if from_ui {
            let id = self.rows.id;
            if let Some(observer) = self.rows.observer.as_mut() {
                observer.item_changed(win, id, node);
            }
        }
        true
    }

    /// Stable reorder of the children of `node`.
    pub fn sort_children(
        &mut self,
        win: &mut Window,
        node: NodeId,
        mut cmp: impl FnMut(&ToggledPanel, &ToggledPanel) -> Ordering,
    ) {
        let Some(mut children) = self.rows.node(node).map(|n| n.children.clone()) else {
            return;
        };
        let tree = win.tree();
        let panel = |id: NodeId| {
            self.rows
                .node(id)
                .and_then(|n| n.panel)
                .and_then(|p| tree.downcast_ref::<ToggledPanel>(p))
        };
        children.sort_by(|&a, &b| match (panel(a), panel(b)) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => Ordering::Equal,
        });
        if let Some(n) = self.rows.node_mut(node) {
            n.children = children;
        }
        self.rows.sync_order(win, self.sc.grid());
        self.sc.invalidate_layout(win);
    }

    /// Node whose row lies under window coordinate `y`.
    pub fn node_at(&self, tree: &Tree, y: i32) -> Option<NodeId> {
        let content = self.sc.content_rect(tree);
        if y < content.y || y >= content.bottom() {
            return None;
        }
        let panel = self.rows.order.iter().copied().find(|&panel| {
            let rect = tree.rect(panel);
            tree.takes_space(panel) && y >= rect.y && y < rect.bottom()
        })?;
        self.rows.node_of_panel(panel)
    }
}

impl Widget for TreeView {
    fn kind(&self) -> WidgetKind {
        WidgetKind::TreeView
    }

    fn best_size(&self, _tree: &Tree, _id: WidgetId) -> Size {
        self.sc.best_size()
    }

    fn register_children(&mut self, win: &mut Window, id: WidgetId) {
        self.rows.id = id;
        self.sc.register(win, id, Box::new(Stack::vertical()));
    }

    fn place(&mut self, win: &mut Window, _id: WidgetId, origin: Point, size: Size) {
        self.sc.place(&mut self.rows, win, origin, size);
    }

    fn layout_children(&mut self, win: &mut Window, _id: WidgetId) {
        self.sc.layout_children(&mut self.rows, win);
    }

    fn event(&mut self, win: &mut Window, id: WidgetId, event: &Event) -> EventResponse {
        match *event {
            Event::Click { y, .. } => {
                if let Some(node) = self.node_at(win.tree(), y) {
                    self.set_select_item(win, node, true);
                }
                EventResponse::Handled
            }
            Event::DoubleClick { y, .. } => {
                if let Some(node) = self.node_at(win.tree(), y) {
                    if !self.children(node).is_empty() {
                        let folded = self.is_folded(node);
                        self.set_folded(win, node, !folded);
                    }
                }
                EventResponse::Handled
            }
            Event::MouseDown {
                y,
                button: MouseButton::Right,
                ..
            } => {
                if let Some(node) = self.node_at(win.tree(), y) {
                    if let Some(observer) = self.rows.observer.as_mut() {
                        observer.right_click(win, id, node);
                    }
                }
                EventResponse::Handled
            }
            _ => self.sc.handle_event(&mut self.rows, win, event),
        }
    }

    fn on_timer(&mut self, win: &mut Window, _id: WidgetId, timer: TimerId) {
        self.sc.on_timer(&mut self.rows, win, timer);
    }

    fn scrollbar_moved(&mut self, win: &mut Window, _id: WidgetId, orientation: Orientation) {
        self.sc.floating_moved(&mut self.rows, win, orientation);
    }

    fn reset_scrollbar(&mut self, win: &mut Window, _id: WidgetId) {
        if self.sc.is_floating_bound() {
            self.sc.reset_scrollbar(win);
        }
    }

    fn popup_new_window(&mut self, win: &mut Window, _id: WidgetId) {
        self.sc.popup_new_window(win);
    }

    fn destroying(&mut self, win: &mut Window, _id: WidgetId) {
        self.sc.destroying(win);
    }
}

super::impl_widget_type!(TreeView, WidgetKind::TreeView);
