//! Arena-based widget storage.
//!
//! Widgets live in a dense vector addressed through a sparse map of
//! generational indices, so stale ids never alias a reused slot. Next to
//! each widget the tree keeps its [`WidgetBase`] (geometry, visibility and
//! draw flags) and its parent/child links. Containers walk and move their
//! subtrees through the bases alone; only dispatch needs to extract the
//! widget itself, which `Window::with_widget_mut` does with a placeholder.
//!
//! Layout invalidation bubbles up to the nearest relayout boundary, which is
//! queued in `layout_roots` for the next `Window::layout` pass.

use std::collections::HashSet;

use crate::error::validate;
use crate::layout::{Point, Size};
use crate::widgets::widget::{DrawingAction, Rect, Visibility, Widget, WidgetBase, WidgetKind};

/// Unique identifier for a widget in the tree.
///
/// `index` is a slot in the sparse map and `generation` counts how many
/// times that slot has been reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WidgetId {
    index: u32,
    generation: u32,
}

impl WidgetId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// An id that never resolves. Used before a child is registered.
    pub fn placeholder() -> Self {
        Self {
            index: u32::MAX,
            generation: u32::MAX,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }

    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

struct Node {
    widget: Box<dyn Widget>,
    base: WidgetBase,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    needs_layout: bool,
    is_relayout_boundary: bool,
    /// Back-pointer to the sparse slot, for swap-remove fixup
    sparse_index: u32,
}

/// Stand-in stored while the real widget is out on loan.
struct Placeholder;

impl Widget for Placeholder {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Placeholder
    }

    fn best_size(&self, _: &Tree, _: WidgetId) -> Size {
        Size::zero()
    }
}

pub struct Tree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    free_indices: Vec<u32>,
    /// Relayout boundaries waiting for layout
    layout_roots: HashSet<WidgetId>,
    /// Generations of freed slots, so a reused slot gets a fresh one
    freed_generations: Vec<u32>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
            layout_roots: HashSet::new(),
            freed_generations: Vec::new(),
        }
    }

    /// Store a widget and return its id. Links are set separately.
    pub fn register(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            let old_gen = self.freed_generations[idx as usize];
            (idx, old_gen.wrapping_add(1))
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(None);
            self.freed_generations.push(0);
            (idx, 0)
        };

        let dense_index = self.dense.len();
        self.dense.push(Node {
            widget,
            base: WidgetBase::default(),
            parent: None,
            children: Vec::new(),
            needs_layout: false,
            is_relayout_boundary: false,
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });

        WidgetId::new(sparse_index, generation)
    }

    /// Remove a single widget and unlink it from its parent.
    ///
    /// Children are not touched; callers remove subtrees bottom-up.
    pub fn unregister(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        let dense_index = self.dense_index(id)?;

        if let Some(parent_id) = self.dense[dense_index].parent {
            if let Some(parent_dense) = self.dense_index(parent_id) {
                self.dense[parent_dense].children.retain(|&c| c != id);
            }
        }
        for child in self.dense[dense_index].children.clone() {
            if let Some(child_dense) = self.dense_index(child) {
                self.dense[child_dense].parent = None;
            }
        }

        let last_dense_index = self.dense.len() - 1;
        let removed = self.dense.swap_remove(dense_index);
        if dense_index != last_dense_index {
            let moved_sparse_idx = self.dense[dense_index].sparse_index;
            if let Some(ref mut entry) = self.sparse[moved_sparse_idx as usize] {
                entry.dense_index = dense_index;
            }
        }

        self.sparse[id.index as usize] = None;
        self.freed_generations[id.index as usize] = id.generation;
        self.free_indices.push(id.index);
        self.layout_roots.remove(&id);

        Some(removed.widget)
    }

    fn dense_index(&self, id: WidgetId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation)
            .map(|e| e.dense_index)
    }

    fn node(&self, id: WidgetId) -> Option<&Node> {
        self.dense_index(id).map(|idx| &self.dense[idx])
    }

    fn node_mut(&mut self, id: WidgetId) -> Option<&mut Node> {
        self.dense_index(id).map(move |idx| &mut self.dense[idx])
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn widget_count(&self) -> usize {
        self.dense.len()
    }

    pub fn with_widget<R>(&self, id: WidgetId, f: impl FnOnce(&dyn Widget) -> R) -> Option<R> {
        self.node(id).map(|node| f(&*node.widget))
    }

    pub fn kind(&self, id: WidgetId) -> Option<WidgetKind> {
        self.node(id).map(|node| node.widget.kind())
    }

    pub fn downcast_ref<T: Widget + 'static>(&self, id: WidgetId) -> Option<&T> {
        self.node(id)
            .and_then(|node| (*node.widget).as_any().downcast_ref::<T>())
    }

    pub fn downcast_mut<T: Widget + 'static>(&mut self, id: WidgetId) -> Option<&mut T> {
        self.node_mut(id)
            .and_then(|node| (*node.widget).as_any_mut().downcast_mut::<T>())
    }

    /// Take the widget out, leaving a placeholder in its slot.
    pub(crate) fn take_widget(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        self.node_mut(id)
            .map(|node| std::mem::replace(&mut node.widget, Box::new(Placeholder)))
    }

    /// Put back a widget taken with `take_widget`. Dropped if the slot was
    /// unregistered meanwhile.
    pub(crate) fn restore_widget(&mut self, id: WidgetId, widget: Box<dyn Widget>) {
        if let Some(node) = self.node_mut(id) {
            node.widget = widget;
        }
    }

    pub fn base(&self, id: WidgetId) -> Option<&WidgetBase> {
        self.node(id).map(|node| &node.base)
    }

    pub fn base_mut(&mut self, id: WidgetId) -> Option<&mut WidgetBase> {
        self.node_mut(id).map(|node| &mut node.base)
    }

    pub fn rect(&self, id: WidgetId) -> Rect {
        self.base(id).map(|b| b.rect()).unwrap_or_default()
    }

    pub fn visibility(&self, id: WidgetId) -> Visibility {
        self.base(id)
            .map(|b| b.visibility())
            .unwrap_or(Visibility::Invisible)
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.visibility(id) == Visibility::Visible
    }

    // Links

    /// Append `child` to `parent`'s children.
    pub fn set_parent(&mut self, child_id: WidgetId, parent_id: WidgetId) {
        self.insert_child(parent_id, child_id, None);
    }

    /// Insert `child` under `parent` at `at` (`None` appends).
    pub fn insert_child(&mut self, parent_id: WidgetId, child_id: WidgetId, at: Option<usize>) {
        self.detach(child_id);
        if let Some(child) = self.node_mut(child_id) {
            child.parent = Some(parent_id);
        }
        if let Some(parent) = self.node_mut(parent_id) {
            let at = at.unwrap_or(parent.children.len()).min(parent.children.len());
            parent.children.insert(at, child_id);
        }
    }

    /// Unlink a widget from its parent, keeping it registered.
    pub fn detach(&mut self, id: WidgetId) {
        let Some(parent_id) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent) = self.node_mut(parent_id) {
            parent.children.retain(|&c| c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Move a widget (and its subtree) under a new parent.
    pub fn reparent(&mut self, id: WidgetId, new_parent: WidgetId) {
        self.insert_child(new_parent, id, None);
    }

    /// Reorder `parent`'s children.
    ///
    /// `order` lists children that move to the front in that order; any
    /// children it leaves out (floating bars, say) keep their relative order
    /// behind them.
    pub fn set_children_order(&mut self, parent_id: WidgetId, order: Vec<WidgetId>) {
        let Some(parent) = self.node_mut(parent_id) else {
            return;
        };
        let mut seen = HashSet::new();
        validate!(
            order
                .iter()
                .all(|c| parent.children.contains(c) && seen.insert(*c)),
            "children order names a stranger or a duplicate"
        );
        let rest: Vec<WidgetId> = parent
            .children
            .iter()
            .copied()
            .filter(|c| !seen.contains(c))
            .collect();
        parent.children = order;
        parent.children.extend(rest);
    }

    pub fn get_parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn get_children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.node(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn child_count(&self, id: WidgetId) -> usize {
        self.node(id).map(|node| node.children.len()).unwrap_or(0)
    }

    /// All descendants in depth-first pre-order, excluding `id`.
    pub fn descendants(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack: Vec<WidgetId> = self.get_children(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.node(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Parent chain from the direct parent up to the root.
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut current = self.get_parent(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.get_parent(parent);
        }
        out
    }

    pub fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    // Layout queue

    /// Mark a widget as needing layout.
    ///
    /// The flag bubbles up to the nearest relayout boundary, which is added
    /// to the layout queue. An already marked widget stops the walk since
    /// its boundary is queued.
    pub fn mark_needs_layout(&mut self, widget_id: WidgetId) {
        let mut current = widget_id;
        loop {
            let Some(idx) = self.dense_index(current) else {
                return;
            };
            if self.dense[idx].needs_layout {
                return;
            }
            self.dense[idx].needs_layout = true;
            if self.dense[idx].is_relayout_boundary {
                self.layout_roots.insert(current);
                return;
            }
            match self.dense[idx].parent {
                Some(parent) => current = parent,
                None => {
                    self.layout_roots.insert(current);
                    return;
                }
            }
        }
    }

    pub fn needs_layout(&self, id: WidgetId) -> bool {
        self.node(id).map(|n| n.needs_layout).unwrap_or(false)
    }

    /// Clear the layout flag on `id` and its whole subtree.
    pub fn clear_needs_layout(&mut self, id: WidgetId) {
        if let Some(node) = self.node_mut(id) {
            node.needs_layout = false;
        }
        for child in self.descendants(id) {
            if let Some(node) = self.node_mut(child) {
                node.needs_layout = false;
            }
        }
    }

    pub fn set_relayout_boundary(&mut self, id: WidgetId, is_boundary: bool) {
        if let Some(node) = self.node_mut(id) {
            node.is_relayout_boundary = is_boundary;
        }
    }

    pub fn is_relayout_boundary(&self, id: WidgetId) -> bool {
        self.node(id)
            .map(|n| n.is_relayout_boundary)
            .unwrap_or(false)
    }

    pub fn take_layout_roots(&mut self) -> Vec<WidgetId> {
        self.layout_roots.drain().collect()
    }

    pub fn has_layout_roots(&self) -> bool {
        !self.layout_roots.is_empty()
    }

    // Geometry

    /// Best size, honouring a fixed-size override.
    pub fn best_size(&self, id: WidgetId) -> Size {
        let Some(node) = self.node(id) else {
            return Size::zero();
        };
        match node.base.fix_size() {
            Some(size) => size,
            None => node.widget.best_size(self, id),
        }
    }

    /// Whether the widget occupies room in its parent's layout.
    pub fn takes_space(&self, id: WidgetId) -> bool {
        self.base(id)
            .map(|b| b.visibility() != Visibility::Invisible && !b.is_floating())
            .unwrap_or(false)
    }

    pub fn place_base(&mut self, id: WidgetId, origin: Point, size: Size) {
        if let Some(base) = self.base_mut(id) {
            base.place(origin, size);
        }
    }

    pub fn set_fix_size(&mut self, id: WidgetId, size: Option<Size>) {
        if let Some(base) = self.base_mut(id) {
            base.set_fix_size(size);
        }
    }

    /// Move a widget, shifting its descendants by the same delta.
    ///
    /// Floating descendants are positioned by whoever leases them and stay
    /// put.
    pub fn set_origin(&mut self, id: WidgetId, origin: Point) {
        let current = self.rect(id).origin();
        let (dx, dy) = (origin.x - current.x, origin.y - current.y);
        if dx == 0 && dy == 0 {
            return;
        }
        if let Some(base) = self.base_mut(id) {
            base.move_to(origin);
        }
        self.shift_children(id, dx, dy);
    }

    fn shift_children(&mut self, id: WidgetId, dx: i32, dy: i32) {
        for child in self.get_children(id) {
            let Some(base) = self.base_mut(child) else {
                continue;
            };
            if base.is_floating() {
                continue;
            }
            let moved = base.origin().offset(dx, dy);
            base.move_to(moved);
            self.shift_children(child, dx, dy);
        }
    }

    /// Propagate a visible area down the subtree.
    ///
    /// Widgets that clip their children pass on the part of `area` inside
    /// their own rect.
    pub fn set_visible_area(&mut self, id: WidgetId, area: Rect) {
        let Some(base) = self.base_mut(id) else {
            return;
        };
        base.set_visible_area(area);
        let child_area = if base.clips_children() {
            area.intersect(&base.rect())
        } else {
            area
        };
        for child in self.get_children(id) {
            self.set_visible_area(child, child_area);
        }
    }

    /// Returns true when the change needs a new layout.
    pub fn set_visible(&mut self, id: WidgetId, visibility: Visibility) -> bool {
        self.base_mut(id)
            .map(|b| b.set_visibility(visibility))
            .unwrap_or(false)
    }

    pub fn set_dirty(&mut self, id: WidgetId) {
        if let Some(base) = self.base_mut(id) {
            base.set_dirty();
        }
    }

    pub fn set_redraw(&mut self, id: WidgetId) {
        if let Some(base) = self.base_mut(id) {
            base.set_redraw();
        }
    }

    // Drawing

    /// Collect the call stacks (root first) that lead to widgets needing a
    /// repaint.
    pub fn populate_dirty_list(&self, id: WidgetId) -> Vec<Vec<WidgetId>> {
        let mut list = Vec::new();
        let mut call_stack = Vec::new();
        self.populate_dirty_list_inner(id, &mut call_stack, &mut list);
        list
    }

    fn populate_dirty_list_inner(
        &self,
        id: WidgetId,
        call_stack: &mut Vec<WidgetId>,
        list: &mut Vec<Vec<WidgetId>>,
    ) {
        let Some(node) = self.node(id) else {
            return;
        };
        let base = &node.base;
        let wants_paint = base.is_dirty() || base.needs_redraw();
        match base.visibility() {
            Visibility::Invisible => return,
            Visibility::Hidden if !wants_paint => return,
            _ => {}
        }
        if base.drawing_action() == DrawingAction::NotDrawn {
            return;
        }

        call_stack.push(id);
        if wants_paint {
            list.push(call_stack.clone());
        } else {
            for &child in &node.children {
                self.populate_dirty_list_inner(child, call_stack, list);
            }
        }
        call_stack.pop();
    }

    /// Mark every visible leaf overlapping `rect` for redraw.
    pub fn dirty_under_rect(&mut self, id: WidgetId, rect: Rect) {
        if !self.is_visible(id) {
            return;
        }
        let children = self.get_children(id);
        if children.is_empty() {
            if let Some(base) = self.base_mut(id) {
                if base.rect().intersects(&rect) {
                    base.set_redraw();
                }
            }
            return;
        }
        for child in children {
            self.dirty_under_rect(child, rect);
        }
    }

    /// Deepest visible widget whose clip contains the point.
    ///
    /// Floating children are tried first, then the rest from topmost to
    /// bottommost.
    pub fn find_at(&self, id: WidgetId, x: i32, y: i32) -> Option<WidgetId> {
        let node = self.node(id)?;
        if node.base.visibility() != Visibility::Visible || !node.base.clip().contains(x, y) {
            return None;
        }
        let (floating, regular): (Vec<WidgetId>, Vec<WidgetId>) = node
            .children
            .iter()
            .partition(|&&c| self.base(c).map(|b| b.is_floating()).unwrap_or(false));
        floating
            .iter()
            .chain(regular.iter().rev())
            .find_map(|&child| self.find_at(child, x, y))
            .or(Some(id))
    }

    /// Reset dirty and redraw on the whole subtree after a paint.
    pub fn clear_draw_flags(&mut self, id: WidgetId) {
        if let Some(base) = self.base_mut(id) {
            base.clear_draw_flags();
        }
        for child in self.descendants(id) {
            if let Some(base) = self.base_mut(child) {
                base.clear_draw_flags();
            }
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockWidget {
        best: Size,
    }

    impl MockWidget {
        fn new() -> Self {
            Self {
                best: Size::new(10, 10),
            }
        }
    }

    impl Widget for MockWidget {
        fn kind(&self) -> WidgetKind {
            WidgetKind::Spacer
        }

        fn best_size(&self, _tree: &Tree, _id: WidgetId) -> Size {
            self.best
        }
    }

    fn placed(tree: &mut Tree, parent: Option<WidgetId>, rect: Rect) -> WidgetId {
        let id = tree.register(Box::new(MockWidget::new()));
        if let Some(parent) = parent {
            tree.set_parent(id, parent);
        }
        tree.place_base(id, rect.origin(), rect.size());
        id
    }

    #[test]
    fn test_tree_register_unregister() {
        let mut tree = Tree::new();
        let id = tree.register(Box::new(MockWidget::new()));
        assert!(tree.contains(id));

        assert!(tree.unregister(id).is_some());
        assert!(!tree.contains(id));
        assert!(tree.unregister(id).is_none());
    }

    #[test]
    fn test_tree_generational_index() {
        let mut tree = Tree::new();
        let id1 = tree.register(Box::new(MockWidget::new()));
        tree.unregister(id1);
        let id2 = tree.register(Box::new(MockWidget::new()));

        assert!(!tree.contains(id1));
        assert!(tree.contains(id2));
        assert_eq!(id1.index, id2.index);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn test_tree_swap_remove_fixup() {
        let mut tree = Tree::new();
        let id1 = tree.register(Box::new(MockWidget::new()));
        let id2 = tree.register(Box::new(MockWidget::new()));
        let id3 = tree.register(Box::new(MockWidget::new()));

        tree.unregister(id1);

        assert!(!tree.contains(id1));
        assert!(tree.with_widget(id2, |_| ()).is_some());
        assert!(tree.with_widget(id3, |_| ()).is_some());
    }

    #[test]
    fn test_tree_parent_child() {
        let mut tree = Tree::new();
        let parent_id = tree.register(Box::new(MockWidget::new()));
        let child_id = tree.register(Box::new(MockWidget::new()));

        tree.set_parent(child_id, parent_id);

        assert_eq!(tree.get_parent(child_id), Some(parent_id));
        assert_eq!(tree.get_children(parent_id), vec![child_id]);
    }

    #[test]
    fn test_tree_reparent_and_order() {
        let mut tree = Tree::new();
        let a = tree.register(Box::new(MockWidget::new()));
        let b = tree.register(Box::new(MockWidget::new()));
        let c1 = tree.register(Box::new(MockWidget::new()));
        let c2 = tree.register(Box::new(MockWidget::new()));
        tree.set_parent(c1, a);
        tree.set_parent(c2, a);

        tree.reparent(c1, b);
        assert_eq!(tree.get_children(a), vec![c2]);
        assert_eq!(tree.get_children(b), vec![c1]);
        assert_eq!(tree.get_parent(c1), Some(b));

        tree.insert_child(b, c2, Some(0));
        assert_eq!(tree.get_children(b), vec![c2, c1]);
        tree.set_children_order(b, vec![c1, c2]);
        assert_eq!(tree.get_children(b), vec![c1, c2]);
    }

    #[test]
    fn test_tree_children_order_keeps_unlisted() {
        let mut tree = Tree::new();
        let a = tree.register(Box::new(MockWidget::new()));
        let c1 = tree.register(Box::new(MockWidget::new()));
        let bar = tree.register(Box::new(MockWidget::new()));
        let c2 = tree.register(Box::new(MockWidget::new()));
        tree.set_parent(c1, a);
        tree.set_parent(bar, a);
        tree.set_parent(c2, a);

        tree.set_children_order(a, vec![c2, c1]);
        assert_eq!(tree.get_children(a), vec![c2, c1, bar]);
    }

    #[test]
    #[should_panic(expected = "stranger or a duplicate")]
    fn test_tree_children_order_rejects_strangers() {
        let mut tree = Tree::new();
        let a = tree.register(Box::new(MockWidget::new()));
        let c = tree.register(Box::new(MockWidget::new()));
        tree.set_parent(c, a);
        tree.set_children_order(a, vec![c, c]);
    }

    #[test]
    fn test_tree_descendants_preorder() {
        let mut tree = Tree::new();
        let root = tree.register(Box::new(MockWidget::new()));
        let a = tree.register(Box::new(MockWidget::new()));
        let a1 = tree.register(Box::new(MockWidget::new()));
        let b = tree.register(Box::new(MockWidget::new()));
        tree.set_parent(a, root);
        tree.set_parent(a1, a);
        tree.set_parent(b, root);

        assert_eq!(tree.descendants(root), vec![a, a1, b]);
        assert_eq!(tree.ancestors(a1), vec![a, root]);
        assert!(tree.is_ancestor(root, a1));
    }

    #[test]
    fn test_tree_dirty_propagation() {
        let mut tree = Tree::new();
        let root_id = tree.register(Box::new(MockWidget::new()));
        let child_id = tree.register(Box::new(MockWidget::new()));
        let grandchild_id = tree.register(Box::new(MockWidget::new()));
        tree.set_parent(child_id, root_id);
        tree.set_parent(grandchild_id, child_id);

        tree.mark_needs_layout(grandchild_id);

        assert!(tree.needs_layout(grandchild_id));
        assert!(tree.needs_layout(child_id));
        assert!(tree.needs_layout(root_id));
        assert!(tree.take_layout_roots().contains(&root_id));
    }

    #[test]
    fn test_tree_relayout_boundary_stops_propagation() {
        let mut tree = Tree::new();
        let root_id = tree.register(Box::new(MockWidget::new()));
        let boundary_id = tree.register(Box::new(MockWidget::new()));
        let leaf_id = tree.register(Box::new(MockWidget::new()));
        tree.set_parent(boundary_id, root_id);
        tree.set_parent(leaf_id, boundary_id);
        tree.set_relayout_boundary(boundary_id, true);

        tree.mark_needs_layout(leaf_id);

        assert!(tree.needs_layout(boundary_id));
        assert!(!tree.needs_layout(root_id));
        let roots = tree.take_layout_roots();
        assert_eq!(roots, vec![boundary_id]);

        tree.clear_needs_layout(boundary_id);
        assert!(!tree.needs_layout(leaf_id));
    }

    #[test]
    fn test_tree_best_size_fix_override() {
        let mut tree = Tree::new();
        let id = tree.register(Box::new(MockWidget::new()));
        assert_eq!(tree.best_size(id), Size::new(10, 10));
        tree.set_fix_size(id, Some(Size::new(3, 4)));
        assert_eq!(tree.best_size(id), Size::new(3, 4));
    }

    #[test]
    fn test_tree_takes_space() {
        let mut tree = Tree::new();
        let id = tree.register(Box::new(MockWidget::new()));
        assert!(tree.takes_space(id));
        tree.set_visible(id, Visibility::Hidden);
        assert!(tree.takes_space(id));
        assert!(tree.set_visible(id, Visibility::Invisible));
        assert!(!tree.takes_space(id));
        tree.set_visible(id, Visibility::Visible);
        tree.base_mut(id).unwrap().set_floating(true);
        assert!(!tree.takes_space(id));
    }

    #[test]
    fn test_tree_set_origin_shifts_subtree() {
        let mut tree = Tree::new();
        let root = placed(&mut tree, None, Rect::new(0, 0, 100, 100));
        let child = placed(&mut tree, Some(root), Rect::new(10, 10, 20, 20));
        let float = placed(&mut tree, Some(root), Rect::new(90, 0, 10, 100));
        tree.base_mut(float).unwrap().set_floating(true);

        tree.set_origin(root, Point::new(5, -7));

        assert_eq!(tree.rect(root).origin(), Point::new(5, -7));
        assert_eq!(tree.rect(child).origin(), Point::new(15, 3));
        assert_eq!(tree.rect(float).origin(), Point::new(90, 0));
        assert!(tree.base(child).unwrap().needs_redraw());
    }

    #[test]
    fn test_tree_visible_area_clips_children() {
        let mut tree = Tree::new();
        let root = placed(&mut tree, None, Rect::new(0, 0, 50, 50));
        tree.base_mut(root).unwrap().set_clips_children(true);
        let child = placed(&mut tree, Some(root), Rect::new(40, 0, 20, 10));

        tree.set_visible_area(root, Rect::new(0, 0, 1000, 1000));

        let base = tree.base(child).unwrap();
        assert_eq!(base.clip(), Rect::new(40, 0, 10, 10));
        assert_eq!(base.drawing_action(), DrawingAction::PartlyDrawn);
    }

    #[test]
    fn test_tree_populate_dirty_list() {
        let mut tree = Tree::new();
        let root = placed(&mut tree, None, Rect::new(0, 0, 100, 100));
        let a = placed(&mut tree, Some(root), Rect::new(0, 0, 100, 50));
        let b = placed(&mut tree, Some(root), Rect::new(0, 50, 100, 50));
        let hidden = placed(&mut tree, Some(root), Rect::new(0, 0, 10, 10));
        tree.set_visible_area(root, Rect::new(0, 0, 100, 100));
        tree.set_visible(hidden, Visibility::Invisible);
        tree.clear_draw_flags(root);

        assert!(tree.populate_dirty_list(root).is_empty());

        tree.set_dirty(b);
        tree.set_dirty(hidden);
        assert_eq!(tree.populate_dirty_list(root), vec![vec![root, b]]);

        tree.set_dirty(root);
        assert_eq!(tree.populate_dirty_list(root), vec![vec![root]]);
        let _ = a;
    }

    #[test]
    fn test_tree_dirty_under_rect() {
        let mut tree = Tree::new();
        let root = placed(&mut tree, None, Rect::new(0, 0, 100, 100));
        let a = placed(&mut tree, Some(root), Rect::new(0, 0, 100, 50));
        let b = placed(&mut tree, Some(root), Rect::new(0, 50, 100, 50));
        tree.clear_draw_flags(root);

        tree.dirty_under_rect(root, Rect::new(0, 60, 10, 10));

        assert!(!tree.base(a).unwrap().needs_redraw());
        assert!(tree.base(b).unwrap().needs_redraw());
    }

    #[test]
    fn test_tree_find_at() {
        let mut tree = Tree::new();
        let root = placed(&mut tree, None, Rect::new(0, 0, 100, 100));
        let a = placed(&mut tree, Some(root), Rect::new(0, 0, 100, 50));
        let float = placed(&mut tree, Some(a), Rect::new(90, 0, 10, 50));
        tree.base_mut(float).unwrap().set_floating(true);
        let under = placed(&mut tree, Some(a), Rect::new(80, 0, 20, 50));
        tree.set_visible_area(root, Rect::new(0, 0, 100, 100));

        assert_eq!(tree.find_at(root, 95, 10), Some(float));
        assert_eq!(tree.find_at(root, 85, 10), Some(under));
        assert_eq!(tree.find_at(root, 5, 10), Some(a));
        assert_eq!(tree.find_at(root, 5, 70), Some(root));
        assert_eq!(tree.find_at(root, 500, 70), None);
    }

    #[test]
    fn test_tree_take_restore_widget() {
        let mut tree = Tree::new();
        let id = tree.register(Box::new(MockWidget::new()));
        let widget = tree.take_widget(id).unwrap();
        assert_eq!(tree.kind(id), Some(WidgetKind::Placeholder));
        tree.restore_widget(id, widget);
        assert_eq!(tree.kind(id), Some(WidgetKind::Spacer));
        assert!(tree.downcast_ref::<MockWidget>(id).is_some());
    }
}
