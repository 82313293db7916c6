//! Row templates and the toggle panel used as a list or tree row.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::layout::{stack_best_size, stack_children, Axis, Point, Size};
use crate::renderer::{Canvas, TextMetrics};
use crate::tree::{Tree, WidgetId};
use crate::window::Window;

use super::label::Label;
use super::widget::{Color, Widget, WidgetKind};

const SELECTED_COLOR: Color = Color::rgba(0.2, 0.4, 0.9, 0.35);

/// One named cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberTemplate {
    pub name: String,
    /// Fixed cell width; measured from the text when unset
    pub width: Option<i32>,
    pub color: Color,
}

impl MemberTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: None,
            color: Color::BLACK,
        }
    }

    pub fn width(mut self, width: i32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Already resolved description of a row's cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTemplate {
    pub members: Vec<MemberTemplate>,
    pub padding: i32,
    pub min_height: i32,
    /// Height assumed for rows never measured
    pub estimated_height: Option<i32>,
}

impl RowTemplate {
    pub fn new(members: Vec<MemberTemplate>) -> Self {
        Self {
            members,
            padding: 2,
            min_height: 0,
            estimated_height: None,
        }
    }

    pub fn padding(mut self, padding: i32) -> Self {
        self.padding = padding;
        self
    }

    pub fn min_height(mut self, height: i32) -> Self {
        self.min_height = height;
        self
    }

    pub fn estimated_height(mut self, height: i32) -> Self {
        self.estimated_height = Some(height);
        self
    }

    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    /// Height of a row that was never materialized.
    pub fn estimate(&self, metrics: &dyn TextMetrics) -> i32 {
        self.estimated_height
            .unwrap_or_else(|| (metrics.measure("").height + 2 * self.padding).max(self.min_height))
    }

    /// Cell values for `data`. An empty key sets every cell first, then
    /// named keys override their own cell; unknown names are ignored.
    pub fn resolve(&self, data: &RowData) -> Vec<String> {
        let mut values = vec![String::new(); self.members.len()];
        if let Some(all) = data.members.get("") {
            values.iter_mut().for_each(|v| v.clone_from(all));
        }
        for (key, value) in data.members.iter().filter(|(k, _)| !k.is_empty()) {
            match self.member_index(key) {
                Some(index) => values[index].clone_from(value),
                None => log::debug!("row data names unknown member `{}`", key),
            }
        }
        values
    }
}

/// Per-row member values keyed by member name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowData {
    pub members: BTreeMap<String, String>,
    pub cookie: u64,
}

impl RowData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for every member.
    pub fn broadcast(value: impl Into<String>) -> Self {
        Self::new().with("", value)
    }

    pub fn with(mut self, member: impl Into<String>, value: impl Into<String>) -> Self {
        self.members.insert(member.into(), value.into());
        self
    }

    pub fn cookie(mut self, cookie: u64) -> Self {
        self.cookie = cookie;
        self
    }
}

/// A selectable row whose member labels exist only while materialized.
pub struct ToggledPanel {
    template: Rc<RowTemplate>,
    values: Vec<String>,
    cookie: u64,
    selected: bool,
    active: bool,
    indent: i32,
    members: Vec<WidgetId>,
    materialized: bool,
    /// Height measured when the members were last released
    gc_height: Option<i32>,
    estimated_height: i32,
}

impl ToggledPanel {
    pub fn new(template: Rc<RowTemplate>, data: &RowData) -> Self {
        let values = template.resolve(data);
        Self {
            template,
            values,
            cookie: data.cookie,
            selected: false,
            active: true,
            indent: 0,
            members: Vec::new(),
            materialized: false,
            gc_height: None,
            estimated_height: 0,
        }
    }

    pub fn cookie(&self) -> u64 {
        self.cookie
    }

    pub fn value(&self, member: &str) -> Option<&str> {
        let index = self.template.member_index(member)?;
        self.values.get(index).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn indent(&self) -> i32 {
        self.indent
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    pub fn gc_height(&self) -> Option<i32> {
        self.gc_height
    }

    pub fn set_selected(&mut self, win: &mut Window, id: WidgetId, selected: bool) {
        if self.selected != selected {
            self.selected = selected;
            win.tree_mut().set_dirty(id);
        }
    }

    pub fn set_active(&mut self, win: &mut Window, id: WidgetId, active: bool) {
        if self.active != active {
            self.active = active;
            win.tree_mut().set_dirty(id);
        }
    }

    pub(crate) fn set_indent(&mut self, indent: i32) {
        self.indent = indent;
    }

    pub fn set_value(&mut self, win: &mut Window, id: WidgetId, member: &str, text: &str) -> bool {
        let Some(index) = self.template.member_index(member) else {
            return false;
        };
        self.values[index] = text.to_string();
        if let Some(&label) = self.members.get(index) {
            win.with::<Label, _>(label, |widget, win| widget.set_text(win, label, text));
        }
        win.tree_mut().set_dirty(id);
        true
    }

    /// Create the member labels.
    pub(crate) fn materialize(&mut self, win: &mut Window, id: WidgetId) {
        if self.is_materialized() {
            return;
        }
        let template = Rc::clone(&self.template);
        for (member, value) in template.members.iter().zip(&self.values) {
            let label = Label::new(value.as_str())
                .padding(template.padding)
                .color(member.color);
            let label = win.add(id, label);
            if let Some(width) = member.width {
                let height = win.tree().best_size(label).height;
                win.tree_mut().set_fix_size(label, Some(Size::new(width, height)));
            }
            self.members.push(label);
        }
        self.materialized = true;
    }

    /// Destroy the member labels, remembering the measured height.
    pub(crate) fn release(&mut self, win: &mut Window, id: WidgetId) {
        if !self.is_materialized() {
            return;
        }
        self.gc_height = Some(self.best_size(win.tree(), id).height);
        for label in std::mem::take(&mut self.members) {
            win.destroy(label);
        }
        self.materialized = false;
    }
}

impl Widget for ToggledPanel {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Panel
    }

    fn best_size(&self, tree: &Tree, id: WidgetId) -> Size {
        if !self.materialized {
            let height = self.gc_height.unwrap_or(self.estimated_height);
            return Size::new(self.indent, height);
        }
        let cells = stack_best_size(tree, &self.members, Axis::Horizontal, 0);
        Size::new(
            cells.width + self.indent,
            cells.height.max(self.template.min_height),
        )
    }

    fn register_children(&mut self, win: &mut Window, _id: WidgetId) {
        self.estimated_height = self.template.estimate(win.settings().metrics.as_ref());
    }

    fn place(&mut self, win: &mut Window, id: WidgetId, origin: Point, size: Size) {
        win.tree_mut().place_base(id, origin, size);
        let rect = win.tree().rect(id);
        let inner = Size::new((rect.width - self.indent).max(0), rect.height);
        stack_children(
            win,
            &self.members,
            Axis::Horizontal,
            rect.origin().offset(self.indent, 0),
            inner,
            0,
        );
    }

    fn draw_background(&self, tree: &Tree, id: WidgetId, canvas: &mut dyn Canvas) {
        if self.selected {
            canvas.fill_rect(tree.rect(id), SELECTED_COLOR);
        }
    }
}

super::impl_widget_type!(ToggledPanel, WidgetKind::Panel);
