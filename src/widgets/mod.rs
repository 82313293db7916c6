pub mod float;
pub mod label;
pub mod listbox;
pub mod panel;
pub mod scroll;
pub mod scroll_container;
pub mod scroll_panel;
pub mod scrollbar;
pub mod spacer;
pub mod stack;
pub mod text_box;
pub mod tree_view;
pub mod widget;

/// Implement [`WidgetType`](widget::WidgetType) so the widget can be looked
/// up by name through the window registry.
macro_rules! impl_widget_type {
    ($t:ty, $kind:expr) => {
        impl crate::widgets::widget::WidgetType for $t {
            const KIND: crate::widgets::widget::WidgetKind = $kind;
        }
    };
}
pub(crate) use impl_widget_type;

pub use float::FloatWidget;
pub use label::Label;
pub use listbox::{ListBox, ListObserver};
pub use panel::{MemberTemplate, RowData, RowTemplate, ToggledPanel};
pub use scroll::{Orientation, ScrollCommand, ScrollbarMode, ScrollbarState};
pub use scroll_container::{
    FloatingLease, FloatingScrollbars, PlainContent, ScrollContainer, ScrollContent,
};
pub use scroll_panel::ScrollPanel;
pub use scrollbar::Scrollbar;
pub use spacer::Spacer;
pub use stack::Stack;
pub use text_box::{Selection, TextBox, TextObserver};
pub use tree_view::{NodeId, TreeObserver, TreeView};
pub use widget::{
    Color, DrawingAction, Event, EventResponse, Key, Modifiers, MouseButton, Rect, ScrollSource,
    Visibility, Widget, WidgetBase, WidgetKind, WidgetType,
};
