//! Layout strategies and the primitives they are built from.
//!
//! A layout pass hands the strategy a [`LayoutHelper`] describing the viewport and an anchor.
//! The strategy asks for children by index (which attaches and measures them as needed) and
//! places each one it wants to keep. Children it never places are recycled after the pass.

mod grid;
mod linear;
mod masonry;

pub use grid::GridLayout;
pub use linear::LinearLayout;
pub use masonry::MasonryLayout;

use crate::list_view::Window;
use crate::{LayoutError, ListItem, SavedScroll, Size};

/// Places children for one layout pass.
pub trait Layout<P> {
    fn layout(&self, helper: &mut LayoutHelper<'_, P>) -> Result<(), LayoutError>;
}

impl<P, F> Layout<P> for F
where
    F: Fn(&mut LayoutHelper<'_, P>) -> Result<(), LayoutError>,
{
    fn layout(&self, helper: &mut LayoutHelper<'_, P>) -> Result<(), LayoutError> {
        self(helper)
    }
}

/// A measured child, as seen by a layout strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildHandle {
    pub index: usize,
    pub width: f32,
    pub height: f32,
}

/// The state a layout strategy works with.
pub struct LayoutHelper<'a, P> {
    window: &'a mut Window<P>,
    /// Viewport width.
    pub width: f32,
    /// Viewport height.
    pub height: f32,
    /// Current scroll offset.
    pub offset_y: f32,
    pub buffer_size: f32,
    pub max_children_to_layout: usize,
    pub item_count: usize,
    /// Where to start: the item at `anchor.index` goes at canvas position `anchor.offset_y`.
    pub anchor: SavedScroll,
}

impl<'a, P> LayoutHelper<'a, P> {
    pub(crate) fn new(
        window: &'a mut Window<P>,
        viewport: Size,
        offset_y: f32,
        buffer_size: f32,
        max_children_to_layout: usize,
        anchor: SavedScroll,
    ) -> Self {
        let item_count = window.items().len();
        Self {
            window,
            width: viewport.width,
            height: viewport.height,
            offset_y,
            buffer_size,
            max_children_to_layout,
            item_count,
            anchor,
        }
    }

    pub fn item(&self, index: usize) -> Option<&ListItem<P>> {
        self.window.items().get(index)
    }

    /// Forward fills may stop once a child starts below this line.
    pub fn fill_bottom(&self) -> f32 {
        self.offset_y + self.height + self.buffer_size
    }

    /// Backward fills may stop once a child starts above this line.
    pub fn fill_top(&self) -> f32 {
        self.offset_y - self.buffer_size
    }

    /// The child for `index`, bound and measured without a width constraint.
    pub fn child(&mut self, index: usize) -> Result<ChildHandle, LayoutError> {
        self.window.child(index, None)
    }

    /// The child for `index`, measured at `width`. A different width than last time
    /// re-measures the child.
    pub fn child_with_width(&mut self, index: usize, width: f32) -> Result<ChildHandle, LayoutError> {
        self.window.child(index, Some(width))
    }

    /// Places a child and keeps it attached. Returns `false` once the pass hit
    /// `max_children_to_layout`; strategies should stop then.
    pub fn layout_child(&mut self, child: ChildHandle, left: f32, top: f32) -> bool {
        self.window.layout_child(child, left, top)
    }
}
