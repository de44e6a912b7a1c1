use alloc::sync::Arc;

use crate::SavedScroll;

/// A callback fired after a layout pass that moved the scroll anchor.
pub type OnScrollChangedCallback = Arc<dyn Fn(SavedScroll) + Send + Sync>;

/// Configuration for [`crate::ListView`].
///
/// Cheap to clone: the callback is stored in an `Arc`, so hosts can tweak a field and call
/// `ListView::set_options` without rebuilding closures.
#[derive(Clone)]
pub struct ListViewOptions {
    /// Extra space, in layout units, filled with children above and below the viewport.
    pub buffer_size: f32,

    /// Upper bound on the number of children laid out (and thus attached) by one pass.
    pub max_children_to_layout: usize,

    /// Number of detached views kept around per view type.
    pub per_view_type_cache_size: usize,

    /// Where the first layout pass should put the viewport.
    ///
    /// Ignored when its index is not a valid item index at the time of the first pass.
    pub initial_scroll: Option<SavedScroll>,

    /// Height assumed for every item below the last attached child when estimating the
    /// canvas extent.
    pub estimated_item_extent: f32,

    /// Child size changes smaller than this are not considered a resize.
    pub resize_epsilon: f32,

    /// Receives the new anchor whenever a layout pass changes it.
    pub on_scroll_changed: Option<OnScrollChangedCallback>,
}

impl Default for ListViewOptions {
    fn default() -> Self {
        Self {
            buffer_size: 256.0,
            max_children_to_layout: 64,
            per_view_type_cache_size: 4,
            initial_scroll: None,
            estimated_item_extent: 100.0,
            resize_epsilon: 1.0,
            on_scroll_changed: None,
        }
    }
}

impl ListViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_size(mut self, buffer_size: f32) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_max_children_to_layout(mut self, max_children_to_layout: usize) -> Self {
        self.max_children_to_layout = max_children_to_layout.max(1);
        self
    }

    pub fn with_per_view_type_cache_size(mut self, per_view_type_cache_size: usize) -> Self {
        self.per_view_type_cache_size = per_view_type_cache_size;
        self
    }

    pub fn with_initial_scroll(mut self, initial_scroll: Option<SavedScroll>) -> Self {
        self.initial_scroll = initial_scroll;
        self
    }

    pub fn with_estimated_item_extent(mut self, estimated_item_extent: f32) -> Self {
        self.estimated_item_extent = estimated_item_extent;
        self
    }

    pub fn with_resize_epsilon(mut self, resize_epsilon: f32) -> Self {
        self.resize_epsilon = resize_epsilon;
        self
    }

    pub fn with_on_scroll_changed(
        mut self,
        on_scroll_changed: Option<impl Fn(SavedScroll) + Send + Sync + 'static>,
    ) -> Self {
        self.on_scroll_changed = on_scroll_changed.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for ListViewOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListViewOptions")
            .field("buffer_size", &self.buffer_size)
            .field("max_children_to_layout", &self.max_children_to_layout)
            .field("per_view_type_cache_size", &self.per_view_type_cache_size)
            .field("initial_scroll", &self.initial_scroll)
            .field("estimated_item_extent", &self.estimated_item_extent)
            .field("resize_epsilon", &self.resize_epsilon)
            .field("on_scroll_changed", &self.on_scroll_changed.is_some())
            .finish()
    }
}
