use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use crate::layout::{ChildHandle, Layout, LayoutHelper, LinearLayout};
use crate::{
    Edit, LayoutError, ListItem, ListViewOptions, SavedScroll, Size, Update, View, ViewRecycler,
    ViewRegistry,
};

/// Lifecycle of an attached child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildState {
    /// Its item changed; the view still shows the old payload.
    Stale,
    /// Bound to its item but not measured since.
    Bound,
    /// Bound and measured.
    Measured,
}

/// A render object currently attached to the list, showing the item at `index`.
pub struct Child<P> {
    view: View<P>,
    index: usize,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    width_constraint: Option<f32>,
    dirty: bool,
    state: ChildState,
}

impl<P> Child<P> {
    pub fn view(&self) -> &View<P> {
        &self.view
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Whether the child changed (rebind or resize) since a layout pass last placed it.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn state(&self) -> ChildState {
        self.state
    }

    fn set_position(&mut self, left: f32, top: f32) {
        if self.left != left || self.top != top {
            self.left = left;
            self.top = top;
            self.view.place(left, top);
        }
    }
}

impl<P> core::fmt::Debug for Child<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Child")
            .field("view_type", self.view.view_type())
            .field("index", &self.index)
            .field("left", &self.left)
            .field("top", &self.top)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .field("state", &self.state)
            .finish()
    }
}

/// The items, the attached children (sorted by index) and the pool they recycle into.
pub(crate) struct Window<P> {
    items: Arc<[ListItem<P>]>,
    children: Vec<Child<P>>,
    recycler: ViewRecycler<P>,
    kept: Vec<usize>,
    max_children: usize,
}

impl<P> Window<P> {
    pub(crate) fn new(recycler: ViewRecycler<P>, max_children: usize) -> Self {
        Self {
            items: Arc::from(Vec::new()),
            children: Vec::new(),
            recycler,
            kept: Vec::new(),
            max_children: max_children.max(1),
        }
    }

    pub(crate) fn items(&self) -> &[ListItem<P>] {
        &self.items
    }

    pub(crate) fn set_items(&mut self, items: Arc<[ListItem<P>]>) {
        self.items = items;
    }

    pub(crate) fn children(&self) -> &[Child<P>] {
        &self.children
    }

    fn slot(&self, index: usize) -> Result<usize, usize> {
        self.children.binary_search_by_key(&index, |child| child.index)
    }

    fn find_mut(&mut self, index: usize) -> Option<&mut Child<P>> {
        let slot = self.slot(index).ok()?;
        Some(&mut self.children[slot])
    }

    /// Returns the child for `index`, attaching, binding and measuring it when needed.
    pub(crate) fn child(
        &mut self,
        index: usize,
        width: Option<f32>,
    ) -> Result<ChildHandle, LayoutError> {
        let count = self.items.len();
        let Some(item) = self.items.get(index) else {
            return Err(LayoutError::ChildOutOfRange { index, count });
        };

        let slot = match self.slot(index) {
            Ok(slot) => slot,
            Err(slot) => {
                let mut view = self.recycler.get(&item.view_type)?;
                view.attach();
                view.bind_values(item);
                self.children.insert(
                    slot,
                    Child {
                        view,
                        index,
                        // not placed yet
                        left: f32::NAN,
                        top: f32::NAN,
                        width: 0.0,
                        height: 0.0,
                        width_constraint: width,
                        dirty: true,
                        state: ChildState::Bound,
                    },
                );
                slot
            }
        };

        let child = &mut self.children[slot];
        if child.state == ChildState::Stale {
            child.view.bind_values(item);
            child.state = ChildState::Bound;
        }
        if child.state == ChildState::Bound || child.width_constraint != width {
            let size = child.view.measure(width);
            if size.is_empty() {
                lwarn!(index, width = size.width, height = size.height, "child measured empty");
            }
            child.width = size.width;
            child.height = size.height;
            child.width_constraint = width;
            child.state = ChildState::Measured;
        }

        Ok(ChildHandle {
            index,
            width: child.width,
            height: child.height,
        })
    }

    /// Positions a child and marks it as kept for this pass. Returns `false` once the pass
    /// has reached its children cap.
    pub(crate) fn layout_child(&mut self, handle: ChildHandle, left: f32, top: f32) -> bool {
        if let Ok(slot) = self.slot(handle.index) {
            let child = &mut self.children[slot];
            child.set_position(left, top);
            child.dirty = false;
            if !self.kept.contains(&handle.index) {
                self.kept.push(handle.index);
            }
        }
        self.kept.len() < self.max_children
    }

    fn recycle(&mut self, mut child: Child<P>) {
        child.view.detach();
        self.recycler.cache(child.view);
    }

    fn recycle_all(&mut self) {
        for child in mem::take(&mut self.children) {
            self.recycle(child);
        }
    }

    fn recycle_untouched(&mut self) {
        let kept = mem::take(&mut self.kept);
        for child in mem::take(&mut self.children) {
            if kept.contains(&child.index) {
                self.children.push(child);
            } else {
                self.recycle(child);
            }
        }
        self.kept = kept;
    }
}

/// Moves `index` along with one edit. An index whose item was removed sticks to the position
/// of the removed range.
fn shift_index(index: usize, edit: &Edit) -> usize {
    match *edit {
        Edit::Insert { position, count } if index >= position => index + count,
        Edit::Remove { position, count } if index >= position + count => index - count,
        Edit::Remove { position, .. } if index >= position => position,
        Edit::Move { from, to } => {
            if index == from {
                return to;
            }
            let index = if index > from { index - 1 } else { index };
            if index >= to { index + 1 } else { index }
        }
        _ => index,
    }
}

/// A virtualized list: attaches render objects only for the items in and around the viewport.
///
/// The list view is headless. The host feeds it updates, viewport sizes, scroll offsets and
/// child resizes, and reads back the scroll offset (which layout passes may correct), the
/// canvas height and the attached children.
pub struct ListView<P> {
    options: ListViewOptions,
    layout: Box<dyn Layout<P>>,
    window: Window<P>,
    viewport: Size,
    offset_y: f32,
    canvas_height: f32,
    first_layout: bool,
    fallback_anchor: Option<SavedScroll>,
    saved_scroll: Option<SavedScroll>,
    layout_pending: bool,
    layout_passes: u64,
    disposed: bool,
}

impl<P> ListView<P> {
    pub fn new(registry: ViewRegistry<P>, options: ListViewOptions) -> Self {
        ldebug!(
            buffer_size = options.buffer_size,
            max_children_to_layout = options.max_children_to_layout,
            per_view_type_cache_size = options.per_view_type_cache_size,
            "ListView::new"
        );
        Self {
            layout: Box::new(LinearLayout),
            window: Window::new(
                ViewRecycler::new(registry, options.per_view_type_cache_size),
                options.max_children_to_layout,
            ),
            options,
            viewport: Size::ZERO,
            offset_y: 0.0,
            canvas_height: 0.0,
            first_layout: true,
            fallback_anchor: None,
            saved_scroll: None,
            layout_pending: false,
            layout_passes: 0,
            disposed: false,
        }
    }

    /// Replaces the default [`LinearLayout`].
    pub fn with_layout(mut self, layout: impl Layout<P> + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    /// Swaps the layout strategy. Takes effect on the next layout pass.
    pub fn set_layout(&mut self, layout: impl Layout<P> + 'static) {
        self.layout = Box::new(layout);
        self.layout_pending = true;
    }

    pub fn options(&self) -> &ListViewOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ListViewOptions) {
        self.window
            .recycler
            .set_per_view_type_cache_size(options.per_view_type_cache_size);
        self.window.max_children = options.max_children_to_layout.max(1);
        self.options = options;
        self.layout_pending = true;
    }

    pub fn items(&self) -> &Arc<[ListItem<P>]> {
        &self.window.items
    }

    /// The attached children, sorted by index.
    pub fn children(&self) -> &[Child<P>] {
        &self.window.children
    }

    pub fn child(&self, index: usize) -> Option<&Child<P>> {
        let slot = self.window.slot(index).ok()?;
        self.window.children.get(slot)
    }

    pub fn recycler(&self) -> &ViewRecycler<P> {
        &self.window.recycler
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// The scroll offset after the last layout pass. Hosts should apply it to their scroll
    /// container, as passes may shift it to keep content stable.
    pub fn scroll_offset(&self) -> f32 {
        self.offset_y
    }

    /// Height of the scrollable canvas: exact once the last item is attached, estimated
    /// before that.
    pub fn canvas_height(&self) -> f32 {
        self.canvas_height
    }

    /// The anchor reported by the last layout pass.
    pub fn saved_scroll(&self) -> Option<SavedScroll> {
        self.saved_scroll
    }

    /// Number of layout passes that ran to completion.
    pub fn layout_passes(&self) -> u64 {
        self.layout_passes
    }

    pub fn is_layout_pending(&self) -> bool {
        self.layout_pending
    }

    /// Shows `items`, rebinding children whose view type still matches.
    pub fn set_items(&mut self, items: impl Into<Arc<[ListItem<P>]>>) -> Result<(), LayoutError> {
        self.apply_update(Update::Full {
            items: items.into(),
        })
    }

    /// Applies one update of an [`crate::UpdateStream`] and runs a layout pass.
    pub fn apply_update(&mut self, update: Update<ListItem<P>>) -> Result<(), LayoutError> {
        if self.disposed {
            return Ok(());
        }

        match update {
            Update::Full { items } => self.apply_full(items),
            Update::Incremental {
                items,
                previous,
                edits,
            } => {
                if !Arc::ptr_eq(&previous, &self.window.items) && !previous.is_empty() {
                    // the edits are relative to a list we never showed
                    ldebug!(edits = edits.len(), "ListView::apply_update unrelated previous");
                    self.apply_full(items);
                } else if items.is_empty()
                    || previous.is_empty()
                    || self.window.children.is_empty()
                {
                    self.window.recycle_all();
                    self.window.items = items;
                } else {
                    ldebug!(edits = edits.len(), "ListView::apply_update incremental");
                    self.window.items = items;
                    self.apply_edits(&edits);
                }
            }
        }

        self.relayout()
    }

    fn apply_full(&mut self, items: Arc<[ListItem<P>]>) {
        ldebug!(len = items.len(), "ListView::apply_update full");
        for mut child in mem::take(&mut self.window.children) {
            match items.get(child.index) {
                Some(item) if item.view_type == *child.view.view_type() => {
                    child.view.bind_values(item);
                    child.state = ChildState::Bound;
                    child.dirty = true;
                    self.window.children.push(child);
                }
                _ => self.window.recycle(child),
            }
        }
        self.window.items = items;
    }

    fn apply_edits(&mut self, edits: &[Edit]) {
        for edit in edits {
            if let Some(anchor) = &mut self.fallback_anchor {
                anchor.index = shift_index(anchor.index, edit);
            }

            match *edit {
                Edit::Insert { position, count } => {
                    for child in &mut self.window.children {
                        if child.index >= position {
                            child.index += count;
                        }
                    }
                }
                Edit::Remove { position, count } => {
                    let end = position + count;
                    for mut child in mem::take(&mut self.window.children) {
                        if child.index < position {
                            self.window.children.push(child);
                        } else if child.index < end {
                            self.window.recycle(child);
                        } else {
                            child.index -= count;
                            self.window.children.push(child);
                        }
                    }
                }
                Edit::Change { position, count } => {
                    for child in &mut self.window.children {
                        if child.index >= position && child.index < position + count {
                            child.state = ChildState::Stale;
                            child.dirty = true;
                        }
                    }
                }
                Edit::Move { from, to } => {
                    lwarn!(from, to, "move is not supported, recycling all children");
                    if self.fallback_anchor.is_none() {
                        self.fallback_anchor = self
                            .anchor_child()
                            .map(|child| SavedScroll::new(shift_index(child.index, edit), child.top));
                    }
                    self.window.recycle_all();
                }
            }
        }

        // rebind against the final list, now that every index has settled
        for mut child in mem::take(&mut self.window.children) {
            if child.state != ChildState::Stale {
                self.window.children.push(child);
                continue;
            }
            match self.window.items.get(child.index) {
                Some(item) if item.view_type == *child.view.view_type() => {
                    child.view.bind_values(item);
                    child.state = ChildState::Bound;
                    self.window.children.push(child);
                }
                _ => {
                    ltrace!(index = child.index, "ListView::apply_edits view type changed");
                    self.window.recycle(child);
                }
            }
        }
    }

    /// Records the viewport size and runs a layout pass if it changed.
    pub fn on_viewport_resize(&mut self, size: Size) -> Result<(), LayoutError> {
        if size == self.viewport && !self.layout_pending {
            return Ok(());
        }
        self.viewport = size;
        self.relayout()
    }

    /// Records a scroll offset coming from the host and runs a layout pass.
    pub fn on_scroll(&mut self, offset_y: f32) -> Result<(), LayoutError> {
        self.offset_y = offset_y.max(0.0);
        self.relayout()
    }

    /// Records a new size for the child at `index`.
    ///
    /// Returns `true` if the change exceeded the resize epsilon, in which case a layout pass is
    /// now pending (see [`Self::run_pending_layout`]).
    pub fn child_resized(&mut self, index: usize, size: Size) -> bool {
        let epsilon = self.options.resize_epsilon;
        let Some(child) = self.window.find_mut(index) else {
            return false;
        };
        if !size.differs_from(Size::new(child.width, child.height), epsilon) {
            return false;
        }
        if size.is_empty() {
            lwarn!(index, "child resized to zero");
        }
        ltrace!(
            index,
            from_width = child.width,
            from_height = child.height,
            to_width = size.width,
            to_height = size.height,
            "ListView::child_resized"
        );
        child.width = size.width;
        child.height = size.height;
        child.dirty = true;
        self.layout_pending = true;
        true
    }

    /// Applies a batch of resize notifications with at most one layout pass.
    ///
    /// Returns whether a pass ran.
    pub fn resize_observed(
        &mut self,
        entries: impl IntoIterator<Item = (usize, Size)>,
    ) -> Result<bool, LayoutError> {
        for (index, size) in entries {
            self.child_resized(index, size);
        }
        self.run_pending_layout()
    }

    /// Runs a layout pass if one is pending. Returns whether a pass ran.
    pub fn run_pending_layout(&mut self) -> Result<bool, LayoutError> {
        if !self.layout_pending {
            return Ok(false);
        }
        self.relayout()?;
        Ok(true)
    }

    /// Runs a layout pass now.
    pub fn relayout(&mut self) -> Result<(), LayoutError> {
        self.layout_pending = false;
        if self.disposed {
            return Ok(());
        }
        if self.viewport.height <= 0.0 {
            lwarn!("skip layout for zero height");
            return Ok(());
        }

        #[cfg(feature = "tracing")]
        let started = web_time::Instant::now();

        self.reset_scrolling();
        let anchor = self.anchor_scroll();

        self.window.kept.clear();
        let result = if self.window.items.is_empty() {
            Ok(())
        } else {
            let mut helper = LayoutHelper::new(
                &mut self.window,
                self.viewport,
                self.offset_y,
                self.options.buffer_size,
                self.options.max_children_to_layout,
                anchor,
            );
            self.layout.layout(&mut helper)
        };
        self.window.recycle_untouched();
        result?;

        self.fix_overflow();
        self.update_canvas_height();
        self.layout_passes += 1;
        self.report_scroll();

        #[cfg(feature = "tracing")]
        {
            let elapsed = started.elapsed();
            if elapsed >= web_time::Duration::from_millis(16) {
                ldebug!(
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    children = self.window.children.len(),
                    "[slow] ListView::relayout"
                );
            }
        }

        Ok(())
    }

    fn is_visible(&self, child: &Child<P>) -> bool {
        child.bottom() > self.offset_y && child.top < self.offset_y + self.viewport.height
    }

    // Someone scrolled past every attached child: jump back to the first one.
    fn reset_scrolling(&mut self) {
        if self.window.children.iter().any(|child| self.is_visible(child)) {
            return;
        }
        match self.window.children.first() {
            Some(child) => self.offset_y = child.top,
            None if self.fallback_anchor.is_some() => {}
            None => self.offset_y = 0.0,
        }
    }

    fn anchor_child(&self) -> Option<&Child<P>> {
        self.window
            .children
            .iter()
            .find(|child| child.top >= self.offset_y)
    }

    // The anchor's `offset_y` is an absolute top here, not relative to the viewport.
    fn anchor_scroll(&mut self) -> SavedScroll {
        let count = self.window.items.len();

        if self.first_layout {
            if count == 0 {
                return SavedScroll::TOP;
            }
            self.first_layout = false;
            return match self.options.initial_scroll {
                Some(initial) if initial.index < count => initial,
                _ => SavedScroll::TOP,
            };
        }

        if let Some(fallback) = self.fallback_anchor.take() {
            if fallback.index < count {
                return fallback;
            }
        }

        if self.offset_y == 0.0 {
            return SavedScroll::TOP;
        }

        self.anchor_child()
            .map(|child| SavedScroll::new(child.index, child.top))
            .unwrap_or(SavedScroll::TOP)
    }

    fn fix_overflow(&mut self) {
        let mut min: Option<&Child<P>> = None;
        for child in &self.window.children {
            if min.is_none_or(|m| child.top < m.top) {
                min = Some(child);
            }
        }
        let Some(min) = min else {
            return;
        };

        if (min.index == 0 && min.top > 0.0) || min.top < 0.0 {
            let delta = -min.top;
            ldebug!(delta, index = min.index, "ListView::fix_overflow");
            for child in &mut self.window.children {
                let (left, top) = (child.left, child.top + delta);
                child.set_position(left, top);
            }
            self.offset_y = (self.offset_y + delta).max(0.0);
        }
    }

    fn update_canvas_height(&mut self) {
        let mut max: Option<&Child<P>> = None;
        for child in &self.window.children {
            if max.is_none_or(|m| child.bottom() >= m.bottom()) {
                max = Some(child);
            }
        }
        let Some(max) = max else {
            self.canvas_height = 2.0 * self.viewport.height;
            return;
        };

        let count = self.window.items.len();
        if max.index + 1 == count {
            self.canvas_height = max.bottom();
        } else {
            let remaining = (count - max.index + 1) as f32;
            let estimate = max.bottom() + self.options.estimated_item_extent * remaining;
            self.canvas_height = self.canvas_height.max(estimate);
        }
    }

    fn report_scroll(&mut self) {
        let Some(child) = self.anchor_child() else {
            return;
        };
        let saved = SavedScroll::new(child.index, child.top - self.offset_y);
        if self.saved_scroll == Some(saved) {
            return;
        }
        self.saved_scroll = Some(saved);
        if let Some(on_scroll_changed) = &self.options.on_scroll_changed {
            on_scroll_changed(saved);
        }
    }

    /// Detaches and destroys every view, attached or pooled. The list view is inert afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        ldebug!(children = self.window.children.len(), "ListView::dispose");
        for mut child in mem::take(&mut self.window.children) {
            child.view.detach();
            child.view.destroy();
        }
        self.window.recycler.destroy_all();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<P> Drop for ListView<P> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<P> core::fmt::Debug for ListView<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListView")
            .field("options", &self.options)
            .field("items", &self.window.items.len())
            .field("children", &self.window.children)
            .field("viewport", &self.viewport)
            .field("offset_y", &self.offset_y)
            .field("canvas_height", &self.canvas_height)
            .field("saved_scroll", &self.saved_scroll)
            .field("layout_passes", &self.layout_passes)
            .finish_non_exhaustive()
    }
}
