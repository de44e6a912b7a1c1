use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::Stream;
use listview::{LayoutError, ListItem, ListView, Size, UpdateStream};

use crate::{AdapterError, Fling, MemoryKey, ScrollMemory, VelocityTracker};

/// A framework-neutral controller that wraps a [`ListView`] and drives the parts of a list
/// that depend on time: drag momentum and the update stream.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_viewport_resize` / `on_scroll` when the host reports layout or scroll changes
/// - `on_pointer_down` / `on_drag` / `on_release` for touch or mouse drags
/// - `tick(now_ms)` every frame while [`Controller::is_flinging`] (and whenever child resizes
///   were reported, to run the pending layout pass)
/// - `poll_updates` from the host's task whenever the update stream wakes it
///
/// After each call the host should apply `list_view().scroll_offset()` to its scroll
/// container.
#[derive(Debug)]
pub struct Controller<P> {
    view: ListView<P>,
    tracker: VelocityTracker,
    fling: Option<Fling>,
    dragging: bool,
    decay: f32,
}

impl<P> Controller<P> {
    pub fn new(view: ListView<P>) -> Self {
        Self {
            view,
            tracker: VelocityTracker::new(),
            fling: None,
            dragging: false,
            decay: Fling::DEFAULT_DECAY,
        }
    }

    /// Per-millisecond velocity decay of flings started from now on.
    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay.clamp(0.0, 1.0);
        self
    }

    pub fn list_view(&self) -> &ListView<P> {
        &self.view
    }

    pub fn list_view_mut(&mut self) -> &mut ListView<P> {
        &mut self.view
    }

    pub fn into_list_view(self) -> ListView<P> {
        self.view
    }

    pub fn is_flinging(&self) -> bool {
        self.fling.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn cancel_fling(&mut self) {
        if self.fling.take().is_some() {
            atrace!("Controller::cancel_fling");
        }
    }

    fn max_scroll(&self) -> f32 {
        (self.view.canvas_height() - self.view.viewport().height).max(0.0)
    }

    pub fn on_viewport_resize(&mut self, size: Size) -> Result<(), LayoutError> {
        self.view.on_viewport_resize(size)
    }

    /// Call this when the host's scroll container reports a new offset.
    pub fn on_scroll(&mut self, offset_y: f32) -> Result<(), LayoutError> {
        self.view.on_scroll(offset_y)
    }

    /// A pointer went down on the list. Stops any fling and starts a fresh velocity estimate.
    pub fn on_pointer_down(&mut self, now_ms: u64) {
        self.cancel_fling();
        self.tracker.reset();
        self.tracker.record(0.0, now_ms);
        self.dragging = true;
    }

    /// The pointer moved by `delta_y`; the content follows it.
    ///
    /// Returns the new scroll offset.
    pub fn on_drag(&mut self, delta_y: f32, now_ms: u64) -> Result<f32, LayoutError> {
        if !self.dragging {
            self.on_pointer_down(now_ms);
        }
        self.tracker.record(delta_y, now_ms);
        let offset = (self.view.scroll_offset() - delta_y).clamp(0.0, self.max_scroll());
        self.view.on_scroll(offset)?;
        Ok(self.view.scroll_offset())
    }

    /// The pointer went up. Starts a fling if it was moving fast enough.
    ///
    /// Returns whether a fling started.
    pub fn on_release(&mut self, now_ms: u64) -> bool {
        if !self.dragging {
            return false;
        }
        self.dragging = false;

        // scrolling runs against the pointer
        let velocity = -self.tracker.velocity(now_ms);
        self.tracker.reset();

        let fling = Fling::new(self.view.scroll_offset(), velocity, now_ms)
            .with_decay(self.decay)
            .with_bounds(0.0, self.max_scroll());
        if fling.is_done() {
            return false;
        }
        adebug!(velocity, offset_y = fling.offset, "Controller::fling");
        self.fling = Some(fling);
        true
    }

    /// Advances the controller.
    ///
    /// - Runs the layout pass requested by child resizes, if any.
    /// - If a fling is active, scrolls to its next offset and returns it.
    pub fn tick(&mut self, now_ms: u64) -> Result<Option<f32>, LayoutError> {
        self.view.run_pending_layout()?;

        let max_scroll = self.max_scroll();
        let Some(fling) = &mut self.fling else {
            return Ok(None);
        };
        // the canvas estimate may have grown since the fling started
        fling.max_offset = max_scroll.max(fling.min_offset);
        let offset = fling.advance(now_ms);
        if fling.is_done() {
            atrace!(offset_y = offset, "Controller::fling_done");
            self.fling = None;
        }

        self.view.on_scroll(offset)?;
        Ok(Some(self.view.scroll_offset()))
    }

    /// Applies every update `updates` has ready.
    ///
    /// Returns `Ready(Ok(()))` once the stream has ended and `Ready(Err(_))` if it failed or an
    /// update could not be laid out. Otherwise returns `Pending`; the stream wakes the task
    /// when the next snapshot arrives.
    pub fn poll_updates(
        &mut self,
        updates: &mut UpdateStream<ListItem<P>>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), AdapterError>> {
        loop {
            match Pin::new(&mut *updates).poll_next(cx) {
                Poll::Ready(Some(Ok(update))) => {
                    atrace!(full = update.is_full(), "Controller::apply_update");
                    if let Err(err) = self.view.apply_update(update) {
                        return Poll::Ready(Err(err.into()));
                    }
                }
                Poll::Ready(Some(Err(err))) => return Poll::Ready(Err(err.into())),
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }
    }

    /// Records the list's current anchor under `key`. Returns whether the memory changed.
    pub fn remember<K: MemoryKey>(&self, memory: &mut ScrollMemory<K>, key: K) -> bool {
        match self.view.saved_scroll() {
            Some(scroll) => memory.record(key, scroll),
            None => false,
        }
    }

    /// Stops any fling and disposes the list view.
    pub fn dispose(&mut self) {
        self.cancel_fling();
        self.tracker.reset();
        self.dragging = false;
        self.view.dispose();
    }
}
