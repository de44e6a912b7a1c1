//! Versioned list snapshots turned into a stream of [`Update`]s.

use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use futures_core::Stream;

use crate::diff::{DiffTask, ItemComparator, SliceCallback, YieldBudget};
use crate::{Edit, ListItem, StreamError, index_keys};

/// What a list view has to do to show the latest snapshot.
#[derive(Clone, Debug)]
pub enum Update<T> {
    /// Replace everything with `items`.
    Full { items: Arc<[T]> },
    /// Apply `edits`, in order, to `previous` to get `items`.
    Incremental {
        items: Arc<[T]>,
        previous: Arc<[T]>,
        edits: Vec<Edit>,
    },
}

impl<T> Update<T> {
    pub fn items(&self) -> &Arc<[T]> {
        match self {
            Self::Full { items } | Self::Incremental { items, .. } => items,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full { .. })
    }
}

type SharedComparator<T> = Arc<dyn ItemComparator<T>>;

struct Shared<T> {
    items: Arc<[T]>,
    generation: u64,
    /// Wakers of pending observers, keyed by observer id.
    wakers: Vec<(u64, Waker)>,
    next_observer: u64,
    closed: bool,
}

impl<T> Shared<T> {
    fn wake_all(&mut self) {
        for (_, waker) in self.wakers.drain(..) {
            waker.wake();
        }
    }
}

/// Holds the current list and hands out [`UpdateStream`]s that follow it.
///
/// Without a comparator every snapshot reaches observers as a [`Update::Full`]. With one,
/// everything after the first snapshot is diffed against the last list the observer received
/// and arrives as an [`Update::Incremental`]. Setting the very same allocation again is
/// ignored.
///
/// Dropping the source ends all of its streams once their pending diffs are delivered.
pub struct ArrayDataSource<T> {
    shared: Rc<RefCell<Shared<T>>>,
    comparator: Option<SharedComparator<T>>,
    budget: YieldBudget,
}

impl<T> ArrayDataSource<T> {
    /// A source that only ever emits full updates.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                items: Arc::from(Vec::new()),
                generation: 0,
                wakers: Vec::new(),
                next_observer: 0,
                closed: false,
            })),
            comparator: None,
            budget: YieldBudget::default(),
        }
    }

    /// A source that diffs consecutive snapshots with `comparator`.
    pub fn with_comparator(comparator: impl ItemComparator<T> + 'static) -> Self {
        let mut source = Self::new();
        source.comparator = Some(Arc::new(comparator));
        source
    }

    /// Sets the yield budget used by the diffs of streams observed from now on.
    pub fn with_budget(mut self, budget: YieldBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn items(&self) -> Arc<[T]> {
        Arc::clone(&self.shared.borrow().items)
    }

    pub fn set_items(&self, items: impl Into<Arc<[T]>>) {
        let items = items.into();
        let mut shared = self.shared.borrow_mut();
        if Arc::ptr_eq(&shared.items, &items) {
            return;
        }
        shared.items = items;
        shared.generation += 1;
        shared.wake_all();
    }

    #[cfg(test)]
    pub(crate) fn waiting_observers(&self) -> usize {
        self.shared.borrow().wakers.len()
    }

    /// A new stream that starts with a full update of the current snapshot.
    pub fn observe(&self) -> UpdateStream<T> {
        let id = {
            let mut shared = self.shared.borrow_mut();
            shared.next_observer += 1;
            shared.next_observer
        };
        UpdateStream {
            id,
            shared: Rc::clone(&self.shared),
            comparator: self.comparator.clone(),
            budget: self.budget,
            seen_generation: None,
            version: 0,
            emitted: None,
            in_flight: Vec::new(),
            finished: false,
        }
    }
}

impl<P> ArrayDataSource<ListItem<P>> {
    /// Like [`Self::set_items`], after giving every item without an id its positional key.
    pub fn set_list_items(&self, mut items: Vec<ListItem<P>>) {
        index_keys(&mut items);
        self.set_items(items);
    }
}

impl<T> Default for ArrayDataSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for ArrayDataSource<T> {
    fn drop(&mut self) {
        let mut shared = self.shared.borrow_mut();
        shared.closed = true;
        shared.wake_all();
    }
}

impl<T> fmt::Debug for ArrayDataSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("ArrayDataSource")
            .field("len", &shared.items.len())
            .field("generation", &shared.generation)
            .field("diffing", &self.comparator.is_some())
            .finish_non_exhaustive()
    }
}

struct InFlight<T> {
    version: u64,
    task: DiffTask<SliceCallback<T, Arc<[T]>, SharedComparator<T>>>,
}

/// The updates of one [`ArrayDataSource`] observer.
///
/// Every snapshot bumps the stream's version and, when diffing, starts a diff against the
/// last list this stream emitted. Diffs run concurrently; a diff whose version has been
/// superseded by the time it finishes is dropped. A failing diff ends the stream with a
/// [`StreamError`].
pub struct UpdateStream<T> {
    id: u64,
    shared: Rc<RefCell<Shared<T>>>,
    comparator: Option<SharedComparator<T>>,
    budget: YieldBudget,
    seen_generation: Option<u64>,
    version: u64,
    emitted: Option<Arc<[T]>>,
    in_flight: Vec<InFlight<T>>,
    finished: bool,
}

impl<T> UpdateStream<T> {
    /// Version of the newest snapshot this stream has picked up.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of diffs still running.
    pub fn pending_diffs(&self) -> usize {
        self.in_flight.len()
    }

    pub(crate) fn fail(&mut self, version: u64, source: crate::DiffError) -> StreamError {
        self.finished = true;
        self.in_flight.clear();
        self.unregister();
        StreamError { version, source }
    }

    fn unregister(&mut self) {
        let id = self.id;
        if let Ok(mut shared) = self.shared.try_borrow_mut() {
            shared.wakers.retain(|(observer, _)| *observer != id);
        }
    }
}

impl<T> Stream for UpdateStream<T> {
    type Item = Result<Update<T>, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        let (generation, items, closed) = {
            let shared = this.shared.borrow();
            (shared.generation, Arc::clone(&shared.items), shared.closed)
        };

        if this.seen_generation != Some(generation) {
            this.seen_generation = Some(generation);
            this.version += 1;

            match (&this.emitted, &this.comparator) {
                (Some(previous), Some(comparator)) => {
                    let callback =
                        SliceCallback::new(Arc::clone(previous), items, Arc::clone(comparator));
                    this.in_flight.push(InFlight {
                        version: this.version,
                        task: DiffTask::new(callback, true, this.budget),
                    });
                }
                _ => {
                    ldebug!(version = this.version, len = items.len(), "UpdateStream::full");
                    this.emitted = Some(Arc::clone(&items));
                    this.in_flight.clear();
                    return Poll::Ready(Some(Ok(Update::Full { items })));
                }
            }
        }

        let mut index = 0;
        while index < this.in_flight.len() {
            let polled = Pin::new(&mut this.in_flight[index].task).poll(cx);
            let Poll::Ready(result) = polled else {
                index += 1;
                continue;
            };

            let flight = this.in_flight.remove(index);
            let diff = match result {
                Ok(diff) => diff,
                Err(source) => {
                    let err = this.fail(flight.version, source);
                    return Poll::Ready(Some(Err(err)));
                }
            };

            if flight.version != this.version {
                ltrace!(
                    version = flight.version,
                    latest = this.version,
                    "UpdateStream::drop_stale"
                );
                continue;
            }

            let edits = diff.edits();
            let (previous, items) = flight.task.into_callback().into_parts();
            ldebug!(
                version = flight.version,
                edits = edits.len(),
                "UpdateStream::incremental"
            );
            this.emitted = Some(Arc::clone(&items));
            this.in_flight.clear();
            return Poll::Ready(Some(Ok(Update::Incremental {
                items,
                previous,
                edits,
            })));
        }

        if closed && this.in_flight.is_empty() {
            this.finished = true;
            return Poll::Ready(None);
        }

        let mut shared = this.shared.borrow_mut();
        match shared.wakers.iter_mut().find(|(observer, _)| *observer == this.id) {
            Some((_, waker)) => waker.clone_from(cx.waker()),
            None => shared.wakers.push((this.id, cx.waker().clone())),
        }
        Poll::Pending
    }
}

impl<T> Drop for UpdateStream<T> {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl<T> fmt::Debug for UpdateStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateStream")
            .field("version", &self.version)
            .field("pending_diffs", &self.in_flight.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
