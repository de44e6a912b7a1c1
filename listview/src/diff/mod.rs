//! Minimal edit scripts between two lists.
//!
//! This is Eugene Myers' O((N+M)·D) difference algorithm in its linear-space form, followed
//! by an optional pass that pairs removed and inserted items into moves. Given the same
//! inputs the result is always the same, and applying the reported edits in order to a copy
//! of the old list yields the new list.
//!
//! Diffs can be computed synchronously with [`diff`] / [`diff_with`], or cooperatively with a
//! [`DiffTask`], which is a `Future` that yields back to its executor according to a
//! [`YieldBudget`].

use core::future::Future;
use core::mem;
use core::pin::Pin;
use core::task::{Context, Poll};

mod batch;
mod budget;
mod callback;
mod result;
mod search;

pub use batch::{BatchingCallback, EditCollector, ListUpdateCallback};
pub use budget::YieldBudget;
pub use callback::{DiffCallback, EqComparator, FnCallback, ItemComparator, SliceCallback};
pub use result::{Diff, MAX_LIST_LEN};

use crate::DiffError;
use budget::BudgetMeter;
use search::MyersSearch;

/// Diffs two lists described by their sizes and two position predicates.
///
/// `same_item(old, new)` decides identity, `same_contents(old, new)` is asked only for
/// identical pairs and decides whether the pair becomes a `Change`.
pub fn diff<I, S>(
    old_len: usize,
    new_len: usize,
    same_item: I,
    same_contents: S,
    detect_moves: bool,
) -> Result<Diff, DiffError>
where
    I: Fn(usize, usize) -> bool,
    S: Fn(usize, usize) -> bool,
{
    diff_with(
        FnCallback::new(old_len, new_len, same_item, same_contents),
        detect_moves,
    )
}

/// Diffs the two lists behind `callback` without ever yielding.
pub fn diff_with<C: DiffCallback>(callback: C, detect_moves: bool) -> Result<Diff, DiffError> {
    DiffTask::new(callback, detect_moves, YieldBudget::UNLIMITED).run()
}

enum TaskState {
    Searching(MyersSearch),
    Failed(DiffError),
    Done,
}

/// A diff computation that can be suspended between search steps.
///
/// Polling the task as a `Future` runs the search until the budget is spent, then wakes its
/// own waker and returns `Pending`, so an executor gets to run other work in between. Polling
/// after completion returns `Pending` without scheduling a wake-up.
pub struct DiffTask<C> {
    callback: C,
    detect_moves: bool,
    meter: BudgetMeter,
    state: TaskState,
}

impl<C: DiffCallback> DiffTask<C> {
    pub fn new(callback: C, detect_moves: bool, budget: YieldBudget) -> Self {
        let old_len = callback.old_len();
        let new_len = callback.new_len();
        let state = match result::check_len(old_len).and_then(|()| result::check_len(new_len)) {
            Ok(()) => TaskState::Searching(MyersSearch::new(old_len, new_len)),
            Err(err) => TaskState::Failed(err),
        };
        Self {
            callback,
            detect_moves,
            meter: BudgetMeter::new(budget),
            state,
        }
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn into_callback(self) -> C {
        self.callback
    }

    /// Runs the computation to completion on the current thread, ignoring the budget.
    pub fn run(mut self) -> Result<Diff, DiffError> {
        loop {
            self.meter.resume();
            if let Poll::Ready(result) = self.step() {
                return result;
            }
        }
    }

    fn step(&mut self) -> Poll<Result<Diff, DiffError>> {
        match mem::replace(&mut self.state, TaskState::Done) {
            TaskState::Searching(mut search) => match search.poll_search(&self.callback, &mut self.meter) {
                Poll::Pending => {
                    self.state = TaskState::Searching(search);
                    Poll::Pending
                }
                Poll::Ready(()) => Poll::Ready(Ok(Diff::new(
                    &self.callback,
                    search.into_diagonals(),
                    self.detect_moves,
                ))),
            },
            TaskState::Failed(err) => Poll::Ready(Err(err)),
            TaskState::Done => Poll::Pending,
        }
    }
}

impl<C: DiffCallback + Unpin> Future for DiffTask<C> {
    type Output = Result<Diff, DiffError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.meter.resume();
        match this.step() {
            Poll::Pending if matches!(this.state, TaskState::Searching(_)) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            other => other,
        }
    }
}

impl<C> core::fmt::Debug for DiffTask<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = match &self.state {
            TaskState::Searching(_) => "searching",
            TaskState::Failed(_) => "failed",
            TaskState::Done => "done",
        };
        f.debug_struct("DiffTask")
            .field("detect_moves", &self.detect_moves)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}
