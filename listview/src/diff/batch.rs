use alloc::vec::Vec;

use crate::Edit;

/// Receives the edits that turn the old list into the new one, in application order.
///
/// Positions are always relative to the list as it looks after every previously reported
/// edit has been applied.
pub trait ListUpdateCallback {
    fn on_inserted(&mut self, position: usize, count: usize);

    fn on_removed(&mut self, position: usize, count: usize);

    /// `from` is removed first, then the item is inserted at `to`.
    fn on_moved(&mut self, from: usize, to: usize);

    fn on_changed(&mut self, position: usize, count: usize);
}

impl<C: ListUpdateCallback + ?Sized> ListUpdateCallback for &mut C {
    fn on_inserted(&mut self, position: usize, count: usize) {
        (**self).on_inserted(position, count);
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        (**self).on_removed(position, count);
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        (**self).on_moved(from, to);
    }

    fn on_changed(&mut self, position: usize, count: usize) {
        (**self).on_changed(position, count);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EventKind {
    Insert,
    Remove,
    Change,
}

#[derive(Clone, Copy, Debug)]
struct PendingEvent {
    kind: EventKind,
    position: usize,
    count: usize,
}

/// Coalesces consecutive single-item events of the same kind into ranges.
///
/// Moves are never merged. Call [`BatchingCallback::dispatch_last_event`] once the producer is
/// done; the diff engine does this itself.
#[derive(Debug)]
pub struct BatchingCallback<C> {
    inner: C,
    pending: Option<PendingEvent>,
}

impl<C: ListUpdateCallback> BatchingCallback<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            pending: None,
        }
    }

    pub fn dispatch_last_event(&mut self) {
        let Some(event) = self.pending.take() else {
            return;
        };
        match event.kind {
            EventKind::Insert => self.inner.on_inserted(event.position, event.count),
            EventKind::Remove => self.inner.on_removed(event.position, event.count),
            EventKind::Change => self.inner.on_changed(event.position, event.count),
        }
    }

    pub fn into_inner(mut self) -> C {
        self.dispatch_last_event();
        self.inner
    }
}

impl<C: ListUpdateCallback> ListUpdateCallback for BatchingCallback<C> {
    fn on_inserted(&mut self, position: usize, count: usize) {
        if let Some(last) = &mut self.pending {
            if last.kind == EventKind::Insert
                && position >= last.position
                && position <= last.position + last.count
            {
                last.count += count;
                last.position = last.position.min(position);
                return;
            }
        }
        self.dispatch_last_event();
        self.pending = Some(PendingEvent {
            kind: EventKind::Insert,
            position,
            count,
        });
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        if let Some(last) = &mut self.pending {
            if last.kind == EventKind::Remove
                && last.position >= position
                && last.position <= position + count
            {
                last.count += count;
                last.position = position;
                return;
            }
        }
        self.dispatch_last_event();
        self.pending = Some(PendingEvent {
            kind: EventKind::Remove,
            position,
            count,
        });
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        self.dispatch_last_event();
        self.inner.on_moved(from, to);
    }

    fn on_changed(&mut self, position: usize, count: usize) {
        if let Some(last) = &mut self.pending {
            if last.kind == EventKind::Change
                && !(position > last.position + last.count || position + count < last.position)
            {
                let end = (last.position + last.count).max(position + count);
                last.position = last.position.min(position);
                last.count = end - last.position;
                return;
            }
        }
        self.dispatch_last_event();
        self.pending = Some(PendingEvent {
            kind: EventKind::Change,
            position,
            count,
        });
    }
}

/// Collects reported events as [`Edit`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditCollector {
    pub edits: Vec<Edit>,
}

impl ListUpdateCallback for EditCollector {
    fn on_inserted(&mut self, position: usize, count: usize) {
        self.edits.push(Edit::Insert { position, count });
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        self.edits.push(Edit::Remove { position, count });
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        self.edits.push(Edit::Move { from, to });
    }

    fn on_changed(&mut self, position: usize, count: usize) {
        self.edits.push(Edit::Change { position, count });
    }
}
