use alloc::vec;
use alloc::vec::Vec;

use super::batch::{BatchingCallback, EditCollector, ListUpdateCallback};
use super::search::Diagonal;
use super::DiffCallback;
use crate::{DiffError, Edit, ListSide};

// A status entry packs the matching position in the other list above a 4-bit flag set.
const FLAG_NOT_CHANGED: usize = 1;
const FLAG_CHANGED: usize = FLAG_NOT_CHANGED << 1;
const FLAG_MOVED_CHANGED: usize = FLAG_CHANGED << 1;
const FLAG_MOVED_NOT_CHANGED: usize = FLAG_MOVED_CHANGED << 1;
const FLAG_MOVED: usize = FLAG_MOVED_CHANGED | FLAG_MOVED_NOT_CHANGED;
const FLAG_OFFSET: u32 = 4;
const FLAG_MASK: usize = (1 << FLAG_OFFSET) - 1;

/// Longest list the engine accepts.
///
/// Positions must fit next to the status flags, and the search works with signed offsets
/// spanning both lists.
pub const MAX_LIST_LEN: usize = usize::MAX >> (FLAG_OFFSET + 2);

pub(crate) fn check_len(len: usize) -> Result<(), DiffError> {
    if len > MAX_LIST_LEN {
        return Err(DiffError::TooLarge {
            len,
            max: MAX_LIST_LEN,
        });
    }
    Ok(())
}

/// A move whose other end has not been reached yet while walking the lists backwards.
#[derive(Clone, Copy, Debug)]
struct PostponedUpdate {
    pos_in_owner_list: usize,
    current_pos: isize,
    removal: bool,
}

/// The outcome of a diff: the matched diagonals plus a status for every old and new position.
///
/// Use [`Diff::dispatch_updates_to`] (or [`Diff::edits`]) to turn it into edits, and the
/// `*_position_to_*` queries to map positions between the two lists.
#[derive(Clone, Debug)]
pub struct Diff {
    diagonals: Vec<Diagonal>,
    old_statuses: Vec<usize>,
    new_statuses: Vec<usize>,
    old_len: usize,
    new_len: usize,
    detect_moves: bool,
}

impl Diff {
    pub(crate) fn new<C: DiffCallback + ?Sized>(
        cb: &C,
        diagonals: Vec<Diagonal>,
        detect_moves: bool,
    ) -> Self {
        let old_len = cb.old_len();
        let new_len = cb.new_len();
        let mut diff = Self {
            diagonals,
            old_statuses: vec![0; old_len],
            new_statuses: vec![0; new_len],
            old_len,
            new_len,
            detect_moves,
        };
        diff.add_edge_diagonals();
        diff.find_matching_items(cb);
        diff
    }

    pub fn old_len(&self) -> usize {
        self.old_len
    }

    pub fn new_len(&self) -> usize {
        self.new_len
    }

    // Brackets the diagonals with empty ones at (0, 0) and (old_len, new_len) so dispatching
    // never needs to special-case the list edges.
    fn add_edge_diagonals(&mut self) {
        let needs_head = self
            .diagonals
            .first()
            .is_none_or(|first| first.x != 0 || first.y != 0);
        if needs_head {
            self.diagonals.insert(0, Diagonal::new(0, 0, 0));
        }
        self.diagonals
            .push(Diagonal::new(self.old_len, self.new_len, 0));
    }

    fn find_matching_items<C: DiffCallback + ?Sized>(&mut self, cb: &C) {
        for diagonal in &self.diagonals {
            for offset in 0..diagonal.size {
                let x = diagonal.x + offset;
                let y = diagonal.y + offset;
                let flag = if cb.same_contents(x, y) {
                    FLAG_NOT_CHANGED
                } else {
                    FLAG_CHANGED
                };
                self.old_statuses[x] = (y << FLAG_OFFSET) | flag;
                self.new_statuses[y] = (x << FLAG_OFFSET) | flag;
            }
        }
        if self.detect_moves {
            self.find_move_matches(cb);
        }
    }

    fn find_move_matches<C: DiffCallback + ?Sized>(&mut self, cb: &C) {
        let mut pos_x = 0;
        for index in 0..self.diagonals.len() {
            let diagonal = self.diagonals[index];
            while pos_x < diagonal.x {
                if self.old_statuses[pos_x] == 0 {
                    self.find_matching_addition(cb, pos_x);
                }
                pos_x += 1;
            }
            pos_x = diagonal.end_x();
        }
    }

    fn find_matching_addition<C: DiffCallback + ?Sized>(&mut self, cb: &C, pos_x: usize) {
        let mut pos_y = 0;
        for diagonal in &self.diagonals {
            while pos_y < diagonal.y {
                if self.new_statuses[pos_y] == 0 && cb.same_item(pos_x, pos_y) {
                    let flag = if cb.same_contents(pos_x, pos_y) {
                        FLAG_MOVED_NOT_CHANGED
                    } else {
                        FLAG_MOVED_CHANGED
                    };
                    self.old_statuses[pos_x] = (pos_y << FLAG_OFFSET) | flag;
                    self.new_statuses[pos_y] = (pos_x << FLAG_OFFSET) | flag;
                    return;
                }
                pos_y += 1;
            }
            pos_y = diagonal.end_y();
        }
    }

    /// Where the item at `old_position` ended up in the new list, or `None` if it was removed.
    pub fn old_position_to_new(&self, old_position: usize) -> Result<Option<usize>, DiffError> {
        let status = self
            .old_statuses
            .get(old_position)
            .ok_or(DiffError::OutOfBounds {
                side: ListSide::Old,
                position: old_position,
                len: self.old_len,
            })?;
        Ok(unpack(*status))
    }

    /// Where the item at `new_position` came from, or `None` if it was inserted.
    pub fn new_position_to_old(&self, new_position: usize) -> Result<Option<usize>, DiffError> {
        let status = self
            .new_statuses
            .get(new_position)
            .ok_or(DiffError::OutOfBounds {
                side: ListSide::New,
                position: new_position,
                len: self.new_len,
            })?;
        Ok(unpack(*status))
    }

    /// Reports the edits to `callback`, batching adjacent events of the same kind.
    ///
    /// Edits are produced from the end of the list towards the start, and every position is
    /// valid for the list as it looks after the edits reported before it.
    pub fn dispatch_updates_to<C: ListUpdateCallback + ?Sized>(&self, callback: &mut C) {
        let mut batching = BatchingCallback::new(callback);
        let mut current_list_size = self.old_len as isize;
        let mut postponed: Vec<PostponedUpdate> = Vec::new();
        let mut pos_x = self.old_len;
        let mut pos_y = self.new_len;

        for diagonal in self.diagonals.iter().rev() {
            let end_x = diagonal.end_x();
            let end_y = diagonal.end_y();

            while pos_x > end_x {
                pos_x -= 1;
                let status = self.old_statuses[pos_x];
                if status & FLAG_MOVED == 0 {
                    batching.on_removed(pos_x, 1);
                    current_list_size -= 1;
                    continue;
                }
                let new_pos = status >> FLAG_OFFSET;
                match take_postponed(&mut postponed, new_pos, false) {
                    Some(update) => {
                        // the insertion half was already seen; the item moves now
                        let updated_new_pos = (current_list_size - update.current_pos - 1) as usize;
                        batching.on_moved(pos_x, updated_new_pos);
                        if status & FLAG_MOVED_CHANGED != 0 {
                            batching.on_changed(updated_new_pos, 1);
                        }
                    }
                    None => postponed.push(PostponedUpdate {
                        pos_in_owner_list: pos_x,
                        current_pos: current_list_size - pos_x as isize - 1,
                        removal: true,
                    }),
                }
            }

            while pos_y > end_y {
                pos_y -= 1;
                let status = self.new_statuses[pos_y];
                if status & FLAG_MOVED == 0 {
                    batching.on_inserted(pos_x, 1);
                    current_list_size += 1;
                    continue;
                }
                let old_pos = status >> FLAG_OFFSET;
                match take_postponed(&mut postponed, old_pos, true) {
                    Some(update) => {
                        let updated_old_pos = (current_list_size - update.current_pos - 1) as usize;
                        batching.on_moved(updated_old_pos, pos_x);
                        if status & FLAG_MOVED_CHANGED != 0 {
                            batching.on_changed(pos_x, 1);
                        }
                    }
                    None => postponed.push(PostponedUpdate {
                        pos_in_owner_list: pos_y,
                        current_pos: current_list_size - pos_x as isize,
                        removal: false,
                    }),
                }
            }

            pos_x = diagonal.x;
            for x in diagonal.x..diagonal.end_x() {
                if self.old_statuses[x] & FLAG_MASK == FLAG_CHANGED {
                    batching.on_changed(x, 1);
                }
            }
            pos_y = diagonal.y;
        }

        batching.dispatch_last_event();
    }

    /// The edits as a list, in the order [`Diff::dispatch_updates_to`] reports them.
    pub fn edits(&self) -> Vec<Edit> {
        let mut collector = EditCollector::default();
        self.dispatch_updates_to(&mut collector);
        collector.edits
    }
}

fn unpack(status: usize) -> Option<usize> {
    if status & FLAG_MASK == 0 {
        None
    } else {
        Some(status >> FLAG_OFFSET)
    }
}

fn take_postponed(
    updates: &mut Vec<PostponedUpdate>,
    pos_in_list: usize,
    removal: bool,
) -> Option<PostponedUpdate> {
    let index = updates
        .iter()
        .position(|u| u.pos_in_owner_list == pos_in_list && u.removal == removal)?;
    let update = updates.remove(index);
    for later in &mut updates[index..] {
        // later entries were recorded closer to the list start; shift them past this one
        if removal {
            later.current_pos -= 1;
        } else {
            later.current_pos += 1;
        }
    }
    Some(update)
}
