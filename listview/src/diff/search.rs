//! Linear-space Myers search for the diagonals shared by two lists.
//!
//! The search keeps its own stack of ranges instead of recursing, and it can be suspended
//! between two edit-distance steps (see [`MyersSearch::poll_search`]).

use alloc::vec;
use alloc::vec::Vec;
use core::task::Poll;

use super::DiffCallback;
use super::budget::BudgetMeter;

/// A run of matching items: `old[x..x + size]` equals `new[y..y + size]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Diagonal {
    pub(crate) x: usize,
    pub(crate) y: usize,
    pub(crate) size: usize,
}

impl Diagonal {
    pub(crate) fn new(x: usize, y: usize, size: usize) -> Self {
        Self { x, y, size }
    }

    pub(crate) fn end_x(&self) -> usize {
        self.x + self.size
    }

    pub(crate) fn end_y(&self) -> usize {
        self.y + self.size
    }
}

/// The middle snake of a range: at most one insertion or removal followed (or, for reverse
/// snakes, preceded) by a diagonal.
#[derive(Clone, Copy, Debug)]
struct Snake {
    start_x: isize,
    start_y: isize,
    end_x: isize,
    end_y: isize,
    reverse: bool,
}

impl Snake {
    fn has_addition_or_removal(&self) -> bool {
        self.end_y - self.start_y != self.end_x - self.start_x
    }

    fn is_addition(&self) -> bool {
        self.end_y - self.start_y > self.end_x - self.start_x
    }

    fn diagonal_size(&self) -> isize {
        (self.end_x - self.start_x).min(self.end_y - self.start_y)
    }

    fn to_diagonal(self) -> Diagonal {
        let size = self.diagonal_size() as usize;
        let (x, y) = (self.start_x as usize, self.start_y as usize);
        if !self.has_addition_or_removal() {
            return Diagonal::new(x, y, (self.end_x - self.start_x) as usize);
        }
        if self.reverse {
            // the edge sits at the end of a reverse snake
            Diagonal::new(x, y, size)
        } else if self.is_addition() {
            Diagonal::new(x, y + 1, size)
        } else {
            Diagonal::new(x + 1, y, size)
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct IndexRange {
    old_start: isize,
    old_end: isize,
    new_start: isize,
    new_end: isize,
}

impl IndexRange {
    fn old_size(&self) -> isize {
        self.old_end - self.old_start
    }

    fn new_size(&self) -> isize {
        self.new_end - self.new_start
    }
}

/// A vector addressable with negative indexes, centered on its middle element.
#[derive(Debug)]
struct CenteredArray {
    data: Vec<isize>,
    mid: isize,
}

impl CenteredArray {
    fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            mid: (size / 2) as isize,
        }
    }

    fn get(&self, k: isize) -> isize {
        self.data[(self.mid + k) as usize]
    }

    fn set(&mut self, k: isize, value: isize) {
        self.data[(self.mid + k) as usize] = value;
    }
}

/// A range whose middle snake is being searched for, suspended at edit distance `d`.
#[derive(Clone, Copy, Debug)]
struct Midpoint {
    range: IndexRange,
    d: isize,
    max: isize,
}

#[derive(Debug)]
pub(crate) struct MyersSearch {
    stack: Vec<IndexRange>,
    forward: CenteredArray,
    backward: CenteredArray,
    diagonals: Vec<Diagonal>,
    active: Option<Midpoint>,
}

impl MyersSearch {
    pub(crate) fn new(old_len: usize, new_len: usize) -> Self {
        let max = (old_len + new_len).div_ceil(2);
        let mut stack = Vec::new();
        stack.push(IndexRange {
            old_start: 0,
            old_end: old_len as isize,
            new_start: 0,
            new_end: new_len as isize,
        });
        Self {
            stack,
            forward: CenteredArray::new(max * 2 + 1),
            backward: CenteredArray::new(max * 2 + 1),
            diagonals: Vec::new(),
            active: None,
        }
    }

    /// Advances the search until every range is resolved (`Ready`) or the meter asks to
    /// suspend (`Pending`). A suspended search resumes exactly where it stopped.
    pub(crate) fn poll_search<C: DiffCallback + ?Sized>(
        &mut self,
        cb: &C,
        meter: &mut BudgetMeter,
    ) -> Poll<()> {
        loop {
            let mut midpoint = match self.active.take() {
                Some(midpoint) => midpoint,
                None => {
                    let Some(range) = self.stack.pop() else {
                        return Poll::Ready(());
                    };
                    if range.old_size() < 1 || range.new_size() < 1 {
                        continue;
                    }
                    self.forward.set(1, range.old_start);
                    self.backward.set(1, range.old_end);
                    Midpoint {
                        range,
                        d: 0,
                        max: (range.old_size() + range.new_size() + 1) / 2,
                    }
                }
            };

            let mut snake = None;
            while midpoint.d < midpoint.max {
                snake = forwards(
                    &midpoint.range,
                    cb,
                    &mut self.forward,
                    &self.backward,
                    midpoint.d,
                );
                if snake.is_some() {
                    break;
                }
                snake = backwards(
                    &midpoint.range,
                    cb,
                    &self.forward,
                    &mut self.backward,
                    midpoint.d,
                );
                if snake.is_some() {
                    break;
                }
                midpoint.d += 1;

                // every poll makes at least one step before it may suspend
                if midpoint.d < midpoint.max && meter.tick() {
                    self.active = Some(midpoint);
                    return Poll::Pending;
                }
            }

            let Some(snake) = snake else {
                continue;
            };
            if snake.diagonal_size() > 0 {
                self.diagonals.push(snake.to_diagonal());
            }

            let range = midpoint.range;
            self.stack.push(IndexRange {
                old_start: range.old_start,
                old_end: snake.start_x,
                new_start: range.new_start,
                new_end: snake.start_y,
            });
            self.stack.push(IndexRange {
                old_start: snake.end_x,
                old_end: range.old_end,
                new_start: snake.end_y,
                new_end: range.new_end,
            });
        }
    }

    /// The discovered diagonals, ordered by their position in the old list.
    pub(crate) fn into_diagonals(self) -> Vec<Diagonal> {
        let mut diagonals = self.diagonals;
        diagonals.sort_by_key(|d| d.x);
        diagonals
    }
}

fn forwards<C: DiffCallback + ?Sized>(
    range: &IndexRange,
    cb: &C,
    forward: &mut CenteredArray,
    backward: &CenteredArray,
    d: isize,
) -> Option<Snake> {
    let delta = range.old_size() - range.new_size();
    let check_for_snake = delta.abs() % 2 == 1;

    for k in (-d..=d).step_by(2) {
        // k = x - y; forward[k] holds the furthest x reached on diagonal k
        let start_x;
        let mut x;
        if k == -d || (k != d && forward.get(k + 1) > forward.get(k - 1)) {
            // step down: y grows, x stays
            start_x = forward.get(k + 1);
            x = start_x;
        } else {
            // step right: x grows
            start_x = forward.get(k - 1);
            x = start_x + 1;
        }

        let mut y = range.new_start + (x - range.old_start) - k;
        let start_y = if d == 0 || x != start_x { y } else { y - 1 };

        while x < range.old_end && y < range.new_end && cb.same_item(x as usize, y as usize) {
            x += 1;
            y += 1;
        }

        forward.set(k, x);

        if check_for_snake {
            let backwards_k = delta - k;
            if backwards_k >= -d + 1 && backwards_k <= d - 1 && backward.get(backwards_k) <= x {
                return Some(Snake {
                    start_x,
                    start_y,
                    end_x: x,
                    end_y: y,
                    reverse: false,
                });
            }
        }
    }

    None
}

fn backwards<C: DiffCallback + ?Sized>(
    range: &IndexRange,
    cb: &C,
    forward: &CenteredArray,
    backward: &mut CenteredArray,
    d: isize,
) -> Option<Snake> {
    let delta = range.old_size() - range.new_size();
    let check_for_snake = delta % 2 == 0;

    for k in (-d..=d).step_by(2) {
        // backward[k] holds the smallest x reached walking back from the range end;
        // on ties deletions win over insertions
        let start_x;
        let mut x;
        if k == -d || (k != d && backward.get(k + 1) < backward.get(k - 1)) {
            start_x = backward.get(k + 1);
            x = start_x;
        } else {
            start_x = backward.get(k - 1);
            x = start_x - 1;
        }

        let mut y = range.new_end - ((range.old_end - x) - k);
        let start_y = if d == 0 || x != start_x { y } else { y + 1 };

        while x > range.old_start
            && y > range.new_start
            && cb.same_item((x - 1) as usize, (y - 1) as usize)
        {
            x -= 1;
            y -= 1;
        }

        backward.set(k, x);

        if check_for_snake {
            let forwards_k = delta - k;
            if forwards_k >= -d && forwards_k <= d && forward.get(forwards_k) >= x {
                // start and end are swapped for a reverse snake
                return Some(Snake {
                    start_x: x,
                    start_y: y,
                    end_x: start_x,
                    end_y: start_y,
                    reverse: true,
                });
            }
        }
    }

    None
}
