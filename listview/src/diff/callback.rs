use alloc::sync::Arc;
use core::marker::PhantomData;

/// Answers the questions the diff engine asks about two lists, by position.
pub trait DiffCallback {
    fn old_len(&self) -> usize;

    fn new_len(&self) -> usize;

    /// Whether the items at the two positions represent the same entity (e.g. same id).
    fn same_item(&self, old_position: usize, new_position: usize) -> bool;

    /// Whether two items that are [`Self::same_item`] also have the same contents.
    ///
    /// Only called for pairs where `same_item` returned `true`. A `false` answer turns into a
    /// `Change` edit.
    fn same_contents(&self, old_position: usize, new_position: usize) -> bool;
}

impl<C: DiffCallback + ?Sized> DiffCallback for &C {
    fn old_len(&self) -> usize {
        (**self).old_len()
    }

    fn new_len(&self) -> usize {
        (**self).new_len()
    }

    fn same_item(&self, old_position: usize, new_position: usize) -> bool {
        (**self).same_item(old_position, new_position)
    }

    fn same_contents(&self, old_position: usize, new_position: usize) -> bool {
        (**self).same_contents(old_position, new_position)
    }
}

/// Value-level comparison used by [`SliceCallback`] and [`crate::ArrayDataSource`].
pub trait ItemComparator<T: ?Sized> {
    fn same_item(&self, old: &T, new: &T) -> bool;

    fn same_contents(&self, old: &T, new: &T) -> bool;
}

impl<T: ?Sized, C: ItemComparator<T> + ?Sized> ItemComparator<T> for Arc<C> {
    fn same_item(&self, old: &T, new: &T) -> bool {
        (**self).same_item(old, new)
    }

    fn same_contents(&self, old: &T, new: &T) -> bool {
        (**self).same_contents(old, new)
    }
}

/// Identity is equality, and equal items always have equal contents.
///
/// Handy for plain value lists where there is no notion of an in-place change.
#[derive(Clone, Copy, Debug, Default)]
pub struct EqComparator;

impl<T: PartialEq + ?Sized> ItemComparator<T> for EqComparator {
    fn same_item(&self, old: &T, new: &T) -> bool {
        old == new
    }

    fn same_contents(&self, _old: &T, _new: &T) -> bool {
        true
    }
}

/// A [`DiffCallback`] over two slices (or anything that can be viewed as one) and an item
/// comparator.
#[derive(Clone, Debug)]
pub struct SliceCallback<T, L, C> {
    old: L,
    new: L,
    comparator: C,
    _item: PhantomData<fn(&T)>,
}

impl<T, L, C> SliceCallback<T, L, C> {
    pub fn new(old: L, new: L, comparator: C) -> Self {
        Self {
            old,
            new,
            comparator,
            _item: PhantomData,
        }
    }

    pub fn old(&self) -> &L {
        &self.old
    }

    pub fn new_list(&self) -> &L {
        &self.new
    }

    /// Returns the `(old, new)` lists.
    pub fn into_parts(self) -> (L, L) {
        (self.old, self.new)
    }
}

impl<T, L, C> DiffCallback for SliceCallback<T, L, C>
where
    L: AsRef<[T]>,
    C: ItemComparator<T>,
{
    fn old_len(&self) -> usize {
        self.old.as_ref().len()
    }

    fn new_len(&self) -> usize {
        self.new.as_ref().len()
    }

    fn same_item(&self, old_position: usize, new_position: usize) -> bool {
        self.comparator
            .same_item(&self.old.as_ref()[old_position], &self.new.as_ref()[new_position])
    }

    fn same_contents(&self, old_position: usize, new_position: usize) -> bool {
        self.comparator
            .same_contents(&self.old.as_ref()[old_position], &self.new.as_ref()[new_position])
    }
}

/// A [`DiffCallback`] built from list sizes and two position predicates.
pub struct FnCallback<I, S> {
    old_len: usize,
    new_len: usize,
    same_item: I,
    same_contents: S,
}

impl<I, S> FnCallback<I, S>
where
    I: Fn(usize, usize) -> bool,
    S: Fn(usize, usize) -> bool,
{
    pub fn new(old_len: usize, new_len: usize, same_item: I, same_contents: S) -> Self {
        Self {
            old_len,
            new_len,
            same_item,
            same_contents,
        }
    }
}

impl<I, S> DiffCallback for FnCallback<I, S>
where
    I: Fn(usize, usize) -> bool,
    S: Fn(usize, usize) -> bool,
{
    fn old_len(&self) -> usize {
        self.old_len
    }

    fn new_len(&self) -> usize {
        self.new_len
    }

    fn same_item(&self, old_position: usize, new_position: usize) -> bool {
        (self.same_item)(old_position, new_position)
    }

    fn same_contents(&self, old_position: usize, new_position: usize) -> bool {
        (self.same_contents)(old_position, new_position)
    }
}
