use core::fmt;

/// Width and height of a render object, in the host's layout units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Returns `true` when either dimension differs from `other` by at least `epsilon`.
    pub fn differs_from(&self, other: Size, epsilon: f32) -> bool {
        abs_diff(self.width, other.width) >= epsilon || abs_diff(self.height, other.height) >= epsilon
    }
}

fn abs_diff(a: f32, b: f32) -> f32 {
    if a > b { a - b } else { b - a }
}

/// A scroll anchor: the item at `index` starts `offset_y` units below the top of the viewport.
///
/// The list view reports one of these after every layout pass that moved the anchor. Hosts
/// persist it (see `listview-adapter`'s `ScrollMemory`) and hand it back through
/// [`crate::ListViewOptions::initial_scroll`] when the screen is recreated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavedScroll {
    pub index: usize,
    pub offset_y: f32,
}

impl SavedScroll {
    pub const TOP: SavedScroll = SavedScroll {
        index: 0,
        offset_y: 0.0,
    };

    pub fn new(index: usize, offset_y: f32) -> Self {
        Self { index, offset_y }
    }
}

/// A single step of an edit script.
///
/// Edits produced by one diff are meant to be applied in order: every edit sees the list as
/// left behind by the edits before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edit {
    Insert { position: usize, count: usize },
    Remove { position: usize, count: usize },
    Change { position: usize, count: usize },
    Move { from: usize, to: usize },
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Edit::Insert { position, count } => write!(f, "insert({position}, {count})"),
            Edit::Remove { position, count } => write!(f, "remove({position}, {count})"),
            Edit::Change { position, count } => write!(f, "change({position}, {count})"),
            Edit::Move { from, to } => write!(f, "move({from} -> {to})"),
        }
    }
}

/// Identity of a list item.
///
/// `Id` is an explicit identity chosen by the caller. `Index` is positional identity: the
/// item's index in the snapshot it was created for, so two positional items are "the same"
/// only when they sit at the same position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKey {
    Id(u64),
    Index(usize),
}

impl Default for ItemKey {
    fn default() -> Self {
        Self::Index(0)
    }
}

/// Which side of a diff a position refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListSide {
    Old,
    New,
}

impl fmt::Display for ListSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListSide::Old => f.write_str("old"),
            ListSide::New => f.write_str("new"),
        }
    }
}
