use crate::{ListSide, ViewType};

/// Errors reported by the diff engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A position query was made with an index outside the list it refers to.
    #[error("index out of bounds - passed position = {position}, {side} list size = {len}")]
    OutOfBounds {
        side: ListSide,
        position: usize,
        len: usize,
    },
    /// The list is too long for its positions to be packed next to the status flags.
    #[error("list of {len} items exceeds the maximum diffable size of {max}")]
    TooLarge { len: usize, max: usize },
}

/// The error that terminated an [`crate::UpdateStream`].
///
/// After yielding this error the stream is finished and returns `None` from then on.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("update stream failed at version {version}")]
pub struct StreamError {
    pub version: u64,
    #[source]
    pub source: DiffError,
}

/// An item (or a layout strategy) asked for a view type that has no registered factory.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no view factory registered for {0}")]
pub struct UnknownViewType(pub ViewType);

/// Errors raised while running a layout pass.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error(transparent)]
    UnknownViewType(#[from] UnknownViewType),
    /// A layout strategy requested a child for an index outside `[0, count)`.
    #[error("layout requested child {index}, but the list has {count} items")]
    ChildOutOfRange { index: usize, count: usize },
}
