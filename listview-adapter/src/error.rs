use listview::{LayoutError, StreamError};

/// Errors surfaced while driving a list view.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Stream(#[from] StreamError),
}
