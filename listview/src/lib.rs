//! A headless virtualized list engine.
//!
//! For host-side utilities (fling momentum, scroll memory, update pumping), see the
//! `listview-adapter` crate.
//!
//! This crate holds the parts of a virtualized list that are independent of any UI toolkit:
//! - a Myers list differ producing minimal edit scripts, with move detection and cooperative
//!   yielding ([`diff`], [`DiffTask`])
//! - a versioned data source that turns list snapshots into a stream of full and incremental
//!   [`Update`]s ([`ArrayDataSource`], [`UpdateStream`])
//! - a per-view-type pool of detached render objects ([`ViewRecycler`])
//! - an anchor-based layout engine that only keeps the children around the viewport attached
//!   ([`ListView`]) with pluggable strategies ([`LinearLayout`], [`GridLayout`],
//!   [`MasonryLayout`])
//!
//! The host provides:
//! - render objects for every view type ([`RenderObject`], [`ViewRegistry`])
//! - viewport size, scroll offset and child resize notifications
//! - the list items, either directly or through an [`UpdateStream`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

pub mod diff;
mod error;
mod item;
pub mod layout;
mod list_view;
mod options;
mod recycler;
mod stream;
mod types;
mod view;

#[cfg(test)]
mod tests;

pub use diff::{
    BatchingCallback, DiffCallback, DiffTask, EditCollector, EqComparator, ItemComparator,
    ListUpdateCallback, SliceCallback, YieldBudget, diff, diff_with,
};
pub use diff::Diff;
pub use error::{DiffError, LayoutError, StreamError, UnknownViewType};
pub use item::{
    Binding, ListItem, ListItemComparator, OutputHandler, Outputs, ViewType, index_keys,
};
pub use layout::{ChildHandle, GridLayout, Layout, LayoutHelper, LinearLayout, MasonryLayout};
pub use list_view::{Child, ChildState, ListView};
pub use options::{ListViewOptions, OnScrollChangedCallback};
pub use recycler::ViewRecycler;
pub use stream::{ArrayDataSource, Update, UpdateStream};
pub use types::{Edit, ItemKey, ListSide, SavedScroll, Size};
pub use view::{Component, ComponentView, RenderObject, Template, TemplateView, View, ViewRegistry};
