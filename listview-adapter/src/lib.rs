//! Adapter utilities for the `listview` crate.
//!
//! The `listview` crate is UI-agnostic and only reacts to the events it is given. This crate
//! provides small, framework-neutral helpers commonly needed by the code that sits between a
//! host UI and a [`listview::ListView`]:
//!
//! - drag velocity tracking and fling momentum ([`VelocityTracker`], [`Fling`])
//! - scroll positions that survive a screen being torn down and recreated ([`ScrollMemory`])
//! - a [`Controller`] tying both to a list view and pumping its update stream
//!
//! This crate is intentionally framework-agnostic: time is passed in as milliseconds and
//! nothing here schedules frames by itself.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod error;
mod fling;
mod memory;

#[cfg(test)]
mod tests;

pub use controller::Controller;
pub use error::AdapterError;
pub use fling::{Fling, VelocityTracker};
pub use memory::{MemoryKey, ScrollMemory};
