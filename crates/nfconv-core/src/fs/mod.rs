//! File system abstractions for nfconv.
//!
//! This module provides the entry type ([`entry::PathEntry`]) and the
//! collector that flattens dropped roots into every reachable entry
//! ([`collect::collect`]).

pub mod collect;
pub mod entry;

pub use collect::{CollectOptions, Collection, UnreadableDir};
pub use entry::PathEntry;
