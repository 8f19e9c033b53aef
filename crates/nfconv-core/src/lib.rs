//! nfconv core library — UI-agnostic filename normalisation.
//!
//! `nfconv-core` renames files and folders so that their names share one
//! Unicode normalization form (NFC or NFD) and a lowercase/underscore
//! convention. It is decoupled from any frontend: the `nfconv` CLI drives
//! it, and a GUI could do the same through [`convert_with`].
//!
//! # Modules
//!
//! - [`fs`] — Path entries and the collector that flattens roots into every reachable entry.
//! - [`naming`] — The name transform and Unicode normalization helpers.
//! - [`rename`] — Deepest-first rename planning and the lazy [`Renamer`].
//! - [`roots`] — Immutable snapshot of the user-supplied roots.
//! - [`convert`] — A full run (collect, then rename) with progress events.
//! - [`config`] — TOML-based settings.
//! - [`event`] — Events reported to the frontend during a run.
//! - [`error`] — Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod convert;
pub mod error;
pub mod event;
pub mod fs;
pub mod naming;
pub mod rename;
pub mod roots;

pub use config::settings::Config;
pub use convert::{convert, convert_with, RunReport};
pub use error::{CoreError, CoreResult};
pub use event::RunEvent;
pub use fs::collect::{collect, collect_with, CollectOptions, Collection, UnreadableDir};
pub use fs::entry::PathEntry;
pub use naming::{
    is_normalized, normalize, transform_name, transform_os_name, NormalizationForm,
};
pub use rename::{
    rename_all, rename_entry, Outcome, PlannedCollision, RenamePlan, RenamePlanItem, Renamer,
    RunState,
};
pub use roots::DropRoots;
