//! Two-dimensional area-of-interest index.
//!
//! Tracks moving entities on a bounded plane split into a uniform grid and
//! maintains, for every entity, the live set of other entities inside its
//! vision radius ("focus set"). Insertions, removals, refreshes and resizes
//! update focus sets incrementally and notify registered handlers when an
//! entity enters or leaves another entity's view.
//!
//! # Visibility search
//!
//! A scan around an entity at cell `(cx, cy)` with vision `v` only visits the
//! `ceil(v / cell_width)` x `ceil(v / cell_height)` neighbourhood of cells.
//! Cells whose closest point lies beyond `v` are skipped without looking at
//! their contents; the rest are filtered by exact Euclidean distance.
//!
//! # Threading
//!
//! [`SpatialIndex`] is a single value behind one read/write lock and can be
//! shared through an `Arc`. Handlers run under the write lock.

mod entity;
mod error;
pub mod events;
mod grid;
mod index;
mod settings;

pub use entity::{EntityGuid, VisionEntity};
pub use error::AoiError;
pub use events::{VisionEvents, VisionHandler};
pub use index::{FocusSet, SpatialIndex};
pub use settings::{AoiSettings, MAX_GRID_CELLS};

pub use glam::DVec2;
