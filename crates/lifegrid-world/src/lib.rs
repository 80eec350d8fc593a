//! # Lifegrid World
//!
//! World persistence for Lifegrid.
//!
//! This crate handles:
//! - The binary chunk stream (live cells grouped by chunk)
//! - JSON save metadata with the rule settings
//! - Save slots on disk with atomic writes
//!
//! It only uses the public API of [`lifegrid_kernel::SimulationCore`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod chunk_serialize;
pub mod save;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::chunk_serialize::*;
    pub use crate::save::*;
}

pub use prelude::*;
