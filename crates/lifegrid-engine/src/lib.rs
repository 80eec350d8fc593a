//! # Lifegrid Engine
//!
//! Headless driver for the Lifegrid simulation.
//!
//! This crate provides:
//! - TOML engine configuration
//! - Fixed-timestep tick timing
//! - The session controller (play/pause, stepping, live parameters, auto-save)
//! - Brush painting and the HUD status line

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod brush;
pub mod config;
pub mod session;
pub mod status;
pub mod timing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::brush::*;
    pub use crate::config::*;
    pub use crate::session::*;
    pub use crate::status::*;
    pub use crate::timing::*;
}

pub use prelude::*;
