//! Inkpad Engine
//!
//! Ties the object model, tool state machine, rasterizer and persistence
//! ports together. [`Editor`] owns one drawing surface and its history;
//! [`Session`] manages the set of pages above it.

pub mod editor;
pub mod session;

pub use editor::{Editor, ExportOptions};
pub use session::Session;
