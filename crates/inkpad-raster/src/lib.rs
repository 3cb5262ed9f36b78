//! Inkpad Raster
//!
//! Deterministic CPU rasterizer for the Inkpad object model, plus the PNG
//! data-URL snapshot codec. Rendering is a pure function of the object list,
//! so re-rendering the same list always produces byte-identical pixels.

pub mod render;
pub mod snapshot;
pub mod surface;

pub use render::{composite_objects, draw_object, render_objects};
pub use snapshot::{decode_snapshot, encode_png, encode_snapshot, SnapshotError};
pub use surface::{CoverageMask, Surface};
