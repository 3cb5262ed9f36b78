//! Inkpad Core Library
//!
//! Platform-agnostic object model, tool state machine and history logic for
//! the Inkpad drawing surface. Rasterization lives in `inkpad-raster`; the
//! coordination layer that ties input, rendering and persistence together
//! lives in `inkpad-engine`.

pub mod geometry;
pub mod history;
pub mod model;
pub mod object;
pub mod page;
pub mod settings;
pub mod storage;
pub mod tools;

pub use geometry::{point_to_segment_distance, pressure_width, PressureOptions, PressureSmoother};
pub use history::{Commit, HistoryRecord, Snapshot, MAX_HISTORY};
pub use model::ObjectModel;
pub use object::{Color, DrawObject, ObjectKind, ObjectStyle, SurfacePoint};
pub use page::{Page, PageRecord};
pub use settings::{MemorySettingsStore, Settings, SettingsStore};
pub use storage::{
    BoxFuture, HistoryEntry, MemoryPageStore, PageStore, StorageError, StorageResult,
};
pub use tools::{GestureOutcome, Tool, ToolGesture};
