//! The hash-generation pipeline.
//!
//! - **resize**: normalize a source image into the fixed 32×32 pixel grid
//! - **encode**: pixel grid → placeholder hash (external encoder)
//! - **select**: deterministic pending-asset selection
//! - **single_flight**: per-asset in-flight registry
//! - **processor**: orchestrates single-asset and batch runs

pub mod encode;
pub mod processor;
pub mod resize;
pub mod select;
pub mod single_flight;

// Re-exports for convenient access
pub use encode::{encode_grid, COMPONENTS_X, COMPONENTS_Y, HASH_LEN};
pub use processor::ProcessingPipeline;
pub use resize::{ImageResizer, PixelGrid, GRID_HEIGHT, GRID_WIDTH};
pub use select::select_pending;
pub use single_flight::SingleFlight;
