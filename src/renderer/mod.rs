//! Artifact renderer.
//!
//! Pure, synchronous compositing: background bytes in, PNG bytes out. No
//! randomness and no timestamps end up in the raster, so rendering is
//! deterministic for identical inputs.

pub mod compose;

pub use compose::{render, RenderError};
