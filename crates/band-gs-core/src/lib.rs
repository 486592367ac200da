#![no_std]
//! Platform-agnostic host driver for the band-gs scanline rasterizer.
//!
//! Drawing calls are encoded into a compact binary command stream held in
//! one of two display lists; on commit the lists swap roles and the upload
//! scheduler streams the committed frame to the hardware band by band,
//! whenever the bus can take data.

pub mod gpu;

pub use gpu::renderer::{RenderError, Renderer, UploadStatus};
