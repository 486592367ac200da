//! The rasterization oracle boundary.
//!
//! The geometric math (clipping, projection, edge setup) lives outside this
//! crate. The driver only needs two things from it: a fixed-layout triangle
//! payload it can move through display lists byte-for-byte, and the two
//! oracle operations below.

use glam::{Vec2, Vec4};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// One rasterizer-ready triangle, as it travels on the wire.
///
/// Produced once per draw call; the upload scheduler later re-derives the
/// per-band variant of this payload with [`Rasterizer::calc_line_increment`]
/// instead of storing one copy per band. The layout is part of the wire
/// format: 96 bytes, 4-byte aligned, no padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RasterizedTriangle {
    /// Baked-in flat color, RGBA4444.
    pub static_color: u16,
    /// First screen row touched by the triangle (inclusive).
    pub bb_start_y: u16,
    /// Last screen row touched by the triangle (inclusive).
    pub bb_end_y: u16,
    /// Horizontal bounding extent.
    pub bb_start_x: u16,
    pub bb_end_x: u16,
    padding: u16,
    /// Edge-weight start values at the bounding box origin.
    pub w_init: [i32; 3],
    /// Edge-weight increments per pixel step in x.
    pub w_inc_x: [i32; 3],
    /// Edge-weight increments per pixel step in y.
    pub w_inc_y: [i32; 3],
    /// Perspective texture coordinate (s/w, t/w, 1/w) start values.
    pub tex_stq_init: [f32; 3],
    pub tex_stq_inc_x: [f32; 3],
    pub tex_stq_inc_y: [f32; 3],
    /// Depth plane start value and increments.
    pub depth_w_init: f32,
    pub depth_w_inc_x: f32,
    pub depth_w_inc_y: f32,
}

/// Oracle interface implemented by the rasterization math.
///
/// Both operations are pure set-up computations; neither touches hardware.
pub trait Rasterizer {
    /// Clip, project, and set up one triangle. Returns false when the
    /// triangle is entirely invisible, in which case `out` holds nothing
    /// useful and no record should be encoded.
    fn rasterize(
        out: &mut RasterizedTriangle,
        v0: Vec4,
        st0: Vec2,
        v1: Vec4,
        st1: Vec2,
        v2: Vec4,
        st2: Vec2,
    ) -> bool;

    /// Re-derive `tri`'s interpolation start values for the screen rows
    /// `[row_start, row_end)` of one display band. Returns false when the
    /// triangle does not intersect the band; the record is then dropped for
    /// that band only.
    fn calc_line_increment(
        out: &mut RasterizedTriangle,
        tri: &RasterizedTriangle,
        row_start: u16,
        row_end: u16,
    ) -> bool;
}
