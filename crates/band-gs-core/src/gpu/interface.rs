//! The drawing capability boundary: the `Render` trait and the GL-flavored
//! state enums it speaks. Applications should depend on this trait, not on
//! a concrete renderer.

use glam::{IVec4, Vec2, Vec4};

/// Depth / alpha comparison function (3-bit wire field).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TestFunc {
    Never = 0,
    Less = 1,
    Equal = 2,
    Lequal = 3,
    Greater = 4,
    Notequal = 5,
    Gequal = 6,
    Always = 7,
}

/// Blend factor (4-bit wire field).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlendFunc {
    Zero = 0,
    One = 1,
    DstColor = 2,
    SrcColor = 3,
    OneMinusDstColor = 4,
    OneMinusSrcColor = 5,
    SrcAlpha = 6,
    OneMinusSrcAlpha = 7,
    DstAlpha = 8,
    OneMinusDstAlpha = 9,
    SrcAlphaSaturate = 10,
}

/// Logical pixel operation. Declared for interface completeness; the
/// hardware has no logic-op slot and `set_logic_op` always fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogicOp {
    Clear = 0,
    And = 1,
    AndReverse = 2,
    Copy = 3,
    AndInverted = 4,
    Noop = 5,
    Xor = 6,
    Or = 7,
    Nor = 8,
    Equiv = 9,
    Invert = 10,
    OrReverse = 11,
    CopyInverted = 12,
    OrInverted = 13,
    Nand = 14,
    Set = 15,
}

/// Texture environment target. Only `TextureEnv` exists on this hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TexEnvTarget {
    TextureEnv,
}

/// Texture environment parameter name. Only the mode is configurable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TexEnvParamName {
    TextureEnvMode,
}

/// Texture environment function (3-bit wire field).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TexEnvMode {
    Disable = 0,
    Replace = 1,
    Modulate = 2,
    Decal = 3,
    Blend = 4,
    Add = 5,
}

/// Texture coordinate wrap mode per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextureWrapMode {
    Repeat,
    ClampToEdge,
}

/// The full set of drawing and state-setting entry points.
///
/// Every operation returns a status instead of panicking: capacity
/// exhaustion and unsupported configurations are ordinary, recoverable
/// errors and leave the command stream exactly as it was.
pub trait Render {
    type Error: core::fmt::Debug;

    /// Draw a flat-colored, optionally textured triangle. A triangle that
    /// is entirely invisible succeeds without encoding anything.
    #[allow(clippy::too_many_arguments)]
    fn draw_triangle(
        &mut self,
        v0: Vec4,
        v1: Vec4,
        v2: Vec4,
        st0: Vec2,
        st1: Vec2,
        st2: Vec2,
        color: IVec4,
    ) -> Result<(), Self::Error>;

    /// Bind a texture for subsequent triangles. Only square textures of
    /// 32/64/128/256 pixels are supported. Pixels are streamed from the
    /// caller's memory during upload, not copied into the display list.
    fn use_texture(
        &mut self,
        pixels: &'static [u16],
        width: u16,
        height: u16,
    ) -> Result<(), Self::Error>;

    /// Clear the selected framebuffers. Selecting neither degrades to a
    /// no-op record that still occupies list space.
    fn clear(&mut self, color_buffer: bool, depth_buffer: bool) -> Result<(), Self::Error>;

    fn set_clear_color(&mut self, color: IVec4) -> Result<(), Self::Error>;
    fn set_clear_depth(&mut self, depth: u16) -> Result<(), Self::Error>;
    fn set_depth_mask(&mut self, enable: bool) -> Result<(), Self::Error>;
    fn enable_depth_test(&mut self, enable: bool) -> Result<(), Self::Error>;
    fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) -> Result<(), Self::Error>;
    fn set_depth_func(&mut self, func: TestFunc) -> Result<(), Self::Error>;
    fn set_alpha_func(&mut self, func: TestFunc, reference: u8) -> Result<(), Self::Error>;
    fn set_tex_env(
        &mut self,
        target: TexEnvTarget,
        pname: TexEnvParamName,
        mode: TexEnvMode,
    ) -> Result<(), Self::Error>;
    fn set_blend_func(&mut self, sfactor: BlendFunc, dfactor: BlendFunc)
        -> Result<(), Self::Error>;
    fn set_logic_op(&mut self, op: LogicOp) -> Result<(), Self::Error>;
    fn set_tex_env_color(&mut self, color: IVec4) -> Result<(), Self::Error>;
    fn set_texture_wrap_mode_s(&mut self, mode: TextureWrapMode) -> Result<(), Self::Error>;
    fn set_texture_wrap_mode_t(&mut self, mode: TextureWrapMode) -> Result<(), Self::Error>;

    /// End the current frame: append the frame-end marker, wait for the
    /// previous frame to drain, swap display lists, and kick off the upload.
    fn commit(&mut self) -> Result<(), Self::Error>;
}
