//! Packed configuration register layouts.
//!
//! Both registers travel as a single 16-bit word and are always resent
//! whole: a setter rewrites its field in the shadow value and the encoder
//! emits the full word. Field offsets and widths are part of the wire
//! format and must not change.

use super::interface::{BlendFunc, TestFunc, TexEnvMode};

/// Config register 1: depth test, alpha test, and write masks.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfReg1(u16);

impl ConfReg1 {
    pub const ENABLE_DEPTH_TEST_OFFSET: usize = 0;
    pub const DEPTH_FUNC_OFFSET: usize = 1;
    pub const DEPTH_FUNC_MASK: u16 = 0x7;
    pub const ALPHA_FUNC_OFFSET: usize = 4;
    pub const ALPHA_FUNC_MASK: u16 = 0x7;
    pub const ALPHA_REF_OFFSET: usize = 7;
    pub const ALPHA_REF_MASK: u16 = 0xF;
    pub const DEPTH_MASK_OFFSET: usize = 11;
    pub const COLOR_MASK_A_OFFSET: usize = 12;
    pub const COLOR_MASK_B_OFFSET: usize = 13;
    pub const COLOR_MASK_G_OFFSET: usize = 14;
    pub const COLOR_MASK_R_OFFSET: usize = 15;

    pub fn set_enable_depth_test(&mut self, enable: bool) {
        self.set_bit(Self::ENABLE_DEPTH_TEST_OFFSET, enable);
    }

    pub fn set_depth_func(&mut self, func: TestFunc) {
        self.set_field(Self::DEPTH_FUNC_OFFSET, Self::DEPTH_FUNC_MASK, func as u16);
    }

    pub fn set_alpha_func(&mut self, func: TestFunc) {
        self.set_field(Self::ALPHA_FUNC_OFFSET, Self::ALPHA_FUNC_MASK, func as u16);
    }

    /// 4-bit alpha reference value; upper bits of `reference` are ignored.
    pub fn set_alpha_ref(&mut self, reference: u8) {
        self.set_field(Self::ALPHA_REF_OFFSET, Self::ALPHA_REF_MASK, reference as u16);
    }

    pub fn set_depth_mask(&mut self, enable: bool) {
        self.set_bit(Self::DEPTH_MASK_OFFSET, enable);
    }

    pub fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.set_bit(Self::COLOR_MASK_R_OFFSET, r);
        self.set_bit(Self::COLOR_MASK_G_OFFSET, g);
        self.set_bit(Self::COLOR_MASK_B_OFFSET, b);
        self.set_bit(Self::COLOR_MASK_A_OFFSET, a);
    }

    /// The full encoded register word.
    pub fn word(self) -> u16 {
        self.0
    }

    fn set_bit(&mut self, offset: usize, value: bool) {
        self.set_field(offset, 0x1, value as u16);
    }

    fn set_field(&mut self, offset: usize, mask: u16, value: u16) {
        self.0 = (self.0 & !(mask << offset)) | ((value & mask) << offset);
    }
}

/// Config register 2: texturing and blending.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfReg2(u16);

impl ConfReg2 {
    pub const PERSP_CORRECT_OFFSET: usize = 0;
    pub const TEX_ENV_FUNC_OFFSET: usize = 1;
    pub const TEX_ENV_FUNC_MASK: u16 = 0x7;
    pub const BLEND_SFACTOR_OFFSET: usize = 4;
    pub const BLEND_SFACTOR_MASK: u16 = 0xF;
    pub const BLEND_DFACTOR_OFFSET: usize = 8;
    pub const BLEND_DFACTOR_MASK: u16 = 0xF;
    pub const TEX_CLAMP_S_OFFSET: usize = 12;
    pub const TEX_CLAMP_T_OFFSET: usize = 13;

    pub fn set_perspective_correction(&mut self, enable: bool) {
        self.set_bit(Self::PERSP_CORRECT_OFFSET, enable);
    }

    pub fn set_tex_env_func(&mut self, mode: TexEnvMode) {
        self.set_field(Self::TEX_ENV_FUNC_OFFSET, Self::TEX_ENV_FUNC_MASK, mode as u16);
    }

    pub fn set_blend_sfactor(&mut self, factor: BlendFunc) {
        self.set_field(
            Self::BLEND_SFACTOR_OFFSET,
            Self::BLEND_SFACTOR_MASK,
            factor as u16,
        );
    }

    pub fn set_blend_dfactor(&mut self, factor: BlendFunc) {
        self.set_field(
            Self::BLEND_DFACTOR_OFFSET,
            Self::BLEND_DFACTOR_MASK,
            factor as u16,
        );
    }

    pub fn set_tex_clamp_s(&mut self, clamp: bool) {
        self.set_bit(Self::TEX_CLAMP_S_OFFSET, clamp);
    }

    pub fn set_tex_clamp_t(&mut self, clamp: bool) {
        self.set_bit(Self::TEX_CLAMP_T_OFFSET, clamp);
    }

    /// The full encoded register word.
    pub fn word(self) -> u16 {
        self.0
    }

    fn set_bit(&mut self, offset: usize, value: bool) {
        self.set_field(offset, 0x1, value as u16);
    }

    fn set_field(&mut self, offset: usize, mask: u16, value: u16) {
        self.0 = (self.0 & !(mask << offset)) | ((value & mask) << offset);
    }
}
