//! Binary command codec for the rasterizer's wire protocol.
//!
//! Every record starts with a 16-bit command word: a 4-bit op class in the
//! top nibble and a 12-bit immediate below it. The op class alone decides
//! the type (and therefore size) of the payload that follows, which lets a
//! re-parser skip records it does not understand.

use glam::IVec4;

/// A 16-bit tagged command word.
pub type CommandWord = u16;

/// Byte alignment of every record slot on the 32-bit bus.
pub const BUS_ALIGN: usize = 4;

pub const OP_MASK: CommandWord = 0xF000;
pub const IMM_MASK: CommandWord = 0x0FFF;

pub const OP_NOP: CommandWord = 0x0000;
pub const OP_TEXTURE_STREAM: CommandWord = 0x1000;
pub const OP_SET_REG: CommandWord = 0x2000;
pub const OP_FRAMEBUFFER: CommandWord = 0x3000;
pub const OP_TRIANGLE_STREAM: CommandWord = 0x4000;

/// No-operation record. Consumes a slot, carries nothing.
pub const NOP: CommandWord = OP_NOP;

// SET_REG immediates select the destination register.
pub const SET_CLEAR_COLOR: CommandWord = OP_SET_REG;
pub const SET_CLEAR_DEPTH: CommandWord = OP_SET_REG | 0x001;
pub const SET_CONF_REG1: CommandWord = OP_SET_REG | 0x002;
pub const SET_CONF_REG2: CommandWord = OP_SET_REG | 0x003;
pub const SET_TEX_ENV_COLOR: CommandWord = OP_SET_REG | 0x004;

// FRAMEBUFFER immediates form a bitmask: operation x target buffers.
pub const FRAMEBUFFER_COMMIT: CommandWord = OP_FRAMEBUFFER | 0x001;
pub const FRAMEBUFFER_MEMSET: CommandWord = OP_FRAMEBUFFER | 0x002;
pub const FRAMEBUFFER_COLOR: CommandWord = OP_FRAMEBUFFER | 0x010;
pub const FRAMEBUFFER_DEPTH: CommandWord = OP_FRAMEBUFFER | 0x020;

/// The 4-bit discriminator in the top nibble of a command word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpClass {
    Nop,
    TextureStream,
    SetReg,
    Framebuffer,
    TriangleStream,
}

impl OpClass {
    /// Decode the op class of a command word. Unknown classes yield `None`
    /// and must be treated as zero-payload records.
    pub fn of(word: CommandWord) -> Option<Self> {
        match word & OP_MASK {
            OP_NOP => Some(OpClass::Nop),
            OP_TEXTURE_STREAM => Some(OpClass::TextureStream),
            OP_SET_REG => Some(OpClass::SetReg),
            OP_FRAMEBUFFER => Some(OpClass::Framebuffer),
            OP_TRIANGLE_STREAM => Some(OpClass::TriangleStream),
            _ => None,
        }
    }
}

/// Extract the 12-bit immediate of a command word.
pub fn imm(word: CommandWord) -> u16 {
    word & IMM_MASK
}

/// Build a triangle-stream command word. The immediate carries the aligned
/// byte size of the rasterized-triangle payload so that a parser can skip
/// the record without knowing its layout.
pub fn triangle_stream(payload_len: usize) -> CommandWord {
    debug_assert!(payload_len <= IMM_MASK as usize);
    OP_TRIANGLE_STREAM | (payload_len as CommandWord & IMM_MASK)
}

/// Size in bytes of the payload that follows a command word *on the wire*.
///
/// Texture pixels are streamed out-of-band, so a texture-stream record has
/// no wire payload. Unknown op classes are defined to carry nothing.
pub fn wire_payload_size(word: CommandWord) -> usize {
    match OpClass::of(word) {
        Some(OpClass::TriangleStream) => imm(word) as usize,
        Some(OpClass::SetReg) => BUS_ALIGN,
        Some(OpClass::Nop) | Some(OpClass::Framebuffer) | Some(OpClass::TextureStream) | None => 0,
    }
}

/// Supported square texture geometries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextureSize {
    S32,
    S64,
    S128,
    S256,
}

impl TextureSize {
    /// Classify a texture request. Non-square or unsupported edge lengths
    /// are rejected.
    pub fn from_dimensions(width: u16, height: u16) -> Option<Self> {
        if width != height {
            return None;
        }
        match width {
            32 => Some(TextureSize::S32),
            64 => Some(TextureSize::S64),
            128 => Some(TextureSize::S128),
            256 => Some(TextureSize::S256),
            _ => None,
        }
    }

    /// The texture-stream command word; the immediate encodes the
    /// width/height class.
    pub fn word(self) -> CommandWord {
        match self {
            TextureSize::S32 => OP_TEXTURE_STREAM | 0x011,
            TextureSize::S64 => OP_TEXTURE_STREAM | 0x022,
            TextureSize::S128 => OP_TEXTURE_STREAM | 0x044,
            TextureSize::S256 => OP_TEXTURE_STREAM | 0x088,
        }
    }

    /// Total pixel count of the texture.
    pub fn pixel_count(self) -> usize {
        match self {
            TextureSize::S32 => 32 * 32,
            TextureSize::S64 => 64 * 64,
            TextureSize::S128 => 128 * 128,
            TextureSize::S256 => 256 * 256,
        }
    }
}

/// Pack an 8-bit-per-channel color into the wire RGBA4444 format:
/// A in [3:0], B in [7:4], G in [11:8], R in [15:12].
pub fn pack_rgba4444(color: IVec4) -> u16 {
    let c = color >> 4i32;
    ((c.w as u16) & 0xF)
        | (((c.z as u16) & 0xF) << 4)
        | (((c.y as u16) & 0xF) << 8)
        | (((c.x as u16) & 0xF) << 12)
}
