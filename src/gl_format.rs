//! OpenGL enumerants used by KTX 1.1 headers.

use crate::error::{FormatError, Result};

// Base/pixel formats
pub const RED: u32 = 0x1903;
pub const RG: u32 = 0x8227;
pub const RGB: u32 = 0x1907;
pub const BGR: u32 = 0x80E0;
pub const RGBA: u32 = 0x1908;
pub const BGRA: u32 = 0x80E1;

// Element types
pub const UNSIGNED_BYTE: u32 = 0x1401;
pub const FLOAT: u32 = 0x1406;
pub const HALF_FLOAT: u32 = 0x140B;

// Sized internal formats
pub const R8: u32 = 0x8229;
pub const RGBA8: u32 = 0x8058;
pub const R16F: u32 = 0x822D;
pub const RGBA16F: u32 = 0x881A;

// Texture targets
pub const TEXTURE_1D: u32 = 0x0DE0;
pub const TEXTURE_2D: u32 = 0x0DE1;
pub const TEXTURE_3D: u32 = 0x806F;
pub const TEXTURE_1D_ARRAY: u32 = 0x8C18;
pub const TEXTURE_2D_ARRAY: u32 = 0x8C1A;
pub const TEXTURE_CUBE_MAP: u32 = 0x8513;
pub const TEXTURE_CUBE_MAP_POSITIVE_X: u32 = 0x8515;
pub const TEXTURE_CUBE_MAP_ARRAY: u32 = 0x9009;

/// Number of channels implied by a base internal format.
pub fn channel_count(base_internal_format: u32) -> Result<u32> {
    match base_internal_format {
        RED => Ok(1),
        RG => Ok(2),
        RGB | BGR => Ok(3),
        RGBA | BGRA => Ok(4),
        other => Err(FormatError::UnsupportedFormat(other).into()),
    }
}

/// Uncompressed formats [`TextureKtx`](crate::writer::TextureKtx) knows how to write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    R8,
    Rgba8,
    R16Float,
    Rgba16Float,
}

impl PixelFormat {
    /// Matches a header's type and base internal format against the known formats.
    pub fn from_gl(gl_type: u32, base_internal_format: u32) -> Option<Self> {
        match (gl_type, base_internal_format) {
            (UNSIGNED_BYTE, RED) => Some(PixelFormat::R8),
            (UNSIGNED_BYTE, RGBA) => Some(PixelFormat::Rgba8),
            (HALF_FLOAT, RED) => Some(PixelFormat::R16Float),
            (HALF_FLOAT, RGBA) => Some(PixelFormat::Rgba16Float),
            _ => None,
        }
    }

    pub fn gl_type(self) -> u32 {
        match self {
            PixelFormat::R8 | PixelFormat::Rgba8 => UNSIGNED_BYTE,
            PixelFormat::R16Float | PixelFormat::Rgba16Float => HALF_FLOAT,
        }
    }

    /// Size in bytes of one channel component.
    pub fn type_size(self) -> u32 {
        match self {
            PixelFormat::R8 | PixelFormat::Rgba8 => 1,
            PixelFormat::R16Float | PixelFormat::Rgba16Float => 2,
        }
    }

    pub fn format(self) -> u32 {
        match self {
            PixelFormat::R8 | PixelFormat::R16Float => RED,
            PixelFormat::Rgba8 | PixelFormat::Rgba16Float => RGBA,
        }
    }

    pub fn internal_format(self) -> u32 {
        match self {
            PixelFormat::R8 => R8,
            PixelFormat::Rgba8 => RGBA8,
            PixelFormat::R16Float => R16F,
            PixelFormat::Rgba16Float => RGBA16F,
        }
    }

    pub fn channels(self) -> u32 {
        match self {
            PixelFormat::R8 | PixelFormat::R16Float => 1,
            PixelFormat::Rgba8 | PixelFormat::Rgba16Float => 4,
        }
    }

    pub fn bytes_per_texel(self) -> u32 {
        self.type_size() * self.channels()
    }
}
