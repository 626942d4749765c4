use crate::error::{FormatError, Result};
use crate::gl_format;
use crate::header::ContainerHeader;

/// Kind of texture a container holds, decided once from its dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
    CubeMap,
    CubeMapArray,
}

impl TextureTarget {
    pub fn gl_enum(self) -> u32 {
        match self {
            TextureTarget::Texture1D => gl_format::TEXTURE_1D,
            TextureTarget::Texture1DArray => gl_format::TEXTURE_1D_ARRAY,
            TextureTarget::Texture2D => gl_format::TEXTURE_2D,
            TextureTarget::Texture2DArray => gl_format::TEXTURE_2D_ARRAY,
            TextureTarget::Texture3D => gl_format::TEXTURE_3D,
            TextureTarget::CubeMap => gl_format::TEXTURE_CUBE_MAP,
            TextureTarget::CubeMapArray => gl_format::TEXTURE_CUBE_MAP_ARRAY,
        }
    }

    /// Which `TexStorage{1,2,3}D` family allocates this target.
    pub fn storage_dimensions(self) -> u8 {
        match self {
            TextureTarget::Texture1D => 1,
            TextureTarget::Texture1DArray | TextureTarget::Texture2D | TextureTarget::CubeMap => 2,
            TextureTarget::Texture2DArray
            | TextureTarget::Texture3D
            | TextureTarget::CubeMapArray => 3,
        }
    }
}

/// Picks the texture target for a header.
///
/// A zero width, or a depth without a height, is rejected with
/// [`FormatError::InvalidDimension`].
pub fn classify_target(header: &ContainerHeader) -> Result<TextureTarget> {
    if header.pixel_width == 0 || (header.pixel_height == 0 && header.pixel_depth != 0) {
        return Err(FormatError::InvalidDimension.into());
    }

    let target = match (
        header.pixel_height,
        header.pixel_depth,
        header.array_elements,
        header.faces,
    ) {
        (0, _, 0, _) => TextureTarget::Texture1D,
        (0, _, _, _) => TextureTarget::Texture1DArray,
        (_, 0, 0, 0) => TextureTarget::Texture2D,
        (_, 0, 0, _) => TextureTarget::CubeMap,
        (_, 0, _, 0) => TextureTarget::Texture2DArray,
        (_, 0, _, _) => TextureTarget::CubeMapArray,
        (_, _, _, _) => TextureTarget::Texture3D,
    };
    Ok(target)
}
