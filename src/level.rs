use crate::error::{FormatError, Result};
use crate::gl_format::channel_count;
use crate::header::ContainerHeader;
use crate::target::TextureTarget;

/// One upload worth of image data: a whole mip level, or a single face of a
/// cube map level. Offsets are relative to the first byte after the
/// key/value block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MipLevelDescriptor {
    pub level_index: u32,
    pub face: Option<u32>,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub byte_offset: u64,
    pub byte_length: u64,
}

fn bytes_per_texel(header: &ContainerHeader) -> Result<u64> {
    let channels = channel_count(header.gl_base_internal_format)?;
    Ok(u64::from(header.gl_type_size) * u64::from(channels))
}

fn aligned_stride(bytes_per_texel: u64, width: u32, alignment: u32) -> Result<u64> {
    if alignment == 0 {
        return Err(FormatError::BadAlignment(alignment).into());
    }
    let alignment = u64::from(alignment);
    bytes_per_texel
        .checked_mul(u64::from(width))
        .and_then(|stride| stride.div_ceil(alignment).checked_mul(alignment))
        .ok_or_else(|| FormatError::Overflow.into())
}

/// Cube map faces pad their rows to 4 bytes, unlike the rest of the walk.
const FACE_ROW_ALIGNMENT: u32 = 4;

fn padded_face_size(bytes_per_texel: u64, width: u32, height: u32) -> Result<u64> {
    aligned_stride(bytes_per_texel, width, FACE_ROW_ALIGNMENT)?
        .checked_mul(u64::from(height))
        .ok_or_else(|| FormatError::Overflow.into())
}

/// Bytes per row of `width` texels, rounded up to a multiple of `alignment`.
/// A zero alignment is rejected.
pub fn row_stride(header: &ContainerHeader, width: u32, alignment: u32) -> Result<u64> {
    aligned_stride(bytes_per_texel(header)?, width, alignment)
}

/// Size of one base-level cube map face, with rows padded to 4 bytes.
pub fn face_size(header: &ContainerHeader) -> Result<u64> {
    face_size_at(header, header.pixel_width, header.pixel_height)
}

/// Size of one cube map face at the given level dimensions, rows padded to 4 bytes.
pub fn face_size_at(header: &ContainerHeader, width: u32, height: u32) -> Result<u64> {
    padded_face_size(bytes_per_texel(header)?, width, height)
}

/// Starts a walk over the image data of `header`, laid out for `target`.
pub fn walk_mip_chain(header: &ContainerHeader, target: TextureTarget) -> Result<MipChain> {
    if header.is_compressed() {
        return Err(FormatError::Compressed.into());
    }
    if target == TextureTarget::CubeMap && header.faces > 6 {
        return Err(FormatError::InvalidDimension.into());
    }
    Ok(MipChain {
        target,
        bytes_per_texel: bytes_per_texel(header)?,
        levels: header.level_count(),
        layers: header.array_elements,
        faces: header.faces,
        level: 0,
        face: 0,
        width: header.pixel_width.max(1),
        height: header.pixel_height.max(1),
        depth: header.pixel_depth.max(1),
        cursor: 0,
        failed: false,
    })
}

/// Lazy walk over the mip levels of a container, highest resolution first.
///
/// Yields one descriptor per level, or `faces` descriptors per level for cube
/// maps. Stops after the first error.
#[derive(Clone, Debug)]
pub struct MipChain {
    target: TextureTarget,
    bytes_per_texel: u64,
    levels: u32,
    layers: u32,
    faces: u32,
    level: u32,
    face: u32,
    width: u32,
    height: u32,
    depth: u32,
    cursor: u64,
    failed: bool,
}

impl MipChain {
    /// Upload extent of the current level.
    fn extent(&self) -> Result<(u32, u32, u32)> {
        let extent = match self.target {
            TextureTarget::Texture1D => (self.width, 1, 1),
            TextureTarget::Texture1DArray => (self.width, self.layers, 1),
            TextureTarget::Texture2D | TextureTarget::CubeMap => (self.width, self.height, 1),
            TextureTarget::Texture2DArray => (self.width, self.height, self.layers),
            TextureTarget::Texture3D => (self.width, self.height, self.depth),
            TextureTarget::CubeMapArray => {
                let layer_faces = self
                    .faces
                    .checked_mul(self.layers)
                    .ok_or(FormatError::Overflow)?;
                (self.width, self.height, layer_faces)
            }
        };
        Ok(extent)
    }

    fn next_level(&mut self) {
        self.level += 1;
        self.width = (self.width >> 1).max(1);
        self.height = (self.height >> 1).max(1);
        self.depth = (self.depth >> 1).max(1);
    }

    fn step(&mut self) -> Result<MipLevelDescriptor> {
        let (width, height, depth) = self.extent()?;

        if self.target == TextureTarget::CubeMap {
            let face_size = padded_face_size(self.bytes_per_texel, width, height)?;
            let byte_offset = face_size
                .checked_mul(u64::from(self.face))
                .and_then(|offset| offset.checked_add(self.cursor))
                .ok_or(FormatError::Overflow)?;
            let descriptor = MipLevelDescriptor {
                level_index: self.level,
                face: Some(self.face),
                width,
                height,
                depth,
                byte_offset,
                byte_length: face_size,
            };
            self.face += 1;
            if self.face >= self.faces {
                self.cursor = byte_offset
                    .checked_add(face_size)
                    .ok_or(FormatError::Overflow)?;
                self.face = 0;
                self.next_level();
            }
            return Ok(descriptor);
        }

        let byte_length = aligned_stride(self.bytes_per_texel, width, 1)?
            .checked_mul(u64::from(height))
            .and_then(|len| len.checked_mul(u64::from(depth)))
            .ok_or(FormatError::Overflow)?;
        let descriptor = MipLevelDescriptor {
            level_index: self.level,
            face: None,
            width,
            height,
            depth,
            byte_offset: self.cursor,
            byte_length,
        };
        self.cursor = self
            .cursor
            .checked_add(byte_length)
            .ok_or(FormatError::Overflow)?;
        self.next_level();
        Ok(descriptor)
    }
}

impl Iterator for MipChain {
    type Item = Result<MipLevelDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.level >= self.levels {
            return None;
        }
        let item = self.step();
        self.failed = item.is_err();
        Some(item)
    }
}

impl std::iter::FusedIterator for MipChain {}
