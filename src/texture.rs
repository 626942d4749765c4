use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::backend::{CubeFace, Extent, RegionTarget, TextureBackend, TextureHandle, UploadRegion};
use crate::error::{FormatError, Result};
use crate::header::{ContainerHeader, read_header};
use crate::level::walk_mip_chain;
use crate::target::{TextureTarget, classify_target};

/// Loads the KTX file at `path` into a texture.
///
/// Uses `texture` when given, otherwise asks the backend for a new one. When
/// the file carries a single mip level the backend is asked to generate the
/// rest.
pub fn load<B, P>(backend: &mut B, path: P, texture: Option<TextureHandle>) -> Result<TextureHandle>
where
    B: TextureBackend + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let header = read_header(path)?;
    let data = fs::read(path)?;
    debug!(path = %path.display(), len = data.len(), "read KTX file");
    upload(backend, &header, &data, texture)
}

/// Same as [`load`] for a container already in memory.
pub fn load_bytes<B>(
    backend: &mut B,
    bytes: &[u8],
    texture: Option<TextureHandle>,
) -> Result<TextureHandle>
where
    B: TextureBackend + ?Sized,
{
    let header = ContainerHeader::decode(bytes)?;
    upload(backend, &header, bytes, texture)
}

fn out_of_bounds(data: &[u8], offset: u64, length: u64) -> FormatError {
    FormatError::OutOfBounds {
        offset,
        length,
        available: data.len() as u64,
    }
}

/// `length` bytes of `data` at `offset`, or `OutOfBounds`.
fn region(data: &[u8], offset: u64, length: u64) -> Result<&[u8]> {
    let start = usize::try_from(offset).map_err(|_| out_of_bounds(data, offset, length))?;
    let len = usize::try_from(length).map_err(|_| out_of_bounds(data, offset, length))?;
    start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| out_of_bounds(data, offset, length).into())
}

/// Base level extent handed to `allocate_storage`.
fn storage_extent(header: &ContainerHeader, target: TextureTarget) -> Result<Extent> {
    let (width, height) = (header.pixel_width, header.pixel_height);
    let extent = match target {
        TextureTarget::Texture1D => Extent::new(width, 1, 1),
        TextureTarget::Texture1DArray => Extent::new(width, header.array_elements, 1),
        TextureTarget::Texture2D | TextureTarget::CubeMap => Extent::new(width, height, 1),
        TextureTarget::Texture2DArray => Extent::new(width, height, header.array_elements),
        TextureTarget::Texture3D => Extent::new(width, height, header.pixel_depth),
        TextureTarget::CubeMapArray => {
            let layer_faces = header
                .faces
                .checked_mul(header.array_elements)
                .ok_or(FormatError::Overflow)?;
            Extent::new(width, height, layer_faces)
        }
    };
    Ok(extent)
}

fn upload<B>(
    backend: &mut B,
    header: &ContainerHeader,
    file: &[u8],
    texture: Option<TextureHandle>,
) -> Result<TextureHandle>
where
    B: TextureBackend + ?Sized,
{
    let data_offset = header.data_offset();
    let payload = usize::try_from(data_offset)
        .ok()
        .and_then(|start| file.get(start..))
        .ok_or_else(|| out_of_bounds(file, data_offset, 0))?;

    let target = classify_target(header)?;
    let chain = walk_mip_chain(header, target)?;
    let levels = header.level_count();
    let extent = storage_extent(header, target)?;

    let handle = match texture {
        Some(handle) => handle,
        None => backend.create_texture()?,
    };
    backend.bind_texture(handle, target)?;

    debug!(?target, levels, ?extent, "allocating texture storage");
    backend.allocate_storage(handle, target, levels, header.gl_internal_format, extent)?;

    for descriptor in chain {
        let descriptor = descriptor?;
        let data = region(payload, descriptor.byte_offset, descriptor.byte_length)?;
        let region_target = match descriptor.face {
            Some(index) => RegionTarget::CubeFace(
                CubeFace::from_index(index).ok_or(FormatError::InvalidDimension)?,
            ),
            None => RegionTarget::Whole(target),
        };
        trace!(
            level = descriptor.level_index,
            face = ?descriptor.face,
            offset = descriptor.byte_offset,
            len = descriptor.byte_length,
            "uploading region"
        );
        backend.upload_region(
            handle,
            &UploadRegion {
                target: region_target,
                level: descriptor.level_index,
                x: 0,
                y: 0,
                z: 0,
                extent: Extent::new(descriptor.width, descriptor.height, descriptor.depth),
                format: header.gl_format,
                gl_type: header.gl_type,
                data,
            },
        )?;
    }

    if levels == 1 {
        debug!(?target, "single mip level, generating mipmaps");
        backend.generate_mipmaps(handle, target)?;
    }

    Ok(handle)
}
