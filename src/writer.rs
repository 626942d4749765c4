use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use half::f16;

use crate::error::{KtxError, Result};
use crate::gl_format::PixelFormat;
use crate::header::{ContainerHeader, Endianness};
use crate::pixel::Texel;

/// An uncompressed texture that can be filled texel by texel and written out
/// as a KTX 1.1 container.
///
/// Rows are tightly packed, the layout the loader walks for 2D levels. Image
/// bytes are written as they are held; only the header follows the byte
/// order chosen at write time.
#[derive(Clone, Debug)]
pub struct TextureKtx {
    header: ContainerHeader,
    level_images: Vec<u8>,
}

impl TextureKtx {
    /// Single-level texture, zero-filled. A zero `height` makes it 1D.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let header = ContainerHeader {
            pixel_width: width,
            pixel_height: height,
            ..ContainerHeader::uncompressed(format)
        };
        let len = width as usize * height.max(1) as usize * format.bytes_per_texel() as usize;
        TextureKtx {
            header,
            level_images: vec![0u8; len],
        }
    }

    /// Wraps an arbitrary header and the image data that follows its
    /// key/value block.
    pub fn from_parts(header: ContainerHeader, level_images: Vec<u8>) -> Self {
        TextureKtx {
            header,
            level_images,
        }
    }

    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    pub fn images(&self) -> &[u8] {
        &self.level_images
    }

    pub fn format(&self) -> Option<PixelFormat> {
        PixelFormat::from_gl(self.header.gl_type, self.header.gl_base_internal_format)
    }

    /// Byte range of texel (x, y) on the base level.
    fn texel_range(&self, x: u32, y: u32, format: PixelFormat) -> Result<std::ops::Range<usize>> {
        let width = self.header.pixel_width;
        let height = self.header.pixel_height.max(1);
        if x >= width || y >= height {
            return Err(KtxError::texel(format!(
                "({x}, {y}) outside {width}x{height} texture"
            )));
        }
        let size = format.bytes_per_texel() as usize;
        let start = (y as usize * width as usize + x as usize) * size;
        let end = start + size;
        if end > self.level_images.len() {
            return Err(KtxError::texel(format!(
                "({x}, {y}) past the end of the image data"
            )));
        }
        Ok(start..end)
    }

    fn checked_format(&self, expected: Option<PixelFormat>) -> Result<PixelFormat> {
        let format = self
            .format()
            .ok_or_else(|| KtxError::texel("texture format has no texel representation"))?;
        match expected {
            Some(expected) if expected != format => Err(KtxError::texel(format!(
                "{expected:?} texel written to {format:?} texture"
            ))),
            _ => Ok(format),
        }
    }

    pub fn write_texel(&mut self, x: u32, y: u32, texel: Texel) -> Result<()> {
        let format = self.checked_format(Some(texel.format()))?;
        let range = self.texel_range(x, y, format)?;
        texel.write_to(&mut &mut self.level_images[range])?;
        Ok(())
    }

    pub fn read_texel(&self, x: u32, y: u32) -> Result<Texel> {
        let format = self.checked_format(None)?;
        let range = self.texel_range(x, y, format)?;
        Ok(Texel::read_from(format, &mut Cursor::new(&self.level_images[range]))?)
    }

    pub fn write_f16(&mut self, x: u32, y: u32, value: f16) -> Result<()> {
        self.write_texel(x, y, Texel::R16Float(value))
    }

    pub fn read_f16(&self, x: u32, y: u32) -> Result<f16> {
        match self.read_texel(x, y)? {
            Texel::R16Float(value) => Ok(value),
            other => Err(KtxError::texel(format!("{:?} is not R16Float", other.format()))),
        }
    }

    pub fn write_pixel(&mut self, x: u32, y: u32, pixel: &[u8; 4]) -> Result<()> {
        self.write_texel(x, y, Texel::Rgba8(*pixel))
    }

    /// Header, a zeroed key/value block, then the image data.
    pub fn to_bytes(&self, endianness: Endianness) -> Vec<u8> {
        let mut bytes = self.header.to_bytes(endianness);
        bytes.resize(self.header.data_offset() as usize, 0);
        bytes.extend_from_slice(&self.level_images);
        bytes
    }

    pub fn write_to_ktx<P: AsRef<Path>>(&self, path: P, endianness: Endianness) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(&self.to_bytes(endianness))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, Recorder, TextureHandle};
    use crate::header::read_header;
    use crate::target::TextureTarget;
    use crate::texture::load_bytes;

    #[test]
    fn f16_texels() {
        let mut tex = TextureKtx::new(2, 2, PixelFormat::R16Float);
        tex.write_f16(1, 1, f16::from_f32(1500.0)).unwrap();
        assert_eq!(tex.read_f16(1, 1).unwrap(), f16::from_f32(1500.0));
        assert_eq!(tex.read_f16(0, 1).unwrap(), f16::ZERO);
        assert_eq!(&tex.images()[6..8], &f16::from_f32(1500.0).to_le_bytes());
    }

    #[test]
    fn rgba8_pixels() {
        let mut tex = TextureKtx::new(3, 2, PixelFormat::Rgba8);
        tex.write_pixel(2, 1, &[9, 8, 7, 6]).unwrap();
        assert_eq!(&tex.images()[20..24], &[9, 8, 7, 6]);
        assert_eq!(tex.read_texel(2, 1).unwrap(), Texel::Rgba8([9, 8, 7, 6]));
    }

    #[test]
    fn rejects_bad_access() {
        let mut tex = TextureKtx::new(2, 2, PixelFormat::Rgba8);
        assert!(matches!(tex.write_pixel(2, 0, &[0; 4]), Err(KtxError::Texel(_))));
        assert!(matches!(
            tex.write_f16(0, 0, f16::ONE),
            Err(KtxError::Texel(_))
        ));
        assert!(matches!(tex.read_f16(0, 0), Err(KtxError::Texel(_))));
    }

    #[test]
    fn serialised_layout() {
        let tex = TextureKtx::new(2, 2, PixelFormat::R8);
        let bytes = tex.to_bytes(Endianness::Little);
        assert_eq!(bytes.len(), 64 + 4);

        let with_metadata = TextureKtx::from_parts(
            ContainerHeader {
                key_value_byte_count: 8,
                ..*tex.header()
            },
            vec![1, 2, 3, 4],
        );
        let bytes = with_metadata.to_bytes(Endianness::Big);
        assert_eq!(bytes.len(), 64 + 8 + 4);
        assert_eq!(&bytes[72..], &[1, 2, 3, 4]);
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.ktx");
        let tex = TextureKtx::new(4, 4, PixelFormat::Rgba16Float);
        tex.write_to_ktx(&path, Endianness::Big).unwrap();
        assert_eq!(read_header(&path).unwrap(), *tex.header());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 64 + 128);
    }

    #[test]
    fn one_dimensional_texture_loads() {
        let mut tex = TextureKtx::new(4, 0, PixelFormat::R8);
        assert_eq!(tex.images().len(), 4);
        tex.write_texel(3, 0, Texel::R8(9)).unwrap();

        let mut backend = Recorder::new();
        load_bytes(&mut backend, &tex.to_bytes(Endianness::Little), None).unwrap();
        assert!(
            backend
                .calls
                .contains(&BackendCall::BindTexture(TextureHandle(1), TextureTarget::Texture1D))
        );
        let uploaded: Vec<usize> = backend
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::UploadRegion { len, .. } => Some(*len),
                _ => None,
            })
            .collect();
        assert_eq!(uploaded, [4]);
    }
}
