use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use half::f16;

use crate::gl_format::PixelFormat;

/// A single texel value. Components are stored little-endian.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Texel {
    R8(u8),
    Rgba8([u8; 4]),
    R16Float(f16),
    Rgba16Float([f16; 4]),
}

impl Texel {
    pub fn format(&self) -> PixelFormat {
        match self {
            Texel::R8(_) => PixelFormat::R8,
            Texel::Rgba8(_) => PixelFormat::Rgba8,
            Texel::R16Float(_) => PixelFormat::R16Float,
            Texel::Rgba16Float(_) => PixelFormat::Rgba16Float,
        }
    }

    pub(crate) fn write_to<W: Write>(&self, wtr: &mut W) -> io::Result<()> {
        match *self {
            Texel::R8(value) => wtr.write_u8(value),
            Texel::Rgba8(pixel) => wtr.write_all(&pixel),
            Texel::R16Float(value) => wtr.write_u16::<LittleEndian>(value.to_bits()),
            Texel::Rgba16Float(pixel) => {
                for value in pixel {
                    wtr.write_u16::<LittleEndian>(value.to_bits())?;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn read_from<R: Read>(format: PixelFormat, rdr: &mut R) -> io::Result<Texel> {
        let texel = match format {
            PixelFormat::R8 => Texel::R8(rdr.read_u8()?),
            PixelFormat::Rgba8 => {
                let mut pixel = [0u8; 4];
                rdr.read_exact(&mut pixel)?;
                Texel::Rgba8(pixel)
            }
            PixelFormat::R16Float => Texel::R16Float(f16::from_bits(rdr.read_u16::<LittleEndian>()?)),
            PixelFormat::Rgba16Float => {
                let mut pixel = [f16::ZERO; 4];
                for value in pixel.iter_mut() {
                    *value = f16::from_bits(rdr.read_u16::<LittleEndian>()?);
                }
                Texel::Rgba16Float(pixel)
            }
        };
        Ok(texel)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn half_float_is_little_endian() {
        let mut bytes = vec![];
        Texel::R16Float(f16::from_f32(1.0)).write_to(&mut bytes).unwrap();
        assert_eq!(bytes, vec![0x00, 0x3C]);
    }

    #[test]
    fn texel_sizes_match_format() {
        let texels = [
            Texel::R8(7),
            Texel::Rgba8([1, 2, 3, 4]),
            Texel::R16Float(f16::from_f32(-2.5)),
            Texel::Rgba16Float([f16::ONE, f16::ZERO, f16::NEG_ONE, f16::MAX]),
        ];
        for texel in texels {
            let mut bytes = vec![];
            texel.write_to(&mut bytes).unwrap();
            assert_eq!(bytes.len() as u32, texel.format().bytes_per_texel());
            let back = Texel::read_from(texel.format(), &mut Cursor::new(&bytes)).unwrap();
            assert_eq!(back, texel);
        }
    }
}
