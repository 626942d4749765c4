use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use field_offset::{FieldOffset, offset_of};
use tracing::{debug, warn};

use crate::error::{FormatError, Result};
use crate::gl_format::PixelFormat;

/// `«KTX 11»\r\n\x1A\n`
pub const IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

/// Size of the fixed header on disk.
pub const HEADER_LEN: usize = 64;

/// Endianness field as written by a host with the same byte order as the reader.
pub const ENDIAN_NATIVE: u32 = 0x04030201;
/// Endianness field as seen when every header field needs swapping.
pub const ENDIAN_SWAPPED: u32 = 0x01020304;

/// Byte order of the multi-byte fields of a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// The 64-byte KTX 1.1 header. Field order and offsets match the file.
///
/// Once decoded every field is in host order and `endianness` holds
/// [`ENDIAN_NATIVE`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct ContainerHeader {
    pub identifier: [u8; 12],
    pub endianness: u32,
    pub gl_type: u32,
    pub gl_type_size: u32,
    pub gl_format: u32,
    pub gl_internal_format: u32,
    pub gl_base_internal_format: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub pixel_depth: u32,
    pub array_elements: u32,
    pub faces: u32,
    pub mip_levels: u32,
    pub key_value_byte_count: u32,
}

/// Every `u32` field after the identifier, in file order. Each one is read and
/// swapped on its own, so adding a field of another width means adding
/// another table rather than changing how these are handled.
fn u32_fields() -> [FieldOffset<ContainerHeader, u32>; 13] {
    [
        offset_of!(ContainerHeader => endianness),
        offset_of!(ContainerHeader => gl_type),
        offset_of!(ContainerHeader => gl_type_size),
        offset_of!(ContainerHeader => gl_format),
        offset_of!(ContainerHeader => gl_internal_format),
        offset_of!(ContainerHeader => gl_base_internal_format),
        offset_of!(ContainerHeader => pixel_width),
        offset_of!(ContainerHeader => pixel_height),
        offset_of!(ContainerHeader => pixel_depth),
        offset_of!(ContainerHeader => array_elements),
        offset_of!(ContainerHeader => faces),
        offset_of!(ContainerHeader => mip_levels),
        offset_of!(ContainerHeader => key_value_byte_count),
    ]
}

fn read_u32_at<E: ByteOrder>(bytes: &[u8], offset: usize) -> Result<u32> {
    let mut rdr = Cursor::new(&bytes[offset..offset + 4]);
    Ok(rdr.read_u32::<E>()?)
}

impl ContainerHeader {
    /// Header for an uncompressed format with every dimension left at zero.
    pub fn uncompressed(format: PixelFormat) -> Self {
        ContainerHeader {
            identifier: IDENTIFIER,
            endianness: ENDIAN_NATIVE,
            gl_type: format.gl_type(),
            gl_type_size: format.type_size(),
            gl_format: format.format(),
            gl_internal_format: format.internal_format(),
            gl_base_internal_format: format.format(),
            mip_levels: 1,
            ..Default::default()
        }
    }

    /// Decodes the first [`HEADER_LEN`] bytes of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(FormatError::TooShort {
                expected: HEADER_LEN,
                actual: bytes.len(),
            }
            .into());
        }
        let bytes = &bytes[..HEADER_LEN];

        if bytes[..IDENTIFIER.len()] != IDENTIFIER {
            return Err(FormatError::BadMagic.into());
        }

        let sentinel_at = offset_of!(ContainerHeader => endianness).get_byte_offset();
        let header = match read_u32_at::<LittleEndian>(bytes, sentinel_at)? {
            ENDIAN_NATIVE => Self::decode_fields::<LittleEndian>(bytes)?,
            ENDIAN_SWAPPED => {
                warn!("big-endian KTX header, swapping fields");
                Self::decode_fields::<BigEndian>(bytes)?
            }
            other => return Err(FormatError::BadEndianness(other).into()),
        };
        debug!(?header, "decoded KTX header");
        Ok(header)
    }

    fn decode_fields<E: ByteOrder>(bytes: &[u8]) -> Result<Self> {
        let mut header = ContainerHeader {
            identifier: IDENTIFIER,
            ..Default::default()
        };
        for field in u32_fields() {
            *field.apply_mut(&mut header) = read_u32_at::<E>(bytes, field.get_byte_offset())?;
        }
        Ok(header)
    }

    /// Encodes the header in the given byte order. The identifier is written
    /// as-is and the endianness field always carries [`ENDIAN_NATIVE`].
    pub fn to_bytes(&self, endianness: Endianness) -> Vec<u8> {
        match endianness {
            Endianness::Little => self.encode_fields::<LittleEndian>(),
            Endianness::Big => self.encode_fields::<BigEndian>(),
        }
    }

    fn encode_fields<E: ByteOrder>(&self) -> Vec<u8> {
        let normalized = ContainerHeader {
            endianness: ENDIAN_NATIVE,
            ..*self
        };
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[..IDENTIFIER.len()].copy_from_slice(&self.identifier);
        for field in u32_fields() {
            let offset = field.get_byte_offset();
            E::write_u32(&mut bytes[offset..offset + 4], *field.apply(&normalized));
        }
        bytes
    }

    /// Number of mip levels to allocate; a stored zero means one.
    pub fn level_count(&self) -> u32 {
        self.mip_levels.max(1)
    }

    /// Offset of the first image byte, past the header and key/value block.
    pub fn data_offset(&self) -> u64 {
        HEADER_LEN as u64 + u64::from(self.key_value_byte_count)
    }

    pub fn is_compressed(&self) -> bool {
        self.gl_type_size == 0
    }
}

/// Reads and decodes the header of the file at `path`. The file is closed
/// before returning.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<ContainerHeader> {
    let file = File::open(path)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64).read_to_end(&mut bytes)?;
    ContainerHeader::decode(&bytes)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::KtxError;

    fn sample() -> ContainerHeader {
        ContainerHeader {
            pixel_width: 256,
            pixel_height: 128,
            mip_levels: 9,
            key_value_byte_count: 16,
            ..ContainerHeader::uncompressed(PixelFormat::Rgba8)
        }
    }

    #[test]
    fn layout_matches_file() {
        assert_eq!(std::mem::size_of::<ContainerHeader>(), HEADER_LEN);
        assert_eq!(offset_of!(ContainerHeader => endianness).get_byte_offset(), 12);
        assert_eq!(offset_of!(ContainerHeader => pixel_width).get_byte_offset(), 36);
        assert_eq!(
            offset_of!(ContainerHeader => key_value_byte_count).get_byte_offset(),
            60
        );
    }

    #[test]
    fn little_endian_bytes() {
        let bytes = sample().to_bytes(Endianness::Little);
        assert_eq!(&bytes[..12], &IDENTIFIER);
        assert_eq!(&bytes[12..16], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[36..40], &[0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn big_endian_bytes() {
        let bytes = sample().to_bytes(Endianness::Big);
        assert_eq!(&bytes[..12], &IDENTIFIER);
        assert_eq!(&bytes[12..16], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[36..40], &[0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn swapped_and_native_decode_identically() {
        let header = sample();
        let le = ContainerHeader::decode(&header.to_bytes(Endianness::Little)).unwrap();
        let be = ContainerHeader::decode(&header.to_bytes(Endianness::Big)).unwrap();
        assert_eq!(le, be);
        assert_eq!(le, header);
        assert_eq!(be.endianness, ENDIAN_NATIVE);
    }

    #[test]
    fn magic_mismatch() {
        let mut bytes = sample().to_bytes(Endianness::Little);
        bytes[5] = b'2';
        let err = ContainerHeader::decode(&bytes).unwrap_err();
        assert!(matches!(err, KtxError::Format(FormatError::BadMagic)));
    }

    #[test]
    fn unknown_endianness() {
        let mut bytes = sample().to_bytes(Endianness::Little);
        bytes[12..16].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let err = ContainerHeader::decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            KtxError::Format(FormatError::BadEndianness(0xEFBEADDE))
        ));
    }

    #[test]
    fn short_input() {
        let bytes = sample().to_bytes(Endianness::Little);
        let err = ContainerHeader::decode(&bytes[..40]).unwrap_err();
        assert!(matches!(
            err,
            KtxError::Format(FormatError::TooShort {
                expected: 64,
                actual: 40
            })
        ));
    }

    #[test]
    fn zero_mip_levels_means_one() {
        let header = ContainerHeader {
            mip_levels: 0,
            ..sample()
        };
        assert_eq!(header.level_count(), 1);
        assert_eq!(sample().level_count(), 9);
        assert_eq!(sample().data_offset(), 80);
    }

    #[test]
    fn read_header_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&sample().to_bytes(Endianness::Big)).unwrap();
        file.write_all(&[0u8; 32]).unwrap();
        assert_eq!(read_header(file.path()).unwrap(), sample());
    }

    #[test]
    fn read_header_short_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&IDENTIFIER).unwrap();
        let err = read_header(file.path()).unwrap_err();
        assert!(matches!(err, KtxError::Format(FormatError::TooShort { .. })));
    }

    #[test]
    fn read_header_rejects_foreign_file() {
        let mut bytes = sample().to_bytes(Endianness::Big);
        bytes[..12].copy_from_slice(b"\x89PNG\r\n\x1a\n\0\0\0\r");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        let err = read_header(file.path()).unwrap_err();
        assert!(matches!(err, KtxError::Format(FormatError::BadMagic)));
    }

    #[test]
    fn read_header_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_header(dir.path().join("missing.ktx")).unwrap_err();
        assert!(matches!(err, KtxError::Io(_)));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn byte_swap_round_trip(
                fields in proptest::array::uniform12(any::<u32>()),
                endianness_le in any::<bool>(),
            ) {
                let header = ContainerHeader {
                    gl_type: fields[0],
                    gl_type_size: fields[1],
                    gl_format: fields[2],
                    gl_internal_format: fields[3],
                    gl_base_internal_format: fields[4],
                    pixel_width: fields[5],
                    pixel_height: fields[6],
                    pixel_depth: fields[7],
                    array_elements: fields[8],
                    faces: fields[9],
                    mip_levels: fields[10],
                    key_value_byte_count: fields[11],
                    ..ContainerHeader::uncompressed(PixelFormat::R8)
                };
                let order = if endianness_le { Endianness::Little } else { Endianness::Big };
                let swapped = ContainerHeader::decode(&header.to_bytes(Endianness::Big)).unwrap();
                let native = ContainerHeader::decode(&header.to_bytes(order)).unwrap();
                prop_assert_eq!(swapped, native);
                prop_assert_eq!(native, header);
            }
        }
    }
}
