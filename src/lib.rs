//! Reader and upload driver for KTX 1.1 texture containers.
//!
//! [`read_header`] decodes and validates the 64-byte header,
//! [`classify_target`] and [`walk_mip_chain`] work out where every mip level
//! (and cube map face) lives in the file, and [`load`] feeds those byte ranges
//! to a [`TextureBackend`].

pub mod backend;
pub mod error;
pub mod gl_format;
pub mod header;
pub mod level;
pub mod pixel;
pub mod target;
pub mod texture;
pub mod writer;

pub use backend::{CubeFace, Extent, RegionTarget, TextureBackend, TextureHandle, UploadRegion};
pub use error::{FormatError, KtxError, Result};
pub use header::{ContainerHeader, Endianness, read_header};
pub use level::{MipChain, MipLevelDescriptor, face_size, row_stride, walk_mip_chain};
pub use target::{TextureTarget, classify_target};
pub use texture::{load, load_bytes};
pub use writer::TextureKtx;
