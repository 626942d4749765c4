//! The graphics backend the loader drives.
//!
//! The loader never touches a GPU itself. It describes storage and uploads to
//! a [`TextureBackend`], which maps them onto `glTexStorage*` /
//! `glTexSubImage*` or whatever the host renderer uses.

use std::fmt;

use thiserror::Error;

use crate::gl_format;
use crate::target::TextureTarget;

/// Opaque texture name handed out by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Extent {
            width,
            height,
            depth,
        }
    }
}

/// One of the six faces of a cube map, in GL face order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Face stored at position `index` of a cube map level.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn gl_enum(self) -> u32 {
        gl_format::TEXTURE_CUBE_MAP_POSITIVE_X + self as u32
    }
}

/// Image an upload writes to: the whole bound target, or one cube map face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionTarget {
    Whole(TextureTarget),
    CubeFace(CubeFace),
}

impl RegionTarget {
    pub fn gl_enum(self) -> u32 {
        match self {
            RegionTarget::Whole(target) => target.gl_enum(),
            RegionTarget::CubeFace(face) => face.gl_enum(),
        }
    }
}

/// Arguments of a single sub-image upload.
#[derive(Clone, Copy, Debug)]
pub struct UploadRegion<'a> {
    pub target: RegionTarget,
    pub level: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub extent: Extent,
    pub format: u32,
    pub gl_type: u32,
    pub data: &'a [u8],
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("backend call `{call}` failed: {message}")]
pub struct BackendError {
    pub call: &'static str,
    pub message: String,
}

impl BackendError {
    pub fn new<S: Into<String>>(call: &'static str, message: S) -> Self {
        BackendError {
            call,
            message: message.into(),
        }
    }
}

/// Texture operations the loader needs. All calls are synchronous.
pub trait TextureBackend {
    fn create_texture(&mut self) -> Result<TextureHandle, BackendError>;

    fn bind_texture(
        &mut self,
        handle: TextureHandle,
        target: TextureTarget,
    ) -> Result<(), BackendError>;

    /// Immutable storage for `levels` mip levels. `extent.height` and
    /// `extent.depth` are 1 when `target` does not use them.
    fn allocate_storage(
        &mut self,
        handle: TextureHandle,
        target: TextureTarget,
        levels: u32,
        internal_format: u32,
        extent: Extent,
    ) -> Result<(), BackendError>;

    fn upload_region(
        &mut self,
        handle: TextureHandle,
        region: &UploadRegion<'_>,
    ) -> Result<(), BackendError>;

    fn generate_mipmaps(
        &mut self,
        handle: TextureHandle,
        target: TextureTarget,
    ) -> Result<(), BackendError>;
}

/// A call seen by [`Recorder`]. Uploads keep the data length, not the bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    CreateTexture(TextureHandle),
    BindTexture(TextureHandle, TextureTarget),
    AllocateStorage {
        handle: TextureHandle,
        target: TextureTarget,
        levels: u32,
        internal_format: u32,
        extent: Extent,
    },
    UploadRegion {
        handle: TextureHandle,
        target: RegionTarget,
        level: u32,
        extent: Extent,
        format: u32,
        gl_type: u32,
        len: usize,
    },
    GenerateMipmaps(TextureHandle, TextureTarget),
}

impl BackendCall {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCall::CreateTexture(_) => "create_texture",
            BackendCall::BindTexture(..) => "bind_texture",
            BackendCall::AllocateStorage { .. } => "allocate_storage",
            BackendCall::UploadRegion { .. } => "upload_region",
            BackendCall::GenerateMipmaps(..) => "generate_mipmaps",
        }
    }
}

impl fmt::Display for BackendCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendCall::CreateTexture(handle) => write!(f, "create_texture -> {}", handle.0),
            BackendCall::BindTexture(handle, target) => {
                write!(f, "bind_texture({}, {:?})", handle.0, target)
            }
            BackendCall::AllocateStorage {
                handle,
                target,
                levels,
                internal_format,
                extent,
            } => write!(
                f,
                "allocate_storage({}, {:?}, levels={}, internal_format={:#06x}, {}x{}x{})",
                handle.0,
                target,
                levels,
                internal_format,
                extent.width,
                extent.height,
                extent.depth
            ),
            BackendCall::UploadRegion {
                handle,
                target,
                level,
                extent,
                format,
                gl_type,
                len,
            } => write!(
                f,
                "upload_region({}, {:#06x}, level={}, {}x{}x{}, format={:#06x}, type={:#06x}, {} bytes)",
                handle.0,
                target.gl_enum(),
                level,
                extent.width,
                extent.height,
                extent.depth,
                format,
                gl_type,
                len
            ),
            BackendCall::GenerateMipmaps(handle, target) => {
                write!(f, "generate_mipmaps({}, {:?})", handle.0, target)
            }
        }
    }
}

/// Backend that records every call instead of talking to a GPU. Used for dry
/// runs and tests.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<BackendCall>,
    next_handle: u32,
    fail_on: Option<&'static str>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call named `call` fail, after recording it.
    pub fn fail_on(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.name() == call).count()
    }

    fn record(&mut self, call: BackendCall) -> Result<(), BackendError> {
        let name = call.name();
        self.calls.push(call);
        match self.fail_on {
            Some(failing) if failing == name => Err(BackendError::new(name, "injected failure")),
            _ => Ok(()),
        }
    }
}

impl TextureBackend for Recorder {
    fn create_texture(&mut self) -> Result<TextureHandle, BackendError> {
        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        self.record(BackendCall::CreateTexture(handle))?;
        Ok(handle)
    }

    fn bind_texture(
        &mut self,
        handle: TextureHandle,
        target: TextureTarget,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::BindTexture(handle, target))
    }

    fn allocate_storage(
        &mut self,
        handle: TextureHandle,
        target: TextureTarget,
        levels: u32,
        internal_format: u32,
        extent: Extent,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::AllocateStorage {
            handle,
            target,
            levels,
            internal_format,
            extent,
        })
    }

    fn upload_region(
        &mut self,
        handle: TextureHandle,
        region: &UploadRegion<'_>,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::UploadRegion {
            handle,
            target: region.target,
            level: region.level,
            extent: region.extent,
            format: region.format,
            gl_type: region.gl_type,
            len: region.data.len(),
        })
    }

    fn generate_mipmaps(
        &mut self,
        handle: TextureHandle,
        target: TextureTarget,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::GenerateMipmaps(handle, target))
    }
}
