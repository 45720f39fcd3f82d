//! Error types for the mesh viewer.
//!
//! Fallible operations return `ViewerResult<T>`. Malformed geometry is not an
//! error: the parsers degrade bad numbers to `NaN` and missing normals to a
//! fallback instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// The file extension matches none of the supported mesh formats.
    #[error("unsupported mesh format: {extension:?} (expected .obj, .norm or .tris)")]
    UnsupportedFormat { extension: String },

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Index list handed to the wireframe deriver does not describe whole triangles.
    #[error("index count {len} is not a multiple of 3")]
    IncompleteTriangle { len: usize },

    #[error("shader compilation failed for {program}: {message}")]
    ShaderCompile { program: &'static str, message: String },

    #[error("program link failed for {program}: {message}")]
    ProgramLink { program: &'static str, message: String },

    /// The driver refused to allocate a shader module or pipeline object.
    #[error("driver could not allocate {program}: {message}")]
    ShaderAllocation { program: &'static str, message: String },

    #[error("buffer creation failed for {label}: {message}")]
    BufferCreation { label: &'static str, message: String },

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("could not create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("could not open graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("could not start mesh loader thread: {0}")]
    LoaderSpawn(#[source] std::io::Error),

    #[error("mesh loader thread exited without a result")]
    LoaderDisconnected,
}

pub type ViewerResult<T> = Result<T, ViewerError>;
