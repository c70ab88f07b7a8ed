/// Error types shared by the core library and the rendering backends
use std::path::PathBuf;

use crate::shader::ShaderStage;

/// Recoverable failures of the transform library.
///
/// Neither variant is fatal: the frame driver skips the rotation or the
/// normal-matrix upload for the frame in which it occurs.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MatrixError {
    /// The rotation axis is too short to normalize.
    #[error("rotation axis is degenerate (length {length})")]
    DegenerateAxis { length: f32 },

    /// The matrix has no inverse.
    #[error("matrix is singular (determinant {determinant})")]
    Singular { determinant: f32 },
}

/// Startup failures. Any of these aborts initialization before the first
/// frame is scheduled.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No drawable surface or rendering context could be acquired.
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    /// A shader stage failed to compile; `log` is the backend's diagnostic.
    #[error("failed compiling {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// The program failed to link.
    #[error("failed linking shader program: {0}")]
    ShaderLink(String),

    /// Shader source text could not be loaded.
    #[error("failed loading shader source from {path}: {source}")]
    ShaderFetch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A buffer object could not be created.
    #[error("failed creating buffer: {0}")]
    BufferCreation(&'static str),

    /// The scene configuration is malformed or violates an invariant.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
