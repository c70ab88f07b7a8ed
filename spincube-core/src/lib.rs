/// spincube core library - transform math and frame logic
///
/// This library provides the backend-independent part of the spinning cube:
/// a column-major 4x4 transform library, the cube's vertex data, the
/// animation state and the frame driver that feeds a rendering backend.

pub mod animation;
pub mod backend;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod mat4;
pub mod shader;

// Re-export commonly used types
pub use animation::AnimationState;
pub use backend::RenderBackend;
pub use config::{BounceLimits, Bounds, SceneConfig, Shading, TransformOrder};
pub use error::{Error, MatrixError, Result};
pub use frame::{FrameMatrices, Renderer};
pub use geometry::CubeGeometry;
pub use mat4::{Mat4, Vec3};
pub use shader::{ShaderSources, ShaderStage, Uniform};
