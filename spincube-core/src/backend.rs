/// The seam between the frame driver and a concrete rasterization backend
use crate::error::Result;
use crate::geometry::CubeGeometry;
use crate::mat4::Mat4;
use crate::shader::{ShaderSources, Uniform};

/// Immediate-mode rendering context.
///
/// Setup calls (`create_program`, `upload_geometry`) run once before the
/// first frame and may fail; per-frame calls cannot.
pub trait RenderBackend {
    /// Drawable size in pixels (or cells).
    fn viewport_size(&self) -> (u32, u32);

    /// Compiles and links the program. Compile and link diagnostics are
    /// returned as `Error::ShaderCompile` / `Error::ShaderLink`.
    fn create_program(&mut self, shaders: &ShaderSources) -> Result<()>;

    /// Uploads the static vertex, color, normal and index buffers.
    fn upload_geometry(&mut self, geometry: &CubeGeometry) -> Result<()>;

    fn clear(&mut self);

    fn set_matrix(&mut self, uniform: Uniform, matrix: &Mat4);

    /// Draws `index_count` indices as triangles.
    fn draw(&mut self, index_count: usize);

    /// Width over height, or 1.0 for an empty viewport.
    fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.viewport_size();
        if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}
