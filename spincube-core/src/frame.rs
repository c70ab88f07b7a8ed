/// Per-frame matrix computation and the frame driver that feeds a backend
use tracing::{debug, info, warn};

use crate::animation::AnimationState;
use crate::backend::RenderBackend;
use crate::config::{SceneConfig, Shading, TransformOrder};
use crate::error::{Error, Result};
use crate::geometry::CubeGeometry;
use crate::mat4::Mat4;
use crate::shader::{ShaderSources, Uniform};

/// Matrices uploaded for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub projection: Mat4,
    pub model_view: Mat4,
    /// Present only for lit shading with an invertible model-view.
    pub normal: Option<Mat4>,
}

impl FrameMatrices {
    pub fn compute(state: &AnimationState, config: &SceneConfig, aspect: f32) -> Self {
        let projection = Mat4::perspective(config.fov_y(), aspect, config.near, config.far);

        let mut model_view = Mat4::create();
        match config.order {
            TransformOrder::TranslateThenRotate => {
                model_view.translate(state.position);
                spin(&mut model_view, state.rotation, config);
            }
            TransformOrder::RotateThenTranslate => {
                spin(&mut model_view, state.rotation, config);
                model_view.translate(state.position);
            }
        }

        let normal = match config.shading {
            Shading::Flat => None,
            Shading::Lit => normal_matrix(&model_view),
        };

        Self {
            projection,
            model_view,
            normal,
        }
    }
}

/// Rotation is skipped for the frame when the axis is degenerate.
fn spin(model_view: &mut Mat4, angle: f32, config: &SceneConfig) {
    if let Err(e) = model_view.rotate(angle, config.rotation_axis) {
        warn!(error = %e, "skipping rotation this frame");
    }
}

/// `None` when the model-view cannot be inverted; lighting is skipped.
pub fn normal_matrix(model_view: &Mat4) -> Option<Mat4> {
    match Mat4::normal_matrix(model_view) {
        Ok(normal) => Some(normal),
        Err(e) => {
            warn!(error = %e, "skipping normal matrix this frame");
            None
        }
    }
}

/// Drives a backend through startup and the per-frame sequence.
pub struct Renderer<B: RenderBackend> {
    backend: B,
    config: SceneConfig,
    state: AnimationState,
    index_count: usize,
}

impl<B: RenderBackend> Renderer<B> {
    /// Validates the config, builds the program and uploads the cube. Any
    /// failure aborts startup; the backend is dropped with it.
    pub fn new(mut backend: B, shaders: &ShaderSources, config: SceneConfig) -> Result<Self> {
        config.validate()?;
        if shaders.shading != config.shading {
            return Err(Error::Config(format!(
                "shaders implement {:?} shading but the scene asks for {:?}",
                shaders.shading, config.shading
            )));
        }

        backend.create_program(shaders)?;
        debug!("shader program linked");

        let geometry = CubeGeometry::new(config.cube_size);
        backend.upload_geometry(&geometry)?;
        debug!(indices = geometry.index_count(), "geometry uploaded");

        let (width, height) = backend.viewport_size();
        info!(width, height, shading = ?config.shading, "renderer ready");

        Ok(Self {
            backend,
            state: AnimationState::new(&config),
            index_count: geometry.index_count(),
            config,
        })
    }

    /// One frame callback: clear, compute, upload, draw, advance. While
    /// paused, or while the viewport has zero area, nothing is touched and
    /// `None` is returned.
    pub fn frame(&mut self, dt: f32) -> Option<FrameMatrices> {
        if self.state.is_paused() {
            return None;
        }
        let (width, height) = self.backend.viewport_size();
        if width == 0 || height == 0 {
            debug!(width, height, "empty viewport, skipping frame");
            return None;
        }

        let aspect = self.backend.aspect_ratio();
        self.backend.clear();

        let matrices = FrameMatrices::compute(&self.state, &self.config, aspect);
        self.backend.set_matrix(Uniform::Projection, &matrices.projection);
        self.backend.set_matrix(Uniform::ModelView, &matrices.model_view);
        if let Some(normal) = &matrices.normal {
            self.backend.set_matrix(Uniform::Normal, normal);
        }
        self.backend.draw(self.index_count);

        let limits = self.config.bounce_limits(aspect);
        self.state.step(&self.config, limits, dt);

        Some(matrices)
    }

    pub fn toggle_pause(&mut self) {
        self.state.toggle_pause();
        info!(paused = self.state.is_paused(), "pause toggled");
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
