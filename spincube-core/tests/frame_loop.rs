use std::cell::RefCell;
use std::rc::Rc;

use spincube_core::{
    AnimationState, CubeGeometry, Error, Mat4, RenderBackend, Renderer, SceneConfig, Shading,
    ShaderSources, ShaderStage, Uniform,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateProgram,
    Upload,
    Clear,
    SetMatrix(Uniform),
    Draw(usize),
}

/// Backend that records every call into a shared log.
struct RecordingBackend {
    calls: Rc<RefCell<Vec<Call>>>,
    fail_compile: bool,
    size: (u32, u32),
}

impl RecordingBackend {
    fn new() -> (Self, Rc<RefCell<Vec<Call>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let backend = Self {
            calls: Rc::clone(&calls),
            fail_compile: false,
            size: (800, 600),
        };
        (backend, calls)
    }
}

impl RenderBackend for RecordingBackend {
    fn viewport_size(&self) -> (u32, u32) {
        self.size
    }

    fn create_program(&mut self, _shaders: &ShaderSources) -> spincube_core::Result<()> {
        self.calls.borrow_mut().push(Call::CreateProgram);
        if self.fail_compile {
            return Err(Error::ShaderCompile {
                stage: ShaderStage::Fragment,
                log: "ERROR: 0:3: 'vColour' : undeclared identifier".to_string(),
            });
        }
        Ok(())
    }

    fn upload_geometry(&mut self, geometry: &CubeGeometry) -> spincube_core::Result<()> {
        assert_eq!(geometry.flat_positions().len(), 72);
        self.calls.borrow_mut().push(Call::Upload);
        Ok(())
    }

    fn clear(&mut self) {
        self.calls.borrow_mut().push(Call::Clear);
    }

    fn set_matrix(&mut self, uniform: Uniform, _matrix: &Mat4) {
        self.calls.borrow_mut().push(Call::SetMatrix(uniform));
    }

    fn draw(&mut self, index_count: usize) {
        self.calls.borrow_mut().push(Call::Draw(index_count));
    }
}

fn basic_renderer() -> (Renderer<RecordingBackend>, Rc<RefCell<Vec<Call>>>) {
    let (backend, calls) = RecordingBackend::new();
    let renderer = Renderer::new(
        backend,
        &ShaderSources::embedded(Shading::Flat),
        SceneConfig::basic(),
    )
    .unwrap();
    (renderer, calls)
}

#[test]
fn startup_creates_program_then_uploads() {
    let (_renderer, calls) = basic_renderer();
    assert_eq!(*calls.borrow(), vec![Call::CreateProgram, Call::Upload]);
}

#[test]
fn compile_failure_aborts_startup() {
    let (mut backend, calls) = RecordingBackend::new();
    backend.fail_compile = true;

    let result = Renderer::new(
        backend,
        &ShaderSources::embedded(Shading::Flat),
        SceneConfig::basic(),
    );
    match result {
        Err(Error::ShaderCompile { stage, log }) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(log.contains("undeclared identifier"));
        }
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("startup should fail"),
    }
    assert_eq!(*calls.borrow(), vec![Call::CreateProgram]);
}

#[test]
fn mismatched_shading_is_rejected() {
    let (backend, calls) = RecordingBackend::new();
    let result = Renderer::new(
        backend,
        &ShaderSources::embedded(Shading::Flat),
        SceneConfig::lit(),
    );
    assert!(matches!(result, Err(Error::Config(_))));
    assert!(calls.borrow().is_empty());
}

#[test]
fn frame_issues_full_sequence() {
    let (mut renderer, calls) = basic_renderer();
    calls.borrow_mut().clear();

    let matrices = renderer.frame(1.0).expect("not paused");
    assert_eq!(
        *calls.borrow(),
        vec![
            Call::Clear,
            Call::SetMatrix(Uniform::Projection),
            Call::SetMatrix(Uniform::ModelView),
            Call::Draw(36),
        ]
    );
    // the first frame is drawn with the starting state
    assert_eq!(&matrices.model_view.data[12..15], &[0.0, 0.0, -3.0]);
    assert!((renderer.state().rotation - 0.01).abs() < 1e-6);
}

#[test]
fn lit_frame_uploads_normal_matrix() {
    let (backend, calls) = RecordingBackend::new();
    let mut renderer = Renderer::new(
        backend,
        &ShaderSources::embedded(Shading::Lit),
        SceneConfig::lit(),
    )
    .unwrap();
    calls.borrow_mut().clear();

    renderer.frame(1.0);
    assert!(calls.borrow().contains(&Call::SetMatrix(Uniform::Normal)));
}

#[test]
fn bounce_flips_velocity_once_per_crossing() {
    let config = SceneConfig::basic();
    let limits = config.bounce_limits(800.0 / 600.0);
    let mut state = AnimationState::new(&config);

    let mut first_exceeded = None;
    let mut flips = Vec::new();
    for frame in 1..=900 {
        let before = state.velocity[0];
        state.step(&config, limits, 1.0);

        if first_exceeded.is_none() && state.position[0] > 2.0 {
            first_exceeded = Some(frame);
        }
        if state.velocity[0] != before {
            assert_eq!(state.velocity[0], -before);
            // past the bound and was heading outward
            assert!(state.position[0].abs() > 2.0);
            assert!(state.position[0] * before > 0.0);
            flips.push((frame, state.position[0]));
        }
    }

    let (first_flip, _) = flips[0];
    assert_eq!(Some(first_flip), first_exceeded);
    assert!((199..=202).contains(&first_flip), "first bounce at frame {first_flip}");

    // walls alternate and crossings are a full traverse apart
    assert_eq!(flips.len(), 2);
    assert!(flips[0].1 > 0.0 && flips[1].1 < 0.0);
    assert!(flips[1].0 - flips[0].0 > 390);
}

#[test]
fn pause_freezes_animation_and_skips_drawing() {
    let (mut renderer, calls) = basic_renderer();
    for _ in 0..50 {
        renderer.frame(1.0);
    }

    renderer.toggle_pause();
    let frozen = *renderer.state();
    calls.borrow_mut().clear();

    for _ in 0..120 {
        assert!(renderer.frame(1.0).is_none());
    }
    assert!(calls.borrow().is_empty());
    assert_eq!(renderer.state().rotation, frozen.rotation);
    assert_eq!(renderer.state().position, frozen.position);
    assert_eq!(renderer.state().velocity, frozen.velocity);

    renderer.toggle_pause();
    assert!(renderer.frame(1.0).is_some());
    assert!(renderer.state().rotation > frozen.rotation);
}

#[test]
fn empty_viewport_skips_frame() {
    let (mut renderer, calls) = basic_renderer();
    renderer.backend_mut().size = (0, 600);
    assert_eq!(renderer.backend().aspect_ratio(), 1.0);
    calls.borrow_mut().clear();

    let before = *renderer.state();
    assert!(renderer.frame(1.0).is_none());
    assert!(calls.borrow().is_empty());
    assert_eq!(*renderer.state(), before);

    // the loop picks up again once the canvas has a size
    renderer.backend_mut().size = (800, 600);
    let matrices = renderer.frame(1.0).expect("viewport restored");
    assert!(matrices.projection.data.iter().all(|v| v.is_finite()));
}

#[test]
fn renderer_keeps_its_config() {
    let (renderer, _calls) = basic_renderer();
    assert_eq!(renderer.config(), &SceneConfig::basic());
    assert_eq!(renderer.config().shading, Shading::Flat);
}
