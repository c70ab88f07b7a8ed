use spincube_core::shader::{ATTR_COLOR, ATTR_NORMAL, ATTR_POSITION};
use spincube_core::{
    CubeGeometry, Error, Mat4, RenderBackend, Result, ShaderSources, ShaderStage, Uniform,
};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation,
};

const UNIFORMS: [Uniform; 3] = [Uniform::Projection, Uniform::ModelView, Uniform::Normal];

/// `RenderBackend` over a WebGL2 context bound to a canvas.
pub struct WebGlBackend {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: Option<WebGlProgram>,
    uniforms: [Option<WebGlUniformLocation>; 3],
    buffers: Vec<WebGlBuffer>,
}

impl WebGlBackend {
    /// Acquires the canvas and its WebGL2 context and sets the fixed
    /// pipeline state (black clear color, depth test).
    pub fn from_canvas_id(canvas_id: &str) -> Result<Self> {
        let unavailable = |what: &str| Error::ContextUnavailable(what.to_string());

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| unavailable("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| unavailable(&format!("no element with id '{canvas_id}'")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| unavailable(&format!("element '{canvas_id}' is not a canvas")))?;
        let gl = canvas
            .get_context("webgl2")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<GL>().ok())
            .ok_or_else(|| unavailable("Unable to initialize WebGL"))?;

        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.enable(GL::DEPTH_TEST);
        gl.depth_func(GL::LEQUAL);
        gl.viewport(0, 0, canvas.width() as i32, canvas.height() as i32);

        Ok(Self {
            gl,
            canvas,
            program: None,
            uniforms: [None, None, None],
            buffers: Vec::new(),
        })
    }

    fn uniform_slot(uniform: Uniform) -> usize {
        match uniform {
            Uniform::Projection => 0,
            Uniform::ModelView => 1,
            Uniform::Normal => 2,
        }
    }

    /// Uploads `data` into a new static array buffer and points the named
    /// attribute at it. Attributes the program does not use are skipped.
    fn attribute_buffer(
        &mut self,
        program: &WebGlProgram,
        name: &str,
        components: i32,
        data: &[f32],
    ) -> Result<()> {
        let location = self.gl.get_attrib_location(program, name);
        if location < 0 {
            tracing::debug!(attribute = name, "attribute not active, skipping upload");
            return Ok(());
        }

        let buffer = self
            .gl
            .create_buffer()
            .ok_or(Error::BufferCreation("vertex attribute"))?;
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        self.gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &js_sys::Float32Array::from(data),
            GL::STATIC_DRAW,
        );
        self.gl
            .vertex_attrib_pointer_with_i32(location as u32, components, GL::FLOAT, false, 0, 0);
        self.gl.enable_vertex_attrib_array(location as u32);

        self.buffers.push(buffer);
        Ok(())
    }
}

impl RenderBackend for WebGlBackend {
    fn viewport_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn create_program(&mut self, shaders: &ShaderSources) -> Result<()> {
        let program = build_program(&self.gl, shaders)?;

        self.gl.use_program(Some(&program));
        for uniform in UNIFORMS {
            self.uniforms[Self::uniform_slot(uniform)] =
                self.gl.get_uniform_location(&program, uniform.name());
        }
        self.program = Some(program);
        Ok(())
    }

    fn upload_geometry(&mut self, geometry: &CubeGeometry) -> Result<()> {
        let program = self
            .program
            .clone()
            .ok_or(Error::BufferCreation("no program to bind attributes to"))?;

        self.attribute_buffer(&program, ATTR_POSITION, 3, geometry.flat_positions())?;
        self.attribute_buffer(&program, ATTR_COLOR, 4, geometry.flat_colors())?;
        self.attribute_buffer(&program, ATTR_NORMAL, 3, geometry.flat_normals())?;

        let indices = self
            .gl
            .create_buffer()
            .ok_or(Error::BufferCreation("index"))?;
        self.gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&indices));
        self.gl.buffer_data_with_array_buffer_view(
            GL::ELEMENT_ARRAY_BUFFER,
            &js_sys::Uint16Array::from(geometry.indices()),
            GL::STATIC_DRAW,
        );
        self.buffers.push(indices);
        Ok(())
    }

    fn clear(&mut self) {
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
    }

    fn set_matrix(&mut self, uniform: Uniform, matrix: &Mat4) {
        let location = self.uniforms[Self::uniform_slot(uniform)].as_ref();
        self.gl
            .uniform_matrix4fv_with_f32_array(location, false, matrix.as_slice());
    }

    fn draw(&mut self, index_count: usize) {
        self.gl
            .draw_elements_with_i32(GL::TRIANGLES, index_count as i32, GL::UNSIGNED_SHORT, 0);
    }
}

/// Shader and program object calls used while building the program.
trait ProgramApi {
    type Shader;
    type Program;

    fn compile(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader>;
    fn delete_shader(&self, shader: &Self::Shader);
    fn create_program(&self) -> Option<Self::Program>;
    /// Attaches both stages and links; `Err` carries the link log.
    fn link(
        &self,
        program: &Self::Program,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> std::result::Result<(), String>;
    fn delete_program(&self, program: &Self::Program);
}

/// Compiles both stages, then creates and links the program. Every object
/// created along the way is deleted on failure; shaders are always deleted
/// once linking has been attempted.
fn build_program<G: ProgramApi>(gl: &G, shaders: &ShaderSources) -> Result<G::Program> {
    let vertex = gl.compile(ShaderStage::Vertex, shaders.source(ShaderStage::Vertex))?;
    let fragment = match gl.compile(ShaderStage::Fragment, shaders.source(ShaderStage::Fragment)) {
        Ok(fragment) => fragment,
        Err(e) => {
            gl.delete_shader(&vertex);
            return Err(e);
        }
    };

    let Some(program) = gl.create_program() else {
        gl.delete_shader(&vertex);
        gl.delete_shader(&fragment);
        return Err(Error::ShaderLink("failed creating program".to_string()));
    };

    let linked = gl.link(&program, &vertex, &fragment);
    gl.delete_shader(&vertex);
    gl.delete_shader(&fragment);

    match linked {
        Ok(()) => Ok(program),
        Err(log) => {
            gl.delete_program(&program);
            Err(Error::ShaderLink(log))
        }
    }
}

impl ProgramApi for GL {
    type Shader = WebGlShader;
    type Program = WebGlProgram;

    fn compile(&self, stage: ShaderStage, source: &str) -> Result<WebGlShader> {
        compile_shader(self, stage, source)
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        GL::delete_shader(self, Some(shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        GL::create_program(self)
    }

    fn link(
        &self,
        program: &WebGlProgram,
        vertex: &WebGlShader,
        fragment: &WebGlShader,
    ) -> std::result::Result<(), String> {
        self.attach_shader(program, vertex);
        self.attach_shader(program, fragment);
        self.link_program(program);

        let linked = self
            .get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if linked {
            Ok(())
        } else {
            Err(self.get_program_info_log(program).unwrap_or_default())
        }
    }

    fn delete_program(&self, program: &WebGlProgram) {
        GL::delete_program(self, Some(program));
    }
}

fn compile_shader(gl: &GL, stage: ShaderStage, source: &str) -> Result<WebGlShader> {
    let kind = match stage {
        ShaderStage::Vertex => GL::VERTEX_SHADER,
        ShaderStage::Fragment => GL::FRAGMENT_SHADER,
    };
    let shader = gl.create_shader(kind).ok_or_else(|| Error::ShaderCompile {
        stage,
        log: "failed creating shader".to_string(),
    })?;

    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if !compiled {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        return Err(Error::ShaderCompile { stage, log });
    }

    Ok(shader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spincube_core::Shading;
    use std::cell::{Cell, RefCell};

    /// Counts live objects; `fail` names the step that should fail.
    #[derive(Default)]
    struct FakeGl {
        fail: Option<&'static str>,
        live_shaders: RefCell<Vec<ShaderStage>>,
        live_programs: Cell<u32>,
        created_programs: Cell<u32>,
    }

    impl ProgramApi for FakeGl {
        type Shader = ShaderStage;
        type Program = u32;

        fn compile(&self, stage: ShaderStage, _source: &str) -> Result<ShaderStage> {
            let failing = match stage {
                ShaderStage::Vertex => self.fail == Some("vertex"),
                ShaderStage::Fragment => self.fail == Some("fragment"),
            };
            if failing {
                return Err(Error::ShaderCompile {
                    stage,
                    log: "syntax error".to_string(),
                });
            }
            self.live_shaders.borrow_mut().push(stage);
            Ok(stage)
        }

        fn delete_shader(&self, shader: &ShaderStage) {
            self.live_shaders.borrow_mut().retain(|s| s != shader);
        }

        fn create_program(&self) -> Option<u32> {
            if self.fail == Some("program") {
                return None;
            }
            self.created_programs.set(self.created_programs.get() + 1);
            self.live_programs.set(self.live_programs.get() + 1);
            Some(self.created_programs.get())
        }

        fn link(&self, _program: &u32, _vertex: &ShaderStage, _fragment: &ShaderStage) -> std::result::Result<(), String> {
            if self.fail == Some("link") {
                Err("missing main".to_string())
            } else {
                Ok(())
            }
        }

        fn delete_program(&self, _program: &u32) {
            self.live_programs.set(self.live_programs.get() - 1);
        }
    }

    fn build(fail: Option<&'static str>) -> (FakeGl, Result<u32>) {
        let gl = FakeGl {
            fail,
            ..FakeGl::default()
        };
        let result = build_program(&gl, &ShaderSources::embedded(Shading::Flat));
        (gl, result)
    }

    #[test]
    fn test_successful_build_keeps_only_program() {
        let (gl, result) = build(None);
        assert!(result.is_ok());
        assert!(gl.live_shaders.borrow().is_empty());
        assert_eq!(gl.live_programs.get(), 1);
    }

    #[test]
    fn test_fragment_failure_releases_vertex_shader() {
        let (gl, result) = build(Some("fragment"));
        assert!(matches!(
            result,
            Err(Error::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            })
        ));
        assert!(gl.live_shaders.borrow().is_empty());
        assert_eq!(gl.created_programs.get(), 0);
    }

    #[test]
    fn test_vertex_failure_creates_nothing() {
        let (gl, result) = build(Some("vertex"));
        assert!(result.is_err());
        assert!(gl.live_shaders.borrow().is_empty());
        assert_eq!(gl.created_programs.get(), 0);
    }

    #[test]
    fn test_program_creation_failure_releases_shaders() {
        let (gl, result) = build(Some("program"));
        assert!(matches!(result, Err(Error::ShaderLink(_))));
        assert!(gl.live_shaders.borrow().is_empty());
    }

    #[test]
    fn test_link_failure_releases_everything() {
        let (gl, result) = build(Some("link"));
        match result {
            Err(Error::ShaderLink(log)) => assert_eq!(log, "missing main"),
            other => panic!("expected link error, got {:?}", other.map(|_| ())),
        }
        assert!(gl.live_shaders.borrow().is_empty());
        assert_eq!(gl.live_programs.get(), 0);
    }
}
