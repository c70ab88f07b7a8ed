/// Software rasterizer backend drawing the cube into a character grid
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Vector3;
use spincube_core::{
    CubeGeometry, Error, Mat4, RenderBackend, Result, ShaderSources, ShaderStage, Shading,
    Uniform,
};
use std::io::Write;

/// Character luminosity ramp for lit shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Glyph used for every covered cell under flat shading
const FLAT_GLYPH: char = '#';

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;

const AMBIENT_LIGHT: f32 = 0.3;

/// Clip-space `w` below this is behind or on the eye plane
const MIN_CLIP_W: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub color: Color,
}

const EMPTY: Cell = Cell {
    glyph: ' ',
    color: Color::Reset,
};

/// Vertex after projection: screen x, screen y, NDC depth
type ScreenVertex = (f32, f32, f32);

/// `RenderBackend` over a depth-tested character framebuffer.
pub struct SoftwareBackend {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    shading: Option<Shading>,
    geometry: Option<CubeGeometry>,
    projection: Mat4,
    model_view: Mat4,
    normal: Option<Mat4>,
    light_dir: Vector3<f32>,
}

impl SoftwareBackend {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![EMPTY; size],
            shading: None,
            geometry: None,
            projection: Mat4::create(),
            model_view: Mat4::create(),
            normal: None,
            light_dir: Vector3::new(0.85, 0.8, 0.75).normalize(),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.cells = vec![EMPTY; size];
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.width + x]
    }

    pub fn covered_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.glyph != ' ').count()
    }

    /// Writes the framebuffer row by row, switching colors only when needed.
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                if current != Some(cell.color) {
                    writer.queue(SetForegroundColor(cell.color))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.glyph))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    fn project(&self, mvp: &Mat4, position: [f32; 3]) -> Option<ScreenVertex> {
        let clip = mvp.transform_point([position[0], position[1], position[2], 1.0]);
        if clip[3] < MIN_CLIP_W {
            return None;
        }

        let ndc_x = clip[0] / clip[3];
        let ndc_y = clip[1] / clip[3];
        let depth = clip[2] / clip[3];

        let screen_x = (ndc_x + 1.0) * 0.5 * self.width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * self.height as f32;
        Some((screen_x, screen_y, depth))
    }

    /// Diffuse intensity in [0, 1] of a vertex normal, or `None` when the
    /// frame carries no normal matrix.
    fn lighting(&self, normal: [f32; 3]) -> Option<f32> {
        let normal_matrix = self.normal.as_ref()?;
        let n = normal_matrix.transform_point([normal[0], normal[1], normal[2], 0.0]);
        let n = Vector3::new(n[0], n[1], n[2]);
        let directional = if n.norm() > 0.0 {
            n.normalize().dot(&self.light_dir).max(0.0)
        } else {
            0.0
        };
        Some((AMBIENT_LIGHT + directional).min(1.0))
    }

    fn shade(&self, geometry: &CubeGeometry, vertex: usize) -> Cell {
        let rgba = CubeGeometry::face_of_vertex(vertex).color();
        let intensity = match self.shading {
            Some(Shading::Lit) => self.lighting(geometry.normal(vertex)),
            _ => None,
        };

        match intensity {
            Some(intensity) => {
                let ramp_index = (intensity * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
                Cell {
                    glyph: LUMINOSITY_RAMP[ramp_index.min(LUMINOSITY_RAMP.len() - 1)],
                    color: rgb(rgba, intensity),
                }
            }
            None => Cell {
                glyph: FLAT_GLYPH,
                color: rgb(rgba, 1.0),
            },
        }
    }

    fn rasterize_triangle(&mut self, coords: [ScreenVertex; 3], cell: Cell) {
        let [v0, v1, v2] = coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                if !(-1.0..=1.0).contains(&depth) {
                    continue;
                }

                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = cell;
                }
            }
        }
    }
}

impl RenderBackend for SoftwareBackend {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    fn aspect_ratio(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / (self.height as f32 * CELL_ASPECT)
        }
    }

    /// There is no GLSL compiler here: the program is accepted when both
    /// stages have text and declare every uniform the shading model will set.
    fn create_program(&mut self, shaders: &ShaderSources) -> Result<()> {
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if shaders.source(stage).trim().is_empty() {
                return Err(Error::ShaderCompile {
                    stage,
                    log: "shader source is empty".to_string(),
                });
            }
        }

        let mut required = vec![Uniform::Projection, Uniform::ModelView];
        if shaders.shading == Shading::Lit {
            required.push(Uniform::Normal);
        }
        let missing: Vec<&str> = required
            .into_iter()
            .map(Uniform::name)
            .filter(|name| !shaders.vertex.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(Error::ShaderLink(format!(
                "vertex shader does not declare {}",
                missing.join(", ")
            )));
        }

        self.shading = Some(shaders.shading);
        Ok(())
    }

    fn upload_geometry(&mut self, geometry: &CubeGeometry) -> Result<()> {
        self.geometry = Some(geometry.clone());
        Ok(())
    }

    fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(EMPTY);
        self.normal = None;
    }

    fn set_matrix(&mut self, uniform: Uniform, matrix: &Mat4) {
        match uniform {
            Uniform::Projection => self.projection = *matrix,
            Uniform::ModelView => self.model_view = *matrix,
            Uniform::Normal => self.normal = Some(*matrix),
        }
    }

    fn draw(&mut self, index_count: usize) {
        let Some(geometry) = self.geometry.take() else {
            tracing::warn!("draw issued before geometry upload");
            return;
        };

        let mvp = self.projection * self.model_view;
        for triangle in geometry.triangles().take(index_count / 3) {
            let mut coords = [(0.0, 0.0, 0.0); 3];
            let mut visible = true;
            for (slot, &vertex) in coords.iter_mut().zip(triangle.iter()) {
                match self.project(&mvp, geometry.position(vertex)) {
                    Some(screen) => *slot = screen,
                    None => visible = false,
                }
            }
            if !visible {
                continue;
            }

            let cell = self.shade(&geometry, triangle[0]);
            self.rasterize_triangle(coords, cell);
        }

        self.geometry = Some(geometry);
    }
}

fn rgb(rgba: [f32; 4], intensity: f32) -> Color {
    let channel = |c: f32| (c * intensity * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb {
        r: channel(rgba[0]),
        g: channel(rgba[1]),
        b: channel(rgba[2]),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
