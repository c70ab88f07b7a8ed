/// Static vertex data for the cube: positions, per-face colors, normals and
/// triangle indices
use crate::mat4::Vec3;

pub const VERTICES_PER_FACE: usize = 4;
pub const FACE_COUNT: usize = 6;
pub const VERTEX_COUNT: usize = FACE_COUNT * VERTICES_PER_FACE;
pub const INDEX_COUNT: usize = FACE_COUNT * 6;

/// Cube faces in buffer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
    Top,
    Bottom,
    Right,
    Left,
}

impl Face {
    pub const ALL: [Face; FACE_COUNT] = [
        Face::Front,
        Face::Back,
        Face::Top,
        Face::Bottom,
        Face::Right,
        Face::Left,
    ];

    pub fn normal(self) -> Vec3 {
        match self {
            Face::Front => [0.0, 0.0, 1.0],
            Face::Back => [0.0, 0.0, -1.0],
            Face::Top => [0.0, 1.0, 0.0],
            Face::Bottom => [0.0, -1.0, 0.0],
            Face::Right => [1.0, 0.0, 0.0],
            Face::Left => [-1.0, 0.0, 0.0],
        }
    }

    pub fn color(self) -> [f32; 4] {
        FACE_COLORS[self as usize]
    }

    /// Corners of the unit face (±1); triangles `0 1 2` and `0 2 3` cover
    /// the quad.
    fn corners(self) -> [Vec3; VERTICES_PER_FACE] {
        match self {
            Face::Front => [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
            Face::Back => [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
            Face::Top => [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
            Face::Bottom => [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
            Face::Right => [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
            Face::Left => [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
        }
    }
}

/// RGBA per face: white, red, green, blue, yellow, purple.
pub const FACE_COLORS: [[f32; 4]; FACE_COUNT] = [
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
];

/// Buffers for an axis-aligned cube centered on the origin.
#[derive(Debug, Clone)]
pub struct CubeGeometry {
    positions: Vec<f32>,
    colors: Vec<f32>,
    normals: Vec<f32>,
    indices: Vec<u16>,
}

impl CubeGeometry {
    /// Cube with the given edge length.
    pub fn new(size: f32) -> Self {
        let half = size / 2.0;
        let mut positions = Vec::with_capacity(VERTEX_COUNT * 3);
        let mut colors = Vec::with_capacity(VERTEX_COUNT * 4);
        let mut normals = Vec::with_capacity(VERTEX_COUNT * 3);
        let mut indices = Vec::with_capacity(INDEX_COUNT);

        for (face_index, face) in Face::ALL.iter().enumerate() {
            for corner in face.corners() {
                positions.extend(corner.iter().map(|c| c * half));
                colors.extend_from_slice(&face.color());
                normals.extend_from_slice(&face.normal());
            }

            let base = (face_index * VERTICES_PER_FACE) as u16;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            positions,
            colors,
            normals,
            indices,
        }
    }

    pub fn flat_positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn flat_colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn flat_normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        let p = &self.positions[vertex * 3..vertex * 3 + 3];
        [p[0], p[1], p[2]]
    }

    pub fn normal(&self, vertex: usize) -> Vec3 {
        let n = &self.normals[vertex * 3..vertex * 3 + 3];
        [n[0], n[1], n[2]]
    }

    pub fn face_of_vertex(vertex: usize) -> Face {
        Face::ALL[vertex / VERTICES_PER_FACE]
    }

    /// Index triples of the 12 triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }
}

impl Default for CubeGeometry {
    fn default() -> Self {
        Self::new(2.0)
    }
}
