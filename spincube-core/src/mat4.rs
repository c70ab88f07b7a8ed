/// 4x4 transformation matrices in OpenGL column-major layout
///
/// Element `i * 4 + j` holds row `j` of column `i`. Operations that combine
/// with an existing matrix come in three shapes: an in-place form
/// (`translate`), a form that reads a separate source (`translate_from`) and a
/// value-returning form (`translated`).
use std::ops::Mul;

use nalgebra::Matrix4;

use crate::error::MatrixError;

/// Translation offset or rotation axis.
pub type Vec3 = [f32; 3];

/// Axes shorter than this cannot be normalized.
pub const AXIS_EPSILON: f32 = 1e-6;

/// Determinants with a smaller magnitude are treated as singular.
pub const SINGULAR_EPSILON: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub data: [f32; 16],
}

impl Mat4 {
    /// Identity matrix
    pub fn create() -> Self {
        let mut data = [0.0; 16];
        data[0] = 1.0;
        data[5] = 1.0;
        data[10] = 1.0;
        data[15] = 1.0;
        Self { data }
    }

    pub fn zero() -> Self {
        Self { data: [0.0; 16] }
    }

    pub fn from_cols_array(data: [f32; 16]) -> Self {
        Self { data }
    }

    /// Right-handed perspective projection mapping the view frustum to the
    /// [-1, 1] clip cube.
    ///
    /// `aspect` must be non-zero and `0 < near < far`; the result is
    /// degenerate otherwise.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let range_inv = 1.0 / (near - far);

        let mut data = [0.0; 16];
        data[0] = f / aspect;
        data[5] = f;
        data[10] = (far + near) * range_inv;
        data[11] = -1.0;
        data[14] = 2.0 * far * near * range_inv;
        Self { data }
    }

    /// `self = self * T(offset)`.
    pub fn translate(&mut self, offset: Vec3) {
        let source = *self;
        self.translate_from(&source, offset);
    }

    /// Writes the translation column of `source * T(offset)` into `self`.
    ///
    /// Only elements 12..16 are written. Columns 0..3 of `self` keep whatever
    /// they held before the call.
    pub fn translate_from(&mut self, source: &Mat4, offset: Vec3) {
        let a = &source.data;
        let [x, y, z] = offset;
        for r in 0..4 {
            self.data[12 + r] = a[r] * x + a[4 + r] * y + a[8 + r] * z + a[12 + r];
        }
    }

    pub fn translated(&self, offset: Vec3) -> Mat4 {
        let mut out = *self;
        out.translate(offset);
        out
    }

    /// `self = self * R(axis, angle)`.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) -> Result<(), MatrixError> {
        let source = *self;
        self.rotate_from(&source, angle, axis)
    }

    /// Writes `source * R(axis, angle)` into `self`, axis-angle via Rodrigues.
    ///
    /// Columns 0..3 are rotated; the translation column is copied from
    /// `source`. On a degenerate axis `self` is left untouched.
    pub fn rotate_from(
        &mut self,
        source: &Mat4,
        angle: f32,
        axis: Vec3,
    ) -> Result<(), MatrixError> {
        let [mut x, mut y, mut z] = axis;
        let length = (x * x + y * y + z * z).sqrt();
        if length < AXIS_EPSILON {
            return Err(MatrixError::DegenerateAxis { length });
        }

        let inv_len = 1.0 / length;
        x *= inv_len;
        y *= inv_len;
        z *= inv_len;

        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;

        let b00 = x * x * t + c;
        let b01 = y * x * t + z * s;
        let b02 = z * x * t - y * s;
        let b10 = x * y * t - z * s;
        let b11 = y * y * t + c;
        let b12 = z * y * t + x * s;
        let b20 = x * z * t + y * s;
        let b21 = y * z * t - x * s;
        let b22 = z * z * t + c;

        let a = &source.data;
        for r in 0..4 {
            let (a0, a1, a2) = (a[r], a[4 + r], a[8 + r]);
            self.data[r] = a0 * b00 + a1 * b01 + a2 * b02;
            self.data[4 + r] = a0 * b10 + a1 * b11 + a2 * b12;
            self.data[8 + r] = a0 * b20 + a1 * b21 + a2 * b22;
            self.data[12 + r] = a[12 + r];
        }

        Ok(())
    }

    pub fn rotated(&self, angle: f32, axis: Vec3) -> Result<Mat4, MatrixError> {
        let mut out = *self;
        out.rotate(angle, axis)?;
        Ok(out)
    }

    /// Determinant by 2x2 sub-determinant expansion.
    pub fn determinant(&self) -> f32 {
        let m = Minors::of(&self.data);
        m.determinant()
    }

    /// Writes the inverse of `source` into `self`. On a singular `source`
    /// `self` is left untouched.
    pub fn invert_from(&mut self, source: &Mat4) -> Result<(), MatrixError> {
        let a = &source.data;
        let m = Minors::of(a);
        let determinant = m.determinant();
        if determinant.abs() < SINGULAR_EPSILON {
            return Err(MatrixError::Singular { determinant });
        }
        let inv = 1.0 / determinant;

        let (a00, a01, a02, a03) = (a[0], a[1], a[2], a[3]);
        let (a10, a11, a12, a13) = (a[4], a[5], a[6], a[7]);
        let (a20, a21, a22, a23) = (a[8], a[9], a[10], a[11]);
        let (a30, a31, a32, a33) = (a[12], a[13], a[14], a[15]);
        let Minors { b00, b01, b02, b03, b04, b05, b06, b07, b08, b09, b10, b11 } = m;

        self.data = [
            (a11 * b11 - a12 * b10 + a13 * b09) * inv,
            (a02 * b10 - a01 * b11 - a03 * b09) * inv,
            (a31 * b05 - a32 * b04 + a33 * b03) * inv,
            (a22 * b04 - a21 * b05 - a23 * b03) * inv,
            (a12 * b08 - a10 * b11 - a13 * b07) * inv,
            (a00 * b11 - a02 * b08 + a03 * b07) * inv,
            (a32 * b02 - a30 * b05 - a33 * b01) * inv,
            (a20 * b05 - a22 * b02 + a23 * b01) * inv,
            (a10 * b10 - a11 * b08 + a13 * b06) * inv,
            (a01 * b08 - a00 * b10 - a03 * b06) * inv,
            (a30 * b04 - a31 * b02 + a33 * b00) * inv,
            (a21 * b02 - a20 * b04 - a23 * b00) * inv,
            (a11 * b07 - a10 * b09 - a12 * b06) * inv,
            (a00 * b09 - a01 * b07 + a02 * b06) * inv,
            (a31 * b01 - a30 * b03 - a32 * b00) * inv,
            (a20 * b03 - a21 * b01 + a22 * b00) * inv,
        ];

        Ok(())
    }

    pub fn inverse(&self) -> Result<Mat4, MatrixError> {
        let mut out = *self;
        out.invert_from(self)?;
        Ok(out)
    }

    pub fn transpose(&mut self) {
        let source = *self;
        self.transpose_from(&source);
    }

    /// Writes the transpose of `source` into `self`.
    pub fn transpose_from(&mut self, source: &Mat4) {
        for i in 0..4 {
            for j in 0..4 {
                self.data[j * 4 + i] = source.data[i * 4 + j];
            }
        }
    }

    pub fn transposed(&self) -> Mat4 {
        let mut out = *self;
        out.transpose();
        out
    }

    /// Inverse-transpose of a model-view matrix, used to re-orient normals.
    pub fn normal_matrix(model_view: &Mat4) -> Result<Mat4, MatrixError> {
        Ok(model_view.inverse()?.transposed())
    }

    pub fn transform_point(&self, point: [f32; 4]) -> [f32; 4] {
        let m = &self.data;
        let mut out = [0.0; 4];
        for (r, value) in out.iter_mut().enumerate() {
            *value = m[r] * point[0] + m[4 + r] * point[1] + m[8 + r] * point[2] + m[12 + r] * point[3];
        }
        out
    }

    /// Element at `row`, `col`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[col * 4 + row]
    }

    pub fn approx_eq(&self, other: &Mat4, epsilon: f32) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::create()
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let (a, b) = (&self.data, &rhs.data);
        let mut data = [0.0; 16];
        for c in 0..4 {
            for r in 0..4 {
                data[c * 4 + r] = (0..4).map(|k| a[k * 4 + r] * b[c * 4 + k]).sum::<f32>();
            }
        }
        Mat4 { data }
    }
}

impl From<Mat4> for Matrix4<f32> {
    fn from(m: Mat4) -> Self {
        Matrix4::from_column_slice(&m.data)
    }
}

impl From<Matrix4<f32>> for Mat4 {
    fn from(m: Matrix4<f32>) -> Self {
        let mut data = [0.0; 16];
        data.copy_from_slice(m.as_slice());
        Mat4 { data }
    }
}

/// 2x2 sub-determinants of the top two and bottom two rows pairs, shared by
/// the determinant and the inverse.
struct Minors {
    b00: f32,
    b01: f32,
    b02: f32,
    b03: f32,
    b04: f32,
    b05: f32,
    b06: f32,
    b07: f32,
    b08: f32,
    b09: f32,
    b10: f32,
    b11: f32,
}

impl Minors {
    fn of(a: &[f32; 16]) -> Self {
        let (a00, a01, a02, a03) = (a[0], a[1], a[2], a[3]);
        let (a10, a11, a12, a13) = (a[4], a[5], a[6], a[7]);
        let (a20, a21, a22, a23) = (a[8], a[9], a[10], a[11]);
        let (a30, a31, a32, a33) = (a[12], a[13], a[14], a[15]);

        Self {
            b00: a00 * a11 - a01 * a10,
            b01: a00 * a12 - a02 * a10,
            b02: a00 * a13 - a03 * a10,
            b03: a01 * a12 - a02 * a11,
            b04: a01 * a13 - a03 * a11,
            b05: a02 * a13 - a03 * a12,
            b06: a20 * a31 - a21 * a30,
            b07: a20 * a32 - a22 * a30,
            b08: a20 * a33 - a23 * a30,
            b09: a21 * a32 - a22 * a31,
            b10: a21 * a33 - a23 * a31,
            b11: a22 * a33 - a23 * a32,
        }
    }

    fn determinant(&self) -> f32 {
        self.b00 * self.b11 - self.b01 * self.b10 + self.b02 * self.b09 + self.b03 * self.b08
            - self.b04 * self.b07
            + self.b05 * self.b06
    }
}
