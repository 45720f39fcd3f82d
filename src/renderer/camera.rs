use glam::{Mat3, Mat4, Vec3};

/// Fixed offset of the model from the eye, applied before any rotation.
pub const MODEL_OFFSET: Vec3 = Vec3::new(0.0, -1.0, -100.0);

pub const LIGHT_DIRECTION: Vec3 = Vec3::new(1.0, 1.0, 1.0);

/// Perspective parameters. The aspect ratio is captured once at startup and
/// is not updated when the window is resized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            fov: std::f32::consts::FRAC_PI_2,
            aspect: width.max(1) as f32 / height.max(1) as f32,
            near: 0.1,
            far: 500.0,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }
}

/// Translate by [`MODEL_OFFSET`], then rotate about Y, then about X.
pub fn model_view(rotation_x: f32, rotation_y: f32) -> Mat4 {
    Mat4::from_translation(MODEL_OFFSET)
        * Mat4::from_rotation_y(rotation_y)
        * Mat4::from_rotation_x(rotation_x)
}

/// Inverse-transpose of the upper 3x3 of `model_view`.
pub fn normal_matrix(model_view: &Mat4) -> Mat3 {
    Mat3::from_mat4(*model_view).inverse().transpose()
}

/// Vertex stage transforms; bound by both programs.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(model_view: &Mat4, projection: &Mat4) -> Self {
        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }
}

/// Solid pass only. WGSL pads each `mat3x3` column to 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub normal_matrix: [[f32; 4]; 3],
    pub light_direction: [f32; 3],
    pub _padding: f32,
}

impl LightingUniform {
    pub fn new(normal_matrix: &Mat3, light_direction: Vec3) -> Self {
        let col = |c: Vec3| [c.x, c.y, c.z, 0.0];
        Self {
            normal_matrix: [
                col(normal_matrix.x_axis),
                col(normal_matrix.y_axis),
                col(normal_matrix.z_axis),
            ],
            light_direction: light_direction.to_array(),
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_creation() {
        let projection = Projection::new(800, 600);
        assert!((projection.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert!((projection.fov - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(projection.near, 0.1);
        assert_eq!(projection.far, 500.0);
    }

    #[test]
    fn test_zero_sized_viewport() {
        let projection = Projection::new(0, 0);
        assert!(projection.matrix().is_finite());
    }

    #[test]
    fn test_model_view_without_rotation_is_translation() {
        let mv = model_view(0.0, 0.0);
        assert!(mv.abs_diff_eq(Mat4::from_translation(MODEL_OFFSET), 1e-6));
    }

    #[test]
    fn test_rotation_order() {
        let (rx, ry) = (0.3, 1.1);
        let mv = model_view(rx, ry);
        let p = Vec3::new(0.0, 0.0, 1.0);
        let expected = Mat4::from_rotation_y(ry).transform_vector3(
            Mat4::from_rotation_x(rx).transform_vector3(p),
        ) + MODEL_OFFSET;
        assert!(mv.transform_point3(p).abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_normal_matrix_of_rigid_motion_is_rotation() {
        let mv = model_view(0.7, -2.4);
        let n = normal_matrix(&mv);
        assert!(n.abs_diff_eq(Mat3::from_mat4(mv), 1e-5));
    }

    #[test]
    fn test_lighting_uniform_layout() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 128);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 64);
        let u = LightingUniform::new(&Mat3::IDENTITY, LIGHT_DIRECTION);
        assert_eq!(u.normal_matrix[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(u.light_direction, [1.0, 1.0, 1.0]);
    }
}
