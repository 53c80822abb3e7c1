//! Math utilities and types
//!
//! Provides fundamental math types for 3D collision detection.

pub use nalgebra::{Matrix3, Rotation3, Unit, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Extension trait for Mat3 with additional convenience methods
pub trait Mat3Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat3;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat3;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat3;

    /// Create a rotation matrix from Euler angles (roll, pitch, yaw)
    fn rotation_euler(roll: f32, pitch: f32, yaw: f32) -> Mat3;
}

impl Mat3Ext for Mat3 {
    fn rotation_x(angle: f32) -> Mat3 {
        Rotation3::from_axis_angle(&Vec3::x_axis(), angle).into_inner()
    }

    fn rotation_y(angle: f32) -> Mat3 {
        Rotation3::from_axis_angle(&Vec3::y_axis(), angle).into_inner()
    }

    fn rotation_z(angle: f32) -> Mat3 {
        Rotation3::from_axis_angle(&Vec3::z_axis(), angle).into_inner()
    }

    fn rotation_euler(roll: f32, pitch: f32, yaw: f32) -> Mat3 {
        Rotation3::from_euler_angles(roll, pitch, yaw).into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_y_quarter_turn() {
        let rot = Mat3::rotation_y(constants::PI * 0.5);
        let v = rot * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_identity_rotation_preserves_vector() {
        let rot = Mat3::identity();
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(rot * v, v);
    }
}
