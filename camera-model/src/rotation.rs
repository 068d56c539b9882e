use nalgebra::{Matrix3, Vector3};

/// Orthonormal 3x3 rotation built from roll/pitch/yaw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix(Matrix3<f64>);

/// Builds `R = Rz(yaw) * Ry(pitch) * Rx(roll)` from angles in degrees.
///
/// Roll is applied first and yaw last. Every calibration stored so far assumes this
/// order; changing it changes every projection.
pub fn rotation_from_euler(roll: f64, pitch: f64, yaw: f64) -> RotationMatrix {
    let (sr, cr) = roll.to_radians().sin_cos();
    let (sp, cp) = pitch.to_radians().sin_cos();
    let (sy, cy) = yaw.to_radians().sin_cos();

    #[rustfmt::skip]
    let rx = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, cr, -sr,
        0.0, sr, cr,
    );
    #[rustfmt::skip]
    let ry = Matrix3::new(
        cp, 0.0, sp,
        0.0, 1.0, 0.0,
        -sp, 0.0, cp,
    );
    #[rustfmt::skip]
    let rz = Matrix3::new(
        cy, -sy, 0.0,
        sy, cy, 0.0,
        0.0, 0.0, 1.0,
    );

    RotationMatrix(rz * ry * rx)
}

impl RotationMatrix {
    pub fn identity() -> Self {
        Self(Matrix3::identity())
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    pub fn apply(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0 * v
    }
}

impl Default for RotationMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn orthonormal_for_any_angles() {
        let angles = [-180.0, -135.0, -90.0, -33.3, 0.0, 12.5, 45.0, 90.0, 179.9, 270.0, 725.0];
        for &roll in &angles {
            for &pitch in &angles {
                for &yaw in &angles {
                    let r = rotation_from_euler(roll, pitch, yaw);
                    assert_abs_diff_eq!(r.determinant(), 1.0, epsilon = 1e-6);
                    let rtr = r.transpose().matrix() * r.matrix();
                    assert_abs_diff_eq!(rtr, Matrix3::identity(), epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn pure_roll_rotates_y_into_z() {
        let r = rotation_from_euler(90.0, 0.0, 0.0);
        let v = r.apply(&Vector3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(v, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn pure_pitch_and_yaw() {
        let v = rotation_from_euler(0.0, 90.0, 0.0).apply(&Vector3::new(0.0, 0.0, 1.0));
        assert_abs_diff_eq!(v, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

        let v = rotation_from_euler(0.0, 0.0, 90.0).apply(&Vector3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(v, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn roll_is_innermost() {
        // Rz(90) * Rx(90): x stays x under roll, then yaw sends it to y
        let r = rotation_from_euler(90.0, 0.0, 90.0);
        let v = r.apply(&Vector3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(v, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        // y rolls into z, which yaw leaves alone
        let v = r.apply(&Vector3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(v, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn zero_angles_are_identity() {
        assert_eq!(rotation_from_euler(0.0, 0.0, 0.0), RotationMatrix::identity());
    }
}
