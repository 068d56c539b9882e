use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{config::IntrinsicsConfig, error::ConfigError};

/// Validated pinhole intrinsics with radial (k1, k2, k3) and tangential (p1, p2)
/// distortion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
    pub k3: f64,
}

impl CameraIntrinsics {
    pub fn pinhole(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            k1: 0.0,
            k2: 0.0,
            p1: 0.0,
            p2: 0.0,
            k3: 0.0,
        }
    }

    pub fn from_config(camera: &str, config: &IntrinsicsConfig) -> Result<Self, ConfigError> {
        let required = [
            ("fx", config.fx),
            ("fy", config.fy),
            ("cx", config.cx),
            ("cy", config.cy),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingIntrinsics {
                camera: camera.to_string(),
                fields: missing,
            });
        }

        let intrinsics = Self {
            fx: config.fx.unwrap_or_default(),
            fy: config.fy.unwrap_or_default(),
            cx: config.cx.unwrap_or_default(),
            cy: config.cy.unwrap_or_default(),
            k1: config.k1.unwrap_or(0.0),
            k2: config.k2.unwrap_or(0.0),
            p1: config.p1.unwrap_or(0.0),
            p2: config.p2.unwrap_or(0.0),
            k3: config.k3.unwrap_or(0.0),
        };
        intrinsics.validate(camera)?;
        Ok(intrinsics)
    }

    fn validate(&self, camera: &str) -> Result<(), ConfigError> {
        let values = [
            ("fx", self.fx),
            ("fy", self.fy),
            ("cx", self.cx),
            ("cy", self.cy),
            ("k1", self.k1),
            ("k2", self.k2),
            ("p1", self.p1),
            ("p2", self.p2),
            ("k3", self.k3),
        ];
        if let Some((name, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::InvalidIntrinsics {
                camera: camera.to_string(),
                reason: format!("{name} is {value}"),
            });
        }
        if self.fx == 0.0 || self.fy == 0.0 {
            return Err(ConfigError::InvalidIntrinsics {
                camera: camera.to_string(),
                reason: "focal length must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Applies radial then tangential distortion to normalized image coordinates.
    pub fn distort(&self, x: f64, y: f64) -> (f64, f64) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;
        let radial = 1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6;

        let xd = x * radial + 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let yd = y * radial + self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
        (xd, yd)
    }

    /// Maps normalized coordinates `(x/z, y/z)` to pixels.
    pub fn to_pixel(&self, x: f64, y: f64) -> Point2<f64> {
        let (xd, yd) = self.distort(x, y);
        Point2::new(self.fx * xd + self.cx, self.fy * yd + self.cy)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn full_config() -> IntrinsicsConfig {
        IntrinsicsConfig {
            fx: Some(1000.0),
            fy: Some(1000.0),
            cx: Some(960.0),
            cy: Some(640.0),
            ..Default::default()
        }
    }

    #[test]
    fn distortion_defaults_to_zero() {
        let intrinsics = CameraIntrinsics::from_config("port_1", &full_config()).unwrap();
        assert_eq!(intrinsics, CameraIntrinsics::pinhole(1000.0, 1000.0, 960.0, 640.0));
    }

    #[test]
    fn lists_every_missing_field() {
        let config = IntrinsicsConfig {
            fx: Some(1000.0),
            cx: Some(960.0),
            k1: Some(0.1),
            ..Default::default()
        };
        let err = CameraIntrinsics::from_config("port_3", &config).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingIntrinsics {
                camera: "port_3".to_string(),
                fields: vec!["fy", "cy"],
            }
        );
        assert_eq!(
            err.to_string(),
            "camera 'port_3' is missing intrinsic field(s): fy, cy"
        );
    }

    #[test]
    fn rejects_degenerate_values() {
        let mut config = full_config();
        config.fy = Some(0.0);
        assert!(matches!(
            CameraIntrinsics::from_config("c", &config),
            Err(ConfigError::InvalidIntrinsics { .. })
        ));

        let mut config = full_config();
        config.k2 = Some(f64::NAN);
        assert!(matches!(
            CameraIntrinsics::from_config("c", &config),
            Err(ConfigError::InvalidIntrinsics { .. })
        ));
    }

    #[test]
    fn radial_distortion() {
        let mut intrinsics = CameraIntrinsics::pinhole(500.0, 500.0, 320.0, 240.0);
        intrinsics.k1 = 0.1;
        intrinsics.k2 = 0.01;
        // (0.2, 0.2): r2 = 0.08, radial = 1 + 0.008 + 0.000064
        let pixel = intrinsics.to_pixel(0.2, 0.2);
        assert_abs_diff_eq!(pixel.x, 0.2 * 1.008064 * 500.0 + 320.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pixel.y, 0.2 * 1.008064 * 500.0 + 240.0, epsilon = 1e-9);
    }

    #[test]
    fn tangential_distortion() {
        let mut intrinsics = CameraIntrinsics::pinhole(1.0, 1.0, 0.0, 0.0);
        intrinsics.p1 = 0.01;
        intrinsics.p2 = -0.02;
        let (xd, yd) = intrinsics.distort(0.3, -0.4);
        // r2 = 0.25
        assert_abs_diff_eq!(
            xd,
            0.3 + 2.0 * 0.01 * 0.3 * -0.4 + -0.02 * (0.25 + 0.18),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            yd,
            -0.4 + 0.01 * (0.25 + 0.32) + 2.0 * -0.02 * 0.3 * -0.4,
            epsilon = 1e-12
        );
    }
}
