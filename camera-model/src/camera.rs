use nalgebra::{Point2, Vector3};
use pcd_core::pointcloud::point::Point;

use crate::{
    config::{CameraConfig, CameraExtrinsics},
    error::ConfigError,
    intrinsics::CameraIntrinsics,
    projection::{project, transform_with, Projection, MIN_DEPTH},
    rotation::RotationMatrix,
};

/// A calibrated camera: validated intrinsics plus the LiDAR-to-camera extrinsics, with
/// the rotation built once.
#[derive(Debug, Clone)]
pub struct CameraModel {
    name: String,
    intrinsics: CameraIntrinsics,
    extrinsics: CameraExtrinsics,
    rotation: RotationMatrix,
    translation: Vector3<f64>,
}

impl CameraModel {
    pub fn new(
        name: impl Into<String>,
        intrinsics: CameraIntrinsics,
        extrinsics: CameraExtrinsics,
    ) -> Self {
        Self {
            name: name.into(),
            intrinsics,
            rotation: extrinsics.rotation(),
            translation: extrinsics.translation(),
            extrinsics,
        }
    }

    pub fn from_config(name: &str, config: &CameraConfig) -> Result<Self, ConfigError> {
        let intrinsics = CameraIntrinsics::from_config(name, &config.intrinsic)?;
        Ok(Self::new(name, intrinsics, config.extrinsic))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    pub fn extrinsics(&self) -> &CameraExtrinsics {
        &self.extrinsics
    }

    pub fn rotation(&self) -> &RotationMatrix {
        &self.rotation
    }

    pub fn set_extrinsics(&mut self, extrinsics: CameraExtrinsics) {
        self.rotation = extrinsics.rotation();
        self.translation = extrinsics.translation();
        self.extrinsics = extrinsics;
    }

    pub fn to_camera_frame(&self, points: &[Point]) -> Vec<Vector3<f64>> {
        transform_with(points, &self.rotation, &self.translation)
    }

    pub fn project(&self, points: &[Point]) -> Projection {
        let projection = project(&self.to_camera_frame(points), &self.intrinsics);
        log::debug!(
            "camera {}: {} of {} points in front",
            self.name,
            projection.pixels.len(),
            points.len()
        );
        projection
    }

    pub fn project_point(&self, point: &Point) -> Option<Point2<f64>> {
        let p = self.rotation.apply(&Vector3::new(point.x, point.y, point.z)) + self.translation;
        (p.z > MIN_DEPTH).then(|| self.intrinsics.to_pixel(p.x / p.z, p.y / p.z))
    }
}
