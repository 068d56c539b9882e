use camera_model::CameraModel;
use pcd_core::pointcloud::point::PointCloud;
use serde::Serialize;

use crate::color::height_to_rgb;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub u: f64,
    pub v: f64,
    /// Sensor-frame Z of the source point.
    pub height: f64,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameProjection {
    pub points: Vec<ProjectedPoint>,
    /// One entry per input point; `true` where a projected point was produced.
    #[serde(skip)]
    pub valid: Vec<bool>,
}

impl FrameProjection {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Projects whole frames onto one camera and attaches the height colour hint.
pub struct FrameProjector {
    camera: CameraModel,
}

impl FrameProjector {
    pub fn new(camera: CameraModel) -> Self {
        Self { camera }
    }

    pub fn camera(&self) -> &CameraModel {
        &self.camera
    }

    pub fn project(&self, point_cloud: &PointCloud) -> FrameProjection {
        let projection = self.camera.project(&point_cloud.points);

        let points: Vec<ProjectedPoint> = projection
            .source_indices()
            .zip(&projection.pixels)
            .map(|(index, pixel)| {
                let height = point_cloud.points[index].z;
                ProjectedPoint {
                    u: pixel.x,
                    v: pixel.y,
                    height,
                    color: height_to_rgb(height),
                }
            })
            .collect();

        FrameProjection {
            points,
            valid: projection.valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use camera_model::{CameraExtrinsics, CameraIntrinsics};
    use pcd_core::pointcloud::point::Point;

    use super::*;

    fn projector() -> FrameProjector {
        FrameProjector::new(CameraModel::new(
            "port_1",
            CameraIntrinsics::pinhole(1000.0, 1000.0, 960.0, 640.0),
            CameraExtrinsics::default(),
        ))
    }

    #[test]
    fn principal_point_scenario() {
        let cloud = PointCloud::new(vec![Point::new(0.0, 0.0, 5.0)]);
        let projection = projector().project(&cloud);
        assert_eq!(projection.len(), 1);
        let p = projection.points[0];
        assert_abs_diff_eq!(p.u, 960.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.v, 640.0, epsilon = 1e-9);
        assert_eq!(p.height, 5.0);
        assert_eq!(p.color, [255, 0, 0]);
    }

    #[test]
    fn colour_follows_source_height() {
        // identity extrinsics: sensor z is also the camera depth
        let cloud = PointCloud::new(vec![
            Point::new(0.0, 0.0, 0.05),
            Point::new(0.1, 0.0, 1.5),
            Point::new(0.0, 0.0, -3.0),
            Point::new(0.0, 0.2, 4.0),
        ]);
        let projection = projector().project(&cloud);
        assert_eq!(projection.valid, vec![false, true, false, true]);
        assert_eq!(projection.points[0].height, 1.5);
        assert_eq!(projection.points[0].color, [0, 255, 0]);
        assert_eq!(projection.points[1].height, 4.0);
    }

    #[test]
    fn serializes_points_only() {
        let cloud = PointCloud::new(vec![Point::new(0.0, 0.0, 5.0)]);
        let json = serde_json::to_value(projector().project(&cloud)).unwrap();
        assert!(json.get("valid").is_none());
        assert_eq!(json["points"][0]["color"], serde_json::json!([255, 0, 0]));
    }
}
