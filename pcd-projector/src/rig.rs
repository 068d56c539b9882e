use std::collections::BTreeMap;

use camera_model::{CameraConfig, CameraModel, ConfigError};
use pcd_core::pointcloud::point::PointCloud;
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

use crate::projector::{FrameProjection, FrameProjector};

#[derive(Debug)]
pub struct CameraProjection {
    pub camera: String,
    pub result: Result<FrameProjection, ConfigError>,
}

/// Projects one frame onto every configured camera. A camera with a bad configuration
/// gets its own error and does not affect the others. Output is ordered by camera name.
pub fn project_rig(
    point_cloud: &PointCloud,
    cameras: &BTreeMap<String, CameraConfig>,
) -> Vec<CameraProjection> {
    let entries: Vec<(&String, &CameraConfig)> = cameras.iter().collect();

    entries
        .par_iter()
        .map(|(name, config)| {
            let result = CameraModel::from_config(name, config)
                .map(|camera| FrameProjector::new(camera).project(point_cloud));
            if let Err(e) = &result {
                log::warn!("skipping overlay: {e}");
            }
            CameraProjection {
                camera: (*name).clone(),
                result,
            }
        })
        .collect()
}
