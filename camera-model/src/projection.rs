use nalgebra::{Point2, Vector3};
use pcd_core::pointcloud::point::Point;
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

use crate::{
    config::{CameraExtrinsics, IntrinsicsConfig},
    error::ConfigError,
    intrinsics::CameraIntrinsics,
    rotation::RotationMatrix,
};

/// Points at or closer than this camera-frame depth (meters) are not projected.
pub const MIN_DEPTH: f64 = 0.1;

/// Pixels of the points that survived depth culling, in input order, plus a mask over
/// the input telling which indices they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub pixels: Vec<Point2<f64>>,
    pub valid: Vec<bool>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Original input indices of the projected pixels.
    pub fn source_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.valid
            .iter()
            .enumerate()
            .filter_map(|(index, &valid)| valid.then_some(index))
    }
}

/// `p_cam = R * p_lidar + t` for every point. Any axis convention change between the
/// sensor and the optical frame must already be part of `R`.
pub fn transform_to_camera(points: &[Point], extrinsics: &CameraExtrinsics) -> Vec<Vector3<f64>> {
    transform_with(points, &extrinsics.rotation(), &extrinsics.translation())
}

pub(crate) fn transform_with(
    points: &[Point],
    rotation: &RotationMatrix,
    translation: &Vector3<f64>,
) -> Vec<Vector3<f64>> {
    points
        .par_iter()
        .map(|p| rotation.apply(&Vector3::new(p.x, p.y, p.z)) + translation)
        .collect()
}

/// Projects camera-frame points through the pinhole + distortion model, dropping every
/// point whose depth is not greater than [`MIN_DEPTH`].
pub fn project(points_cam: &[Vector3<f64>], intrinsics: &CameraIntrinsics) -> Projection {
    let projected: Vec<Option<Point2<f64>>> = points_cam
        .par_iter()
        .map(|p| {
            // NaN depth fails the comparison as well
            if p.z > MIN_DEPTH {
                Some(intrinsics.to_pixel(p.x / p.z, p.y / p.z))
            } else {
                None
            }
        })
        .collect();

    let valid = projected.iter().map(Option::is_some).collect();
    let pixels = projected.into_iter().flatten().collect();
    Projection { pixels, valid }
}

/// Transforms and projects sensor-frame points for one camera configuration. A
/// `ConfigError` names `camera`.
pub fn project_points(
    camera: &str,
    points: &[Point],
    intrinsics: &IntrinsicsConfig,
    extrinsics: &CameraExtrinsics,
) -> Result<Projection, ConfigError> {
    let intrinsics = CameraIntrinsics::from_config(camera, intrinsics)?;
    Ok(project(&transform_to_camera(points, extrinsics), &intrinsics))
}
