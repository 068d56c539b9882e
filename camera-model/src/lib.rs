mod camera;
mod config;
mod error;
mod intrinsics;
mod projection;
mod rotation;

pub use camera::CameraModel;
pub use config::{CameraConfig, CameraExtrinsics, IntrinsicsConfig, RigConfig};
pub use error::ConfigError;
pub use intrinsics::CameraIntrinsics;
pub use projection::{project, project_points, transform_to_camera, Projection, MIN_DEPTH};
pub use rotation::{rotation_from_euler, RotationMatrix};
