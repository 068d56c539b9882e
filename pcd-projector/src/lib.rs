pub mod color;
pub mod projector;
pub mod rig;

pub use projector::{FrameProjection, FrameProjector, ProjectedPoint};
pub use rig::{project_rig, CameraProjection};
