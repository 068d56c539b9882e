use std::sync::Arc;

use camera_model::RigConfig;
use frame_cache::PointBudgetCache;
use parking_lot::RwLock;
use pcd_core::pointcloud::point::PointCloud;
use pcd_parser::{Parser as _, PcdParser};
use pcd_projector::{project_rig, CameraProjection};

use crate::{dataset::Dataset, error::AppError};

/// Default upper bound on points handed out per frame.
pub const DEFAULT_MAX_POINTS: usize = 30_000;

/// Shared state behind the calibration tool: the active dataset, the frame cache and
/// the current rig configuration. Safe to use from many threads at once.
pub struct CalibrationService {
    dataset: RwLock<Arc<Dataset>>,
    cache: PointBudgetCache,
    rig: RwLock<RigConfig>,
}

impl CalibrationService {
    pub fn new(dataset: Dataset, rig: RigConfig, max_points: usize) -> Self {
        Self {
            dataset: RwLock::new(Arc::new(dataset)),
            cache: PointBudgetCache::new(max_points),
            rig: RwLock::new(rig),
        }
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        self.dataset.read().clone()
    }

    pub fn cache(&self) -> &PointBudgetCache {
        &self.cache
    }

    /// Makes `dataset` active and drops everything cached for the previous one.
    pub fn switch_dataset(&self, dataset: Dataset) {
        let dataset = Arc::new(dataset);
        let previous = std::mem::replace(&mut *self.dataset.write(), dataset.clone());
        if previous.id() != dataset.id() {
            self.cache.invalidate(&previous.id());
        }
        log::info!("switched dataset to {:?}", dataset.root());
    }

    /// Points of `frame` in the active dataset, capped to the point budget.
    pub fn points(&self, frame: &str) -> Result<Arc<PointCloud>, AppError> {
        let dataset = self.dataset();
        let path = dataset.pcd_path(frame);
        let cloud = self
            .cache
            .get_capped(&dataset.id(), frame, || PcdParser::new(&path).parse())?;
        Ok(cloud)
    }

    /// Projects the capped points of `frame` onto every configured camera.
    pub fn overlay(&self, frame: &str) -> Result<Vec<CameraProjection>, AppError> {
        let cloud = self.points(frame)?;
        let rig = self.rig.read();
        Ok(project_rig(&cloud, &rig.cameras))
    }

    pub fn rig(&self) -> RigConfig {
        self.rig.read().clone()
    }

    /// Replaces the rig; later overlays use the new cameras. Cached frames stay valid.
    pub fn update_rig(&self, rig: RigConfig) {
        *self.rig.write() = rig;
    }
}
