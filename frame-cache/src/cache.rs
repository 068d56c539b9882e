use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use dashmap::DashMap;
use parking_lot::Mutex;
use pcd_core::pointcloud::{decimation::decimator::cap_to, point::PointCloud};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub dataset: String,
    pub frame: String,
}

impl FrameKey {
    pub fn new(dataset: impl Into<String>, frame: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            frame: frame.into(),
        }
    }
}

/// One cache entry. The mutex serializes loads of this key only; `generation` is the
/// dataset generation the entry was created under.
struct Slot {
    generation: u64,
    cloud: Mutex<Option<Arc<PointCloud>>>,
    // set once `cloud` holds a value, readable without waiting on a load in flight
    loaded: AtomicBool,
}

impl Slot {
    fn new(generation: u64) -> Arc<Self> {
        Arc::new(Self {
            generation,
            cloud: Mutex::new(None),
            loaded: AtomicBool::new(false),
        })
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }
}

/// Decoded point clouds keyed by (dataset, frame), loaded at most once per key and
/// capped to a point budget on the way out.
///
/// Each dataset has a generation counter that `invalidate` bumps before dropping the
/// dataset's older entries. A lookup only returns a cloud whose slot generation still
/// matches, so nothing loaded before an invalidation is handed out after it.
pub struct PointBudgetCache {
    max_points: usize,
    slots: DashMap<FrameKey, Arc<Slot>>,
    generations: DashMap<String, u64>,
}

impl PointBudgetCache {
    pub fn new(max_points: usize) -> Self {
        Self {
            max_points,
            slots: DashMap::new(),
            generations: DashMap::new(),
        }
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Returns the full cloud for the key, calling `loader` only on a miss. Concurrent
    /// callers for the same key wait for a single load; a failed load is not cached.
    pub fn get_frame<F, E>(
        &self,
        dataset: &str,
        frame: &str,
        mut loader: F,
    ) -> Result<Arc<PointCloud>, E>
    where
        F: FnMut() -> Result<PointCloud, E>,
    {
        let key = FrameKey::new(dataset, frame);
        loop {
            let slot = self.slot(&key);

            let cloud = {
                let mut cloud = slot.cloud.lock();
                match cloud.as_ref() {
                    Some(cached) => cached.clone(),
                    None => {
                        log::debug!("cache miss for {}/{}", key.dataset, key.frame);
                        let loaded = Arc::new(loader()?);
                        *cloud = Some(loaded.clone());
                        slot.loaded.store(true, Ordering::Release);
                        loaded
                    }
                }
            };

            if self.generation(dataset) == slot.generation {
                return Ok(cloud);
            }
            log::debug!(
                "dataset {} invalidated while loading {}, reloading",
                key.dataset,
                key.frame
            );
        }
    }

    /// Like [`get_frame`](Self::get_frame), capped to the configured point budget.
    pub fn get_capped<F, E>(
        &self,
        dataset: &str,
        frame: &str,
        loader: F,
    ) -> Result<Arc<PointCloud>, E>
    where
        F: FnMut() -> Result<PointCloud, E>,
    {
        let cloud = self.get_frame(dataset, frame, loader)?;
        if cloud.len() <= self.max_points {
            Ok(cloud)
        } else {
            Ok(Arc::new(cap_to(&cloud, self.max_points)))
        }
    }

    /// Drops every entry of `dataset` created before this call. Lookups in flight for
    /// it will reload.
    pub fn invalidate(&self, dataset: &str) {
        let generation = {
            let mut generation = self.generations.entry(dataset.to_string()).or_insert(0);
            *generation += 1;
            *generation
        };
        // slots already created under the new generation are fresh and stay
        self.slots
            .retain(|key, slot| key.dataset != dataset || slot.generation >= generation);
        log::debug!("invalidated cached frames of {dataset}");
    }

    pub fn clear(&self) {
        let mut datasets: Vec<String> = self
            .slots
            .iter()
            .map(|entry| entry.key().dataset.clone())
            .collect();
        datasets.sort();
        datasets.dedup();
        for dataset in datasets {
            self.invalidate(&dataset);
        }
    }

    /// Number of keys with a loaded cloud. Never waits on a load in progress.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().is_loaded())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, dataset: &str, frame: &str) -> bool {
        self.slots
            .get(&FrameKey::new(dataset, frame))
            .is_some_and(|slot| slot.is_loaded())
    }

    fn generation(&self, dataset: &str) -> u64 {
        self.generations.get(dataset).map_or(0, |g| *g)
    }

    fn slot(&self, key: &FrameKey) -> Arc<Slot> {
        let entry = self.slots.entry(key.clone());
        // read while the key's shard is locked: an `invalidate` bumping past this value
        // has to wait for the shard before its sweep, and sweeps this slot
        let generation = self.generation(&key.dataset);
        let mut slot = entry.or_insert_with(|| Slot::new(generation));
        if slot.generation < generation {
            *slot = Slot::new(generation);
        }
        slot.value().clone()
    }
}
