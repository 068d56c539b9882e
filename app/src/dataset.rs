use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::AppError;

/// Camera port whose images define the frame list.
pub const REFERENCE_PORT: &str = "port_1";
pub const LIDAR_DIR: &str = "lidar_os2_pcd";
pub const IMAGE_EXTENSION: &str = "jpg";
pub const CLOUD_EXTENSION: &str = "pcd";

/// On-disk layout of one recorded scene:
/// `<root>/<port>/<frame>.jpg` and `<root>/lidar_os2_pcd/<frame>.pcd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    root: PathBuf,
}

impl Dataset {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AppError::DatasetNotFound(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache key of the dataset.
    pub fn id(&self) -> String {
        self.root.to_string_lossy().into_owned()
    }

    pub fn image_path(&self, port: &str, frame: &str) -> PathBuf {
        self.root
            .join(port)
            .join(format!("{frame}.{IMAGE_EXTENSION}"))
    }

    pub fn pcd_path(&self, frame: &str) -> PathBuf {
        self.root
            .join(LIDAR_DIR)
            .join(format!("{frame}.{CLOUD_EXTENSION}"))
    }

    /// Frame ids from the reference port's images, sorted. Empty when the port is missing.
    pub fn frames(&self) -> Result<Vec<String>, AppError> {
        let port_dir = self.root.join(REFERENCE_PORT);
        if !port_dir.is_dir() {
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/*.{IMAGE_EXTENSION}",
            Pattern::escape(&port_dir.to_string_lossy())
        );
        let mut frames = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|e| AppError::Listing {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                frames.push(stem.to_string());
            }
        }
        frames.sort();
        Ok(frames)
    }

    /// Missing runs among the numbered frames, as inclusive `(first, last)` ranges.
    pub fn gaps(&self) -> Result<Vec<(u64, u64)>, AppError> {
        let numbers: Vec<u64> = self
            .frames()?
            .iter()
            .filter_map(|frame| frame.parse().ok())
            .collect();
        Ok(find_gaps(numbers))
    }
}

pub fn find_gaps(mut numbers: Vec<u64>) -> Vec<(u64, u64)> {
    numbers.sort_unstable();
    numbers.dedup();

    let mut gaps = Vec::new();
    let mut expected = match numbers.first() {
        Some(&first) => first,
        None => return gaps,
    };
    for number in numbers {
        if number != expected {
            gaps.push((expected, number - 1));
        }
        expected = number + 1;
    }
    gaps
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn gaps_between_runs() {
        assert_eq!(find_gaps(vec![3, 1, 2, 7, 8, 10]), vec![(4, 6), (9, 9)]);
        assert!(find_gaps(vec![5, 5, 6]).is_empty());
        assert!(find_gaps(Vec::new()).is_empty());
    }

    #[test]
    fn lists_frames_from_reference_port() {
        let dir = tempfile::tempdir().unwrap();
        let port = dir.path().join(REFERENCE_PORT);
        fs::create_dir_all(&port).unwrap();
        for name in ["000012.jpg", "000010.jpg", "000013.jpg", "notes.txt"] {
            fs::write(port.join(name), b"").unwrap();
        }
        fs::create_dir_all(dir.path().join("port_2")).unwrap();
        fs::write(dir.path().join("port_2").join("000099.jpg"), b"").unwrap();

        let dataset = Dataset::open(dir.path()).unwrap();
        assert_eq!(dataset.frames().unwrap(), vec!["000010", "000012", "000013"]);
        assert_eq!(dataset.gaps().unwrap(), vec![(11, 11)]);
        assert_eq!(
            dataset.pcd_path("000010"),
            dir.path().join(LIDAR_DIR).join("000010.pcd")
        );
        assert_eq!(
            dataset.image_path("port_2", "000099"),
            dir.path().join("port_2").join("000099.jpg")
        );
    }

    #[test]
    fn missing_reference_port_has_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Dataset::open(dir.path()).unwrap();
        assert!(dataset.frames().unwrap().is_empty());
    }

    #[test]
    fn missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::open(dir.path().join("nope")).unwrap_err();
        assert!(err.is_not_found());
    }
}
