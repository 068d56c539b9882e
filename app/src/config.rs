use std::{collections::BTreeMap, fs, io, path::Path};

use camera_model::{CameraConfig, RigConfig};

use crate::error::AppError;

/// Loads the rig configuration. A missing file is an empty configuration.
///
/// Both `{"cameras": {...}}` and a bare `{"<port>": {...}}` map are accepted.
pub fn load_config(path: &Path) -> Result<RigConfig, AppError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("no config at {:?}, starting empty", path);
            return Ok(RigConfig::default());
        }
        Err(source) => {
            return Err(AppError::ConfigIo {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let format_error = |source| AppError::ConfigFormat {
        path: path.to_path_buf(),
        source,
    };
    let value: serde_json::Value = serde_json::from_str(&text).map_err(format_error)?;
    if value.get("cameras").is_some() {
        serde_json::from_value(value).map_err(format_error)
    } else {
        let cameras: BTreeMap<String, CameraConfig> =
            serde_json::from_value(value).map_err(format_error)?;
        Ok(RigConfig { cameras })
    }
}

pub fn save_config(path: &Path, config: &RigConfig) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).map_err(|source| AppError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })
}
