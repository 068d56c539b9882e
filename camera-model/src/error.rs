use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("camera '{camera}' is missing intrinsic field(s): {}", fields.join(", "))]
    MissingIntrinsics {
        camera: String,
        fields: Vec<&'static str>,
    },
    #[error("camera '{camera}' has invalid intrinsics: {reason}")]
    InvalidIntrinsics { camera: String, reason: String },
}

impl ConfigError {
    pub fn camera(&self) -> &str {
        match self {
            Self::MissingIntrinsics { camera, .. } | Self::InvalidIntrinsics { camera, .. } => {
                camera
            }
        }
    }
}
