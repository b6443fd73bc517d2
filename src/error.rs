use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TrackError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("failed to parse config: {0}")]
    ConfigParse(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("detector error: {0}")]
    Detector(String),
    #[error("short-term tracker error: {0}")]
    ShortTermTracker(String),
}

impl From<std::io::Error> for TrackError {
    fn from(err: std::io::Error) -> Self {
        TrackError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        TrackError::ConfigParse(err.to_string())
    }
}
