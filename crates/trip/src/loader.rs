use std::fs;
use std::path::{Path, PathBuf};

use crate::model::TripData;

#[derive(Debug)]
pub enum TripLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl std::fmt::Display for TripLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripLoadError::Io { path, source } => {
                write!(f, "failed to read trip {}: {source}", path.display())
            }
            TripLoadError::Parse(e) => write!(f, "failed to parse trip: {e}"),
        }
    }
}

impl std::error::Error for TripLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TripLoadError::Io { source, .. } => Some(source),
            TripLoadError::Parse(e) => Some(e),
        }
    }
}

impl TripData {
    pub fn from_json_str(payload: &str) -> Result<Self, TripLoadError> {
        serde_json::from_str(payload).map_err(TripLoadError::Parse)
    }
}

pub fn load_trip(path: impl AsRef<Path>) -> Result<TripData, TripLoadError> {
    let path = path.as_ref();
    let payload = fs::read_to_string(path).map_err(|e| TripLoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    TripData::from_json_str(&payload)
}
