//! Ошибки крейта

use crate::validation::controller::JobStatus;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("province data io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("province data is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum PlacementError {
    #[error("could not create the minimum number of provinces: required {required}, actual {actual}")]
    InsufficientProvinces { required: f64, actual: usize },
}

/// Ошибка источника рельефа: координата не может быть разрешена
#[derive(Debug, Error, Clone, PartialEq)]
#[error("terrain unavailable at ({x}, {z}): {reason}")]
pub struct TerrainError {
    pub x: i64,
    pub z: i64,
    pub reason: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("province {0} has no cells to sample")]
    EmptyProvince(u32),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    #[error("sampling pause was interrupted")]
    Interrupted,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot {request} while job is {from:?}")]
pub struct ControlError {
    pub from: JobStatus,
    pub request: &'static str,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to persist provinces: {0}")]
    Store(#[from] StoreError),
}
