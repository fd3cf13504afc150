pub mod config;
pub mod error;
pub mod province;
pub mod terrain;
pub mod validation;

pub use config::{ProvincesConfig, WorldBounds, WorldCorner};
pub use error::{ClassifyError, ConfigError, PlacementError, StoreError, TerrainError};
pub use province::placer::{SpatialPlacer, minimum_allowed_provinces};
pub use province::store::{ProvinceRegistry, ProvinceStore};
pub use province::{Coord, Province};
pub use terrain::{NoiseTerrain, TerrainKind, TerrainOracle};
pub use validation::classifier::{FixedDelay, LandClassifier, NoPacing, SamplePacing};
pub use validation::controller::{JobStatus, ValidationJobController};
pub use validation::job::{JobOutcome, JobReport, ValidationJob, ValidationProgress};
