pub mod noise;

pub use noise::NoiseTerrain;

use crate::error::TerrainError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Источник рельефа: по мировым координатам возвращает тип поверхности.
///
/// Настоящая реализация опрашивает мир игры; крейту нужен только предикат
/// `is_water_or_coastal`.
pub trait TerrainOracle {
    type Kind;

    fn sample_terrain(&self, world_x: i64, world_z: i64) -> Result<Self::Kind, TerrainError>;

    /// Вода или побережье (океан, пляж)
    fn is_water_or_coastal(&self, kind: &Self::Kind) -> bool;
}

impl<T: TerrainOracle + ?Sized> TerrainOracle for &T {
    type Kind = T::Kind;

    fn sample_terrain(&self, world_x: i64, world_z: i64) -> Result<Self::Kind, TerrainError> {
        (**self).sample_terrain(world_x, world_z)
    }

    fn is_water_or_coastal(&self, kind: &Self::Kind) -> bool {
        (**self).is_water_or_coastal(kind)
    }
}

impl<T: TerrainOracle + ?Sized> TerrainOracle for Arc<T> {
    type Kind = T::Kind;

    fn sample_terrain(&self, world_x: i64, world_z: i64) -> Result<Self::Kind, TerrainError> {
        (**self).sample_terrain(world_x, world_z)
    }

    fn is_water_or_coastal(&self, kind: &Self::Kind) -> bool {
        (**self).is_water_or_coastal(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    DeepOcean,
    Ocean,
    Beach,
    Plains,
    Hills,
    Mountains,
}

impl TerrainKind {
    #[must_use]
    pub fn is_water_or_coastal(self) -> bool {
        matches!(
            self,
            TerrainKind::DeepOcean | TerrainKind::Ocean | TerrainKind::Beach
        )
    }
}
