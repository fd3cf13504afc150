use crate::config::TerrainSettings;
use crate::error::TerrainError;
use crate::terrain::{TerrainKind, TerrainOracle};
use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

/// Рельеф из шума: заменяет мир игры, когда его нет (CLI, демонстрация)
pub struct NoiseTerrain {
    noise: FastNoiseLite,
    sea_level: f32,
    beach_width: f32,
}

impl std::fmt::Debug for NoiseTerrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseTerrain")
            .field("sea_level", &self.sea_level)
            .field("beach_width", &self.beach_width)
            .finish_non_exhaustive()
    }
}

impl NoiseTerrain {
    #[must_use]
    pub fn new(settings: &TerrainSettings) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(settings.seed));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(4));
        noise.set_frequency(Some(settings.frequency));
        Self {
            noise,
            sea_level: settings.sea_level,
            beach_width: settings.beach_width,
        }
    }

    /// Тип поверхности по высоте шума в диапазоне [-1, 1]
    #[must_use]
    pub fn kind_for_height(&self, height: f32) -> TerrainKind {
        let above_sea = height - self.sea_level;
        if above_sea < -0.3 {
            TerrainKind::DeepOcean
        } else if above_sea < 0.0 {
            TerrainKind::Ocean
        } else if above_sea < self.beach_width {
            TerrainKind::Beach
        } else if above_sea < 0.35 {
            TerrainKind::Plains
        } else if above_sea < 0.6 {
            TerrainKind::Hills
        } else {
            TerrainKind::Mountains
        }
    }
}

impl TerrainOracle for NoiseTerrain {
    type Kind = TerrainKind;

    fn sample_terrain(&self, world_x: i64, world_z: i64) -> Result<TerrainKind, TerrainError> {
        let height = self.noise.get_noise_2d(world_x as f32, world_z as f32);
        if !height.is_finite() {
            return Err(TerrainError {
                x: world_x,
                z: world_z,
                reason: "noise produced a non-finite height".into(),
            });
        }
        Ok(self.kind_for_height(height))
    }

    fn is_water_or_coastal(&self, kind: &TerrainKind) -> bool {
        kind.is_water_or_coastal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_bands() {
        let terrain = NoiseTerrain::new(&TerrainSettings::default());
        assert_eq!(terrain.kind_for_height(-0.9), TerrainKind::DeepOcean);
        assert_eq!(terrain.kind_for_height(-0.1), TerrainKind::Ocean);
        assert_eq!(terrain.kind_for_height(0.01), TerrainKind::Beach);
        assert_eq!(terrain.kind_for_height(0.2), TerrainKind::Plains);
        assert_eq!(terrain.kind_for_height(0.9), TerrainKind::Mountains);
    }

    #[test]
    fn samples_are_stable_for_a_seed() {
        let terrain = NoiseTerrain::new(&TerrainSettings::default());
        let a = terrain.sample_terrain(1200, -340).unwrap();
        let b = terrain.sample_terrain(1200, -340).unwrap();
        assert_eq!(a, b);
        assert_eq!(terrain.is_water_or_coastal(&a), a.is_water_or_coastal());
    }
}
