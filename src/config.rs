// src/config.rs
//! Конфигурация провинций
//!
//! Этот модуль определяет все параметры, управляющие разметкой мира на провинции:
//! - Границы мира и размер ячейки сетки
//! - Параметры размещения "домашних" ячеек провинций
//! - Параметры проверки суши/моря
//! - Настройки шумового источника рельефа
//!
//! Все структуры поддерживают сериализацию в TOML для удобной настройки через конфигурационные файлы.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Точка мира в блоках (вертикальная координата не нужна)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldCorner {
    pub x: f64,
    pub z: f64,
}

/// Нормализованный прямоугольник мира: `min` всегда меньше либо равен `max` по каждой оси
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl WorldBounds {
    /// Строит прямоугольник по двум противоположным углам в любом порядке.
    #[must_use]
    pub fn from_corners(a: WorldCorner, b: WorldCorner) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_z: a.z.min(b.z),
            max_x: a.x.max(b.x),
            max_z: a.z.max(b.z),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    /// Площадь мира в квадратных блоках (никогда не отрицательная)
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.depth()
    }
}

/// Границы мира и сетка
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSettings {
    /// Первый угол мира (обычно северо-западный)
    #[serde(default = "default_top_left")]
    pub top_left: WorldCorner,

    /// Противоположный угол мира
    #[serde(default = "default_bottom_right")]
    pub bottom_right: WorldCorner,

    /// Длина стороны ячейки сетки в блоках (чанк = 16)
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,
}

fn default_top_left() -> WorldCorner {
    WorldCorner {
        x: -5000.0,
        z: -5000.0,
    }
}
fn default_bottom_right() -> WorldCorner {
    WorldCorner {
        x: 5000.0,
        z: 5000.0,
    }
}
fn default_cell_size() -> u32 {
    16
}

impl WorldSettings {
    #[must_use]
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::from_corners(self.top_left, self.bottom_right)
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            top_left: default_top_left(),
            bottom_right: default_bottom_right(),
            cell_size: default_cell_size(),
        }
    }
}

/// Параметры размещения провинций
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Средняя площадь провинции в квадратных блоках
    #[serde(default = "default_average_province_area")]
    pub average_province_area: f64,

    /// Минимальное расстояние между домашними ячейками в блоках
    #[serde(default = "default_min_home_distance")]
    pub min_home_distance: f64,

    /// Допустимая недостача провинций относительно идеального количества:
    /// - `0.0` — нужно ровно идеальное количество,
    /// - `0.1` — допускается на 10% меньше.
    #[serde(default = "default_max_allowed_variance")]
    pub max_allowed_variance: f64,

    /// Количество попыток на одну домашнюю ячейку
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Сид генератора; если не задан, берётся из энтропии
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_average_province_area() -> f64 {
    1_000_000.0
}
fn default_min_home_distance() -> f64 {
    600.0
}
fn default_max_allowed_variance() -> f64 {
    0.1
}
fn default_max_attempts() -> u32 {
    100
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            average_province_area: default_average_province_area(),
            min_home_distance: default_min_home_distance(),
            max_allowed_variance: default_max_allowed_variance(),
            max_attempts: default_max_attempts(),
            seed: None,
        }
    }
}

/// Параметры проверки суши/моря
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandValidationSettings {
    /// Сколько раз опрашивать рельеф для одной провинции
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,

    /// Пауза между опросами в миллисекундах (0 = без паузы)
    #[serde(default = "default_sample_delay_ms")]
    pub sample_delay_ms: u64,
}

fn default_sample_count() -> u32 {
    10
}
fn default_sample_delay_ms() -> u64 {
    200
}

impl LandValidationSettings {
    #[must_use]
    pub fn sample_delay(&self) -> Duration {
        Duration::from_millis(self.sample_delay_ms)
    }
}

impl Default for LandValidationSettings {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            sample_delay_ms: default_sample_delay_ms(),
        }
    }
}

/// Настройки шумового рельефа (используется CLI вместо настоящего мира)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainSettings {
    #[serde(default)]
    pub seed: i32,

    /// Частота шума: меньше значение → крупнее континенты
    #[serde(default = "default_frequency")]
    pub frequency: f32,

    /// Уровень моря в диапазоне шума [-1, 1]
    #[serde(default = "default_sea_level")]
    pub sea_level: f32,

    /// Ширина полосы пляжа над уровнем моря
    #[serde(default = "default_beach_width")]
    pub beach_width: f32,
}

fn default_frequency() -> f32 {
    0.0015
}
fn default_sea_level() -> f32 {
    0.0
}
fn default_beach_width() -> f32 {
    0.04
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency: default_frequency(),
            sea_level: default_sea_level(),
            beach_width: default_beach_width(),
        }
    }
}

/// Полная конфигурация провинций. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvincesConfig {
    #[serde(default)]
    pub world: WorldSettings,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub land_validation: LandValidationSettings,

    #[serde(default)]
    pub terrain: TerrainSettings,
}

impl ProvincesConfig {
    /// Загружает параметры из TOML-файла и проверяет их
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// [world]
    /// top_left = { x = -2000.0, z = -2000.0 }
    /// bottom_right = { x = 2000.0, z = 2000.0 }
    ///
    /// [generation]
    /// average_province_area = 250000.0
    /// min_home_distance = 300.0
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.cell_size == 0 {
            return Err(ConfigError::Invalid("world.cell_size must be positive".into()));
        }
        let corners = [self.world.top_left, self.world.bottom_right];
        if corners.iter().any(|c| !c.x.is_finite() || !c.z.is_finite()) {
            return Err(ConfigError::Invalid("world corners must be finite".into()));
        }
        let bounds = self.world.bounds();
        if !bounds.width().is_finite() || !bounds.depth().is_finite() || !bounds.area().is_finite()
        {
            return Err(ConfigError::Invalid("world is too large".into()));
        }
        let area = self.generation.average_province_area;
        if area.is_nan() || area <= 0.0 {
            return Err(ConfigError::Invalid(
                "generation.average_province_area must be positive".into(),
            ));
        }
        let distance = self.generation.min_home_distance;
        if distance.is_nan() || distance < 0.0 {
            return Err(ConfigError::Invalid(
                "generation.min_home_distance must not be negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.generation.max_allowed_variance) {
            return Err(ConfigError::Invalid(
                "generation.max_allowed_variance must be within [0, 1]".into(),
            ));
        }
        if self.land_validation.sample_count == 0 {
            return Err(ConfigError::Invalid(
                "land_validation.sample_count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_normalized_regardless_of_corner_order() {
        let bounds = WorldBounds::from_corners(
            WorldCorner { x: 100.0, z: -20.0 },
            WorldCorner { x: -100.0, z: 80.0 },
        );
        assert_eq!(bounds.min_x, -100.0);
        assert_eq!(bounds.max_z, 80.0);
        assert_eq!(bounds.area(), 200.0 * 100.0);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ProvincesConfig::from_toml_str("").unwrap();
        assert_eq!(config.world.cell_size, 16);
        assert_eq!(config.land_validation.sample_count, 10);
        assert_eq!(config.generation.max_attempts, 100);
        assert!(config.generation.seed.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = ProvincesConfig::from_toml_str(
            r#"
            [world]
            top_left = { x = 0.0, z = 0.0 }
            bottom_right = { x = 320.0, z = 160.0 }

            [generation]
            max_allowed_variance = 0.5
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.world.bounds().area(), 320.0 * 160.0);
        assert_eq!(config.generation.max_allowed_variance, 0.5);
        assert_eq!(config.generation.seed, Some(7));
        assert_eq!(config.generation.min_home_distance, 600.0);
    }

    #[test]
    fn rejects_out_of_range_variance() {
        let err = ProvincesConfig::from_toml_str("[generation]\nmax_allowed_variance = 1.5\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_finite_world() {
        let err = ProvincesConfig::from_toml_str(
            "[world]\ntop_left = { x = -inf, z = 0.0 }\nbottom_right = { x = 100.0, z = 100.0 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ProvincesConfig::from_toml_str(
            "[world]\ntop_left = { x = -1.0e308, z = 0.0 }\nbottom_right = { x = 1.0e308, z = 100.0 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ProvincesConfig::from_toml_str(
            "[world]\ntop_left = { x = nan, z = 0.0 }\nbottom_right = { x = 100.0, z = 100.0 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_samples() {
        let err = ProvincesConfig::from_toml_str("[land_validation]\nsample_count = 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
