// src/province/placer.rs
//! Размещение домашних ячеек провинций
//!
//! Домашние ячейки выбираются случайной выборкой с отбраковкой: кандидат в пределах мира
//! принимается, только если он не ближе `min_home_distance` ни к одной уже существующей
//! домашней ячейке. На каждую ячейку даётся ограниченное число попыток (по умолчанию 100).
//!
//! ## Допуск
//!
//! Идеальное количество провинций — `⌊площадь мира / средняя площадь провинции⌋`.
//! Если очередную ячейку разместить не удалось, генерация останавливается, и результат
//! принимается, когда провинций не меньше `идеал × (1 − допуск)`.

use crate::config::{ProvincesConfig, WorldBounds};
use crate::error::PlacementError;
use crate::province::store::ProvinceStore;
use crate::province::{Coord, Province};
use rand::Rng;

/// Минимально допустимое количество провинций для данного допуска
#[must_use]
pub fn minimum_allowed_provinces(ideal: usize, allowed_variance: f64) -> f64 {
    ideal as f64 * (1.0 - allowed_variance)
}

/// Достаточно ли `actual` провинций при идеальном количестве `ideal`
#[must_use]
pub fn meets_minimum(ideal: usize, actual: usize, allowed_variance: f64) -> bool {
    actual as f64 >= minimum_allowed_provinces(ideal, allowed_variance)
}

#[derive(Debug, Clone)]
pub struct SpatialPlacer {
    pub bounds: WorldBounds,
    pub cell_size: u32,
    pub average_province_area: f64,
    /// Минимальное расстояние между домашними ячейками в блоках
    pub min_home_distance: f64,
    pub max_allowed_variance: f64,
    pub max_attempts: u32,
}

impl SpatialPlacer {
    #[must_use]
    pub fn from_config(config: &ProvincesConfig) -> Self {
        Self {
            bounds: config.world.bounds(),
            cell_size: config.world.cell_size,
            average_province_area: config.generation.average_province_area,
            min_home_distance: config.generation.min_home_distance,
            max_allowed_variance: config.generation.max_allowed_variance,
            max_attempts: config.generation.max_attempts,
        }
    }

    #[must_use]
    pub fn ideal_province_count(&self) -> usize {
        (self.bounds.area() / self.average_province_area) as usize
    }

    /// Минимальное расстояние в ячейках сетки
    #[must_use]
    pub fn min_distance_in_cells(&self) -> f64 {
        self.min_home_distance / f64::from(self.cell_size)
    }

    fn quantize(&self, block: f64) -> i32 {
        (block / f64::from(self.cell_size)).floor() as i32
    }

    #[must_use]
    pub fn is_valid_home(&self, candidate: Coord, existing: &[Coord]) -> bool {
        let min_distance = self.min_distance_in_cells();
        existing
            .iter()
            .all(|home| candidate.distance(home) >= min_distance)
    }

    /// Пытается найти одну домашнюю ячейку; `None`, если все попытки отбракованы
    pub fn generate_home<R: Rng>(&self, rng: &mut R, existing: &[Coord]) -> Option<Coord> {
        let (width, depth) = (self.bounds.width(), self.bounds.depth());
        if !(width.is_finite() && width > 0.0) || !(depth.is_finite() && depth > 0.0) {
            return None;
        }
        for _ in 0..self.max_attempts {
            let x = rng.gen_range(self.bounds.min_x..self.bounds.max_x);
            let z = rng.gen_range(self.bounds.min_z..self.bounds.max_z);
            let candidate = Coord::new(self.quantize(x), self.quantize(z));
            if self.is_valid_home(candidate, existing) {
                return Some(candidate);
            }
        }
        None
    }

    /// Создаёт провинции (только с домашними ячейками) и регистрирует их в хранилище.
    ///
    /// Возвращает число созданных провинций. При нехватке провинций уже созданные
    /// остаются в хранилище, а вызывающий код не должен продолжать настройку мира.
    pub fn generate_province_homes<S, R>(
        &self,
        store: &mut S,
        rng: &mut R,
    ) -> Result<usize, PlacementError>
    where
        S: ProvinceStore + ?Sized,
        R: Rng,
    {
        let ideal = self.ideal_province_count();
        tracing::info!(
            target: "provinces::placement",
            world_area = self.bounds.area(),
            ideal,
            "ideal number of provinces"
        );

        let mut homes = store.homes();
        let mut created = 0;
        for _ in 0..ideal {
            let Some(home) = self.generate_home(rng, &homes) else {
                tracing::info!(
                    target: "provinces::placement",
                    created,
                    "could not generate province home"
                );
                let actual = store.len();
                let required = minimum_allowed_provinces(ideal, self.max_allowed_variance);
                if !meets_minimum(ideal, actual, self.max_allowed_variance) {
                    tracing::error!(
                        target: "provinces::placement",
                        required,
                        actual,
                        "could not create the minimum number of provinces"
                    );
                    return Err(PlacementError::InsufficientProvinces { required, actual });
                }
                return Ok(created);
            };
            let id = store.next_id();
            store.add_province(Province::new(id, home));
            homes.push(home);
            created += 1;
            tracing::debug!(
                target: "provinces::placement",
                id,
                x = home.x,
                z = home.z,
                "province home generated"
            );
        }
        Ok(created)
    }
}
