// src/validation/classifier.rs
//! Классификация провинции: суша или море
//!
//! Полный обход всех ячеек слишком дорог, поэтому рельеф опрашивается в нескольких
//! случайных ячейках провинции (с повторениями). Первый же образец, который не является
//! водой или побережьем, делает провинцию сушей. Ошибки ожидаемы и исправляются вручную.

use crate::error::ClassifyError;
use crate::province::Province;
use crate::terrain::TerrainOracle;
use parking_lot::{Condvar, Mutex};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("pause interrupted")]
pub struct Interrupted;

/// Политика пауз между опросами рельефа
pub trait SamplePacing {
    fn pause(&self) -> Result<(), Interrupted>;

    /// Сбрасывает прерывание, оставшееся от прошлого запуска
    fn reset(&self) {}
}

impl<T: SamplePacing + ?Sized> SamplePacing for Arc<T> {
    fn pause(&self) -> Result<(), Interrupted> {
        (**self).pause()
    }

    fn reset(&self) {
        (**self).reset();
    }
}

/// Без пауз (тесты, офлайн-источники рельефа)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl SamplePacing for NoPacing {
    fn pause(&self) -> Result<(), Interrupted> {
        Ok(())
    }
}

/// Фиксированная пауза, которую можно прервать из другого потока.
///
/// Прерывание одноразовое: его получает ближайший (или текущий) вызов `pause`
/// в пределах одного запуска задачи.
#[derive(Debug, Default)]
pub struct FixedDelay {
    delay: Duration,
    interrupted: Mutex<bool>,
    wakeup: Condvar,
}

impl FixedDelay {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            interrupted: Mutex::new(false),
            wakeup: Condvar::new(),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn interrupt(&self) {
        *self.interrupted.lock() = true;
        self.wakeup.notify_all();
    }
}

impl SamplePacing for FixedDelay {
    fn pause(&self) -> Result<(), Interrupted> {
        let mut interrupted = self.interrupted.lock();
        let deadline = Instant::now() + self.delay;
        while !*interrupted {
            if self.wakeup.wait_until(&mut interrupted, deadline).timed_out() {
                break;
            }
        }
        if *interrupted {
            *interrupted = false;
            return Err(Interrupted);
        }
        Ok(())
    }

    fn reset(&self) {
        *self.interrupted.lock() = false;
    }
}

#[derive(Debug, Clone)]
pub struct LandClassifier<P> {
    pub sample_count: u32,
    /// Сторона ячейки в блоках, для перевода ячейки в мировые координаты
    pub cell_size: u32,
    pub pacing: P,
}

impl<P: SamplePacing> LandClassifier<P> {
    /// `sample_count` не меньше 1: без образцов любая провинция оказалась бы морской
    #[must_use]
    pub fn new(sample_count: u32, cell_size: u32, pacing: P) -> Self {
        Self {
            sample_count: sample_count.max(1),
            cell_size,
            pacing,
        }
    }

    /// Возвращает `true`, если все образцы — вода или побережье (провинция морская)
    pub fn classify<O, R>(
        &self,
        province: &Province,
        oracle: &O,
        rng: &mut R,
    ) -> Result<bool, ClassifyError>
    where
        O: TerrainOracle + ?Sized,
        R: Rng,
    {
        if province.cells.is_empty() {
            return Err(ClassifyError::EmptyProvince(province.id));
        }
        for sample in 0..self.sample_count.max(1) {
            if sample > 0 {
                self.pacing
                    .pause()
                    .map_err(|_| ClassifyError::Interrupted)?;
            }
            let cell = province.cells[rng.gen_range(0..province.cells.len())];
            let (x, z) = cell.world_center(self.cell_size);
            let kind = oracle.sample_terrain(x, z)?;
            if !oracle.is_water_or_coastal(&kind) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerrainError;
    use crate::province::Coord;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::Cell;

    /// Суша — всё, что восточнее `land_from_x`
    struct EastIsLand {
        land_from_x: i64,
        samples: Cell<u32>,
    }

    impl TerrainOracle for EastIsLand {
        type Kind = bool;

        fn sample_terrain(&self, world_x: i64, _world_z: i64) -> Result<bool, TerrainError> {
            self.samples.set(self.samples.get() + 1);
            Ok(world_x >= self.land_from_x)
        }

        fn is_water_or_coastal(&self, is_land: &bool) -> bool {
            !is_land
        }
    }

    fn province_with_cells(cells: &[(i32, i32)]) -> Province {
        let mut province = Province::new(1, Coord::new(cells[0].0, cells[0].1));
        province.cells = cells.iter().map(|&(x, z)| Coord::new(x, z)).collect();
        province
    }

    #[test]
    fn all_water_is_sea_after_every_sample() {
        let oracle = EastIsLand {
            land_from_x: 10_000,
            samples: Cell::new(0),
        };
        let classifier = LandClassifier::new(10, 16, NoPacing);
        let province = province_with_cells(&[(0, 0), (1, 0), (2, 5)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(classifier.classify(&province, &oracle, &mut rng), Ok(true));
        assert_eq!(oracle.samples.get(), 10);
    }

    #[test]
    fn single_cell_is_sampled_repeatedly() {
        let oracle = EastIsLand {
            land_from_x: 10_000,
            samples: Cell::new(0),
        };
        let classifier = LandClassifier::new(10, 16, NoPacing);
        let province = province_with_cells(&[(3, 3)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(classifier.classify(&province, &oracle, &mut rng), Ok(true));
        assert_eq!(oracle.samples.get(), 10);
    }

    #[test]
    fn first_land_sample_short_circuits() {
        let oracle = EastIsLand {
            land_from_x: 0,
            samples: Cell::new(0),
        };
        let classifier = LandClassifier::new(10, 16, NoPacing);
        let province = province_with_cells(&[(0, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(classifier.classify(&province, &oracle, &mut rng), Ok(false));
        assert_eq!(oracle.samples.get(), 1);
    }

    #[test]
    fn samples_at_cell_centers() {
        // ячейка -1 занимает блоки [-16, -1], её центр -8 — ещё вода
        let oracle = EastIsLand {
            land_from_x: -7,
            samples: Cell::new(0),
        };
        let classifier = LandClassifier::new(3, 16, NoPacing);
        let province = province_with_cells(&[(-1, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(classifier.classify(&province, &oracle, &mut rng), Ok(true));
    }

    #[test]
    fn empty_province_is_an_error() {
        let oracle = EastIsLand {
            land_from_x: 0,
            samples: Cell::new(0),
        };
        let classifier = LandClassifier::new(10, 16, NoPacing);
        let mut province = Province::new(9, Coord::new(0, 0));
        province.cells.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(
            classifier.classify(&province, &oracle, &mut rng),
            Err(ClassifyError::EmptyProvince(9))
        );
    }

    #[test]
    fn interrupted_pause_aborts_classification() {
        let oracle = EastIsLand {
            land_from_x: 10_000,
            samples: Cell::new(0),
        };
        let pacing = Arc::new(FixedDelay::new(Duration::from_secs(60)));
        pacing.interrupt();
        let classifier = LandClassifier::new(10, 16, Arc::clone(&pacing));
        let province = province_with_cells(&[(0, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(
            classifier.classify(&province, &oracle, &mut rng),
            Err(ClassifyError::Interrupted)
        );
        assert_eq!(oracle.samples.get(), 1);
    }

    #[test]
    fn interrupt_wakes_a_waiting_pause() {
        let pacing = Arc::new(FixedDelay::new(Duration::from_secs(60)));
        let waiter = {
            let pacing = Arc::clone(&pacing);
            std::thread::spawn(move || pacing.pause())
        };
        std::thread::sleep(Duration::from_millis(20));
        pacing.interrupt();
        assert_eq!(waiter.join().unwrap(), Err(Interrupted));
        assert_eq!(FixedDelay::new(Duration::ZERO).pause(), Ok(()));
    }

    #[test]
    fn reset_discards_a_stale_interrupt() {
        let pacing = FixedDelay::new(Duration::ZERO);
        pacing.interrupt();
        pacing.reset();
        assert_eq!(pacing.pause(), Ok(()));
        assert_eq!(pacing.delay(), Duration::ZERO);
    }

    #[test]
    fn zero_sample_count_still_samples_once() {
        let oracle = EastIsLand {
            land_from_x: 0,
            samples: Cell::new(0),
        };
        let classifier = LandClassifier::new(0, 16, NoPacing);
        assert_eq!(classifier.sample_count, 1);
        let province = province_with_cells(&[(2, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(classifier.classify(&province, &oracle, &mut rng), Ok(false));

        let raw = LandClassifier {
            sample_count: 0,
            cell_size: 16,
            pacing: NoPacing,
        };
        assert_eq!(raw.classify(&province, &oracle, &mut rng), Ok(false));
        assert_eq!(oracle.samples.get(), 2);
    }
}
