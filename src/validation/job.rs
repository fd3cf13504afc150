// src/validation/job.rs
//! Задача проверки суши
//!
//! Обходит все провинции, ожидающие проверки, классифицирует каждую и на границе между
//! провинциями проверяет статус контроллера:
//!
//! | Статус             | Флаги проверки          | Сохранение | Итог              |
//! |--------------------|-------------------------|------------|-------------------|
//! | `StopRequested`    | сбрасываются у всех     | да         | `Stopped`         |
//! | `PauseRequested`   | остаются                | да         | `Paused`          |
//! | `RestartRequested` | сбрасываются у всех     | да         | новый полный проход |
//!
//! Если ни одна провинция не ждёт проверки, запуск начинается с полного прохода.

use crate::error::{ClassifyError, JobError};
use crate::province::Province;
use crate::province::store::ProvinceStore;
use crate::terrain::TerrainOracle;
use crate::validation::classifier::{LandClassifier, SamplePacing};
use crate::validation::controller::{JobStatus, ValidationJobController};
use parking_lot::Mutex;
use std::sync::Arc;

/// Чем закончился запуск задачи
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Paused,
    Stopped,
    Restarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationProgress {
    /// Провинции, уже проверенные в этом цикле (включая прошлые запуски)
    pub processed: usize,
    pub total: usize,
    /// `⌊processed / total × 100⌋`
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub outcome: JobOutcome,
    /// Провинции, классифицированные этим запуском
    pub classified: usize,
    pub processed: usize,
    pub total: usize,
    pub percent: u32,
    /// Провинции, которые не удалось классифицировать; их прежняя классификация сохранена
    pub skipped: Vec<u32>,
}

type ProgressListener = Box<dyn Fn(&ValidationProgress) + Send + Sync>;

pub struct ValidationJob<O, P> {
    controller: Arc<ValidationJobController>,
    classifier: LandClassifier<P>,
    oracle: O,
    listener: Option<ProgressListener>,
}

impl<O, P> std::fmt::Debug for ValidationJob<O, P>
where
    P: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationJob")
            .field("controller", &self.controller)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

impl<O, P> ValidationJob<O, P>
where
    O: TerrainOracle,
    P: SamplePacing,
{
    #[must_use]
    pub fn new(
        controller: Arc<ValidationJobController>,
        classifier: LandClassifier<P>,
        oracle: O,
    ) -> Self {
        Self {
            controller,
            classifier,
            oracle,
            listener: None,
        }
    }

    /// Вызывается после каждой провинции, до проверки статуса контроллера
    #[must_use]
    pub fn with_progress_listener(
        mut self,
        listener: impl Fn(&ValidationProgress) + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    #[must_use]
    pub fn controller(&self) -> &Arc<ValidationJobController> {
        &self.controller
    }

    /// Выполняет запуски, пока задача не перестанет перезапускаться
    pub fn run_until_settled<S>(&self, store: &Mutex<S>) -> Result<JobReport, JobError>
    where
        S: ProvinceStore + ?Sized,
    {
        loop {
            let report = self.run(store)?;
            if report.outcome != JobOutcome::Restarted {
                return Ok(report);
            }
            tracing::info!(target: "provinces::validation", "land validation job restarting");
        }
    }

    /// Один запуск: до конца цикла, до паузы или до остановки.
    ///
    /// Блокирует, пока другой запуск с тем же контроллером не завершится.
    pub fn run<S>(&self, store: &Mutex<S>) -> Result<JobReport, JobError>
    where
        S: ProvinceStore + ?Sized,
    {
        if self.controller.is_job_active() {
            tracing::info!(
                target: "provinces::validation",
                "another land validation job is running, waiting for it"
            );
        }
        let _job = self.controller.lock_job();
        tracing::info!(target: "provinces::validation", "land validation job starting");
        self.controller.begin();
        self.classifier.pacing.reset();

        let snapshot = {
            let mut store = store.lock();
            if !store.any_validation_requested() {
                let requested = store.set_all_validation_requested(true);
                tracing::info!(
                    target: "provinces::validation",
                    requested,
                    "no pending validations, starting a full cycle"
                );
            }
            store.all_provinces()
        };

        match self.execute(store, &snapshot) {
            Ok(report) => Ok(report),
            Err(err) => {
                // статус не должен остаться `Running` после неудачного сохранения
                self.controller.stop_task();
                Err(err)
            }
        }
    }

    fn execute<S>(&self, store: &Mutex<S>, snapshot: &[Province]) -> Result<JobReport, JobError>
    where
        S: ProvinceStore + ?Sized,
    {
        let total = snapshot.len();
        let mut report = JobReport {
            outcome: JobOutcome::Completed,
            classified: 0,
            processed: snapshot
                .iter()
                .filter(|p| !p.land_validation_requested)
                .count(),
            total,
            percent: 0,
            skipped: Vec::new(),
        };
        let mut rng = rand::thread_rng();

        for province in snapshot {
            if province.land_validation_requested {
                match self.classifier.classify(province, &self.oracle, &mut rng) {
                    Ok(is_sea) => {
                        if let Some(stored) = store.lock().province_mut(province.id) {
                            if stored.is_sea != is_sea {
                                stored.is_sea = is_sea;
                            }
                            stored.land_validation_requested = false;
                        }
                        report.classified += 1;
                        report.processed += 1;
                    }
                    Err(ClassifyError::Interrupted) => {
                        tracing::warn!(
                            target: "provinces::validation",
                            province_id = province.id,
                            "sampling interrupted, stopping land validation"
                        );
                        self.controller.cancel();
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: "provinces::validation",
                            province_id = province.id,
                            error = %err,
                            "province skipped, keeping previous classification"
                        );
                        if let Some(stored) = store.lock().province_mut(province.id) {
                            stored.land_validation_requested = false;
                        }
                        report.skipped.push(province.id);
                        report.processed += 1;
                    }
                }
            }

            let progress = ValidationProgress {
                processed: report.processed,
                total,
                percent: (report.processed * 100 / total) as u32,
            };
            report.percent = progress.percent;
            tracing::info!(
                target: "provinces::validation",
                percent = progress.percent,
                processed = progress.processed,
                total,
                "land validation job progress"
            );
            if let Some(listener) = &self.listener {
                listener(&progress);
            }

            match self.controller.status() {
                JobStatus::StopRequested => {
                    self.checkpoint(store, true)?;
                    self.controller.stop_task();
                    report.outcome = JobOutcome::Stopped;
                    return Ok(report);
                }
                JobStatus::PauseRequested => {
                    self.checkpoint(store, false)?;
                    self.controller.pause_task();
                    report.outcome = JobOutcome::Paused;
                    return Ok(report);
                }
                JobStatus::RestartRequested => {
                    self.checkpoint(store, true)?;
                    self.controller.restart_task();
                    report.outcome = JobOutcome::Restarted;
                    return Ok(report);
                }
                _ => {}
            }
        }

        self.checkpoint(store, false)?;
        self.controller.stop_task();
        report.percent = 100;
        tracing::info!(
            target: "provinces::validation",
            classified = report.classified,
            skipped = report.skipped.len(),
            "land validation job complete"
        );
        Ok(report)
    }

    /// Сохраняет все провинции; `clear_requests` сбрасывает оставшиеся запросы проверки
    fn checkpoint<S>(&self, store: &Mutex<S>, clear_requests: bool) -> Result<(), JobError>
    where
        S: ProvinceStore + ?Sized,
    {
        let mut store = store.lock();
        if clear_requests {
            let cleared = store.set_all_validation_requested(false);
            tracing::info!(
                target: "provinces::validation",
                cleared,
                "clearing all validation requests"
            );
        }
        tracing::info!(target: "provinces::validation", "saving province data");
        store.persist_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerrainError;
    use crate::province::Coord;
    use crate::province::store::ProvinceRegistry;
    use crate::validation::classifier::NoPacing;

    /// Суша — ячейки с чётным `x`
    struct EvenColumnsAreLand;

    impl TerrainOracle for EvenColumnsAreLand {
        type Kind = bool;

        fn sample_terrain(&self, world_x: i64, _world_z: i64) -> Result<bool, TerrainError> {
            Ok((world_x / 16) % 2 == 0)
        }

        fn is_water_or_coastal(&self, is_land: &bool) -> bool {
            !is_land
        }
    }

    fn store_with(n: u32) -> Mutex<ProvinceRegistry> {
        let mut registry = ProvinceRegistry::new();
        for id in 0..n {
            let mut province = Province::new(id, Coord::new(id as i32, 0));
            province.cells = vec![province.home];
            registry.add_province(province);
        }
        Mutex::new(registry)
    }

    fn job() -> ValidationJob<EvenColumnsAreLand, NoPacing> {
        ValidationJob::new(
            Arc::new(ValidationJobController::new()),
            LandClassifier::new(10, 16, NoPacing),
            EvenColumnsAreLand,
        )
    }

    #[test]
    fn fresh_run_classifies_everything() {
        let store = store_with(4);
        let report = job().run(&store).unwrap();

        assert_eq!(report.outcome, JobOutcome::Completed);
        assert_eq!(report.classified, 4);
        assert_eq!(report.percent, 100);
        let store = store.lock();
        let is_sea: Vec<bool> = store.iter().map(|p| p.is_sea).collect();
        assert_eq!(is_sea, vec![false, true, false, true]);
        assert!(!store.any_validation_requested());
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn empty_store_completes() {
        let store = Mutex::new(ProvinceRegistry::new());
        let job = job();
        let report = job.run(&store).unwrap();
        assert_eq!(report.outcome, JobOutcome::Completed);
        assert_eq!(report.total, 0);
        assert_eq!(job.controller().status(), JobStatus::Stopped);
    }

    #[test]
    fn province_without_cells_is_skipped() {
        let store = store_with(3);
        {
            let mut store = store.lock();
            let province = store.province_mut(1).unwrap();
            province.cells.clear();
            province.is_sea = false;
        }
        let report = job().run(&store).unwrap();
        assert_eq!(report.skipped, vec![1]);
        assert_eq!(report.processed, 3);
        let store = store.lock();
        assert!(!store.get(1).unwrap().is_sea);
        assert!(!store.any_validation_requested());
    }
}
