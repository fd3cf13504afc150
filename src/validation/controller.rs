// src/validation/controller.rs
//! Управление задачей проверки суши
//!
//! Внешний код только *запрашивает* паузу, остановку или перезапуск. Сама задача видит
//! запрос лишь на границе между провинциями и переводит статус в `Paused`/`Stopped`.
//!
//! ```text
//!            request_pause             pause_task
//! Running ───────────────▶ PauseRequested ──────────▶ Paused
//!    │  request_stop                    stop_task
//!    ├──────────────▶ StopRequested ──────────────▶ Stopped
//!    │  request_restart                 restart_task
//!    └──────────────▶ RestartRequested ───────────▶ Stopped (+ новый проход)
//! ```

use crate::error::ControlError;
use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Running,
    PauseRequested,
    Paused,
    StopRequested,
    /// Также начальное состояние: задача ещё не запускалась
    Stopped,
    RestartRequested,
}

impl JobStatus {
    /// Есть ли запрос, который задача должна обработать на ближайшей границе
    #[must_use]
    pub fn is_pending_request(self) -> bool {
        matches!(
            self,
            JobStatus::PauseRequested | JobStatus::StopRequested | JobStatus::RestartRequested
        )
    }
}

/// Общий для процесса контроллер задачи. Передаётся всем участникам через `Arc`.
#[derive(Debug)]
pub struct ValidationJobController {
    status: Mutex<JobStatus>,
    changed: Condvar,
    /// Блокировка тела задачи: одновременно выполняется не больше одной
    job_lock: Mutex<()>,
}

impl Default for ValidationJobController {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationJobController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: Mutex::new(JobStatus::Stopped),
            changed: Condvar::new(),
            job_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn status(&self) -> JobStatus {
        *self.status.lock()
    }

    fn set(&self, status: &mut JobStatus, next: JobStatus) {
        tracing::debug!(
            target: "provinces::validation",
            from = ?*status,
            to = ?next,
            "job status changed"
        );
        *status = next;
        self.changed.notify_all();
    }

    fn request(
        &self,
        request: &'static str,
        allowed: &[JobStatus],
        next: JobStatus,
    ) -> Result<(), ControlError> {
        let mut status = self.status.lock();
        if !allowed.contains(&*status) {
            return Err(ControlError {
                from: *status,
                request,
            });
        }
        self.set(&mut status, next);
        tracing::info!(
            target: "provinces::validation",
            request,
            "land validation request accepted"
        );
        Ok(())
    }

    pub fn request_pause(&self) -> Result<(), ControlError> {
        self.request("pause", &[JobStatus::Running], JobStatus::PauseRequested)
    }

    pub fn request_stop(&self) -> Result<(), ControlError> {
        self.request(
            "stop",
            &[JobStatus::Running, JobStatus::PauseRequested],
            JobStatus::StopRequested,
        )
    }

    pub fn request_restart(&self) -> Result<(), ControlError> {
        self.request(
            "restart",
            &[JobStatus::Running, JobStatus::PauseRequested],
            JobStatus::RestartRequested,
        )
    }

    /// Задача начала (или возобновила) проход
    pub fn begin(&self) {
        let mut status = self.status.lock();
        self.set(&mut status, JobStatus::Running);
    }

    /// Задача сохранилась и приостановилась
    pub fn pause_task(&self) {
        let mut status = self.status.lock();
        self.set(&mut status, JobStatus::Paused);
    }

    /// Задача сохранилась и остановилась (или закончила проход)
    pub fn stop_task(&self) {
        let mut status = self.status.lock();
        self.set(&mut status, JobStatus::Stopped);
    }

    /// Задача сбросила запросы; следующий запуск начнёт полный проход
    pub fn restart_task(&self) {
        let mut status = self.status.lock();
        self.set(&mut status, JobStatus::Stopped);
    }

    /// Отмена изнутри задачи (например, прерванная пауза): идёт по пути остановки
    pub(crate) fn cancel(&self) {
        let mut status = self.status.lock();
        self.set(&mut status, JobStatus::StopRequested);
    }

    /// Захватывает блокировку тела задачи; ждёт, пока предыдущая задача не завершится
    pub fn lock_job(&self) -> MutexGuard<'_, ()> {
        self.job_lock.lock()
    }

    #[must_use]
    pub fn is_job_active(&self) -> bool {
        self.job_lock.is_locked()
    }

    /// Ждёт статуса, удовлетворяющего `predicate`; `false` по истечении `timeout`
    pub fn wait_for(&self, timeout: Duration, predicate: impl Fn(JobStatus) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut status = self.status.lock();
        while !predicate(*status) {
            if self.changed.wait_until(&mut status, deadline).timed_out() {
                return predicate(*status);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stopped_and_rejects_requests() {
        let controller = ValidationJobController::new();
        assert_eq!(controller.status(), JobStatus::Stopped);
        assert_eq!(
            controller.request_pause(),
            Err(ControlError {
                from: JobStatus::Stopped,
                request: "pause"
            })
        );
        assert!(controller.request_stop().is_err());
        assert!(controller.request_restart().is_err());
    }

    #[test]
    fn pause_then_stop_is_allowed() {
        let controller = ValidationJobController::new();
        controller.begin();
        controller.request_pause().unwrap();
        assert!(controller.status().is_pending_request());
        controller.request_stop().unwrap();
        assert_eq!(controller.status(), JobStatus::StopRequested);
        assert!(controller.request_pause().is_err());
        controller.stop_task();
        assert_eq!(controller.status(), JobStatus::Stopped);
    }

    #[test]
    fn paused_job_ignores_requests_until_resumed() {
        let controller = ValidationJobController::new();
        controller.begin();
        controller.request_pause().unwrap();
        controller.pause_task();
        assert!(controller.request_stop().is_err());
        controller.begin();
        controller.request_restart().unwrap();
        controller.restart_task();
        assert_eq!(controller.status(), JobStatus::Stopped);
    }

    #[test]
    fn wait_for_sees_change_from_other_thread() {
        let controller = std::sync::Arc::new(ValidationJobController::new());
        let worker = {
            let controller = std::sync::Arc::clone(&controller);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(10));
                controller.begin();
            })
        };
        assert!(controller.wait_for(Duration::from_secs(5), |s| s == JobStatus::Running));
        worker.join().unwrap();
        assert!(!controller.wait_for(Duration::from_millis(5), |s| s == JobStatus::Paused));
    }

    #[test]
    fn job_lock_is_exclusive() {
        let controller = ValidationJobController::new();
        let guard = controller.lock_job();
        assert!(controller.is_job_active());
        drop(guard);
        assert!(!controller.is_job_active());
    }
}
