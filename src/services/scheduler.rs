//! Cron-driven reminder jobs.
//!
//! One tokio task per active reminder. The id -> task table is only touched
//! through [`ReminderScheduler`], which serialises access with a mutex so
//! request handlers and startup loading can schedule and cancel concurrently.

use chrono::Local;
use croner::Cron;
use log::{info, warn};
use sqlx::PgPool;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db;
use crate::models::reminder::Reminder;

/// Delivery side effect run when a reminder fires.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, reminder: &Reminder);
}

/// Writes the reminder to the application log. Push delivery is not wired up.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, reminder: &Reminder) {
        info!(
            "Reminder {} for User {} ({}): {}",
            reminder.id,
            reminder.user_id,
            reminder.reminder_type.as_str(),
            reminder.message
        );
    }
}

#[derive(Debug)]
pub enum ScheduleError {
    InvalidExpression { expression: String, reason: String },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidExpression { expression, reason } => {
                write!(f, "invalid cron expression '{}': {}", expression, reason)
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Standard five-field cron, `@daily` style aliases, or six fields with leading seconds.
pub fn parse_expression(expression: &str) -> Result<Cron, ScheduleError> {
    Cron::new(expression.trim())
        .with_seconds_optional()
        .parse()
        .map_err(|err| ScheduleError::InvalidExpression {
            expression: expression.to_string(),
            reason: err.to_string(),
        })
}

pub struct ReminderScheduler {
    runtime: Handle,
    running: watch::Sender<bool>,
    jobs: Mutex<HashMap<i64, JoinHandle<()>>>,
    notifier: Arc<dyn Notifier>,
}

impl ReminderScheduler {
    /// Jobs are spawned on the runtime this is called from.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_runtime(Handle::current(), notifier)
    }

    pub fn with_runtime(runtime: Handle, notifier: Arc<dyn Notifier>) -> Self {
        let (running, _) = watch::channel(false);
        Self {
            runtime,
            running,
            jobs: Mutex::new(HashMap::new()),
            notifier,
        }
    }

    pub fn start(&self) {
        self.running.send_replace(true);
        info!("Reminder scheduler started");
    }

    pub fn stop(&self) {
        self.running.send_replace(false);
        info!("Reminder scheduler stopped");
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<i64, JoinHandle<()>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a recurring job for `reminder`. An existing job for the same
    /// id is cancelled before the new one takes its place.
    pub fn schedule_reminder(&self, reminder: &Reminder) -> Result<(), ScheduleError> {
        let cron = parse_expression(&reminder.time)?;

        let mut jobs = self.jobs();
        if let Some(previous) = jobs.remove(&reminder.id) {
            previous.abort();
        }
        let job = self.runtime.spawn(run_job(
            cron,
            reminder.clone(),
            self.running.subscribe(),
            Arc::clone(&self.notifier),
        ));
        jobs.insert(reminder.id, job);
        Ok(())
    }

    /// Schedules every reminder it can; failures are logged and skipped.
    pub fn schedule_all(&self, reminders: &[Reminder]) -> usize {
        reminders
            .iter()
            .filter(|reminder| match self.schedule_reminder(reminder) {
                Ok(()) => true,
                Err(err) => {
                    warn!("Failed to schedule reminder {}: {}", reminder.id, err);
                    false
                }
            })
            .count()
    }

    pub async fn load_reminders(&self, pool: &PgPool, user_id: i64) -> Result<usize, sqlx::Error> {
        let reminders = db::reminders::list_active(pool, user_id).await?;
        Ok(self.schedule_all(&reminders))
    }

    /// Returns whether a job was cancelled. Unknown ids are a no-op.
    pub fn remove_reminder(&self, reminder_id: i64) -> bool {
        match self.jobs().remove(&reminder_id) {
            Some(job) => {
                job.abort();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn is_scheduled(&self, reminder_id: i64) -> bool {
        self.jobs().contains_key(&reminder_id)
    }

    pub fn scheduled_count(&self) -> usize {
        self.jobs().len()
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        for (_, job) in self.jobs().drain() {
            job.abort();
        }
    }
}

async fn run_job(
    cron: Cron,
    reminder: Reminder,
    mut running: watch::Receiver<bool>,
    notifier: Arc<dyn Notifier>,
) {
    loop {
        if running.wait_for(|on| *on).await.is_err() {
            return;
        }

        let now = Local::now();
        let next = match cron.find_next_occurrence(&now, false) {
            Ok(next) => next,
            Err(err) => {
                warn!("Reminder {} has no upcoming fire time: {}", reminder.id, err);
                return;
            }
        };
        let delay = (next - now).to_std().unwrap_or_default();

        let fired = tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            changed = running.changed() => {
                if changed.is_err() {
                    return;
                }
                false
            }
        };

        let still_running = *running.borrow();
        if fired && still_running {
            notifier.notify(&reminder);
        }
    }
}
