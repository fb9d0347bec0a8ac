//! Job scheduling for reminders and daily notifications.
//!
//! Jobs are plain values ([`ScheduledJob`]) paired with a [`Trigger`]; the
//! scheduler hands back an opaque [`JobHandle`] that is only good for
//! cancellation. What a job *does* when it fires is decided by the
//! [`JobRunner`] the scheduler was built with.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};
use parking_lot::Mutex;
use teloxide::types::ChatId;
use tokio_util::sync::CancellationToken;

use crate::subscriptions::NotificationKind;

/// Opaque reference to a registered job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobHandle(u64);

impl JobHandle {
    /// For `Scheduler` implementations that allocate their own ids
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPayload {
    Reminder { text: String },
    Notification(NotificationKind),
}

impl JobPayload {
    /// Metric/log label
    pub fn kind(&self) -> &'static str {
        match self {
            JobPayload::Reminder { .. } => "reminder",
            JobPayload::Notification(kind) => kind.as_str(),
        }
    }
}

/// Everything a job needs at fire time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    pub chat_id: ChatId,
    pub payload: JobPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fire once after the delay
    Once(Duration),
    /// Fire every day at the local wall-clock time
    Daily(NaiveTime),
}

/// Registers and cancels jobs.
///
/// Implementations guarantee that a one-shot job fires at most once and no
/// earlier than its delay, that a daily job fires once per day until
/// cancelled, and that cancelling only prevents future firings.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, trigger: Trigger, job: ScheduledJob) -> JobHandle;

    /// Returns `false` when the handle is unknown (already fired or cancelled)
    fn cancel(&self, handle: JobHandle) -> bool;

    fn schedule_once(&self, delay: Duration, job: ScheduledJob) -> JobHandle {
        self.schedule(Trigger::Once(delay), job)
    }

    fn schedule_daily(&self, at: NaiveTime, job: ScheduledJob) -> JobHandle {
        self.schedule(Trigger::Daily(at), job)
    }
}

/// Executes a job when it fires
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: ScheduledJob);
}

/// Local wall-clock source used for daily triggers
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Next moment strictly after `now` whose time of day is `at`
pub fn next_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// Time left until the next `at`
pub fn duration_until(now: NaiveDateTime, at: NaiveTime) -> Duration {
    (next_occurrence(now, at) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Longest uninterrupted sleep of a daily job before the wall clock is re-read
const MAX_DAILY_SLEEP: Duration = Duration::from_secs(60);

/// Scheduler running every job as its own tokio task
pub struct TokioScheduler {
    runner: Arc<dyn JobRunner>,
    clock: Arc<dyn Clock>,
    jobs: Arc<Mutex<HashMap<JobHandle, CancellationToken>>>,
    next_id: AtomicU64,
}

impl TokioScheduler {
    pub fn new(runner: Arc<dyn JobRunner>, clock: Arc<dyn Clock>) -> Self {
        Self {
            runner,
            clock,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_system_clock(runner: Arc<dyn JobRunner>) -> Self {
        Self::new(runner, Arc::new(SystemClock))
    }

    /// Number of jobs that may still fire
    pub fn active_jobs(&self) -> usize {
        self.jobs.lock().len()
    }

    async fn run_once(
        runner: Arc<dyn JobRunner>,
        jobs: Arc<Mutex<HashMap<JobHandle, CancellationToken>>>,
        token: CancellationToken,
        handle: JobHandle,
        delay: Duration,
        job: ScheduledJob,
    ) {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        // Forget the handle first: from here on cancel() reports false
        if jobs.lock().remove(&handle).is_none() {
            return;
        }
        tracing::debug!(chat_id = %job.chat_id, kind = job.payload.kind(), "Running one-shot job");
        runner.run(job).await;
    }

    async fn run_daily(
        runner: Arc<dyn JobRunner>,
        clock: Arc<dyn Clock>,
        token: CancellationToken,
        at: NaiveTime,
        job: ScheduledJob,
    ) {
        let mut next_fire = next_occurrence(clock.now(), at);

        loop {
            // Wall clock may jump (DST, NTP) while we sleep; re-read it every chunk
            loop {
                let remaining = (next_fire - clock.now())
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                if remaining.is_zero() {
                    break;
                }
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(remaining.min(MAX_DAILY_SLEEP)) => {}
                }
            }
            if token.is_cancelled() {
                return;
            }

            tracing::debug!(
                chat_id = %job.chat_id,
                kind = job.payload.kind(),
                at = %at,
                "Running daily job"
            );
            runner.run(job.clone()).await;

            next_fire = next_occurrence(next_fire.max(clock.now()), at);
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, trigger: Trigger, job: ScheduledJob) -> JobHandle {
        let handle = JobHandle::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let token = CancellationToken::new();
        self.jobs.lock().insert(handle, token.clone());

        let runner = Arc::clone(&self.runner);
        match trigger {
            Trigger::Once(delay) => {
                tokio::spawn(Self::run_once(
                    runner,
                    Arc::clone(&self.jobs),
                    token,
                    handle,
                    delay,
                    job,
                ));
            }
            Trigger::Daily(at) => {
                tokio::spawn(Self::run_daily(
                    runner,
                    Arc::clone(&self.clock),
                    token,
                    at,
                    job,
                ));
            }
        }

        handle
    }

    fn cancel(&self, handle: JobHandle) -> bool {
        match self.jobs.lock().remove(&handle) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("active_jobs", &self.active_jobs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct CountingRunner {
        fired: Mutex<Vec<ScheduledJob>>,
    }

    #[async_trait]
    impl JobRunner for CountingRunner {
        async fn run(&self, job: ScheduledJob) {
            self.fired.lock().push(job);
        }
    }

    fn reminder(chat: i64) -> ScheduledJob {
        ScheduledJob {
            chat_id: ChatId(chat),
            payload: JobPayload::Reminder {
                text: "x".to_string(),
            },
        }
    }

    /// Wall clock driven by tokio's paused time, with manual jumps
    struct JumpingClock {
        start: NaiveDateTime,
        origin: tokio::time::Instant,
        offset: Mutex<chrono::Duration>,
    }

    impl JumpingClock {
        fn jump(&self, by: chrono::Duration) {
            *self.offset.lock() += by;
        }
    }

    impl Clock for JumpingClock {
        fn now(&self) -> NaiveDateTime {
            let elapsed = chrono::Duration::from_std(self.origin.elapsed()).unwrap();
            self.start + elapsed + *self.offset.lock()
        }
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_next_occurrence_rolls_over_midnight() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();

        assert_eq!(duration_until(now, at(9, 0)), Duration::from_secs(30 * 60));
        // Exactly now means tomorrow
        assert_eq!(
            duration_until(now, at(8, 30)),
            Duration::from_secs(24 * 60 * 60)
        );
        assert_eq!(
            next_occurrence(now, at(0, 0)).date(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_fires_once_and_is_forgotten() {
        let runner = Arc::new(CountingRunner {
            fired: Mutex::new(Vec::new()),
        });
        let scheduler = TokioScheduler::with_system_clock(runner.clone());

        let handle = scheduler.schedule_once(Duration::from_secs(5), reminder(1));
        assert_eq!(scheduler.active_jobs(), 1);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(runner.fired.lock().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runner.fired.lock().len(), 1);
        assert_eq!(scheduler.active_jobs(), 0);
        assert!(!scheduler.cancel(handle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_job_never_fires() {
        let runner = Arc::new(CountingRunner {
            fired: Mutex::new(Vec::new()),
        });
        let scheduler = TokioScheduler::with_system_clock(runner.clone());

        let handle = scheduler.schedule_once(Duration::from_secs(5), reminder(2));
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(runner.fired.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_daily_job_follows_wall_clock_jump() {
        let runner = Arc::new(CountingRunner {
            fired: Mutex::new(Vec::new()),
        });
        let clock = Arc::new(JumpingClock {
            start: NaiveDate::from_ymd_opt(2024, 3, 31)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            origin: tokio::time::Instant::now(),
            offset: Mutex::new(chrono::Duration::zero()),
        });
        let scheduler = TokioScheduler::new(runner.clone(), clock.clone());
        scheduler.schedule_daily(at(9, 0), reminder(3));

        tokio::time::sleep(Duration::from_secs(10 * 60)).await;
        // Clocks go forward: 08:10 becomes 08:40
        clock.jump(chrono::Duration::minutes(30));

        // Local 08:59
        tokio::time::sleep(Duration::from_secs(19 * 60)).await;
        assert!(runner.fired.lock().is_empty());

        // Local 09:01, half an hour before the pre-jump deadline
        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        assert_eq!(runner.fired.lock().len(), 1);
    }
}
