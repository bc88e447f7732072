//! Daily history cleanup at local midnight.

use chrono::{DateTime, Duration as TimeDelta, Local, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::controller::ChatController;

/// Period between cleanups once the first midnight has passed
pub const CLEANUP_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Source of the current local time
pub trait Clock: Send + Sync + 'static {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// How the scheduler re-arms after the first midnight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupPolicy {
    /// Every 24 hours after the first midnight. Drifts by an hour across DST changes.
    #[default]
    FixedInterval,
    /// Look up the next local midnight after every cleanup.
    RecomputeMidnight,
}

/// Time left until the next local midnight.
///
/// Zero when `now` is exactly midnight.
pub fn delay_until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let time = now.time();
    if time.num_seconds_from_midnight() == 0 && time.nanosecond() == 0 {
        return Duration::ZERO;
    }
    delay_until_following_midnight(now)
}

/// Time until the first local midnight strictly after `now`.
fn delay_until_following_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    next_midnight_after(now)
        .and_then(|midnight| midnight.signed_duration_since(now).to_std().ok())
        .unwrap_or(CLEANUP_PERIOD)
}

/// The next local midnight after `now`. When midnight falls in a DST gap,
/// the first valid local minute after it.
fn next_midnight_after<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let tomorrow = now.date_naive().succ_opt()?;
    let midnight: NaiveDateTime = tomorrow.and_hms_opt(0, 0, 0)?;

    (0..=180)
        .map(|minutes| midnight + TimeDelta::minutes(minutes))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
}

/// Arms the daily cleanup.
pub struct CleanupScheduler<C = SystemClock> {
    clock: C,
    policy: CleanupPolicy,
}

impl CleanupScheduler {
    pub fn new(policy: CleanupPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> CleanupScheduler<C> {
    pub fn with_clock(policy: CleanupPolicy, clock: C) -> Self {
        Self { clock, policy }
    }

    /// Start the timer task. Cleanup stops when the returned handle is
    /// cancelled or dropped.
    pub fn spawn(self, chat: ChatController) -> CleanupHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(self.clock, self.policy, chat, cancel.clone()));
        CleanupHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Owned handle to a running cleanup timer
pub struct CleanupHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl CleanupHandle {
    /// Stop the timer
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop the timer and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for CleanupHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<C: Clock>(
    clock: C,
    policy: CleanupPolicy,
    chat: ChatController,
    cancel: CancellationToken,
) {
    let first = delay_until_next_midnight(&clock.now());
    tracing::info!(in_secs = first.as_secs(), ?policy, "daily cleanup armed");

    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(first) => {}
    }

    match policy {
        CleanupPolicy::FixedInterval => {
            let mut ticker = tokio::time::interval_at(Instant::now() + CLEANUP_PERIOD, CLEANUP_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            cleanup(&chat).await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => cleanup(&chat).await,
                }
            }
        }
        CleanupPolicy::RecomputeMidnight => {
            cleanup(&chat).await;
            loop {
                let delay = delay_until_following_midnight(&clock.now());
                tracing::debug!(in_secs = delay.as_secs(), "next cleanup");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => cleanup(&chat).await,
                }
            }
        }
    }
    tracing::debug!("daily cleanup stopped");
}

async fn cleanup(chat: &ChatController) {
    tracing::info!("running scheduled history cleanup");
    // Failures are already surfaced as notifications
    let _ = chat.clear().await;
}
