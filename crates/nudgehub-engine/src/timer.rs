//! Self-rescheduling wall-clock timer with cooperative cancellation.
//!
//! A [`DailyTimer`] owns at most one live background task. `arm` starts a
//! one-shot wait; when it elapses the callback runs to completion on the
//! timer's task, and the task then re-arms itself with the fixed period —
//! indefinitely, without an external driver. `cancel` sends a done-signal
//! and waits for the task to acknowledge before returning, so a rearm
//! after a configuration change can never leave two overlapping live
//! timers. Cancellation interrupts a pending wait only; a callback that
//! has already started runs to completion.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

/// Handle to the live background task of an armed timer.
#[derive(Debug)]
struct ArmedTimer {
    /// Done-signal sender; flipping it to `true` requests shutdown.
    cancel_tx: watch::Sender<bool>,
    /// The background task, awaited on cancel for acknowledgement.
    handle: JoinHandle<()>,
}

/// A self-rescheduling timer. State machine:
/// `Idle → Armed → (Fired → Armed)*` or `Armed → Cancelled → Idle`.
#[derive(Debug)]
pub struct DailyTimer {
    /// Rearm period applied after each fire.
    period: Duration,
    /// The at-most-one live task.
    inner: Mutex<Option<ArmedTimer>>,
}

impl DailyTimer {
    /// Create an idle timer with the given rearm period.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            inner: Mutex::new(None),
        }
    }

    /// Arm the timer: wait `initial_delay`, run `on_fire`, then rearm
    /// with the fixed period after each return of `on_fire`.
    ///
    /// An already-armed timer is fully cancelled (awaited) first.
    pub async fn arm<F, Fut>(&self, initial_delay: Duration, on_fire: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel().await;

        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let period = self.period;

        debug!(
            initial_delay_secs = initial_delay.as_secs(),
            period_secs = period.as_secs(),
            "Arming timer"
        );

        let handle = tokio::spawn(async move {
            let mut delay = initial_delay;
            loop {
                tokio::select! {
                    changed = cancel_rx.changed() => {
                        // Cancelled, or the sender side is gone.
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }
                    _ = time::sleep(delay) => {
                        // A cancel that raced the deadline is authoritative
                        // over a late fire.
                        if *cancel_rx.borrow() {
                            break;
                        }
                        on_fire().await;
                        delay = period;
                    }
                }
            }
        });

        *self.inner.lock().await = Some(ArmedTimer { cancel_tx, handle });
    }

    /// Cancel a pending wait. Sends the done-signal, then blocks until
    /// the background task has acknowledged and stopped. Safe to call
    /// when idle, and safe to call concurrently with an in-flight rearm
    /// race: the fire path treats cancellation as authoritative.
    pub async fn cancel(&self) {
        let armed = self.inner.lock().await.take();
        if let Some(timer) = armed {
            let _ = timer.cancel_tx.send(true);
            let _ = timer.handle.await;
            info!("Timer cancelled");
        }
    }

    /// Whether a live background task currently exists.
    pub async fn is_armed(&self) -> bool {
        match self.inner.lock().await.as_ref() {
            Some(timer) => !timer.handle.is_finished(),
            None => false,
        }
    }
}

/// Delay from `now` until the next occurrence of `target` time-of-day in
/// the reference timezone (`utc_offset_minutes` east of UTC). If the
/// moment has already passed today, the delay wraps to tomorrow.
pub fn next_fire_delay(now: DateTime<Utc>, target: NaiveTime, utc_offset_minutes: i32) -> Duration {
    let offset = TimeDelta::minutes(utc_offset_minutes as i64);
    let local_now = now.naive_utc() + offset;
    let target_today = local_now.date().and_time(target);

    let mut until = target_today - local_now;
    if until <= TimeDelta::zero() {
        until += TimeDelta::days(1);
    }

    // `until` is strictly positive here, so the conversion cannot fail.
    until.to_std().unwrap_or(Duration::from_secs(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_next_fire_delay_later_today() {
        let now = utc(2024, 3, 10, 6, 0, 0);
        let target = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert_eq!(
            next_fire_delay(now, target, 0),
            Duration::from_secs(2 * 3600)
        );
    }

    #[test]
    fn test_next_fire_delay_wraps_to_tomorrow() {
        let now = utc(2024, 3, 10, 9, 30, 0);
        let target = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert_eq!(
            next_fire_delay(now, target, 0),
            Duration::from_secs(22 * 3600 + 30 * 60)
        );
    }

    #[test]
    fn test_next_fire_delay_exact_moment_wraps() {
        let now = utc(2024, 3, 10, 8, 0, 0);
        let target = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert_eq!(
            next_fire_delay(now, target, 0),
            Duration::from_secs(24 * 3600)
        );
    }

    #[test]
    fn test_next_fire_delay_respects_offset() {
        // 06:00 UTC is 08:00 at +120 minutes; target already reached,
        // so the delay wraps a full day.
        let now = utc(2024, 3, 10, 6, 0, 0);
        let target = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert_eq!(
            next_fire_delay(now, target, 120),
            Duration::from_secs(24 * 3600)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_then_rearms_with_period() {
        let timer = DailyTimer::new(Duration::from_millis(20));
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        timer
            .arm(Duration::from_millis(10), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;

        // Fires at t=10, 30, 50.
        time::sleep(Duration::from_millis(55)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        timer.cancel().await;
        assert!(!timer.is_armed().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_fire_suppresses_callback() {
        let timer = DailyTimer::new(Duration::from_millis(20));
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        timer
            .arm(Duration::from_millis(50), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;

        time::sleep(Duration::from_millis(10)).await;
        timer.cancel().await;

        // Well past the original deadline: the callback must never run.
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_task() {
        let timer = DailyTimer::new(Duration::from_millis(100));
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&first);
        timer
            .arm(Duration::from_millis(30), move || {
                let f = Arc::clone(&f);
                async move {
                    f.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;

        // Rearm before the first timer's deadline: the old task must be
        // fully cancelled, leaving a single live timer.
        let s = Arc::clone(&second);
        timer
            .arm(Duration::from_millis(10), move || {
                let s = Arc::clone(&s);
                async move {
                    s.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        timer.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_when_idle_is_noop() {
        let timer = DailyTimer::new(Duration::from_millis(20));
        timer.cancel().await;
        assert!(!timer.is_armed().await);
    }
}
