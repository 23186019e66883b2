//! Engine facade: owns the timers and reacts to configuration changes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use nudgehub_core::config::EngineConfig;
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::NudgeConfigStore;
use nudgehub_entity::nudge::config::NudgeConfig;

use crate::cycle::NudgeCycleRunner;
use crate::retention::RetentionJobs;
use crate::timer::{next_fire_delay, DailyTimer};

/// The schedule currently armed on the cycle timer, kept so that a
/// configuration save that changes nothing relevant skips the rearm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArmedSchedule {
    enabled: bool,
    process_time: NaiveTime,
}

/// Top-level engine: the cycle timer, the housekeeping timers, and the
/// rearm-on-config-change logic.
#[derive(Debug)]
pub struct NudgeEngine {
    cycle: Arc<NudgeCycleRunner>,
    retention: Arc<RetentionJobs>,
    config_store: Arc<dyn NudgeConfigStore>,
    settings: EngineConfig,
    cycle_timer: DailyTimer,
    history_timer: DailyTimer,
    reaper_timer: DailyTimer,
    current_schedule: Mutex<Option<ArmedSchedule>>,
}

impl NudgeEngine {
    /// Create an engine with idle timers.
    pub fn new(
        cycle: Arc<NudgeCycleRunner>,
        retention: Arc<RetentionJobs>,
        config_store: Arc<dyn NudgeConfigStore>,
        settings: EngineConfig,
    ) -> Self {
        let cycle_period = Duration::from_secs(settings.period_hours * 3600);
        let day = Duration::from_secs(24 * 3600);
        Self {
            cycle,
            retention,
            config_store,
            settings,
            cycle_timer: DailyTimer::new(cycle_period),
            history_timer: DailyTimer::new(day),
            reaper_timer: DailyTimer::new(day),
            current_schedule: Mutex::new(None),
        }
    }

    /// Start the engine: arm the housekeeping timers, then arm the cycle
    /// timer per the saved configuration (if one exists and is enabled).
    pub async fn start(&self) -> AppResult<()> {
        self.arm_housekeeping().await;

        match self.config_store.find().await? {
            Some(config) => {
                self.apply_schedule(&config).await;
            }
            None => {
                warn!("No nudge configuration saved; cycle timer stays idle until one is");
            }
        }
        Ok(())
    }

    /// Apply a freshly saved configuration. Rearms the cycle timer only
    /// when the effective schedule (enabled flag or process time) actually
    /// changed; block size, group, and mode changes take effect at the
    /// next fire without touching the timer. Returns whether a rearm (or
    /// cancel) happened.
    pub async fn on_config_updated(&self, config: &NudgeConfig) -> AppResult<bool> {
        let next = self.schedule_for(config);
        {
            let current = self.current_schedule.lock().await;
            if current.as_ref() == Some(&next) {
                info!("Configuration saved; schedule unchanged, timer untouched");
                return Ok(false);
            }
        }
        self.apply_schedule(config).await;
        Ok(true)
    }

    /// Cancel every timer and wait for their tasks to stop.
    pub async fn shutdown(&self) {
        self.cycle_timer.cancel().await;
        self.history_timer.cancel().await;
        self.reaper_timer.cancel().await;
        *self.current_schedule.lock().await = None;
        info!("Engine stopped");
    }

    /// Whether the cycle timer currently has a live task.
    pub async fn is_cycle_armed(&self) -> bool {
        self.cycle_timer.is_armed().await
    }

    async fn apply_schedule(&self, config: &NudgeConfig) {
        let schedule = self.schedule_for(config);

        if schedule.enabled {
            let delay = next_fire_delay(
                Utc::now(),
                schedule.process_time,
                self.settings.utc_offset_minutes,
            );
            info!(
                process_time = %schedule.process_time,
                delay_secs = delay.as_secs(),
                "Arming nudge cycle timer"
            );
            let cycle = Arc::clone(&self.cycle);
            self.cycle_timer
                .arm(delay, move || {
                    let cycle = Arc::clone(&cycle);
                    async move {
                        cycle.run_cycle().await;
                    }
                })
                .await;
        } else {
            info!("Nudge processing disabled; cancelling cycle timer");
            self.cycle_timer.cancel().await;
        }

        *self.current_schedule.lock().await = Some(schedule);
    }

    /// The effective schedule for a configuration, with the deployment
    /// default (and a compiled-in 08:00 last resort) covering an absent
    /// or unparseable `process_time`.
    fn schedule_for(&self, config: &NudgeConfig) -> ArmedSchedule {
        let process_time = config
            .process_time_of_day()
            .or_else(|| {
                NaiveTime::parse_from_str(&self.settings.default_process_time, "%H:%M:%S").ok()
            })
            .unwrap_or_else(|| NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN));
        ArmedSchedule {
            enabled: config.enabled,
            process_time,
        }
    }

    async fn arm_housekeeping(&self) {
        let offset = self.settings.utc_offset_minutes;

        let prune_at = parse_time_or(&self.settings.history_prune_time, 2, 0);
        let retention = Arc::clone(&self.retention);
        self.history_timer
            .arm(next_fire_delay(Utc::now(), prune_at, offset), move || {
                let retention = Arc::clone(&retention);
                async move {
                    retention.prune_history().await;
                }
            })
            .await;

        let reap_at = parse_time_or(&self.settings.reaper_time, 2, 30);
        let retention = Arc::clone(&self.retention);
        self.reaper_timer
            .arm(next_fire_delay(Utc::now(), reap_at, offset), move || {
                let retention = Arc::clone(&retention);
                async move {
                    retention.reap_stale_runs().await;
                }
            })
            .await;
    }
}

fn parse_time_or(value: &str, fallback_hour: u32, fallback_minute: u32) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .ok()
        .or_else(|| NaiveTime::from_hms_opt(fallback_hour, fallback_minute, 0))
        .unwrap_or(NaiveTime::MIN)
}
