//! Per-cycle orchestration: load → evaluate → dedup-check → send → record.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use nudgehub_core::error::AppError;
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::{
    NotificationGateway, NudgeConfigStore, NudgeStore, ProcessStore, SentNudgeStore, UserSource,
};
use nudgehub_entity::nudge::config::NudgeConfig;
use nudgehub_entity::nudge::model::Nudge;
use nudgehub_entity::nudge::sent::{NewSentNudge, NudgeMode};
use nudgehub_entity::user::EndUser;

use crate::evaluator::{EvaluatorRegistry, NudgeEvaluator};

/// Deployment-level knobs for the cycle runner.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    /// Subject line for outbound messages.
    pub subject: String,
    /// User-block size applied when the stored config has none.
    pub default_block_size: usize,
}

/// Counters accumulated over one cycle, for the completion log line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// Active nudges processed.
    pub nudges: usize,
    /// Users in the audience.
    pub users: usize,
    /// Notifications sent and recorded.
    pub sent: u64,
    /// Qualifications suppressed by the ledger.
    pub deduped: u64,
    /// Per-item failures (evaluation, ledger, or send).
    pub failures: u64,
}

/// The per-run control loop.
///
/// A cycle is fire-and-forget: [`run_cycle`](Self::run_cycle) never
/// returns an error to the timer. Failing to load the nudge list or the
/// user population aborts the whole cycle; every per-user step is
/// isolated so one user's failure never affects the rest of the batch.
#[derive(Debug)]
pub struct NudgeCycleRunner {
    nudges: Arc<dyn NudgeStore>,
    config: Arc<dyn NudgeConfigStore>,
    ledger: Arc<dyn SentNudgeStore>,
    processes: Arc<dyn ProcessStore>,
    users: Arc<dyn UserSource>,
    gateway: Arc<dyn NotificationGateway>,
    registry: EvaluatorRegistry,
    settings: CycleSettings,
}

impl NudgeCycleRunner {
    /// Create a new cycle runner.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nudges: Arc<dyn NudgeStore>,
        config: Arc<dyn NudgeConfigStore>,
        ledger: Arc<dyn SentNudgeStore>,
        processes: Arc<dyn ProcessStore>,
        users: Arc<dyn UserSource>,
        gateway: Arc<dyn NotificationGateway>,
        registry: EvaluatorRegistry,
        settings: CycleSettings,
    ) -> Self {
        Self {
            nudges,
            config,
            ledger,
            processes,
            users,
            gateway,
            registry,
            settings,
        }
    }

    /// Run one full cycle. Logs the outcome and updates the run record;
    /// never propagates an error to the caller.
    pub async fn run_cycle(&self) {
        let started_at = Utc::now();
        info!("Nudge cycle starting");

        // The run record is observability only: failing to write it must
        // not stop the cycle.
        let process = match self.processes.insert_running(started_at).await {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("Failed to insert run record, continuing without one: {e}");
                None
            }
        };

        match self.execute().await {
            Ok(stats) => {
                info!(
                    nudges = stats.nudges,
                    users = stats.users,
                    sent = stats.sent,
                    deduped = stats.deduped,
                    failures = stats.failures,
                    "Nudge cycle completed"
                );
                if let Some(p) = process {
                    if let Err(e) = self.processes.mark_succeeded(p.id, Utc::now()).await {
                        warn!("Failed to mark run record succeeded: {e}");
                    }
                }
            }
            Err(e) => {
                error!("Nudge cycle aborted: {e}");
                if let Some(p) = process {
                    if let Err(e2) = self
                        .processes
                        .mark_failed(p.id, Utc::now(), &e.to_string())
                        .await
                    {
                        warn!("Failed to mark run record failed: {e2}");
                    }
                }
            }
        }
    }

    /// The cycle body. Errors here abort the whole cycle (fatal class):
    /// nudge list, configuration, or user population could not be loaded.
    async fn execute(&self) -> AppResult<CycleStats> {
        let mut stats = CycleStats::default();

        let nudges = self.nudges.find_active().await?;
        if nudges.is_empty() {
            info!("No active nudges; nothing to do");
            return Ok(stats);
        }
        stats.nudges = nudges.len();

        let config = self
            .config
            .find()
            .await?
            .ok_or_else(|| AppError::configuration("No nudge configuration saved; cannot determine audience"))?;

        // The user population is loaded once and shared across all
        // nudges in this cycle.
        let users = self.users.get_users(config.audience_group()).await?;
        stats.users = users.len();
        debug!(
            group = config.audience_group(),
            users = users.len(),
            mode = %config.mode(),
            "Loaded cycle audience"
        );

        let block_size = if config.block_size > 0 {
            config.block_size as usize
        } else {
            self.settings.default_block_size
        };

        for nudge in &nudges {
            let Some(evaluator) = self.registry.get(&nudge.nudge_type) else {
                warn!(
                    "Unsupported nudge type '{}' on nudge '{}', skipping",
                    nudge.nudge_type, nudge.name
                );
                continue;
            };

            for block in users.chunks(block_size) {
                debug!(
                    nudge = %nudge.name,
                    block_users = block.len(),
                    "Processing user block"
                );
                for user in block {
                    self.process_user(nudge, evaluator.as_ref(), user, &config, &mut stats)
                        .await;
                }
            }
        }

        Ok(stats)
    }

    /// Evaluate one (nudge, user) pair and notify per qualification.
    /// All failures here are per-item: logged and swallowed.
    async fn process_user(
        &self,
        nudge: &Nudge,
        evaluator: &dyn NudgeEvaluator,
        user: &EndUser,
        config: &NudgeConfig,
        stats: &mut CycleStats,
    ) {
        let qualifications = match evaluator.evaluate(nudge, user).await {
            Ok(q) => q,
            Err(e) => {
                warn!(
                    "Evaluation failed for user '{}' on nudge '{}': {e}",
                    user.external_id, nudge.name
                );
                stats.failures += 1;
                return;
            }
        };

        for qualification in qualifications {
            self.notify_once(nudge, user, qualification.fingerprint, qualification.detail, config.mode(), stats)
                .await;
        }
    }

    /// The idempotence gate: dedup-check immediately before the send,
    /// ledger write immediately after a successful send.
    async fn notify_once(
        &self,
        nudge: &Nudge,
        user: &EndUser,
        fingerprint: u32,
        detail: Option<String>,
        mode: NudgeMode,
        stats: &mut CycleStats,
    ) {
        match self.ledger.exists(nudge.id, user.id, fingerprint, mode).await {
            Ok(true) => {
                debug!(
                    "Already notified: nudge '{}', user '{}', fingerprint {fingerprint}",
                    nudge.name, user.external_id
                );
                stats.deduped += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                // Fail closed: without a readable ledger we cannot rule
                // out a duplicate, so the send is skipped this cycle.
                warn!(
                    "Ledger check failed for user '{}' on nudge '{}', skipping send: {e}",
                    user.external_id, nudge.name
                );
                stats.failures += 1;
                return;
            }
        }

        let body = render_message(&nudge.message, detail.as_deref(), nudge.link.as_deref());
        let recipients = vec![user.external_id.clone()];

        if let Err(e) = self
            .gateway
            .send(&recipients, &self.settings.subject, &body)
            .await
        {
            // No ledger write on failure: the same condition stays
            // eligible for retry next cycle.
            warn!(
                "Notification send failed for user '{}' on nudge '{}': {e}",
                user.external_id, nudge.name
            );
            stats.failures += 1;
            return;
        }
        stats.sent += 1;

        let entry = NewSentNudge {
            nudge_id: nudge.id,
            user_id: user.id,
            external_user_id: user.external_id.clone(),
            fingerprint,
            mode,
            sent_at: Utc::now(),
        };
        if let Err(e) = self.ledger.record(&entry).await {
            // The message is out; the send is never retried for a
            // failed ledger write.
            warn!(
                "Ledger write failed after send for user '{}' on nudge '{}': {e}",
                user.external_id, nudge.name
            );
        }
    }
}

/// Fill the message's `{}` placeholder with the qualification detail and
/// append the deep link, when present.
fn render_message(template: &str, detail: Option<&str>, link: Option<&str>) -> String {
    let mut body = match detail {
        Some(d) => template.replacen("{}", d, 1),
        None => template.to_string(),
    };
    if let Some(link) = link {
        body.push('\n');
        body.push_str(link);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_message_with_placeholder() {
        assert_eq!(
            render_message("You missed {}!", Some("Essay 1"), None),
            "You missed Essay 1!"
        );
    }

    #[test]
    fn test_render_message_without_detail_keeps_template() {
        assert_eq!(render_message("We miss you", None, None), "We miss you");
    }

    #[test]
    fn test_render_message_appends_link() {
        assert_eq!(
            render_message("We miss you", None, Some("https://lms.example.edu")),
            "We miss you\nhttps://lms.example.edu"
        );
    }

    #[test]
    fn test_render_message_replaces_first_placeholder_only() {
        assert_eq!(
            render_message("{} and {}", Some("A"), None),
            "A and {}"
        );
    }
}
