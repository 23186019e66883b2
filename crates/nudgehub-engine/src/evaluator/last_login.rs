//! Last-login evaluator.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use nudgehub_core::result::AppResult;
use nudgehub_core::traits::LearningProvider;
use nudgehub_entity::nudge::model::Nudge;
use nudgehub_entity::user::EndUser;

use crate::fingerprint::{canonical_hours, canonical_instant, fingerprint};

use super::{NudgeEvaluator, Qualification};

/// Qualifies users whose last login is further in the past than the
/// nudge's `hours` threshold.
///
/// A user with no login data never qualifies; that is a normal outcome,
/// not an error. The fingerprint covers the exact last-login instant and
/// the threshold, so a newer login instant (even one still beyond the
/// threshold) produces a fresh fingerprint eligible for one new
/// notification.
#[derive(Debug)]
pub struct LastLoginEvaluator {
    provider: Arc<dyn LearningProvider>,
    default_threshold_hours: f64,
}

impl LastLoginEvaluator {
    /// Create a new last-login evaluator.
    pub fn new(provider: Arc<dyn LearningProvider>, default_threshold_hours: f64) -> Self {
        Self {
            provider,
            default_threshold_hours,
        }
    }
}

#[async_trait]
impl NudgeEvaluator for LastLoginEvaluator {
    fn nudge_type(&self) -> &str {
        "last_login"
    }

    async fn evaluate(&self, nudge: &Nudge, user: &EndUser) -> AppResult<Vec<Qualification>> {
        let threshold_hours = nudge.threshold_hours(self.default_threshold_hours);

        let last_login = match self.provider.get_last_login(&user.external_id).await? {
            Some(t) => t,
            None => return Ok(Vec::new()),
        };

        let elapsed_hours = (Utc::now() - last_login).num_seconds() as f64 / 3600.0;
        if elapsed_hours <= threshold_hours {
            return Ok(Vec::new());
        }

        let days_inactive = (elapsed_hours / 24.0).floor() as i64;
        Ok(vec![Qualification {
            fingerprint: fingerprint(&[
                &canonical_instant(last_login),
                &canonical_hours(threshold_hours),
            ]),
            detail: Some(days_inactive.to_string()),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;

    use crate::evaluator::testing::{nudge, user, FakeProvider};

    #[tokio::test]
    async fn test_qualifies_beyond_threshold() {
        let last_login = Utc::now() - Duration::days(15);
        let evaluator = LastLoginEvaluator::new(
            Arc::new(FakeProvider {
                last_login: Some(last_login),
                ..Default::default()
            }),
            336.0,
        );

        let quals = evaluator
            .evaluate(&nudge("last_login", serde_json::json!({"hours": 336})), &user())
            .await
            .expect("evaluate");

        assert_eq!(quals.len(), 1);
        assert_eq!(
            quals[0].fingerprint,
            fingerprint(&[&canonical_instant(last_login), "336"])
        );
        assert_eq!(quals[0].detail.as_deref(), Some("15"));
    }

    #[tokio::test]
    async fn test_does_not_qualify_within_threshold() {
        let evaluator = LastLoginEvaluator::new(
            Arc::new(FakeProvider {
                last_login: Some(Utc::now() - Duration::days(10)),
                ..Default::default()
            }),
            336.0,
        );

        let quals = evaluator
            .evaluate(&nudge("last_login", serde_json::json!({"hours": 336})), &user())
            .await
            .expect("evaluate");

        assert!(quals.is_empty());
    }

    #[tokio::test]
    async fn test_no_login_data_never_qualifies() {
        let evaluator = LastLoginEvaluator::new(Arc::new(FakeProvider::default()), 336.0);

        let quals = evaluator
            .evaluate(&nudge("last_login", serde_json::json!({})), &user())
            .await
            .expect("no login data is not an error");

        assert!(quals.is_empty());
    }

    #[tokio::test]
    async fn test_fingerprint_tracks_login_instant() {
        let first = Utc::now() - Duration::days(20);
        let second = Utc::now() - Duration::days(15);
        let n = nudge("last_login", serde_json::json!({"hours": 336}));

        let f1 = LastLoginEvaluator::new(
            Arc::new(FakeProvider {
                last_login: Some(first),
                ..Default::default()
            }),
            336.0,
        )
        .evaluate(&n, &user())
        .await
        .expect("evaluate")[0]
            .fingerprint;

        let f2 = LastLoginEvaluator::new(
            Arc::new(FakeProvider {
                last_login: Some(second),
                ..Default::default()
            }),
            336.0,
        )
        .evaluate(&n, &user())
        .await
        .expect("evaluate")[0]
            .fingerprint;

        assert_ne!(f1, f2);
    }
}
