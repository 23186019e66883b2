//! In-memory collaborators for engine integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use nudgehub_core::error::AppError;
use nudgehub_core::result::AppResult;
use nudgehub_core::traits::{
    LearningProvider, NotificationGateway, NudgeConfigStore, NudgeStore, ProcessStore,
    SentNudgeStore, UserSource,
};
use nudgehub_entity::assignment::Assignment;
use nudgehub_entity::nudge::config::NudgeConfig;
use nudgehub_entity::nudge::model::{CreateNudge, Nudge};
use nudgehub_entity::nudge::process::{NudgeProcess, ProcessStatus};
use nudgehub_entity::nudge::sent::{NewSentNudge, NudgeMode};
use nudgehub_entity::user::EndUser;

#[derive(Debug, Default)]
pub struct MemNudgeStore {
    pub nudges: Mutex<Vec<Nudge>>,
    pub fail_reads: AtomicBool,
}

impl MemNudgeStore {
    pub fn with(nudges: Vec<Nudge>) -> Arc<Self> {
        Arc::new(Self {
            nudges: Mutex::new(nudges),
            fail_reads: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl NudgeStore for MemNudgeStore {
    async fn find_all(&self) -> AppResult<Vec<Nudge>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::database("nudge store unavailable"));
        }
        Ok(self.nudges.lock().unwrap().clone())
    }

    async fn find_active(&self) -> AppResult<Vec<Nudge>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|n| n.active)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Nudge>> {
        Ok(self
            .nudges
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn insert(&self, create: &CreateNudge) -> AppResult<Nudge> {
        let nudge = Nudge {
            id: Uuid::new_v4(),
            nudge_type: create.nudge_type.clone(),
            name: create.name.clone(),
            message: create.message.clone(),
            link: create.link.clone(),
            params: create.params.clone(),
            active: create.active,
            user_sources: create.user_sources.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.nudges.lock().unwrap().push(nudge.clone());
        Ok(nudge)
    }

    async fn update(&self, nudge: &Nudge) -> AppResult<()> {
        let mut nudges = self.nudges.lock().unwrap();
        match nudges.iter_mut().find(|n| n.id == nudge.id) {
            Some(slot) => {
                *slot = nudge.clone();
                Ok(())
            }
            None => Err(AppError::not_found("no such nudge")),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut nudges = self.nudges.lock().unwrap();
        let before = nudges.len();
        nudges.retain(|n| n.id != id);
        Ok(nudges.len() < before)
    }
}

#[derive(Debug, Default)]
pub struct MemConfigStore {
    pub config: Mutex<Option<NudgeConfig>>,
}

impl MemConfigStore {
    pub fn with(config: NudgeConfig) -> Arc<Self> {
        Arc::new(Self {
            config: Mutex::new(Some(config)),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl NudgeConfigStore for MemConfigStore {
    async fn find(&self) -> AppResult<Option<NudgeConfig>> {
        Ok(self.config.lock().unwrap().clone())
    }

    async fn save(&self, config: &NudgeConfig) -> AppResult<()> {
        *self.config.lock().unwrap() = Some(config.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemLedger {
    pub entries: Mutex<Vec<NewSentNudge>>,
    pub fail_reads: AtomicBool,
}

impl MemLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl SentNudgeStore for MemLedger {
    async fn exists(
        &self,
        nudge_id: Uuid,
        user_id: Uuid,
        fingerprint: u32,
        mode: NudgeMode,
    ) -> AppResult<bool> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::database("ledger unavailable"));
        }
        Ok(self.entries.lock().unwrap().iter().any(|e| {
            e.nudge_id == nudge_id
                && e.user_id == user_id
                && e.fingerprint == fingerprint
                && e.mode == mode
        }))
    }

    async fn record(&self, entry: &NewSentNudge) -> AppResult<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemProcessStore {
    pub runs: Mutex<Vec<NudgeProcess>>,
}

impl MemProcessStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn statuses(&self) -> Vec<ProcessStatus> {
        self.runs.lock().unwrap().iter().map(|r| r.status).collect()
    }
}

#[async_trait]
impl ProcessStore for MemProcessStore {
    async fn insert_running(&self, started_at: DateTime<Utc>) -> AppResult<NudgeProcess> {
        let process = NudgeProcess {
            id: Uuid::new_v4(),
            started_at,
            completed_at: None,
            status: ProcessStatus::Running,
            error_message: None,
        };
        self.runs.lock().unwrap().push(process.clone());
        Ok(process)
    }

    async fn mark_succeeded(&self, id: Uuid, completed_at: DateTime<Utc>) -> AppResult<()> {
        let mut runs = self.runs.lock().unwrap();
        match runs.iter_mut().find(|r| r.id == id) {
            Some(run) => {
                run.status = ProcessStatus::Succeeded;
                run.completed_at = Some(completed_at);
                Ok(())
            }
            None => Err(AppError::not_found("no such run")),
        }
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
        error: &str,
    ) -> AppResult<()> {
        let mut runs = self.runs.lock().unwrap();
        match runs.iter_mut().find(|r| r.id == id) {
            Some(run) => {
                run.status = ProcessStatus::Failed;
                run.completed_at = Some(completed_at);
                run.error_message = Some(error.to_string());
                Ok(())
            }
            None => Err(AppError::not_found("no such run")),
        }
    }

    async fn find_recent(&self, limit: i64) -> AppResult<Vec<NudgeProcess>> {
        let runs = self.runs.lock().unwrap();
        Ok(runs.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut runs = self.runs.lock().unwrap();
        let before = runs.len();
        runs.retain(|r| r.started_at >= cutoff);
        Ok((before - runs.len()) as u64)
    }

    async fn fail_stale_running(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut runs = self.runs.lock().unwrap();
        let mut updated = 0;
        for run in runs
            .iter_mut()
            .filter(|r| r.status == ProcessStatus::Running && r.started_at < cutoff)
        {
            run.status = ProcessStatus::Failed;
            run.error_message = Some("stale running record".to_string());
            updated += 1;
        }
        Ok(updated)
    }
}

#[derive(Debug, Default)]
pub struct StaticUsers {
    pub users: Vec<EndUser>,
    pub requested_groups: Mutex<Vec<String>>,
    pub fail_reads: AtomicBool,
}

impl StaticUsers {
    pub fn with(users: Vec<EndUser>) -> Arc<Self> {
        Arc::new(Self {
            users,
            requested_groups: Mutex::new(Vec::new()),
            fail_reads: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl UserSource for StaticUsers {
    async fn get_users(&self, group: &str) -> AppResult<Vec<EndUser>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::external_service("groups service unavailable"));
        }
        self.requested_groups.lock().unwrap().push(group.to_string());
        Ok(self.users.clone())
    }
}

#[derive(Debug, Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<(Vec<String>, String, String)>>,
    pub fail_for: Mutex<HashSet<String>>,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_recipient(&self, external_id: &str) {
        self.fail_for.lock().unwrap().insert(external_id.to_string());
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(r, _, _)| r.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> AppResult<()> {
        let failing = self.fail_for.lock().unwrap();
        if recipients.iter().any(|r| failing.contains(r)) {
            return Err(AppError::external_service("gateway rejected message"));
        }
        drop(failing);
        self.sent.lock().unwrap().push((
            recipients.to_vec(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

/// Per-user activity scripted by external ID.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    pub last_logins: Mutex<HashMap<String, DateTime<Utc>>>,
    pub missed: Mutex<HashMap<String, Vec<Assignment>>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_last_login(&self, external_id: &str, at: DateTime<Utc>) {
        self.last_logins
            .lock()
            .unwrap()
            .insert(external_id.to_string(), at);
    }

    pub fn set_missed(&self, external_id: &str, assignments: Vec<Assignment>) {
        self.missed
            .lock()
            .unwrap()
            .insert(external_id.to_string(), assignments);
    }
}

#[async_trait]
impl LearningProvider for ScriptedProvider {
    async fn get_last_login(&self, external_id: &str) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.last_logins.lock().unwrap().get(external_id).copied())
    }

    async fn get_missed_assignments(&self, external_id: &str) -> AppResult<Vec<Assignment>> {
        Ok(self
            .missed
            .lock()
            .unwrap()
            .get(external_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_completed_assignments(&self, _external_id: &str) -> AppResult<Vec<Assignment>> {
        Ok(Vec::new())
    }
}

pub fn end_user(external_id: &str) -> EndUser {
    EndUser {
        id: Uuid::new_v4(),
        external_id: external_id.to_string(),
    }
}

pub fn nudge(nudge_type: &str, name: &str, params: serde_json::Value) -> Nudge {
    Nudge {
        id: Uuid::new_v4(),
        nudge_type: nudge_type.to_string(),
        name: name.to_string(),
        message: "Heads up: {}".to_string(),
        link: None,
        params,
        active: true,
        user_sources: serde_json::json!([]),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn config(process_time: &str) -> NudgeConfig {
    NudgeConfig {
        id: 1,
        enabled: true,
        production_group: "students".to_string(),
        test_group: "qa-students".to_string(),
        test_mode: false,
        process_time: process_time.to_string(),
        block_size: 50,
        updated_at: Utc::now(),
    }
}
