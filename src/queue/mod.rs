//! Single-slot deferred sync queue.
//!
//! When a kit write cannot find an active kit the job is parked in the
//! option store. Later drains replay it; the slot is cleared only after a
//! confirmed successful write.

pub mod error;
pub mod event;
pub mod machine;
pub mod model;

pub use error::{QueueError, QueueResult};
pub use event::{DrainTrigger, QueueEvent};
pub use machine::QueueMachine;
pub use model::{PendingJob, QueueState};

use crate::host::{HostResult, SyncStatus};
use crate::notification::{self, NoticeLevel};
use crate::storage::OptionStore;

pub const PENDING_JOB_KEY: &str = "edtm_pending_kit_sync";

const APPLIED_NOTICE: &str = "Kit settings updated (queued sync processed).";
const FAILED_NOTICE: &str = "Could not sync kit settings. Run the sync again or check the log.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing was queued.
    Idle,
    Applied,
    /// Still no active kit; the job stays queued.
    Deferred,
    /// The write failed; the job stays queued.
    Failed,
}

pub struct SyncQueue<'a> {
    options: &'a dyn OptionStore,
    machine: QueueMachine,
}

impl<'a> SyncQueue<'a> {
    /// Reads the slot to decide the starting state.
    pub fn load(options: &'a dyn OptionStore) -> QueueResult<Self> {
        let state = match options.get(PENDING_JOB_KEY)? {
            Some(value) if !is_blank(&value) => QueueState::Pending,
            _ => QueueState::Empty,
        };
        Ok(Self {
            options,
            machine: QueueMachine::new(state),
        })
    }

    pub fn state(&self) -> QueueState {
        self.machine.state()
    }

    /// The queued job, if one is stored and readable.
    pub fn pending(&self) -> QueueResult<Option<PendingJob>> {
        Ok(self
            .options
            .get(PENDING_JOB_KEY)?
            .filter(|value| !is_blank(value))
            .and_then(|value| serde_json::from_value(value).ok()))
    }

    /// Parks `job`, replacing whatever was queued before.
    pub fn enqueue(&mut self, job: &PendingJob) -> QueueResult<()> {
        let value = serde_json::to_value(job).map_err(crate::storage::StorageError::from)?;
        self.options.set(PENDING_JOB_KEY, value)?;
        self.machine.transition(QueueEvent::Enqueue)?;
        tracing::info!(
            colors = job.colors_norm.len(),
            fonts = job.fonts_norm.len(),
            mode = job.mode.as_str(),
            "kit sync queued"
        );
        Ok(())
    }

    /// Replays the queued job through `apply`. Draining an empty queue is a
    /// no-op.
    pub fn drain<F>(&mut self, trigger: DrainTrigger, apply: F) -> QueueResult<DrainOutcome>
    where
        F: FnOnce(&PendingJob) -> HostResult<SyncStatus>,
    {
        if self.state() == QueueState::Empty {
            tracing::debug!(trigger = trigger.as_str(), "nothing queued");
            return Ok(DrainOutcome::Idle);
        }

        let Some(job) = self.pending()? else {
            self.machine.transition(QueueEvent::DrainFailed)?;
            notification::send(self.options, FAILED_NOTICE, NoticeLevel::Warning);
            tracing::warn!(
                trigger = trigger.as_str(),
                "queued job is unreadable; kept until the next write replaces it"
            );
            return Ok(DrainOutcome::Failed);
        };

        match apply(&job) {
            Ok(SyncStatus::Success) => {
                self.options.delete(PENDING_JOB_KEY)?;
                self.machine.transition(QueueEvent::DrainSucceeded)?;
                notification::send(self.options, APPLIED_NOTICE, NoticeLevel::Success);
                tracing::info!(trigger = trigger.as_str(), "queued kit sync applied");
                Ok(DrainOutcome::Applied)
            }
            Ok(SyncStatus::Queued) => {
                self.machine.transition(QueueEvent::DrainDeferred)?;
                tracing::debug!(trigger = trigger.as_str(), "kit still unavailable; job kept");
                Ok(DrainOutcome::Deferred)
            }
            Err(err) => {
                self.machine.transition(QueueEvent::DrainFailed)?;
                notification::send(self.options, FAILED_NOTICE, NoticeLevel::Warning);
                tracing::warn!(trigger = trigger.as_str(), %err, "queued kit sync failed; job kept");
                Ok(DrainOutcome::Failed)
            }
        }
    }
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(object) => object.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::String(text) => text.is_empty(),
        _ => false,
    }
}
