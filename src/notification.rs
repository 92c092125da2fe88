//! One-slot sync notice, shown once by whoever reads it next.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::storage::{OptionStore, StorageResult};

pub const NOTICE_KEY: &str = "edtm_sync_notice";
pub const NOTICE_TTL_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    /// Unix seconds.
    pub expires_at: i64,
}

fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Stores `body` as the pending notice, replacing any earlier one. Storage
/// failures are logged, not returned.
pub fn send(options: &dyn OptionStore, body: impl Into<String>, level: NoticeLevel) {
    send_at(options, body, level, now_unix());
}

pub fn send_at(options: &dyn OptionStore, body: impl Into<String>, level: NoticeLevel, now: i64) {
    let notice = Notice {
        message: body.into(),
        level,
        expires_at: now + NOTICE_TTL_SECS,
    };
    let stored = serde_json::to_value(&notice)
        .map_err(Into::into)
        .and_then(|value| options.set(NOTICE_KEY, value));
    if let Err(err) = stored {
        tracing::warn!("sync notice could not be stored: {err}");
    }
}

/// Removes and returns the pending notice if it has not expired.
pub fn take(options: &dyn OptionStore) -> Option<Notice> {
    take_at(options, now_unix())
}

pub fn take_at(options: &dyn OptionStore, now: i64) -> Option<Notice> {
    match take_stored(options) {
        Ok(Some(notice)) if notice.expires_at > now => Some(notice),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!("sync notice could not be read: {err}");
            None
        }
    }
}

fn take_stored(options: &dyn OptionStore) -> StorageResult<Option<Notice>> {
    let Some(raw) = options.get(NOTICE_KEY)? else {
        return Ok(None);
    };
    options.delete(NOTICE_KEY)?;
    Ok(serde_json::from_value::<Notice>(raw).ok().or_else(|| {
        tracing::debug!("discarding malformed sync notice");
        None
    }))
}
