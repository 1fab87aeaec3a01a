use chrono::{DateTime, Utc};

use crate::api::ErrorInfo;
use crate::models::UserRecord;

/// Result of a successful fetch, shaped by its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheData {
    List(Vec<UserRecord>),
    Record(UserRecord),
}

impl CacheData {
    pub fn as_list(&self) -> Option<&[UserRecord]> {
        match self {
            CacheData::List(users) => Some(users),
            CacheData::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&UserRecord> {
        match self {
            CacheData::Record(user) => Some(user),
            CacheData::List(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Absent,
    Pending,
    Success,
    Error,
}

/// Snapshot of one query key.
///
/// `data` survives a failed or pending re-fetch so views can keep showing it,
/// but a stale entry is never served by `QueryCache::read`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub status: CacheStatus,
    pub data: Option<CacheData>,
    pub error: Option<ErrorInfo>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub stale: bool,
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self {
            status: CacheStatus::Absent,
            data: None,
            error: None,
            fetched_at: None,
            stale: false,
        }
    }
}

impl CacheEntry {
    /// True when a read must go to the network.
    pub fn needs_fetch(&self) -> bool {
        self.stale || matches!(self.status, CacheStatus::Absent | CacheStatus::Pending)
    }

    pub(crate) fn mark_pending(&mut self) {
        self.status = CacheStatus::Pending;
        self.stale = false;
    }

    pub(crate) fn settle_success(&mut self, data: CacheData) {
        self.status = CacheStatus::Success;
        self.data = Some(data);
        self.error = None;
        self.fetched_at = Some(Utc::now());
        self.stale = false;
    }

    pub(crate) fn settle_error(&mut self, error: ErrorInfo) {
        self.status = CacheStatus::Error;
        self.error = Some(error);
        self.fetched_at = Some(Utc::now());
        self.stale = false;
    }

    pub fn age_minutes(&self) -> Option<i64> {
        self.fetched_at.map(|at| (Utc::now() - at).num_minutes())
    }

    pub fn age_display(&self) -> String {
        let Some(minutes) = self.age_minutes() else {
            return "never".to_string();
        };
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
