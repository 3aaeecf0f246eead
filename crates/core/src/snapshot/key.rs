//! Snapshot kinds, document keys, and rebuild run status.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking::Basis;

/// Key of the account-overview singleton.
pub const SUMMARY_KEY: &str = "summary";

/// Which precomputed aggregate a snapshot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    /// Sales dashboard by operator and agent.
    Sales,
    /// Founders ledger.
    Founders,
    /// Monthly profit and loss.
    Pnl,
    /// Account-balance overview.
    Accounts,
}

impl SnapshotKind {
    /// All kinds.
    pub const ALL: [Self; 4] = [Self::Sales, Self::Founders, Self::Pnl, Self::Accounts];

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Founders => "founders",
            Self::Pnl => "pnl",
            Self::Accounts => "accounts",
        }
    }

    /// Parses a kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document key of one snapshot.
///
/// - sales and founders: `{from}_{to}:{basis}`
/// - monthly P&L: `YYYY-MM`
/// - account overview: `summary`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    /// Snapshot kind.
    pub kind: SnapshotKind,
    /// Document key within the kind.
    pub key: String,
}

impl SnapshotKey {
    /// Range key for dashboards.
    #[must_use]
    pub fn range(kind: SnapshotKind, from: NaiveDate, to: NaiveDate, basis: Basis) -> Self {
        Self {
            kind,
            key: format!("{}:{}", range_key(from, to), basis.as_str()),
        }
    }

    /// Monthly P&L key.
    #[must_use]
    pub fn month(month: &str) -> Self {
        Self {
            kind: SnapshotKind::Pnl,
            key: month.to_string(),
        }
    }

    /// Account-overview singleton key.
    #[must_use]
    pub fn summary() -> Self {
        Self {
            kind: SnapshotKind::Accounts,
            key: SUMMARY_KEY.to_string(),
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.key)
    }
}

/// `{from}_{to}` in ISO dates.
#[must_use]
pub fn range_key(from: NaiveDate, to: NaiveDate) -> String {
    format!("{from}_{to}")
}

/// Status of the last rebuild of a snapshot kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheRunStatus {
    /// Rebuild in progress.
    Running,
    /// Rebuild completed and the snapshot was written.
    Done,
    /// Rebuild failed; the previous snapshot is untouched.
    Error,
}

impl CacheRunStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Parses a status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}
