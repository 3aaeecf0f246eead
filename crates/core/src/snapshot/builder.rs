//! Snapshot builder: full recompute of one snapshot kind.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::accounts::{AccountOverview, build_account_overview};
use super::founders::{FoundersSnapshot, build_founders};
use super::key::{SnapshotKey, SnapshotKind};
use super::pnl::{MonthlyPnl, build_monthly_pnl};
use super::sales::{SalesSnapshot, build_sales};
use crate::booking::Basis;
use crate::reconciliation::{ReportError, ReportInput, month_bounds, months_between, validate_range};

/// What to rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotRequest {
    /// Snapshot kind.
    pub kind: SnapshotKind,
    /// Range start (ignored by the account overview).
    pub from: NaiveDate,
    /// Range end; the cutoff for every kind.
    pub to: NaiveDate,
    /// Date basis for dashboards.
    pub basis: Basis,
}

/// Computed snapshot document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum SnapshotPayload {
    /// Sales dashboard.
    Sales(SalesSnapshot),
    /// Founders ledger.
    Founders(FoundersSnapshot),
    /// Monthly P&L.
    Pnl(MonthlyPnl),
    /// Account overview.
    Accounts(AccountOverview),
}

/// Stateless snapshot builder.
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    /// Recomputes every document the request covers.
    ///
    /// Monthly P&L yields one document per month touched by the range; every
    /// other kind yields exactly one.
    pub fn build(
        request: &SnapshotRequest,
        input: &ReportInput,
    ) -> Result<Vec<(SnapshotKey, SnapshotPayload)>, ReportError> {
        let SnapshotRequest {
            kind,
            from,
            to,
            basis,
        } = *request;
        validate_range(from, to)?;

        let documents = match kind {
            SnapshotKind::Sales => vec![(
                SnapshotKey::range(kind, from, to, basis),
                SnapshotPayload::Sales(build_sales(&input.bookings, from, to, basis)),
            )],
            SnapshotKind::Founders => vec![(
                SnapshotKey::range(kind, from, to, basis),
                SnapshotPayload::Founders(build_founders(input, from, to, basis)),
            )],
            SnapshotKind::Pnl => months_between(from, to)
                .into_iter()
                .filter_map(|month| {
                    let (first, last) = month_bounds(&month)?;
                    let pnl = build_monthly_pnl(input, &month, first, last, basis);
                    Some((SnapshotKey::month(&month), SnapshotPayload::Pnl(pnl)))
                })
                .collect(),
            SnapshotKind::Accounts => vec![(
                SnapshotKey::summary(),
                SnapshotPayload::Accounts(build_account_overview(input, to)?),
            )],
        };
        Ok(documents)
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
