//! Ledger record types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tourbook_shared::types::{
    AccountId, AllocationId, BookingId, CategoryId, CounterpartyId, CurrencyCode, TransactionId,
    WithdrawalId,
};

use crate::booking::Founder;

/// Direction of a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Money in.
    Income,
    /// Money out.
    Expense,
}

impl Side {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parses a side.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Signed amount: positive for income, negative for expense.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

/// Transaction lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Expected but not yet happened.
    Planned,
    /// Happened.
    #[default]
    Actual,
    /// Matched against a bank statement.
    Reconciled,
}

impl TransactionStatus {
    /// Only actual and reconciled transactions count toward realized totals.
    #[must_use]
    pub fn is_realized(self) -> bool {
        matches!(self, Self::Actual | Self::Reconciled)
    }

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Actual => "actual",
            Self::Reconciled => "reconciled",
        }
    }

    /// Parses a status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(Self::Planned),
            "actual" => Some(Self::Actual),
            "reconciled" => Some(Self::Reconciled),
            _ => None,
        }
    }
}

/// A raw money movement on one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Value date.
    pub date: NaiveDate,
    /// Income or expense.
    pub side: Side,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Account the money moved on.
    pub account_id: AccountId,
    /// Original currency.
    pub currency: CurrencyCode,
    /// Unsigned amount in `currency`.
    pub amount: Decimal,
    /// Amount in the base currency, resolved once at creation.
    pub base_amount: Decimal,
    /// Base amount not yet linked to bookings.
    pub remaining_to_allocate: Decimal,
    /// Category, if any.
    pub category_id: Option<CategoryId>,
    /// Counterparty, if any.
    pub counterparty_id: Option<CounterpartyId>,
    /// Founder the expense is attributed to.
    pub owner_who: Option<Founder>,
    /// Free-text note.
    pub note: Option<String>,
}

impl Transaction {
    /// A non-zero amount whose base amount resolved to zero (no usable FX rate).
    #[must_use]
    pub fn is_unconvertible(&self) -> bool {
        !self.amount.is_zero() && self.base_amount.is_zero()
    }

    /// Base amount signed by side.
    #[must_use]
    pub fn signed_base_amount(&self) -> Decimal {
        self.side.signed(self.base_amount)
    }
}

/// Allocation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    /// Draft; ignored by every total.
    Planned,
    /// Counts toward booking totals.
    #[default]
    Posted,
}

impl AllocationStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Posted => "posted",
        }
    }

    /// Parses a status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(Self::Planned),
            "posted" => Some(Self::Posted),
            _ => None,
        }
    }
}

/// Part of a transaction linked to a booking (an "order").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// Allocation ID.
    pub id: AllocationId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Target booking.
    pub booking_id: BookingId,
    /// Copied from the transaction.
    pub date: NaiveDate,
    /// Copied from the transaction.
    pub side: Side,
    /// Base-currency amount.
    pub amount: Decimal,
    /// Planned or posted.
    pub status: AllocationStatus,
}

impl Allocation {
    /// Returns true when the allocation counts toward totals.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        self.status == AllocationStatus::Posted
    }
}

/// Finance category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Expenses in this category are agent-commission payouts.
    pub is_agent_commission: bool,
}

/// Bank or cash account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Account currency.
    pub currency: CurrencyCode,
    /// Opening balance in the base currency.
    pub opening_balance: Decimal,
}

/// Profit paid out to a founder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerWithdrawal {
    /// Withdrawal ID.
    pub id: WithdrawalId,
    /// Payout date.
    pub date: NaiveDate,
    /// Receiving founder.
    pub founder: Founder,
    /// Amount in the base currency.
    pub amount: Decimal,
}
