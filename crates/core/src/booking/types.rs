//! Booking domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tourbook_shared::types::BookingId;

use super::state::CommissionState;

/// How the client paid; selects the agent's commission share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Card payment (the default).
    #[default]
    Card,
    /// Bank transfer.
    Iban,
    /// Crypto payment.
    Crypto,
}

impl PaymentMethod {
    /// Agent share of the margin for this payment method.
    #[must_use]
    pub fn agent_share(self) -> Decimal {
        match self {
            Self::Iban | Self::Crypto => Decimal::new(85, 2),
            Self::Card => Decimal::new(80, 2),
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Iban => "iban",
            Self::Crypto => "crypto",
        }
    }

    /// Parses a payment method; unknown values fall back to card.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "iban" | "bank" | "transfer" => Self::Iban,
            "crypto" => Self::Crypto,
            _ => Self::Card,
        }
    }
}

/// One of the two founders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Founder {
    /// First founder.
    Igor,
    /// Second founder.
    Evgeniy,
}

impl Founder {
    /// Both founders, in reporting order.
    pub const ALL: [Self; 2] = [Self::Igor, Self::Evgeniy];

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Igor => "igor",
            Self::Evgeniy => "evgeniy",
        }
    }

    /// Parses a founder tag.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "igor" => Some(Self::Igor),
            "evgeniy" => Some(Self::Evgeniy),
            _ => None,
        }
    }
}

impl fmt::Display for Founder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who the pooled booking is "based" on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PooledBase {
    /// Igor brought the booking.
    Igor,
    /// Evgeniy brought the booking.
    Evgeniy,
    /// Company pool: the margin is split evenly.
    Company,
}

impl PooledBase {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Igor => "igor",
            Self::Evgeniy => "evgeniy",
            Self::Company => "company",
        }
    }

    /// Parses a pool base tag.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "igor" => Some(Self::Igor),
            "evgeniy" => Some(Self::Evgeniy),
            "company" => Some(Self::Company),
            _ => None,
        }
    }
}

/// Booking variant; selects the commission formula family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookingKind {
    /// Ordinary booking sold by an agent.
    Generic {
        /// Operator sells at net (derived from the operator registry).
        allow_net: bool,
    },
    /// Booking on the founders' own base, split between the two founders.
    Pooled {
        /// Which base the booking belongs to.
        base: PooledBase,
    },
}

/// The "cost to us" fields a booking may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostFields {
    /// Our internal net cost.
    pub internal_net: Option<Decimal>,
    /// Net price quoted by the supplier.
    pub supplier_net: Option<Decimal>,
    /// Operator's own gross price.
    pub operator_gross: Option<Decimal>,
}

impl CostFields {
    /// Net cost: first non-empty of internal net, supplier net, operator gross.
    ///
    /// A field is empty when absent or zero. Defaults to zero.
    #[must_use]
    pub fn net_cost(&self) -> Decimal {
        [self.internal_net, self.supplier_net, self.operator_gross]
            .into_iter()
            .flatten()
            .find(|v| !v.is_zero())
            .unwrap_or(Decimal::ZERO)
    }
}

/// Date basis used to place a booking in a reporting range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Booking creation date.
    #[default]
    Created,
    /// Check-in date (falls back to creation date when unknown).
    CheckIn,
}

impl Basis {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::CheckIn => "check_in",
        }
    }

    /// Parses a basis; unknown values fall back to creation date.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "check_in" | "checkin" => Self::CheckIn,
            _ => Self::Created,
        }
    }
}

/// A booking as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking ID.
    pub id: BookingId,
    /// Human-facing booking number.
    pub booking_number: String,
    /// Tour operator name.
    pub operator: String,
    /// Sales agent, if any.
    pub agent: Option<String>,
    /// Creation date.
    pub created_on: NaiveDate,
    /// Check-in date.
    pub check_in: Option<NaiveDate>,
    /// Client payment method.
    pub payment_method: PaymentMethod,
    /// Client gross price (B).
    pub gross_client_price: Decimal,
    /// Cost fields.
    pub costs: CostFields,
    /// Booking variant.
    pub kind: BookingKind,
    /// Derived or frozen commission figures.
    pub commission: CommissionState,
}

impl Booking {
    /// Zero-valued stand-in for a booking referenced but not found.
    #[must_use]
    pub fn placeholder(id: BookingId, on: NaiveDate) -> Self {
        Self {
            id,
            booking_number: String::new(),
            operator: String::new(),
            agent: None,
            created_on: on,
            check_in: None,
            payment_method: PaymentMethod::Card,
            gross_client_price: Decimal::ZERO,
            costs: CostFields::default(),
            kind: BookingKind::Generic { allow_net: false },
            commission: CommissionState::Pending,
        }
    }

    /// Contractual net cost owed to the operator.
    #[must_use]
    pub fn net_cost(&self) -> Decimal {
        self.costs.net_cost()
    }

    /// Date that places the booking in a range for `basis`.
    #[must_use]
    pub fn basis_date(&self, basis: Basis) -> NaiveDate {
        match basis {
            Basis::Created => self.created_on,
            Basis::CheckIn => self.check_in.unwrap_or(self.created_on),
        }
    }
}
