//! Transaction creation: validation and one-time FX resolution.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tourbook_shared::types::{AccountId, CategoryId, CounterpartyId, CurrencyCode, TransactionId};

use super::error::LedgerError;
use super::types::{Side, Transaction, TransactionStatus};
use crate::booking::Founder;
use crate::fx::FxResolver;

/// Input for creating a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// Value date.
    pub date: NaiveDate,
    /// Income or expense.
    pub side: Side,
    /// Lifecycle status (defaults to actual).
    #[serde(default)]
    pub status: TransactionStatus,
    /// Account the money moved on.
    pub account_id: AccountId,
    /// Original currency code.
    pub currency: String,
    /// Unsigned amount in `currency`.
    pub amount: Decimal,
    /// Category, if any.
    pub category_id: Option<CategoryId>,
    /// Counterparty, if any.
    pub counterparty_id: Option<CounterpartyId>,
    /// Founder the expense is attributed to.
    pub owner_who: Option<Founder>,
    /// Free-text note.
    pub note: Option<String>,
}

impl NewTransaction {
    /// Validates the input and resolves the base amount once.
    ///
    /// A missing FX rate does not fail creation: the base amount is stored
    /// as zero and the transaction later shows up as unconvertible.
    pub fn into_transaction(self, fx: &FxResolver) -> Result<Transaction, LedgerError> {
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(self.amount));
        }
        if self.owner_who.is_some() && self.side == Side::Income {
            return Err(LedgerError::OwnerOnIncome);
        }
        let currency: CurrencyCode = self
            .currency
            .parse()
            .map_err(|_| LedgerError::InvalidCurrency(self.currency.clone()))?;

        let base_amount = fx.to_base(self.amount, &currency, self.date);
        if base_amount.is_zero() {
            tracing::warn!(%currency, date = %self.date, "Transaction stored without base amount");
        }

        Ok(Transaction {
            id: TransactionId::new(),
            date: self.date,
            side: self.side,
            status: self.status,
            account_id: self.account_id,
            currency,
            amount: self.amount,
            base_amount,
            remaining_to_allocate: base_amount,
            category_id: self.category_id,
            counterparty_id: self.counterparty_id,
            owner_who: self.owner_who,
            note: self.note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::FxRateSnapshot;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn fx() -> FxResolver {
        FxResolver::new(
            code("EUR"),
            vec![FxRateSnapshot::new(day(1), code("EUR")).with_rate(code("USD"), dec!(1.25))],
        )
    }

    fn input(currency: &str, amount: Decimal) -> NewTransaction {
        NewTransaction {
            date: day(10),
            side: Side::Income,
            status: TransactionStatus::Actual,
            account_id: AccountId::new(),
            currency: currency.to_string(),
            amount,
            category_id: None,
            counterparty_id: None,
            owner_who: None,
            note: None,
        }
    }

    #[test]
    fn test_base_amount_resolved_once() {
        let tx = input("usd", dec!(250)).into_transaction(&fx()).unwrap();
        assert_eq!(tx.currency.as_str(), "USD");
        assert_eq!(tx.base_amount, dec!(200.00));
        assert_eq!(tx.remaining_to_allocate, dec!(200.00));
        assert!(!tx.is_unconvertible());
    }

    #[test]
    fn test_missing_rate_stores_zero_base() {
        let tx = input("GBP", dec!(100)).into_transaction(&fx()).unwrap();
        assert_eq!(tx.base_amount, Decimal::ZERO);
        assert!(tx.is_unconvertible());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            input("EUR", dec!(0)).into_transaction(&fx()),
            Err(LedgerError::NonPositiveAmount(dec!(0)))
        );
        assert!(matches!(
            input("EURO", dec!(5)).into_transaction(&fx()),
            Err(LedgerError::InvalidCurrency(_))
        ));

        let mut owned = input("EUR", dec!(5));
        owned.owner_who = Some(Founder::Igor);
        assert_eq!(owned.into_transaction(&fx()), Err(LedgerError::OwnerOnIncome));
    }
}
