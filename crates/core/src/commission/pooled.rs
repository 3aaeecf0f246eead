//! Formula family B: founder split on pooled bookings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tourbook_shared::types::round_money;

use crate::booking::{Founder, PooledBase};

/// Share of the over-commission kept by the founder who owns the base.
const BASE_OWNER_OVER_SHARE: Decimal = Decimal::from_parts(3, 0, 0, false, 1);
/// Share of the over-commission going to the other founder.
const PARTNER_OVER_SHARE: Decimal = Decimal::from_parts(7, 0, 0, false, 1);
/// Each founder's share of the real commission on the company pool.
const COMPANY_SPLIT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
/// What remains after the external tax/fee (a flat 10%).
const AFTER_FEE: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// The six derived numbers of a pooled booking, stored verbatim once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PooledSplit {
    /// `O = gross - supplier_net`.
    pub base_commission: Decimal,
    /// `over = supplier_net - internal_net`.
    pub over_commission: Decimal,
    /// `real = gross - internal_net`.
    pub real_commission: Decimal,
    /// Igor's share.
    pub igor_share: Decimal,
    /// Evgeniy's share.
    pub evgeniy_share: Decimal,
    /// `real * 0.9`.
    pub commission_after_fee: Decimal,
}

/// Computes the pooled split for `base`.
#[must_use]
pub fn pooled_split(
    base: PooledBase,
    gross_client_price: Decimal,
    supplier_net: Decimal,
    internal_net: Decimal,
) -> PooledSplit {
    let base_commission = gross_client_price - supplier_net;
    let over_commission = supplier_net - internal_net;
    let real_commission = gross_client_price - internal_net;
    let over = over_commission.max(Decimal::ZERO);

    let owner = base_commission + BASE_OWNER_OVER_SHARE * over;
    let partner = PARTNER_OVER_SHARE * over;

    let (igor_share, evgeniy_share) = match base {
        PooledBase::Igor => (owner, partner),
        PooledBase::Evgeniy => (partner, owner),
        PooledBase::Company => (
            COMPANY_SPLIT * real_commission,
            COMPANY_SPLIT * real_commission,
        ),
    };

    PooledSplit {
        base_commission: round_money(base_commission),
        over_commission: round_money(over_commission),
        real_commission: round_money(real_commission),
        igor_share: round_money(igor_share),
        evgeniy_share: round_money(evgeniy_share),
        commission_after_fee: round_money(real_commission * AFTER_FEE),
    }
}

impl PooledSplit {
    /// Share attributed to `founder`.
    #[must_use]
    pub fn share_of(&self, founder: Founder) -> Decimal {
        match founder {
            Founder::Igor => self.igor_share,
            Founder::Evgeniy => self.evgeniy_share,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_split_rates() {
        assert_eq!(BASE_OWNER_OVER_SHARE + PARTNER_OVER_SHARE, dec!(1.0));
        assert_eq!(COMPANY_SPLIT, dec!(0.5));
        assert_eq!(AFTER_FEE, dec!(0.9));
    }

    #[test]
    fn test_igor_base() {
        let split = pooled_split(PooledBase::Igor, dec!(1000), dec!(700), dec!(650));
        assert_eq!(split.base_commission, dec!(300));
        assert_eq!(split.over_commission, dec!(50));
        assert_eq!(split.real_commission, dec!(350));
        assert_eq!(split.igor_share, dec!(315));
        assert_eq!(split.evgeniy_share, dec!(35));
        assert_eq!(split.commission_after_fee, dec!(315.00));
    }

    #[test]
    fn test_evgeniy_base_is_inverse() {
        let split = pooled_split(PooledBase::Evgeniy, dec!(1000), dec!(700), dec!(650));
        assert_eq!(split.igor_share, dec!(35));
        assert_eq!(split.evgeniy_share, dec!(315));
        assert_eq!(split.share_of(Founder::Evgeniy), dec!(315));
    }

    #[test]
    fn test_company_base_splits_real_evenly() {
        let split = pooled_split(PooledBase::Company, dec!(1000), dec!(700), dec!(650));
        assert_eq!(split.igor_share, dec!(175));
        assert_eq!(split.evgeniy_share, dec!(175));
    }

    #[test]
    fn test_negative_over_commission_is_not_shared() {
        // internal net above supplier net: over = -50, nothing extra to split
        let split = pooled_split(PooledBase::Igor, dec!(1000), dec!(700), dec!(750));
        assert_eq!(split.over_commission, dec!(-50));
        assert_eq!(split.igor_share, dec!(300));
        assert_eq!(split.evgeniy_share, dec!(0));
        assert_eq!(split.commission_after_fee, dec!(225.00));
    }
}
