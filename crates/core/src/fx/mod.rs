//! Foreign-exchange resolution into the base currency.
//!
//! Rates are stored per effective date as "1 base = r target"; converting a
//! foreign amount into the base currency divides by `r`.

pub mod error;
pub mod rate;
pub mod resolver;

pub use error::FxError;
pub use rate::FxRateSnapshot;
pub use resolver::{FxQuote, FxResolver, RateLookupMethod};
