//! tally-core: transaction record, amount/date contracts, statement periods, errors

pub mod dates;
pub mod error;
pub mod period;
pub mod transaction;

pub use error::{Error, Result};
pub use period::{StatementPeriod, period_for_date, statement_period};
pub use transaction::{
    CURRENCY, DEFAULT_CATEGORY, DEFAULT_SUBCATEGORY, MAX_TRANSACTION_VALUE, Transaction,
    format_amount, is_valid_value, parse_amount,
};
