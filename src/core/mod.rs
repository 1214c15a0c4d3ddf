mod engine;
mod format;
mod types;

pub use engine::{amortized_payment, compute_mortgage, round_to_cents};
pub use format::{format_currency, format_time_savings, parse_numeric_input};
pub use types::{
    LoanInputs, MortgageError, MortgageResults, OneTimePolicy, PaymentType, TimeSavings,
};
