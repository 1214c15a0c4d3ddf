use serde::Serialize;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PaymentType {
    #[default]
    OneTime,
    Monthly,
}

/// How a one-time lump sum changes the remaining schedule.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OneTimePolicy {
    /// Re-amortize the reduced principal over the original term, lowering the payment.
    #[default]
    ReAmortize,
    /// Keep the regular payment and finish early.
    ShortenTerm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoanInputs {
    pub loan_amount: f64,
    pub interest_rate_percent: f64,
    pub loan_term_years: f64,
    pub extra_payment: f64,
    pub payment_type: PaymentType,
    pub one_time_policy: OneTimePolicy,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TimeSavings {
    pub years: u32,
    pub months: u32,
}

impl TimeSavings {
    pub fn from_months(total_months: u32) -> Self {
        Self {
            years: total_months / 12,
            months: total_months % 12,
        }
    }

    pub fn total_months(self) -> u32 {
        self.years * 12 + self.months
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageResults {
    pub monthly_payment_regular: f64,
    pub monthly_payment_extra: f64,
    pub total_interest_regular: f64,
    pub total_amount_regular: f64,
    pub total_interest_extra: f64,
    pub total_amount_extra: f64,
    pub interest_savings: f64,
    pub time_savings: TimeSavings,
    pub payments_with_extra: u32,
    pub total_payments_regular: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_principal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_time_payment_amount: Option<f64>,
}

/// Outcomes where no results record can be shown.
///
/// The `Missing*` variants mean the form is not filled in enough to compute
/// anything yet; callers should hide the results rather than report an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MortgageError {
    #[error("loan amount must be greater than zero")]
    MissingLoanAmount,

    #[error("interest rate must be greater than zero")]
    MissingInterestRate,

    #[error("loan term must cover at least one monthly payment")]
    MissingLoanTerm,

    #[error("invalid input: {name} = {value}")]
    InvalidInput { name: &'static str, value: f64 },

    #[error(
        "loan does not amortize under these terms: payment stops covering interest after {payments_made} payments with {remaining_balance:.2} outstanding"
    )]
    NonAmortizing {
        payments_made: u32,
        remaining_balance: f64,
    },

    #[error("payoff did not converge within {max_payments} payments ({remaining_balance:.2} outstanding)")]
    DidNotConverge {
        max_payments: u32,
        remaining_balance: f64,
    },
}

impl MortgageError {
    #[must_use]
    pub fn invalid_input(name: &'static str, value: f64) -> Self {
        Self::InvalidInput { name, value }
    }

    /// True for the "nothing to show yet" outcomes.
    pub fn is_no_result(&self) -> bool {
        matches!(
            self,
            Self::MissingLoanAmount | Self::MissingInterestRate | Self::MissingLoanTerm
        )
    }
}
