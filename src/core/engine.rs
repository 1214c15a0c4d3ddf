use super::types::{
    LoanInputs, MortgageError, MortgageResults, OneTimePolicy, PaymentType, TimeSavings,
};

const CENT: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct RegularScenario {
    monthly_payment: f64,
    total_interest: f64,
    total_amount: f64,
    payments: u32,
}

#[derive(Debug, Clone, Copy)]
struct ExtraScenario {
    monthly_payment: f64,
    total_interest: f64,
    total_amount: f64,
    payments: u32,
}

impl ExtraScenario {
    fn unchanged(regular: &RegularScenario) -> Self {
        Self {
            monthly_payment: regular.monthly_payment,
            total_interest: regular.total_interest,
            total_amount: regular.total_amount,
            payments: regular.payments,
        }
    }

    fn paid_in_full(upfront: f64) -> Self {
        Self {
            monthly_payment: 0.0,
            total_interest: 0.0,
            total_amount: upfront,
            payments: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PayoffPlan {
    principal: f64,
    scheduled_payment: f64,
    monthly_rate: f64,
    extra_per_period: f64,
    scheduled_term: u32,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum PayoffStatus {
    PaidOff,
    NonAmortizing,
    IterationCap,
}

#[derive(Debug, Clone, Copy)]
struct PayoffSimulation {
    payments: u32,
    total_interest: f64,
    remaining_balance: f64,
    status: PayoffStatus,
    max_payments: u32,
}

impl PayoffSimulation {
    fn into_result(self) -> Result<Self, MortgageError> {
        match self.status {
            PayoffStatus::PaidOff => Ok(self),
            PayoffStatus::NonAmortizing => Err(MortgageError::NonAmortizing {
                payments_made: self.payments,
                remaining_balance: self.remaining_balance,
            }),
            PayoffStatus::IterationCap => Err(MortgageError::DidNotConverge {
                max_payments: self.max_payments,
                remaining_balance: self.remaining_balance,
            }),
        }
    }
}

/// Computes the regular and extra-payment scenarios for one set of loan terms.
///
/// Returns one of the `Missing*` errors when the loan amount, rate or term
/// leaves nothing to amortize; callers treat those as "no result yet".
pub fn compute_mortgage(inputs: &LoanInputs) -> Result<MortgageResults, MortgageError> {
    validate_inputs(inputs)?;

    let monthly_rate = inputs.interest_rate_percent / 100.0 / 12.0;
    let scheduled_payments = scheduled_payment_count(inputs.loan_term_years);

    if inputs.loan_amount <= 0.0 {
        return Err(MortgageError::MissingLoanAmount);
    }
    if monthly_rate <= 0.0 {
        return Err(MortgageError::MissingInterestRate);
    }
    if scheduled_payments == 0 {
        return Err(MortgageError::MissingLoanTerm);
    }

    let regular = regular_scenario(inputs, monthly_rate, scheduled_payments)?;
    let mut extra = if inputs.extra_payment == 0.0 {
        ExtraScenario::unchanged(&regular)
    } else {
        match inputs.payment_type {
            PaymentType::OneTime => one_time_scenario(inputs, &regular, monthly_rate)?,
            PaymentType::Monthly => monthly_scenario(inputs, &regular, monthly_rate)?,
        }
    };
    // The simulated total is cent-rounded while the regular one is closed form,
    // so a sub-cent gap must not read as paying more interest.
    extra.total_interest = extra.total_interest.min(regular.total_interest);

    let (reduced_principal, one_time_payment_amount) = match inputs.payment_type {
        PaymentType::OneTime => (
            Some(inputs.loan_amount - inputs.extra_payment.min(inputs.loan_amount)),
            Some(inputs.extra_payment),
        ),
        PaymentType::Monthly => (None, None),
    };

    Ok(MortgageResults {
        monthly_payment_regular: regular.monthly_payment,
        monthly_payment_extra: extra.monthly_payment,
        total_interest_regular: regular.total_interest,
        total_amount_regular: regular.total_amount,
        total_interest_extra: extra.total_interest,
        total_amount_extra: extra.total_amount,
        interest_savings: (regular.total_interest - extra.total_interest).max(0.0),
        time_savings: TimeSavings::from_months(regular.payments.saturating_sub(extra.payments)),
        payments_with_extra: extra.payments,
        total_payments_regular: regular.payments,
        reduced_principal,
        one_time_payment_amount,
    })
}

/// Fixed-rate payment that amortizes `principal` in exactly `payments` months.
///
/// `None` when the rate/term combination overflows or the growth factor
/// collapses to 1, so the closed form has no finite value.
pub fn amortized_payment(principal: f64, monthly_rate: f64, payments: u32) -> Option<f64> {
    let growth = (1.0 + monthly_rate).powf(payments as f64);
    if !growth.is_finite() || growth <= 1.0 {
        return None;
    }
    let payment = principal * monthly_rate * growth / (growth - 1.0);
    payment.is_finite().then_some(payment)
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn validate_inputs(inputs: &LoanInputs) -> Result<(), MortgageError> {
    for (name, value) in [
        ("loan_amount", inputs.loan_amount),
        ("interest_rate_percent", inputs.interest_rate_percent),
        ("loan_term_years", inputs.loan_term_years),
        ("extra_payment", inputs.extra_payment),
    ] {
        if !value.is_finite() {
            return Err(MortgageError::invalid_input(name, value));
        }
    }
    if inputs.extra_payment < 0.0 {
        return Err(MortgageError::invalid_input(
            "extra_payment",
            inputs.extra_payment,
        ));
    }
    Ok(())
}

fn scheduled_payment_count(loan_term_years: f64) -> u32 {
    let months = (loan_term_years * 12.0).round();
    if months <= 0.0 { 0 } else { months as u32 }
}

fn regular_scenario(
    inputs: &LoanInputs,
    monthly_rate: f64,
    scheduled_payments: u32,
) -> Result<RegularScenario, MortgageError> {
    let monthly_payment = amortized_payment(inputs.loan_amount, monthly_rate, scheduled_payments)
        .ok_or_else(|| MortgageError::invalid_input("loan_term_years", inputs.loan_term_years))?;
    let total_interest = monthly_payment * scheduled_payments as f64 - inputs.loan_amount;
    Ok(RegularScenario {
        monthly_payment,
        total_interest,
        total_amount: inputs.loan_amount + total_interest,
        payments: scheduled_payments,
    })
}

fn one_time_scenario(
    inputs: &LoanInputs,
    regular: &RegularScenario,
    monthly_rate: f64,
) -> Result<ExtraScenario, MortgageError> {
    if inputs.extra_payment >= inputs.loan_amount {
        return Ok(ExtraScenario::paid_in_full(inputs.extra_payment));
    }

    let reduced_principal = inputs.loan_amount - inputs.extra_payment;
    let scheduled_payment = match inputs.one_time_policy {
        OneTimePolicy::ReAmortize => {
            amortized_payment(reduced_principal, monthly_rate, regular.payments).ok_or_else(
                || MortgageError::invalid_input("loan_term_years", inputs.loan_term_years),
            )?
        }
        OneTimePolicy::ShortenTerm => regular.monthly_payment,
    };

    let payoff = simulate_payoff(&PayoffPlan {
        principal: reduced_principal,
        scheduled_payment,
        monthly_rate,
        extra_per_period: 0.0,
        scheduled_term: regular.payments,
    })
    .into_result()?;

    Ok(ExtraScenario {
        monthly_payment: scheduled_payment,
        total_interest: payoff.total_interest,
        total_amount: inputs.extra_payment + scheduled_payment * payoff.payments as f64,
        payments: payoff.payments,
    })
}

fn monthly_scenario(
    inputs: &LoanInputs,
    regular: &RegularScenario,
    monthly_rate: f64,
) -> Result<ExtraScenario, MortgageError> {
    let payoff = simulate_payoff(&PayoffPlan {
        principal: inputs.loan_amount,
        scheduled_payment: regular.monthly_payment,
        monthly_rate,
        extra_per_period: inputs.extra_payment,
        scheduled_term: regular.payments,
    })
    .into_result()?;

    let monthly_payment = regular.monthly_payment + inputs.extra_payment;
    Ok(ExtraScenario {
        monthly_payment,
        total_interest: payoff.total_interest,
        total_amount: monthly_payment * payoff.payments as f64,
        payments: payoff.payments,
    })
}

// Balance is carried at full precision and compared in whole cents, so a
// sub-cent principal portion still moves it toward zero.
fn simulate_payoff(plan: &PayoffPlan) -> PayoffSimulation {
    let max_payments = plan.scheduled_term.saturating_mul(2);
    let mut balance = plan.principal;
    let mut total_interest = 0.0;
    let mut payments = 0u32;

    while round_to_cents(balance) > CENT && payments < max_payments {
        let interest = balance * plan.monthly_rate;
        let principal_portion = plan.scheduled_payment - interest;
        if principal_portion <= 0.0 {
            return PayoffSimulation {
                payments,
                total_interest: round_to_cents(total_interest),
                remaining_balance: round_to_cents(balance),
                status: PayoffStatus::NonAmortizing,
                max_payments,
            };
        }

        let principal_paid = (principal_portion + plan.extra_per_period).min(balance);
        total_interest += interest;
        balance -= principal_paid;
        payments += 1;
    }

    let remaining_balance = round_to_cents(balance);
    PayoffSimulation {
        payments,
        total_interest: round_to_cents(total_interest),
        remaining_balance,
        status: if remaining_balance > CENT {
            PayoffStatus::IterationCap
        } else {
            PayoffStatus::PaidOff
        },
        max_payments,
    }
}
