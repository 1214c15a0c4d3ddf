use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    LoanInputs, MortgageError, MortgageResults, OneTimePolicy, PaymentType, compute_mortgage,
    format_currency, format_time_savings, parse_numeric_input,
};

const MAX_INTEREST_RATE_PERCENT: f64 = 100.0;
const MAX_LOAN_TERM_YEARS: f64 = 100.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPaymentType {
    OneTime,
    Monthly,
}

impl From<CliPaymentType> for PaymentType {
    fn from(value: CliPaymentType) -> Self {
        match value {
            CliPaymentType::OneTime => PaymentType::OneTime,
            CliPaymentType::Monthly => PaymentType::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliOneTimePolicy {
    ReAmortize,
    ShortenTerm,
}

impl From<CliOneTimePolicy> for OneTimePolicy {
    fn from(value: CliOneTimePolicy) -> Self {
        match value {
            CliOneTimePolicy::ReAmortize => OneTimePolicy::ReAmortize,
            CliOneTimePolicy::ShortenTerm => OneTimePolicy::ShortenTerm,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPaymentType {
    #[serde(alias = "oneTime", alias = "one_time")]
    OneTime,
    Monthly,
}

impl From<ApiPaymentType> for CliPaymentType {
    fn from(value: ApiPaymentType) -> Self {
        match value {
            ApiPaymentType::OneTime => CliPaymentType::OneTime,
            ApiPaymentType::Monthly => CliPaymentType::Monthly,
        }
    }
}

impl From<PaymentType> for ApiPaymentType {
    fn from(value: PaymentType) -> Self {
        match value {
            PaymentType::OneTime => ApiPaymentType::OneTime,
            PaymentType::Monthly => ApiPaymentType::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiOneTimePolicy {
    #[serde(alias = "reAmortize", alias = "re_amortize", alias = "reamortize")]
    ReAmortize,
    #[serde(alias = "shortenTerm", alias = "shorten_term")]
    ShortenTerm,
}

impl From<ApiOneTimePolicy> for CliOneTimePolicy {
    fn from(value: ApiOneTimePolicy) -> Self {
        match value {
            ApiOneTimePolicy::ReAmortize => CliOneTimePolicy::ReAmortize,
            ApiOneTimePolicy::ShortenTerm => CliOneTimePolicy::ShortenTerm,
        }
    }
}

impl From<OneTimePolicy> for ApiOneTimePolicy {
    fn from(value: OneTimePolicy) -> Self {
        match value {
            OneTimePolicy::ReAmortize => ApiOneTimePolicy::ReAmortize,
            OneTimePolicy::ShortenTerm => ApiOneTimePolicy::ShortenTerm,
        }
    }
}

/// Form fields arrive either as JSON numbers or as the text shown in the input box.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    fn resolve(self, name: &str) -> Result<f64, String> {
        match self {
            NumericField::Number(value) => Ok(value),
            NumericField::Text(text) => parse_numeric_input(&text)
                .ok_or_else(|| format!("{name} must be a non-negative number, got {text:?}")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    loan_amount: Option<NumericField>,
    interest_rate: Option<NumericField>,
    loan_term_years: Option<NumericField>,
    extra_payment: Option<NumericField>,
    payment_type: Option<ApiPaymentType>,
    one_time_policy: Option<ApiOneTimePolicy>,
}

#[derive(Parser, Debug)]
#[command(
    name = "mortgage",
    about = "Mortgage payment calculator with one-time or monthly extra payment savings"
)]
struct Cli {
    #[arg(long, help = "Principal borrowed")]
    loan_amount: f64,
    #[arg(long, help = "Nominal annual interest rate in percent, e.g. 6.5")]
    interest_rate: f64,
    #[arg(long, default_value_t = 30.0, help = "Loan term in years")]
    loan_term_years: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Extra payment amount; applied once up front or added to every payment"
    )]
    extra_payment: f64,
    #[arg(long, value_enum, default_value_t = CliPaymentType::OneTime)]
    payment_type: CliPaymentType,
    #[arg(
        long,
        value_enum,
        default_value_t = CliOneTimePolicy::ReAmortize,
        help = "One-time payment handling: lower the payment over the same term, or keep the payment and finish early"
    )]
    one_time_policy: CliOneTimePolicy,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum CalculationStatus {
    Ok,
    NoResult,
    NonAmortizing,
    DidNotConverge,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DisplaySummary {
    monthly_payment_regular: String,
    monthly_payment_extra: String,
    total_interest_regular: String,
    total_amount_regular: String,
    total_interest_extra: String,
    total_amount_extra: String,
    interest_savings: String,
    time_saved: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    upfront_payment: Option<String>,
}

impl From<&MortgageResults> for DisplaySummary {
    fn from(results: &MortgageResults) -> Self {
        Self {
            monthly_payment_regular: format_currency(results.monthly_payment_regular),
            monthly_payment_extra: format_currency(results.monthly_payment_extra),
            total_interest_regular: format_currency(results.total_interest_regular),
            total_amount_regular: format_currency(results.total_amount_regular),
            total_interest_extra: format_currency(results.total_interest_extra),
            total_amount_extra: format_currency(results.total_amount_extra),
            interest_savings: format_currency(results.interest_savings),
            time_saved: format_time_savings(&results.time_savings),
            upfront_payment: results.one_time_payment_amount.map(format_currency),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    status: CalculationStatus,
    payment_type: ApiPaymentType,
    one_time_policy: ApiOneTimePolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<MortgageResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display: Option<DisplaySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
}

fn build_inputs(cli: Cli) -> Result<LoanInputs, String> {
    for (flag, value) in [
        ("--loan-amount", cli.loan_amount),
        ("--interest-rate", cli.interest_rate),
        ("--loan-term-years", cli.loan_term_years),
        ("--extra-payment", cli.extra_payment),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{flag} must be >= 0"));
        }
    }

    if cli.interest_rate > MAX_INTEREST_RATE_PERCENT {
        return Err(format!(
            "--interest-rate must be between 0 and {MAX_INTEREST_RATE_PERCENT}"
        ));
    }

    if cli.loan_term_years > MAX_LOAN_TERM_YEARS {
        return Err(format!(
            "--loan-term-years must be between 0 and {MAX_LOAN_TERM_YEARS}"
        ));
    }

    Ok(LoanInputs {
        loan_amount: cli.loan_amount,
        interest_rate_percent: cli.interest_rate,
        loan_term_years: cli.loan_term_years,
        extra_payment: cli.extra_payment,
        payment_type: cli.payment_type.into(),
        one_time_policy: cli.one_time_policy.into(),
    })
}

/// Runs a single calculation from command-line flags and returns the process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    let cli = Cli::parse_from(args);
    let inputs = match build_inputs(cli) {
        Ok(inputs) => inputs,
        Err(msg) => {
            eprintln!("{msg}");
            return 2;
        }
    };

    let outcome = compute_mortgage(&inputs);
    if let Err(err @ MortgageError::InvalidInput { .. }) = &outcome {
        eprintln!("{err}");
        return 2;
    }
    print!("{}", render_report(&inputs, &outcome));
    0
}

fn render_report(inputs: &LoanInputs, outcome: &Result<MortgageResults, MortgageError>) -> String {
    let results = match outcome {
        Ok(results) => results,
        Err(err) if err.is_no_result() => return format!("Nothing to calculate yet: {err}\n"),
        Err(err) => return format!("{err}\n"),
    };
    let has_extra = inputs.extra_payment > 0.0;
    let payment_line =
        |label: &str, amount: f64| format!("{label:<40}{:>16}", format_currency(amount));
    let column_line = |label: &str, regular: String, extra: String| {
        format!("{label:<24}{regular:>16}{extra:>16}")
    };

    let mut lines = vec![payment_line(
        "Regular monthly payment",
        results.monthly_payment_regular,
    )];
    if has_extra {
        match inputs.payment_type {
            PaymentType::OneTime => {
                lines.push(payment_line("Upfront payment", inputs.extra_payment));
                lines.push(payment_line(
                    "Monthly payment after upfront payment",
                    results.monthly_payment_extra,
                ));
            }
            PaymentType::Monthly => lines.push(payment_line(
                "Monthly payment with extra payment",
                results.monthly_payment_extra,
            )),
        }
    }

    lines.push(String::new());
    lines.push(column_line("", "Regular".into(), "With extra".into()));
    lines.push(column_line(
        "Total interest",
        format_currency(results.total_interest_regular),
        format_currency(results.total_interest_extra),
    ));
    lines.push(column_line(
        "Total amount",
        format_currency(results.total_amount_regular),
        format_currency(results.total_amount_extra),
    ));
    lines.push(column_line(
        "Payments",
        results.total_payments_regular.to_string(),
        results.payments_with_extra.to_string(),
    ));

    if has_extra {
        lines.push(String::new());
        lines.push(format!(
            "{:<24}{:>16}",
            "Interest saved",
            format_currency(results.interest_savings)
        ));
        lines.push(format!(
            "{:<24}{:>16}",
            "Time saved",
            format_time_savings(&results.time_savings)
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("mortgage HTTP API listening on http://{addr}");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { ok: true })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    let inputs = match api_request_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => {
            warn!(error = %msg, "rejected calculation payload");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let outcome = compute_mortgage(&inputs);
    debug!(?inputs, ok = outcome.is_ok(), "calculated mortgage");

    match build_calculate_response(&inputs, outcome) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!(error = %msg, "calculation rejected inputs");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn with_cache_control(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)).into_response())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<LoanInputs, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: CalculatePayload) -> Result<LoanInputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.loan_amount {
        cli.loan_amount = v.resolve("loanAmount")?;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v.resolve("interestRate")?;
    }
    if let Some(v) = payload.loan_term_years {
        cli.loan_term_years = v.resolve("loanTermYears")?;
    }
    if let Some(v) = payload.extra_payment {
        cli.extra_payment = v.resolve("extraPayment")?;
    }
    if let Some(v) = payload.payment_type {
        cli.payment_type = v.into();
    }
    if let Some(v) = payload.one_time_policy {
        cli.one_time_policy = v.into();
    }

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        loan_amount: 300_000.0,
        interest_rate: 6.5,
        loan_term_years: 30.0,
        extra_payment: 0.0,
        payment_type: CliPaymentType::OneTime,
        one_time_policy: CliOneTimePolicy::ReAmortize,
    }
}

fn build_calculate_response(
    inputs: &LoanInputs,
    outcome: Result<MortgageResults, MortgageError>,
) -> Result<CalculateResponse, String> {
    let (status, results, message) = match outcome {
        Ok(results) => (CalculationStatus::Ok, Some(results), None),
        Err(err @ MortgageError::InvalidInput { .. }) => return Err(err.to_string()),
        Err(err) if err.is_no_result() => (CalculationStatus::NoResult, None, Some(err.to_string())),
        Err(err @ MortgageError::NonAmortizing { .. }) => {
            warn!(%err, "loan does not amortize");
            (CalculationStatus::NonAmortizing, None, Some(err.to_string()))
        }
        Err(err) => {
            warn!(%err, "payoff simulation hit its safety cap");
            (CalculationStatus::DidNotConverge, None, Some(err.to_string()))
        }
    };

    Ok(CalculateResponse {
        status,
        payment_type: inputs.payment_type.into(),
        one_time_policy: inputs.one_time_policy.into(),
        display: results.as_ref().map(DisplaySummary::from),
        results,
        message,
    })
}
