use std::str::FromStr;
use std::time::Instant;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DebtPayoffError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::DebtPayoffResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Horizons beyond this many periods get a warning in the output envelope.
const LONG_HORIZON_MONTHS: u32 = 600;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// The three debt parameters a payoff projection is computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtInput {
    pub total_debt: Money,
    pub annual_rate_percent: Percent,
    pub monthly_payment: Money,
    /// First-payment month; only used to anchor the projected payoff date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl DebtInput {
    /// Build an input from the raw text fields a form or flag set supplies.
    ///
    /// Decimal has no NaN, so malformed text is rejected here instead of
    /// propagating as a poisoned number.
    pub fn from_raw(
        total_debt: &str,
        annual_rate_percent: &str,
        monthly_payment: &str,
    ) -> DebtPayoffResult<Self> {
        Ok(DebtInput {
            total_debt: parse_field("total_debt", total_debt)?,
            annual_rate_percent: parse_field("annual_rate_percent", annual_rate_percent)?,
            monthly_payment: parse_field("monthly_payment", monthly_payment)?,
            start_date: None,
        })
    }

    /// Periodic rate as a fraction: annual percent / 100 / 12.
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
    }
}

/// A successful payoff projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffOutput {
    /// Total periods until debt-free, ceiling of the closed-form solve.
    pub months: u32,
    pub years: u32,
    pub remaining_months: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub principal_percentage: Percent,
    pub interest_percentage: Percent,
    pub monthly_rate: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_payoff_date: Option<NaiveDate>,
}

/// Input for the interest-only payment floor query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimumPaymentInput {
    pub total_debt: Money,
    pub annual_rate_percent: Percent,
}

impl MinimumPaymentInput {
    pub fn from_raw(total_debt: &str, annual_rate_percent: &str) -> DebtPayoffResult<Self> {
        Ok(MinimumPaymentInput {
            total_debt: parse_field("total_debt", total_debt)?,
            annual_rate_percent: parse_field("annual_rate_percent", annual_rate_percent)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimumPaymentOutput {
    /// Interest accrued in the first period at zero amortization. Any payment
    /// at or below this can never retire the debt.
    pub minimum_payment: Money,
    pub monthly_rate: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Check a `DebtInput` against the sign and affordability gates.
///
/// `compute_payoff` assumes this has passed; callers must gate on it.
pub fn validate(input: &DebtInput) -> DebtPayoffResult<()> {
    if input.total_debt <= Decimal::ZERO {
        return Err(DebtPayoffError::InvalidInput {
            field: "total_debt".into(),
            reason: "total debt must be a positive amount".into(),
        });
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(DebtPayoffError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "annual interest rate cannot be negative".into(),
        });
    }
    if input.monthly_payment <= Decimal::ZERO {
        return Err(DebtPayoffError::InvalidInput {
            field: "monthly_payment".into(),
            reason: "monthly payment must be a positive amount".into(),
        });
    }

    // A zero-rate debt is retired by any positive payment, so the floor
    // check only applies while interest accrues.
    if input.annual_rate_percent > Decimal::ZERO {
        let floor = interest_floor(input.total_debt, input.monthly_rate())?;
        if input.monthly_payment <= floor {
            return Err(DebtPayoffError::PaymentTooLow {
                minimum_payment: floor,
            });
        }
    }

    Ok(())
}

/// Solve the payoff horizon and derived totals for a validated input.
///
/// Precondition: `validate(input)` has returned `Ok`. Calling this with an
/// unvalidated input is a contract violation; the numeric guards below then
/// surface as `NumericDomain` rather than a user-facing error.
pub fn compute_payoff(input: &DebtInput) -> DebtPayoffResult<PayoffOutput> {
    let monthly_rate = input.monthly_rate();

    let raw_months = if monthly_rate.is_zero() {
        // No compounding: plain division, final partial period billed whole.
        input
            .total_debt
            .checked_div(input.monthly_payment)
            .ok_or_else(|| DebtPayoffError::NumericDomain {
                context: "payoff term (debt / payment)".into(),
            })?
    } else {
        // n = -ln(1 - P*r / M) / ln(1 + r)
        let accrual_ratio = interest_floor(input.total_debt, monthly_rate)?
            .checked_div(input.monthly_payment)
            .ok_or_else(|| DebtPayoffError::NumericDomain {
                context: "payoff term (interest / payment)".into(),
            })?;
        let numerator = (Decimal::ONE - accrual_ratio).checked_ln().ok_or_else(|| {
            DebtPayoffError::NumericDomain {
                context: "payoff term (log of non-positive amortization argument)".into(),
            }
        })?;
        let denominator = (Decimal::ONE + monthly_rate).checked_ln().ok_or_else(|| {
            DebtPayoffError::NumericDomain {
                context: "payoff term (log of non-positive growth factor)".into(),
            }
        })?;
        if denominator.is_zero() {
            return Err(DebtPayoffError::NumericDomain {
                context: "payoff term (zero growth factor)".into(),
            });
        }
        (-numerator)
            .checked_div(denominator)
            .ok_or_else(|| DebtPayoffError::NumericDomain {
                context: "payoff term (period ratio)".into(),
            })?
    };

    let months = ceil_to_months(raw_months)?;
    let years = months / MONTHS_PER_YEAR;
    let remaining_months = months % MONTHS_PER_YEAR;

    let total_paid = input
        .monthly_payment
        .checked_mul(Decimal::from(months))
        .ok_or_else(|| DebtPayoffError::NumericDomain {
            context: "total paid (payment * months)".into(),
        })?;
    let total_interest = total_paid - input.total_debt;

    let principal_percentage = input.total_debt / total_paid * dec!(100);
    let interest_percentage = total_interest / total_paid * dec!(100);

    let projected_payoff_date = input
        .start_date
        .and_then(|date| date.checked_add_months(Months::new(months)));

    Ok(PayoffOutput {
        months,
        years,
        remaining_months,
        total_paid,
        total_interest,
        principal_percentage,
        interest_percentage,
        monthly_rate,
        projected_payoff_date,
    })
}

/// Validate, solve, and wrap a payoff projection in the output envelope.
///
/// This is the entry point the CLI and bindings call.
pub fn plan_payoff(input: &DebtInput) -> DebtPayoffResult<ComputationOutput<PayoffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;
    let output = compute_payoff(input)?;

    if output.months > LONG_HORIZON_MONTHS {
        warnings.push(format!(
            "Payoff horizon is {} months; the payment only marginally outpaces accruing interest.",
            output.months
        ));
    }
    if input.start_date.is_some() && output.projected_payoff_date.is_none() {
        warnings.push(
            "Projected payoff date exceeds the supported calendar range and was omitted."
                .to_string(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "monthly_rate": output.monthly_rate.to_string(),
        "minimum_viable_payment": interest_floor(input.total_debt, output.monthly_rate)?.to_string(),
        "closing_period_convention": "final partial month billed in full",
    });

    Ok(with_metadata(
        "Loan Amortization Payoff (closed-form period solve)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Interest-only payment floor for a debt: below this the balance never falls.
pub fn calculate_minimum_payment(
    input: &MinimumPaymentInput,
) -> DebtPayoffResult<ComputationOutput<MinimumPaymentOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.total_debt <= Decimal::ZERO {
        return Err(DebtPayoffError::InvalidInput {
            field: "total_debt".into(),
            reason: "total debt must be a positive amount".into(),
        });
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(DebtPayoffError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "annual interest rate cannot be negative".into(),
        });
    }

    let monthly_rate = input.annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR);
    let minimum_payment = interest_floor(input.total_debt, monthly_rate)?;

    let output = MinimumPaymentOutput {
        minimum_payment,
        monthly_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "periods_per_year": MONTHS_PER_YEAR.to_string(),
    });

    Ok(with_metadata(
        "Interest-Only Payment Floor",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_field(field: &str, raw: &str) -> DebtPayoffResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DebtPayoffError::InvalidInput {
            field: field.into(),
            reason: "value is empty".into(),
        });
    }
    Decimal::from_str(trimmed).map_err(|_| DebtPayoffError::InvalidInput {
        field: field.into(),
        reason: format!("'{trimmed}' is not a number"),
    })
}

/// First-period interest accrual at zero amortization.
fn interest_floor(total_debt: Money, monthly_rate: Rate) -> DebtPayoffResult<Money> {
    total_debt
        .checked_mul(monthly_rate)
        .ok_or_else(|| DebtPayoffError::NumericDomain {
            context: "interest floor (debt * rate)".into(),
        })
}

/// Round a period count up to whole months.
///
/// A validated input always lands at >= 1; anything below that proves the
/// caller skipped validation, and a count past u32 is unrepresentable.
fn ceil_to_months(raw: Decimal) -> DebtPayoffResult<u32> {
    let ceiled = raw.ceil();
    if ceiled < Decimal::ONE {
        return Err(DebtPayoffError::NumericDomain {
            context: "payoff term below one period".into(),
        });
    }
    ceiled
        .normalize()
        .to_string()
        .parse::<u32>()
        .map_err(|_| DebtPayoffError::NumericDomain {
            context: "payoff term exceeds representable months".into(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_input() -> DebtInput {
        // 18% APR on 5000 owed: monthly rate 1.5%, interest floor 75.
        DebtInput {
            total_debt: dec!(5000),
            annual_rate_percent: dec!(18),
            monthly_payment: dec!(150),
            start_date: None,
        }
    }

    #[test]
    fn test_monthly_rate_derivation() {
        let input = base_input();
        assert_eq!(input.monthly_rate(), dec!(0.015));
    }

    #[test]
    fn test_standard_case_solves_closed_form() {
        let input = base_input();
        let output = compute_payoff(&input).unwrap();

        // ln(2) / ln(1.015) = 46.555... -> 47 whole months
        assert_eq!(output.months, 47);
        assert_eq!(output.years, 3);
        assert_eq!(output.remaining_months, 11);
        assert_eq!(output.total_paid, dec!(7050));
        assert_eq!(output.total_interest, dec!(2050));
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let input = base_input();
        let output = compute_payoff(&input).unwrap();

        let sum = output.principal_percentage + output.interest_percentage;
        assert!((sum - dec!(100)).abs() < dec!(0.0000001), "sum was {sum}");
        assert!(output.principal_percentage > output.interest_percentage);
    }

    #[test]
    fn test_zero_rate_is_linear_division() {
        let input = DebtInput {
            total_debt: dec!(1200),
            annual_rate_percent: dec!(0),
            monthly_payment: dec!(100),
            start_date: None,
        };
        validate(&input).unwrap();
        let output = compute_payoff(&input).unwrap();

        // Exact division must not over-ceil.
        assert_eq!(output.months, 12);
        assert_eq!(output.years, 1);
        assert_eq!(output.remaining_months, 0);
        assert_eq!(output.total_interest, dec!(0));
        assert_eq!(output.total_paid, dec!(1200));
        assert_eq!(output.principal_percentage, dec!(100));
    }

    #[test]
    fn test_zero_rate_skips_payment_floor() {
        // Any positive payment retires a zero-interest debt eventually, so
        // even a token payment against a large balance validates.
        let input = DebtInput {
            total_debt: dec!(1_000_000),
            annual_rate_percent: dec!(0),
            monthly_payment: dec!(0.01),
            start_date: None,
        };
        validate(&input).unwrap();
        let output = compute_payoff(&input).unwrap();
        assert_eq!(output.months, 100_000_000);
    }

    #[test]
    fn test_payment_at_floor_rejected() {
        let mut input = base_input();
        input.monthly_payment = dec!(75);
        let err = validate(&input).unwrap_err();
        match err {
            DebtPayoffError::PaymentTooLow { minimum_payment } => {
                assert_eq!(minimum_payment, dec!(75));
            }
            other => panic!("Expected PaymentTooLow, got {other:?}"),
        }
    }

    #[test]
    fn test_payment_below_floor_rejected() {
        let mut input = base_input();
        input.monthly_payment = dec!(70);
        assert!(matches!(
            validate(&input),
            Err(DebtPayoffError::PaymentTooLow { .. })
        ));
    }

    #[test]
    fn test_sign_gates() {
        let mut negative_debt = base_input();
        negative_debt.total_debt = dec!(-100);
        match validate(&negative_debt).unwrap_err() {
            DebtPayoffError::InvalidInput { field, .. } => assert_eq!(field, "total_debt"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let mut negative_rate = base_input();
        negative_rate.annual_rate_percent = dec!(-1);
        match validate(&negative_rate).unwrap_err() {
            DebtPayoffError::InvalidInput { field, .. } => {
                assert_eq!(field, "annual_rate_percent")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let mut zero_payment = base_input();
        zero_payment.monthly_payment = dec!(0);
        match validate(&zero_payment).unwrap_err() {
            DebtPayoffError::InvalidInput { field, .. } => assert_eq!(field, "monthly_payment"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_unvalidated_compute_hits_numeric_domain() {
        // Payment below the interest floor makes the log argument negative;
        // skipping validate must surface as a contract violation, not a panic.
        let mut input = base_input();
        input.monthly_payment = dec!(70);
        match compute_payoff(&input).unwrap_err() {
            DebtPayoffError::NumericDomain { context } => {
                assert!(context.contains("log"), "context was {context}")
            }
            other => panic!("Expected NumericDomain, got {other:?}"),
        }
    }

    #[test]
    fn test_from_raw_parses_and_trims() {
        let input = DebtInput::from_raw(" 5000 ", "18", "150.50").unwrap();
        assert_eq!(input.total_debt, dec!(5000));
        assert_eq!(input.annual_rate_percent, dec!(18));
        assert_eq!(input.monthly_payment, dec!(150.50));
        assert!(input.start_date.is_none());
    }

    #[test]
    fn test_from_raw_rejects_malformed_text() {
        match DebtInput::from_raw("5000", "eighteen", "150").unwrap_err() {
            DebtPayoffError::InvalidInput { field, reason } => {
                assert_eq!(field, "annual_rate_percent");
                assert!(reason.contains("eighteen"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        match DebtInput::from_raw("", "18", "150").unwrap_err() {
            DebtPayoffError::InvalidInput { field, reason } => {
                assert_eq!(field, "total_debt");
                assert!(reason.contains("empty"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_minimum_payment_from_raw() {
        let input = MinimumPaymentInput::from_raw("5000", " 18 ").unwrap();
        assert_eq!(input.total_debt, dec!(5000));
        assert_eq!(input.annual_rate_percent, dec!(18));

        match MinimumPaymentInput::from_raw("5000", "high").unwrap_err() {
            DebtPayoffError::InvalidInput { field, .. } => {
                assert_eq!(field, "annual_rate_percent");
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_final_partial_month_billed_whole() {
        // Ceiling convention: a debt smaller than one payment still takes one
        // full payment, so total_paid can exceed the balance.
        let input = DebtInput {
            total_debt: dec!(50),
            annual_rate_percent: dec!(0),
            monthly_payment: dec!(100),
            start_date: None,
        };
        let output = compute_payoff(&input).unwrap();
        assert_eq!(output.months, 1);
        assert_eq!(output.total_paid, dec!(100));
        assert_eq!(output.total_interest, dec!(50));
    }

    #[test]
    fn test_projected_payoff_date() {
        let mut input = base_input();
        input.start_date = NaiveDate::from_ymd_opt(2025, 1, 15);
        let output = compute_payoff(&input).unwrap();
        assert_eq!(
            output.projected_payoff_date,
            NaiveDate::from_ymd_opt(2028, 12, 15)
        );
    }

    #[test]
    fn test_plan_wraps_envelope_with_metadata() {
        let input = base_input();
        let result = plan_payoff(&input).unwrap();
        assert_eq!(result.result.months, 47);
        assert!(result.warnings.is_empty());
        assert!(!result.methodology.is_empty());
        assert_eq!(result.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_plan_warns_on_long_horizon() {
        // Barely above the 75 floor: horizon stretches past 50 years.
        let mut input = base_input();
        input.monthly_payment = dec!(75.005);
        let result = plan_payoff(&input).unwrap();
        assert!(result.result.months > LONG_HORIZON_MONTHS);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("marginally"));
    }

    #[test]
    fn test_plan_warns_when_payoff_date_overflows_calendar() {
        // An anchor this close to NaiveDate::MAX cannot carry a 47-month
        // horizon; the date is omitted and a warning takes its place.
        let mut input = base_input();
        input.start_date = NaiveDate::from_ymd_opt(262142, 12, 1);
        let result = plan_payoff(&input).unwrap();

        assert!(result.result.projected_payoff_date.is_none());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("calendar range"));
    }

    #[test]
    fn test_minimum_payment_known_floor() {
        let input = MinimumPaymentInput {
            total_debt: dec!(5000),
            annual_rate_percent: dec!(18),
        };
        let result = calculate_minimum_payment(&input).unwrap();
        assert_eq!(result.result.minimum_payment, dec!(75));
        assert_eq!(result.result.monthly_rate, dec!(0.015));
    }

    #[test]
    fn test_minimum_payment_zero_rate_is_zero() {
        let input = MinimumPaymentInput {
            total_debt: dec!(5000),
            annual_rate_percent: dec!(0),
        };
        let result = calculate_minimum_payment(&input).unwrap();
        assert_eq!(result.result.minimum_payment, dec!(0));
    }

    #[test]
    fn test_minimum_payment_rejects_bad_signs() {
        let input = MinimumPaymentInput {
            total_debt: dec!(0),
            annual_rate_percent: dec!(18),
        };
        assert!(matches!(
            calculate_minimum_payment(&input),
            Err(DebtPayoffError::InvalidInput { .. })
        ));
    }
}
