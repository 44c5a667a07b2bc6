use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;

use debt_payoff_core::payoff::{self, DebtInput, MinimumPaymentInput};

use crate::input;

/// Arguments for a payoff projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PlanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal owed
    #[arg(long)]
    pub total_debt: Option<String>,

    /// Nominal annual interest rate in percent (18 = 18%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<String>,

    /// Fixed monthly payment
    #[arg(long, alias = "payment")]
    pub monthly_payment: Option<String>,

    /// First payment month (YYYY-MM-DD); anchors the projected payoff date
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for the interest-only payment floor
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct MinPaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal owed
    #[arg(long)]
    pub total_debt: Option<String>,

    /// Nominal annual interest rate in percent (18 = 18%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<String>,
}

pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let debt_input: DebtInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let total_debt = args
            .total_debt
            .ok_or("--total-debt is required (or provide --input)")?;
        let annual_rate = args
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?;
        let monthly_payment = args
            .monthly_payment
            .ok_or("--monthly-payment is required (or provide --input)")?;

        // Raw text goes through the core so malformed numerals surface as
        // its typed validation error, not a CLI parse failure.
        let mut parsed = DebtInput::from_raw(&total_debt, &annual_rate, &monthly_payment)?;
        parsed.start_date = args.start_date;
        parsed
    };

    let result = payoff::plan_payoff(&debt_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_min_payment(args: MinPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let floor_input: MinimumPaymentInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let total_debt = args
            .total_debt
            .ok_or("--total-debt is required (or provide --input)")?;
        let annual_rate = args
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?;
        MinimumPaymentInput::from_raw(&total_debt, &annual_rate)?
    };

    let result = payoff::calculate_minimum_payment(&floor_input)?;
    Ok(serde_json::to_value(result)?)
}
