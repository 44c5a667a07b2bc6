use colored::{Color, Colorize};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde_json::Value;

use super::json;

/// Width of the principal/interest breakdown bars, in cells.
const BAR_WIDTH: usize = 25;

/// Human-readable report for a terminal, in rand.
///
/// Recognises the two result shapes this tool produces; anything else
/// falls back to pretty JSON.
pub fn print_summary(value: &Value) {
    let Some(result) = value.get("result") else {
        json::print_json(value);
        return;
    };

    if result.get("months").is_some() {
        print_plan_summary(result);
    } else if result.get("minimum_payment").is_some() {
        print_floor_summary(result);
    } else {
        json::print_json(value);
        return;
    }

    print_warnings(value);
}

fn print_plan_summary(result: &Value) {
    let years = result["years"].as_u64().unwrap_or(0) as u32;
    let remaining = result["remaining_months"].as_u64().unwrap_or(0) as u32;
    let months = result["months"].as_u64().unwrap_or(0);

    println!(
        "Debt-free in {} ({} payments)",
        format_payoff_time(years, remaining).bold().green(),
        months
    );
    println!();
    println!("  Total paid:      {}", money_field(result, "total_paid"));
    println!("  Total interest:  {}", money_field(result, "total_interest"));
    println!();
    print_bar("Principal", percent_field(result, "principal_percentage"), Color::Green);
    print_bar("Interest", percent_field(result, "interest_percentage"), Color::Red);

    if let Some(date) = result["projected_payoff_date"].as_str() {
        println!();
        println!("  Projected payoff: {date}");
    }
}

fn print_floor_summary(result: &Value) {
    println!(
        "Minimum payment to cover interest: {}",
        money_field(result, "minimum_payment").bold()
    );
    println!("A payment at or below this will never retire the debt.");
}

fn print_warnings(envelope: &Value) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!();
            for w in warnings {
                if let Value::String(s) = w {
                    println!("{} {}", "warning:".yellow().bold(), s);
                }
            }
        }
    }
}

fn print_bar(label: &str, percentage: Option<Decimal>, color: Color) {
    let Some(pct) = percentage else { return };
    let filled = bar_cells(pct);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
    let display = pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    println!("  {:<10} {}  {:.1}%", label, bar.color(color), display);
}

fn bar_cells(pct: Decimal) -> usize {
    let cells = (pct * Decimal::from(BAR_WIDTH as u32) / dec!(100)).round();
    cells
        .normalize()
        .to_string()
        .parse::<usize>()
        .unwrap_or(0)
        .min(BAR_WIDTH)
}

/// Money fields arrive as JSON strings; render in rand or pass through.
fn money_field(result: &Value, key: &str) -> String {
    result[key]
        .as_str()
        .and_then(|s| s.parse::<Decimal>().ok())
        .map(format_rand)
        .unwrap_or_else(|| result[key].to_string())
}

fn percent_field(result: &Value, key: &str) -> Option<Decimal> {
    result[key].as_str().and_then(|s| s.parse::<Decimal>().ok())
}

/// South African rand: space-grouped thousands, comma decimal separator,
/// always two decimal places. `7050` renders as `R 7 050,00`.
pub fn format_rand(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let magnitude = rounded.abs();
    let plain = format!("{magnitude:.2}");
    let (int_digits, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_digits.len() + int_digits.len() / 3);
    for (i, ch) in int_digits.chars().enumerate() {
        if i > 0 && (int_digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    format!("R {sign}{grouped},{cents}")
}

/// `3 years and 11 months`, with singular forms and a floor of
/// `Less than a month` when both parts are zero.
pub fn format_payoff_time(years: u32, months: u32) -> String {
    let year_part = match years {
        0 => None,
        1 => Some("1 year".to_string()),
        n => Some(format!("{n} years")),
    };
    let month_part = match months {
        0 => None,
        1 => Some("1 month".to_string()),
        n => Some(format!("{n} months")),
    };

    match (year_part, month_part) {
        (Some(y), Some(m)) => format!("{y} and {m}"),
        (Some(y), None) => y,
        (None, Some(m)) => m,
        (None, None) => "Less than a month".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
