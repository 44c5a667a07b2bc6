mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use debt_payoff_core::DebtPayoffError;
use std::process;

use commands::payoff::{MinPaymentArgs, PlanArgs};

/// Debt payoff projections with decimal precision
#[derive(Parser)]
#[command(
    name = "dpc",
    version,
    about = "Debt payoff projections with decimal precision",
    long_about = "A CLI for projecting how long a debt takes to retire at a fixed \
                  monthly payment. Solves the closed-form amortization period, \
                  reports total interest and the principal/interest split, and \
                  flags payments that can never clear the balance."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "summary", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Project the payoff horizon and cost of a debt
    Plan(PlanArgs),
    /// Show the interest-only payment floor for a debt
    MinPayment(MinPaymentArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Summary,
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Plan(args) => commands::payoff::run_plan(args),
        Commands::MinPayment(args) => commands::payoff::run_min_payment(args),
        Commands::Version => {
            println!("dpc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), render_error(e.as_ref()));
            process::exit(1);
        }
    }
}

/// The payment-floor error carries a raw Decimal; stderr shows it in rand.
/// Every other error prints its Display message unchanged.
fn render_error(e: &(dyn std::error::Error + 'static)) -> String {
    if let Some(DebtPayoffError::PaymentTooLow { minimum_payment }) = e.downcast_ref() {
        return format!(
            "Payment too low: the monthly payment must exceed the monthly interest \
             of {} for the debt to ever be retired",
            output::summary::format_rand(*minimum_payment)
        );
    }
    e.to_string()
}
