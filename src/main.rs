//! Fixed deposit pricing CLI
//!
//! ```bash
//! # Manual rate with classification bonuses
//! fd-pricing quote --principal 100000 --tenure 12 --rate 7 --tds 10 -c SENIOR_CITIZEN
//!
//! # Rate from a matrix file
//! fd-pricing quote --principal 250000 --tenure 9 --matrix data/rates/standard_fd.csv
//!
//! # Rate from a named matrix under data/rates
//! fd-pricing quote --principal 250000 --tenure 9 --matrix-name standard_fd
//!
//! # Compare scenarios
//! fd-pricing compare --scenarios data/scenarios/sample.csv --common-principal 50000
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use fd_pricing::deposit::load_scenarios;
use fd_pricing::rates::{load_named_matrix, load_rate_matrix};
use fd_pricing::{
    ComparisonRequest, CompoundingFrequency, DepositRequest, PricingConfig, QuoteOrchestrator, QuoteResult,
    TenureUnit,
};

/// Fixed deposit pricing: quotes, schedules and scenario comparison
#[derive(Parser)]
#[command(name = "fd-pricing")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pricing config JSON (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a single deposit
    Quote(QuoteArgs),

    /// Compare scenarios from a CSV file and pick the best
    Compare(CompareArgs),
}

#[derive(Args)]
struct QuoteArgs {
    #[arg(long)]
    principal: Decimal,

    #[arg(long)]
    tenure: u32,

    /// MONTHS or YEARS
    #[arg(long, default_value = "MONTHS")]
    unit: TenureUnit,

    /// Manual base rate in percent
    #[arg(long, conflicts_with_all = ["matrix", "matrix_name"])]
    rate: Option<Decimal>,

    /// Rate matrix CSV to resolve the base rate from
    #[arg(long, group = "matrix_source")]
    matrix: Option<PathBuf>,

    /// Rate matrix by name from data/rates (e.g. standard_fd)
    #[arg(long, group = "matrix_source")]
    matrix_name: Option<String>,

    /// Base rate used when no matrix slab matches
    #[arg(long, requires = "matrix_source")]
    default_rate: Option<Decimal>,

    /// MONTHLY, QUARTERLY, HALF_YEARLY or ANNUALLY
    #[arg(long)]
    frequency: Option<CompoundingFrequency>,

    /// TDS rate in percent
    #[arg(long)]
    tds: Option<Decimal>,

    /// Customer classification (repeatable)
    #[arg(short = 'c', long = "classification")]
    classifications: Vec<String>,

    /// Start date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Schedule rows to print
    #[arg(long, default_value_t = 12)]
    months_shown: usize,
}

#[derive(Args)]
struct CompareArgs {
    /// Scenario CSV
    #[arg(long)]
    scenarios: PathBuf,

    /// Principal applied to every scenario
    #[arg(long)]
    common_principal: Option<Decimal>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PricingConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PricingConfig::default(),
    };
    let orchestrator = QuoteOrchestrator::new(config);

    match cli.command {
        Commands::Quote(args) => run_quote(&orchestrator, args, cli.json),
        Commands::Compare(args) => run_compare(&orchestrator, args, cli.json),
    }
}

fn run_quote(orchestrator: &QuoteOrchestrator, args: QuoteArgs, json: bool) -> Result<()> {
    let mut request = DepositRequest::new(args.principal, args.tenure)
        .with_tenure_unit(args.unit)
        .with_classifications(args.classifications);
    request.interest_rate = args.rate;
    request.compounding_frequency = args.frequency;
    request.tds_rate = args.tds;
    request.start_date = args.start_date;

    let matrix = match (&args.matrix, &args.matrix_name) {
        (Some(path), _) => Some(
            load_rate_matrix(path).with_context(|| format!("Failed to load rate matrix from {}", path.display()))?,
        ),
        (None, Some(name)) => {
            Some(load_named_matrix(name).with_context(|| format!("Failed to load rate matrix '{}'", name))?)
        }
        (None, None) => None,
    };
    let result = match &matrix {
        Some(matrix) => orchestrator.quote_with_matrix(&request, matrix, args.default_rate)?,
        None => orchestrator.quote(&request)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_quote(&result);
    print_schedule(&result, args.months_shown);
    Ok(())
}

fn run_compare(orchestrator: &QuoteOrchestrator, args: CompareArgs, json: bool) -> Result<()> {
    let scenarios = load_scenarios(&args.scenarios)
        .with_context(|| format!("Failed to load scenarios from {}", args.scenarios.display()))?;
    let request = ComparisonRequest {
        scenarios,
        common_principal: args.common_principal,
    };
    let comparison = orchestrator.compare(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    println!("Scenario Comparison ({} scenarios)", comparison.results.len());
    println!("{}", "=".repeat(96));
    println!(
        "{:>3} {:>14} {:>8} {:>12} {:>8} {:>8} {:>14} {:>14} {:>6}",
        "#", "Principal", "Tenure", "Frequency", "Rate", "APY", "Interest", "Maturity", "Best"
    );
    println!("{}", "-".repeat(96));
    for (i, r) in comparison.results.iter().enumerate() {
        println!(
            "{:>3} {:>14} {:>8} {:>12} {:>8} {:>8} {:>14} {:>14} {:>6}",
            i + 1,
            r.principal,
            format!("{}m", r.tenure_months),
            r.compounding_frequency,
            r.final_rate,
            r.apy,
            r.interest_earned,
            r.maturity_amount,
            if i == comparison.best_index { "*" } else { "" }
        );
    }
    println!();
    if let Some(best) = comparison.best() {
        println!(
            "Best: scenario {} with maturity {}",
            comparison.best_index + 1,
            best.maturity_amount
        );
    }
    Ok(())
}

fn print_quote(r: &QuoteResult) {
    println!("Fixed Deposit Quote");
    println!("===================\n");
    println!("  Principal:        {}", r.principal);
    println!("  Tenure:           {} {} ({} months)", r.tenure, r.tenure_unit, r.tenure_months);
    println!("  Compounding:      {}", r.compounding_frequency);
    println!(
        "  Rate:             {}% (base {}% + additional {}%)",
        r.final_rate, r.base_rate, r.additional_rate
    );
    if !r.classifications.is_empty() {
        println!("  Classifications:  {}", r.classifications.join(", "));
    }
    println!("  Start / Maturity: {} / {}", r.start_date, r.maturity_date);
    println!();
    println!("  Interest earned:  {}", r.interest_earned);
    println!("  TDS rate:         {}%", r.tds_rate);
    println!("  TDS withheld:     {}", r.tds_amount);
    println!("  Net interest:     {}", r.net_interest);
    println!("  Maturity (gross): {}", r.maturity_before_tax);
    println!("  Maturity (net):   {}", r.maturity_amount);
    println!("  APY:              {}%", r.apy);
    println!();
}

fn print_schedule(r: &QuoteResult, months_shown: usize) {
    if months_shown == 0 {
        return;
    }
    println!(
        "{:>5} {:>12} {:>16} {:>14} {:>16} {:>14}",
        "Month", "Date", "Opening", "Interest", "Closing", "Cumulative"
    );
    println!("{}", "-".repeat(82));
    for entry in r.monthly_breakdown.iter().take(months_shown) {
        println!(
            "{:>5} {:>12} {:>16} {:>14} {:>16} {:>14}",
            entry.month,
            entry.date.to_string(),
            entry.opening_balance,
            entry.interest_earned,
            entry.closing_balance,
            entry.cumulative_interest
        );
    }
    if r.monthly_breakdown.len() > months_shown {
        println!("... ({} more months)", r.monthly_breakdown.len() - months_shown);
    }

    let summary = r.summary();
    println!();
    println!(
        "Schedule: {} months, total interest {}, largest month {}, final balance {}",
        summary.total_months, summary.total_interest, summary.largest_monthly_interest, summary.final_balance
    );
}
