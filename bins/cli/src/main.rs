//! Splitbook command-line tool.
//!
//! Usage:
//!   splitbook balances <snapshot.json> [--strict]  - Aggregate a group snapshot
//!   splitbook split <request.json>                 - Compute a single split
//!
//! Results are printed to stdout as JSON. Logs go to stderr and follow
//! `RUST_LOG`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use splitbook_core::balance::{AggregationOptions, BalanceAggregator};
use splitbook_core::expense::{Expense, Settlement};
use splitbook_core::split::{Participant, SplitCalculator, SplitPolicy};
use splitbook_shared::AppConfig;
use splitbook_shared::types::{GroupId, MemberId, Money};

const USAGE: &str = "usage: splitbook balances <snapshot.json> [--strict]
       splitbook split <request.json>";

/// A consistent read of one group.
#[derive(Debug, Deserialize)]
struct GroupSnapshot {
    group_id: GroupId,
    roster: Vec<MemberId>,
    expenses: Vec<Expense>,
    #[serde(default)]
    settlements: Vec<Settlement>,
}

/// Input for a one-off split.
#[derive(Debug, Deserialize)]
struct SplitRequest {
    total_amount: Money,
    policy: SplitPolicy,
    participants: Vec<Participant>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Balances { snapshot: PathBuf, strict: bool },
    Split { request: PathBuf },
}

impl Command {
    fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let command = match (args.next().as_deref(), args.next()) {
            (Some("balances"), Some(path)) => Self::Balances {
                snapshot: PathBuf::from(path),
                strict: false,
            },
            (Some("split"), Some(path)) => Self::Split {
                request: PathBuf::from(path),
            },
            _ => bail!(USAGE),
        };

        match (command, args.next().as_deref()) {
            (command, None) => Ok(command),
            (Self::Balances { snapshot, .. }, Some("--strict")) => Ok(Self::Balances {
                snapshot,
                strict: true,
            }),
            (_, Some(extra)) => bail!("unexpected argument `{extra}`\n{USAGE}"),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn run_balances(config: &AppConfig, path: &Path, strict: bool) -> anyhow::Result<()> {
    let snapshot: GroupSnapshot = read_json(path)?;

    let mut options = AggregationOptions::from(&config.engine);
    options.strict_mode |= strict;

    info!(
        group_id = %snapshot.group_id,
        members = snapshot.roster.len(),
        expenses = snapshot.expenses.len(),
        settlements = snapshot.settlements.len(),
        strict = options.strict_mode,
        "Aggregating group balances"
    );

    let report =
        BalanceAggregator::aggregate_expenses(&snapshot.roster, &snapshot.expenses, &options)
            .with_context(|| format!("group {}", snapshot.group_id))?;

    print_json(&report)
}

fn run_split(path: &Path) -> anyhow::Result<()> {
    let request: SplitRequest = read_json(path)?;
    let result =
        SplitCalculator::compute(request.total_amount, &request.participants, request.policy)?;
    print_json(&result)
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "splitbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    match Command::parse(std::env::args().skip(1))? {
        Command::Balances { snapshot, strict } => run_balances(&config, &snapshot, strict),
        Command::Split { request } => run_split(&request),
    }
}
