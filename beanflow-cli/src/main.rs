use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use beanflow_core::{Classifier, LedgerEmitter, RuleSet};
use beanflow_ingest::parse_stgeorge_csv;
use beanflow_upbank::{to_ledger, unknown_report, Transaction, UpClient};

mod config;

use config::load_config;

#[derive(Parser, Debug)]
#[command(name = "beanflow", version, about = "Bank statements to plain-text ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a St George CSV export into ledger text
    Convert {
        /// Statement CSV, as exported (newest row first)
        #[arg(long)]
        csv: PathBuf,

        /// JSON rule file mapping category paths to merchant patterns
        #[arg(long)]
        rules: PathBuf,

        /// Bank account the statement belongs to (default: from config)
        #[arg(long)]
        account: Option<String>,
    },

    /// List statement merchants with no matching rule, most frequent first
    Unknowns {
        #[arg(long)]
        csv: PathBuf,

        #[arg(long)]
        rules: PathBuf,
    },

    /// List every account with its declared patterns
    Accounts {
        #[arg(long)]
        rules: PathBuf,
    },

    /// Up Bank commands
    Up {
        #[command(subcommand)]
        command: UpCommand,
    },
}

#[derive(Subcommand, Debug)]
enum UpCommand {
    /// Ping the API to verify the token is working
    Ping,

    /// Show the current balance of the first account
    Balance,

    /// List the transaction categories Up knows about
    Categories,

    /// Download one month of settled transactions as JSON (for archiving)
    Month { year: i32, month: u32 },

    /// Render an archived JSON download as ledger text
    Ledger {
        /// JSON transaction download (from `up month`)
        #[arg(long)]
        raw: PathBuf,

        /// Account balance at download time
        #[arg(long)]
        balance: f64,

        #[arg(long)]
        rules: PathBuf,

        #[arg(long)]
        account: Option<String>,
    },

    /// Report merchants in a JSON download with no matching rule
    Unknowns {
        #[arg(long)]
        raw: PathBuf,

        #[arg(long)]
        rules: PathBuf,
    },
}

fn load_classifier(rules: &PathBuf) -> Result<Classifier> {
    Ok(Classifier::new(RuleSet::from_file(rules)?))
}

fn load_raw_transactions(raw: &PathBuf) -> Result<Vec<Transaction>> {
    let text =
        fs::read_to_string(raw).with_context(|| format!("reading {}", raw.display()))?;
    serde_json::from_str(&text).with_context(|| format!("decoding {}", raw.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config()?;

    match cli.command {
        Command::Convert { csv, rules, account } => {
            let classifier = load_classifier(&rules)?;
            let transactions = parse_stgeorge_csv(&csv)?;
            let bank_account = account.unwrap_or(cfg.ledger.bank_account);
            let emitter = LedgerEmitter::new(&classifier, bank_account)
                .currency(cfg.ledger.currency)
                .unknown_account(cfg.ledger.unknown_account);
            print!("{}", emitter.emit(&transactions)?);
        }

        Command::Unknowns { csv, rules } => {
            let classifier = load_classifier(&rules)?;
            let transactions = parse_stgeorge_csv(&csv)?;
            let merchants: Vec<&str> =
                transactions.iter().map(|t| t.merchant.as_str()).collect();
            for merchant in classifier.find_unknown(merchants) {
                println!("{merchant}");
            }
        }

        Command::Accounts { rules } => {
            let rules = RuleSet::from_file(&rules)?;
            for (account, patterns) in rules.patterns_by_account() {
                println!("{account}");
                for pattern in patterns {
                    println!("    {pattern}");
                }
            }
        }

        Command::Up { command } => run_up(command, &cfg).await?,
    }

    Ok(())
}

async fn run_up(command: UpCommand, cfg: &config::Config) -> Result<()> {
    match command {
        UpCommand::Ping => {
            let client = UpClient::new(cfg.require_token()?);
            let body = client.ping().await?;
            println!("Ping!");
            println!("{body}");
        }

        UpCommand::Balance => {
            let client = UpClient::new(cfg.require_token()?);
            let accounts = client.accounts().await?;
            let balance = accounts
                .first()
                .and_then(|account| account.pointer("/attributes/balance/value"))
                .and_then(|value| value.as_str())
                .context("no accounts in response")?
                .to_string();
            println!("${balance}");
        }

        UpCommand::Categories => {
            let client = UpClient::new(cfg.require_token()?);
            let categories = client.categories().await?;
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }

        UpCommand::Month { year, month } => {
            let client = UpClient::new(cfg.require_token()?);
            let transactions = client.get_month(year, month).await?;
            println!("{}", serde_json::to_string_pretty(&transactions)?);
        }

        UpCommand::Ledger {
            raw,
            balance,
            rules,
            account,
        } => {
            let classifier = load_classifier(&rules)?;
            let transactions = load_raw_transactions(&raw)?;
            let bank_account = account.unwrap_or_else(|| cfg.upbank.bank_account.clone());
            print!(
                "{}",
                to_ledger(&transactions, &classifier, &bank_account, balance)
            );
        }

        UpCommand::Unknowns { raw, rules } => {
            let classifier = load_classifier(&rules)?;
            let transactions = load_raw_transactions(&raw)?;
            print!("{}", unknown_report(&transactions, &classifier));
        }
    }

    Ok(())
}
