//! Command-line maintenance tool for the credit ledger store.
//!
//! Runs against the store file directly; the server does not need to be
//! running (and should not be, since separate handles do not see each
//! other's writes).

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use shared::{CreditStatus, PaymentMethod};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use credit_ledger::config::Config;
use credit_ledger::domain::commands::credits::AdminCreditCommand;
use credit_ledger::domain::commands::members::{RegisterMemberCommand, SetMembershipCommand};
use credit_ledger::domain::commands::payments::RecordPaymentCommand;
use credit_ledger::domain::models::member::Member;
use credit_ledger::io::rest::mappers::{
    credit_mapper::CreditMapper, member_mapper::MemberMapper, notification_mapper::NotificationMapper,
    payment_mapper::PaymentMapper, setting_mapper::SettingMapper,
};
use credit_ledger::AppState;

#[derive(Parser)]
#[command(name = "db-manager", version, about = "Inspect and maintain the credit ledger store")]
struct Cli {
    /// Store file (overrides configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the store, or one collection of it
    Show {
        #[arg(value_enum)]
        collection: Option<Collection>,
    },
    /// Print record counts
    Stats,
    /// Register a new person
    AddMember {
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// National document / MEC code
        #[arg(long)]
        document: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,
        /// Grant association membership right away
        #[arg(long)]
        member: bool,
    },
    /// Grant an approved credit to a member
    AddCredit {
        #[arg(long)]
        consumer_code: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Record and confirm a payment against a member's credit
    AddTransaction {
        #[arg(long)]
        consumer_code: String,
        #[arg(long)]
        amount: f64,
        /// Defaults to the member's oldest approved credit
        #[arg(long)]
        credit_id: Option<String>,
        #[arg(long, value_enum, default_value = "cash")]
        method: Method,
        #[arg(long)]
        description: Option<String>,
    },
    /// Empty every collection (no administrator is seeded)
    Clear,
    /// Delete the store and recreate the seeded default
    Reset,
    /// Write the store to a JSON file
    Export { file: PathBuf },
    /// Replace the store with a JSON file (canonical or legacy layout)
    Import { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Collection {
    Members,
    Credits,
    Payments,
    Notifications,
    Settings,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Transfer,
    Cash,
    MonthlyFee,
    Other,
}

impl From<Method> for PaymentMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Transfer => PaymentMethod::Transfer,
            Method::Cash => PaymentMethod::Cash,
            Method::MonthlyFee => PaymentMethod::MonthlyFee,
            Method::Other => PaymentMethod::Other,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(db) = cli.db {
        config.store_path = db;
    }

    let state = credit_ledger::initialize_backend(&config)
        .await
        .with_context(|| format!("Failed to open store {}", config.store_path.display()))?;

    run(cli.command, &state).await
}

async fn run(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Show { collection } => show(state, collection).await,
        Command::Stats => print_json(&state.connection.stats().await),
        Command::AddMember {
            name,
            password,
            email,
            phone,
            document,
            address,
            city,
            state: province,
            birth_date,
            member,
        } => {
            let birth_date = birth_date
                .map(|value| NaiveDate::parse_from_str(&value, "%Y-%m-%d"))
                .transpose()
                .context("Birth date must be YYYY-MM-DD")?;
            let mut created = state
                .member_service
                .register(RegisterMemberCommand {
                    name,
                    password,
                    consumer_code: None,
                    email,
                    phone,
                    document,
                    address,
                    city,
                    state: province,
                    zip_code: None,
                    birth_date,
                })
                .await?;
            if member {
                let admin = cli_admin(state).await?;
                created = state
                    .member_service
                    .set_membership(SetMembershipCommand {
                        admin_id: admin.id,
                        member_id: created.id,
                        is_member: Some(true),
                        is_admin: None,
                    })
                    .await?;
            }
            println!("Member created: {} ({})", created.consumer_code, created.id);
            Ok(())
        }
        Command::AddCredit {
            consumer_code,
            amount,
            description,
        } => {
            let admin = cli_admin(state).await?;
            let member = member_by_code(state, &consumer_code).await?;
            let credit = state
                .credit_service
                .create_approved_credit(AdminCreditCommand {
                    admin_id: admin.id,
                    member_id: member.id,
                    amount,
                    description,
                })
                .await?;
            println!(
                "Credit created: {} (amount {:.2}, interest {:.2}, total {:.2})",
                credit.id, credit.amount, credit.interest, credit.total
            );
            Ok(())
        }
        Command::AddTransaction {
            consumer_code,
            amount,
            credit_id,
            method,
            description,
        } => {
            let admin = cli_admin(state).await?;
            let member = member_by_code(state, &consumer_code).await?;
            let credit_id = match credit_id {
                Some(id) => id,
                None => state
                    .credit_service
                    .list_member_credits(&member.id)
                    .await?
                    .into_iter()
                    .find(|c| c.status == CreditStatus::Approved)
                    .map(|c| c.id)
                    .ok_or_else(|| anyhow!("{} has no approved credit", consumer_code))?,
            };

            let payment = state
                .payment_service
                .record_payment(RecordPaymentCommand {
                    member_id: member.id,
                    credit_id,
                    amount,
                    method: Some(method.into()),
                    description,
                })
                .await?;
            let payment = state.payment_service.confirm_payment(&payment.id, &admin.id).await?;
            let credit = state.credit_service.require_credit(&payment.credit_id).await?;
            println!(
                "Payment confirmed: {} ({:.2} on {}, credit now {})",
                payment.id, payment.amount, credit.id, credit.status
            );
            Ok(())
        }
        Command::Clear => {
            state.connection.clear().await?;
            println!("Store cleared: {}", state.connection.path().display());
            Ok(())
        }
        Command::Reset => {
            state.connection.reset().await?;
            println!("Store reset: {}", state.connection.path().display());
            Ok(())
        }
        Command::Export { file } => {
            state.connection.export(&file).await?;
            println!("Exported to {}", file.display());
            Ok(())
        }
        Command::Import { file } => {
            let stats = state.connection.import(&file).await?;
            println!("Imported {}", file.display());
            print_json(&stats)
        }
    }
}

async fn show(state: &AppState, collection: Option<Collection>) -> Result<()> {
    let document = state.connection.snapshot().await;
    let members = || -> Vec<_> { document.members.iter().cloned().map(MemberMapper::to_dto).collect() };
    let credits = || -> Vec<_> { document.credits.iter().cloned().map(CreditMapper::to_dto).collect() };
    let payments = || -> Vec<_> { document.payments.iter().cloned().map(PaymentMapper::to_dto).collect() };
    let notifications = || -> Vec<_> {
        document
            .notifications
            .iter()
            .cloned()
            .map(NotificationMapper::to_dto)
            .collect()
    };
    let settings = || -> Vec<_> { document.settings.iter().cloned().map(SettingMapper::to_dto).collect() };

    let value = match collection {
        Some(Collection::Members) => json!(members()),
        Some(Collection::Credits) => json!(credits()),
        Some(Collection::Payments) => json!(payments()),
        Some(Collection::Notifications) => json!(notifications()),
        Some(Collection::Settings) => json!(settings()),
        None => json!({
            "members": members(),
            "credits": credits(),
            "payments": payments(),
            "notifications": notifications(),
            "settings": settings(),
        }),
    };
    print_json(&value)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The administrator the CLI acts as: the first active one in the store.
async fn cli_admin(state: &AppState) -> Result<Member> {
    state
        .member_service
        .active_members()
        .await?
        .into_iter()
        .find(|m| m.is_admin)
        .ok_or_else(|| anyhow!("Store has no active administrator; run `db-manager reset`"))
}

async fn member_by_code(state: &AppState, consumer_code: &str) -> Result<Member> {
    state
        .member_service
        .find_by_consumer_code(consumer_code)
        .await?
        .ok_or_else(|| anyhow!("No active member with consumer code {}", consumer_code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_test() -> (TempDir, AppState) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config {
            store_path: temp_dir.path().join("ledger.json"),
            backup_dir: temp_dir.path().join("backups"),
            ..Config::default()
        };
        let state = credit_ledger::initialize_backend(&config)
            .await
            .expect("Failed to open test store");
        (temp_dir, state)
    }

    async fn run_args(state: &AppState, args: &[&str]) -> Result<()> {
        let cli = Cli::try_parse_from(std::iter::once("db-manager").chain(args.iter().copied()))?;
        run(cli.command, state).await
    }

    async fn member_named(state: &AppState, name: &str) -> Member {
        state
            .member_service
            .active_members()
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.name == name)
            .unwrap()
    }

    #[tokio::test]
    async fn test_member_credit_and_transaction_commands() {
        let (_dir, state) = setup_test().await;

        run_args(
            &state,
            &["add-member", "--name", "Joana Matos", "--password", "secret123", "--member"],
        )
        .await
        .unwrap();
        let member = member_named(&state, "Joana Matos").await;
        assert!(member.is_member);

        run_args(
            &state,
            &["add-credit", "--consumer-code", member.consumer_code.as_str(), "--amount", "1000"],
        )
        .await
        .unwrap();
        let credits = state.credit_service.list_member_credits(&member.id).await.unwrap();
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].status, CreditStatus::Approved);
        assert_eq!(credits[0].total, 1150.0);

        // No --credit-id: the oldest approved credit is used
        run_args(
            &state,
            &["add-transaction", "--consumer-code", member.consumer_code.as_str(), "--amount", "1150"],
        )
        .await
        .unwrap();
        let credit = state.credit_service.require_credit(&credits[0].id).await.unwrap();
        assert_eq!(credit.status, CreditStatus::Paid);

        let payments = state.payment_service.list_member_payments(&member.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].method, PaymentMethod::Cash);

        run_args(&state, &["show", "payments"]).await.unwrap();
        run_args(&state, &["show"]).await.unwrap();
        run_args(&state, &["stats"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_transaction_without_approved_credit_fails() {
        let (_dir, state) = setup_test().await;
        run_args(&state, &["add-member", "--name", "Pedro Neto", "--password", "secret123"])
            .await
            .unwrap();
        let member = member_named(&state, "Pedro Neto").await;

        let result = run_args(
            &state,
            &["add-transaction", "--consumer-code", member.consumer_code.as_str(), "--amount", "10"],
        )
        .await;
        assert!(result.is_err());

        let result = run_args(&state, &["add-credit", "--consumer-code", "PPDUNKNOWN", "--amount", "10"]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_export_clear_import() {
        let (dir, state) = setup_test().await;
        run_args(&state, &["add-member", "--name", "Joana Matos", "--password", "secret123"])
            .await
            .unwrap();
        let export_path = dir.path().join("export.json");
        let export_arg = export_path.to_str().unwrap();

        run_args(&state, &["export", export_arg]).await.unwrap();
        run_args(&state, &["clear"]).await.unwrap();
        assert_eq!(state.connection.stats().await.total_members, 0);

        run_args(&state, &["import", export_arg]).await.unwrap();
        assert_eq!(state.connection.stats().await.total_members, 2);
        member_named(&state, "Joana Matos").await;

        run_args(&state, &["reset"]).await.unwrap();
        assert_eq!(state.connection.stats().await.total_members, 1);
    }

    #[test]
    fn test_unknown_collection_is_rejected() {
        assert!(Cli::try_parse_from(["db-manager", "show", "loans"]).is_err());
        let cli = Cli::try_parse_from(["db-manager", "--db", "/tmp/other.json", "stats"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/other.json")));
    }
}
