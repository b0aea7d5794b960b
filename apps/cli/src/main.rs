use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ActionOutcome, FormField, InvestmentClient, InvestmentPlanner,
};
use shared::domain::InvestmentId;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "investments", about = "Manage investment records on the planning backend")]
struct Args {
    /// Backend base url; overrides investments.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all investments.
    List {
        /// Only show investments whose name contains this text.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show a single investment.
    Get { id: i64 },
    /// Create an investment from the given fields.
    Create(RecordFields),
    /// Load an investment, apply the given fields and save it.
    Update {
        id: i64,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Delete an investment.
    Delete { id: i64 },
}

#[derive(clap::Args, Debug)]
struct RecordFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    current_value: Option<String>,
    #[arg(long)]
    investor_id: Option<String>,
}

impl RecordFields {
    fn edits(&self) -> Vec<(FormField, &str)> {
        [
            (FormField::InvestmentName, &self.name),
            (FormField::InitialInvestmentAmount, &self.amount),
            (FormField::InvestmentStartDate, &self.start_date),
            (FormField::CurrentValue, &self.current_value),
            (FormField::InvestorId, &self.investor_id),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(api_url) = args.api_url.clone() {
        settings.api_url = api_url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = InvestmentClient::from_settings(&settings)
        .context("failed to build investment client")?;
    let planner = InvestmentPlanner::new(Arc::new(client));
    tracing::debug!(api_url = %settings.api_url, "planner initialising");
    let loaded = planner.initialize().await;

    let outcome = match args.command {
        Command::List { filter } => {
            if let Some(filter) = filter {
                planner.apply_filter(&filter).await;
            }
            if loaded == ActionOutcome::Failed {
                bail!("failed to load investments from {}", settings.api_url);
            }
            loaded
        }
        Command::Get { id } => {
            let outcome = planner.handle_edit(InvestmentId(id)).await;
            if outcome == ActionOutcome::Completed {
                let record = planner.snapshot().await.form.to_record()?;
                println!("{}", serde_json::to_string_pretty(&record)?);
                return Ok(());
            }
            outcome
        }
        Command::Create(fields) => {
            for (field, value) in fields.edits() {
                planner.set_field(field, value).await;
            }
            if planner.is_create_button_disabled().await {
                bail!(
                    "create is disabled: --name must be non-empty and --amount, --start-date, \
                     --current-value and --investor-id must be valid"
                );
            }
            planner.handle_create().await
        }
        Command::Update { id, fields } => {
            match planner.handle_edit(InvestmentId(id)).await {
                ActionOutcome::Completed => {
                    for (field, value) in fields.edits() {
                        planner.set_field(field, value).await;
                    }
                    planner.handle_update().await
                }
                other => other,
            }
        }
        Command::Delete { id } => planner.handle_delete(InvestmentId(id)).await,
    };

    let state = planner.snapshot().await;
    if !state.response_message.is_empty() {
        println!("{}", state.response_message);
    }
    if outcome == ActionOutcome::Failed {
        bail!("request failed: {}", state.response_message);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&state.filtered_investments)?
    );

    Ok(())
}
