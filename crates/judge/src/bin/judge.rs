use anyhow::Context;
use clap::{Parser, Subcommand};
use judge::{ApiClient, FlushReport, Outbox, RetryPolicy};
use std::path::PathBuf;
use storage::{dto::result::RecordResultRequest, models::ResultStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "zawody-judge")]
#[command(about = "Records competition results, queueing them while offline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    #[arg(long, env = "JUDGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "OUTBOX_PATH", default_value = "./outbox.jsonl")]
    outbox: PathBuf,

    #[command(flatten)]
    retry: RetryArgs,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::Args)]
struct RetryArgs {
    #[arg(long, env = "RETRY_MAX_ATTEMPTS", default_value_t = 5)]
    max_attempts: u8,

    #[arg(long, env = "RETRY_BASE_MS", default_value_t = 500)]
    retry_base_ms: u64,

    #[arg(long, env = "RETRY_MAX_MS", default_value_t = 30_000)]
    retry_max_ms: u64,
}

impl From<&RetryArgs> for RetryPolicy {
    fn from(args: &RetryArgs) -> Self {
        Self {
            max_attempts: args.max_attempts,
            base_ms: args.retry_base_ms,
            max_ms: args.retry_max_ms,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a result and try to deliver everything pending
    Record {
        #[arg(long)]
        athlete: Uuid,

        #[arg(long)]
        competition: Uuid,

        /// Points, seconds or meters; `,` is accepted as decimal separator
        #[arg(default_value = "")]
        value: String,

        #[arg(long, default_value = "active")]
        status: ResultStatus,

        #[arg(long)]
        notes: Option<String>,

        /// Only write to the outbox
        #[arg(long)]
        no_flush: bool,
    },
    /// Deliver pending results
    Flush,
    /// List pending results
    Pending,
    /// Drop delivered and rejected entries from the outbox file
    Compact,
    /// Show the start list of a competition
    StartList { competition: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("zawody_judge={},judge={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let policy = RetryPolicy::from(&cli.retry);

    match &cli.command {
        Commands::Record {
            athlete,
            competition,
            value,
            status,
            notes,
            no_flush,
        } => {
            let mut outbox = open_outbox(&cli)?;
            let client_id = outbox.enqueue(RecordResultRequest {
                athlete_id: *athlete,
                competition_id: *competition,
                value: value.clone(),
                status: *status,
                notes: notes.clone(),
                client_id: None,
            })?;
            tracing::info!(%client_id, pending = outbox.pending().len(), "Result saved to outbox");

            if !no_flush {
                flush(&cli, &mut outbox, &policy).await?;
            }
        }
        Commands::Flush => {
            let mut outbox = open_outbox(&cli)?;
            flush(&cli, &mut outbox, &policy).await?;
        }
        Commands::Pending => {
            let outbox = open_outbox(&cli)?;
            tracing::info!("{} pending result(s)", outbox.pending().len());
            for entry in outbox.pending() {
                tracing::info!(
                    "  {} athlete={} competition={} value='{}' status={} queued={}",
                    entry.client_id,
                    entry.request.athlete_id,
                    entry.request.competition_id,
                    entry.request.value,
                    entry.request.status,
                    entry.queued_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        Commands::Compact => {
            let mut outbox = open_outbox(&cli)?;
            let dropped = outbox.compact().context("Failed to compact outbox")?;
            tracing::info!(
                "✓ Compacted {}: {} line(s) dropped, {} pending",
                outbox.path().display(),
                dropped,
                outbox.pending().len()
            );
        }
        Commands::StartList { competition } => {
            let client = api_client(&cli)?;
            let entries = client
                .start_list(*competition)
                .await
                .context("Failed to fetch start list")?;

            for entry in entries {
                tracing::info!(
                    "{:>3}. {} {} ({}{}) {}{}",
                    entry.start_order,
                    entry.first_name,
                    entry.last_name,
                    entry.team_name,
                    entry
                        .start_number
                        .map(|n| format!(" #{n}"))
                        .unwrap_or_default(),
                    if entry.present { "present" } else { "absent" },
                    if entry.completed { ", done" } else { "" }
                );
            }
        }
    }

    Ok(())
}

fn open_outbox(cli: &Cli) -> anyhow::Result<Outbox> {
    Outbox::open(&cli.outbox)
        .with_context(|| format!("Failed to open outbox at {}", cli.outbox.display()))
}

fn api_client(cli: &Cli) -> anyhow::Result<ApiClient> {
    let api_key = cli
        .api_key
        .as_deref()
        .context("JUDGE_API_KEY is required to talk to the API")?;

    ApiClient::new(&cli.api_url, api_key).context("Failed to build API client")
}

async fn flush(cli: &Cli, outbox: &mut Outbox, policy: &RetryPolicy) -> anyhow::Result<()> {
    if outbox.is_empty() {
        tracing::info!("Nothing to deliver");
        return Ok(());
    }

    let client = api_client(cli)?;
    let report = outbox
        .flush(&client, policy)
        .await
        .context("Failed to update outbox")?;

    log_report(&report);
    Ok(())
}

fn log_report(report: &FlushReport) {
    tracing::info!(
        "✓ Delivered {} result(s), {} already on the server",
        report.delivered,
        report.duplicates
    );

    for (client_id, reason) in &report.rejected {
        tracing::warn!("✗ {} rejected: {}", client_id, reason);
    }

    if let Some(reason) = &report.stopped {
        tracing::warn!(
            "Delivery stopped ({}); {} result(s) stay queued, run `flush` later",
            reason,
            report.remaining
        );
    }
}
