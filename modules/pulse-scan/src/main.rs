use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arctic_client::ArcticClient;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pulse_common::{Config, SystemClock};
use pulse_scan::summarize::{summarizer_from_config, Summarizer};
use pulse_scan::{ScanPolicy, ScanRequest, Scanner, Tracker, UnavailableSummarizer};

#[derive(Parser)]
#[command(name = "pulse", about = "Curate and summarize community discussion for a subreddit")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one scan and print the result as JSON
    Scan {
        /// Subreddit name, `r/name`, or a reddit.com/r/ URL
        subject: String,
        /// Display name handed to the summarizer
        #[arg(long)]
        label: Option<String>,
        /// Comma-separated keywords to watch for
        #[arg(long)]
        keywords: Option<String>,
        /// Skip the summarizer
        #[arg(long)]
        no_summary: bool,
    },
    /// Re-scan a subject on a fixed interval
    Watch {
        subject: String,
        /// Seconds between scans
        #[arg(long, default_value_t = 60)]
        every: u64,
        /// Stop after this many scans
        #[arg(long)]
        rounds: Option<u32>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
    },
}

/// Workspace crates whose `info!` and above show without `RUST_LOG`.
const DEFAULT_DIRECTIVES: [&str; 2] = ["pulse=info", "arctic_client=info"];

fn with_default_directives(mut filter: EnvFilter) -> Result<EnvFilter> {
    for directive in DEFAULT_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = with_default_directives(EnvFilter::from_default_env())?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn scan_request(subject: String, label: Option<String>, keywords: Option<String>) -> ScanRequest {
    ScanRequest {
        subject,
        label,
        keywords,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    let config = Config::from_env().context("Failed to load configuration")?;
    config.log_redacted();

    let search = Arc::new(ArcticClient::new(&config.arctic_base_url, &config.user_agent));
    let scanner = Arc::new(Scanner::new(
        search,
        ScanPolicy::from_config(&config),
        Arc::new(SystemClock),
    ));

    match cli.command {
        Command::Scan {
            subject,
            label,
            keywords,
            no_summary,
        } => {
            let summarizer: Arc<dyn Summarizer> = if no_summary {
                Arc::new(UnavailableSummarizer)
            } else {
                summarizer_from_config(&config)
            };
            let tracker = Tracker::new(scanner, summarizer);
            let result = tracker.run(&scan_request(subject, label, keywords)).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Watch {
            subject,
            every,
            rounds,
            label,
            keywords,
        } => {
            let tracker = Tracker::new(scanner, summarizer_from_config(&config));
            let request = scan_request(subject, label, keywords);
            let mut ticker = tokio::time::interval(Duration::from_secs(every.max(1)));
            let mut round = 0u32;

            loop {
                ticker.tick().await;
                round += 1;

                let result = tracker.run(&request).await;
                info!(
                    round,
                    subject = %result.subject,
                    posts = result.post_count,
                    cached = result.cached,
                    error = result.error.as_deref().unwrap_or(""),
                    "Round finished"
                );
                println!("{}", serde_json::to_string(&result)?);

                let status = tracker.scanner().cache_status(&request.subject).await;
                info!(
                    subject = %request.subject,
                    cached = status.cached,
                    valid = status.valid,
                    expires_in = status.expires_in.unwrap_or(0),
                    "Cache status"
                );

                if rounds.is_some_and(|max| round >= max) {
                    break;
                }
            }
        }
    }

    Ok(())
}
