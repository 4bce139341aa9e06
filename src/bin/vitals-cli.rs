use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use page_vitals::aggregator::{PageView, ReadinessPolicy, SessionOutcome, SessionSettings};
use page_vitals::config::{
    load_or_default, set_public_base_url, validate_config, ConfigError, VitalsConfig,
};
use page_vitals::delivery::{DeliveryClient, NetworkStatus};
use page_vitals::observability::logging;
use page_vitals::observers::{EntryFeed, EntryType, NavigationTiming, PerformanceEntry};
use page_vitals::record::{DeviceContext, PageType};

#[derive(Parser)]
#[command(name = "vitals-cli")]
#[command(about = "Command-line client for the page-vitals collection endpoint", long_about = None)]
struct Cli {
    /// TOML configuration file; `[delivery]` and `[collector]` are used.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the collection endpoint; overrides `delivery.endpoint`.
    #[arg(short, long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show endpoint version and stored record count
    Status,
    /// POST a JSON metrics document from a file
    Send { file: PathBuf },
    /// Run one synthetic page view end to end against the endpoint
    Simulate(SimulateArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    TtfbAndLcp,
    LcpOnly,
    FirstInteraction,
}

impl From<Policy> for ReadinessPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::TtfbAndLcp => ReadinessPolicy::TtfbAndLcp,
            Policy::LcpOnly => ReadinessPolicy::LcpOnly,
            Policy::FirstInteraction => ReadinessPolicy::FirstInteraction,
        }
    }
}

#[derive(clap::Args)]
struct SimulateArgs {
    #[arg(long, default_value = "/ssr")]
    page_url: String,

    /// SSR or CSR
    #[arg(long, default_value = "SSR")]
    page_type: PageType,

    /// Overrides `collector.readiness`
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    #[arg(long, default_value_t = 120.0)]
    ttfb: f64,

    #[arg(long, default_value_t = 450.0)]
    fcp: f64,

    #[arg(long, default_value_t = 1200.0)]
    lcp: f64,

    /// Load event end, used when LCP is unsupported
    #[arg(long, default_value_t = 1500.0)]
    load_event_end: f64,

    #[arg(long, default_value_t = 0.05)]
    cls: f64,

    /// Interaction durations in ms; each one is a separate interaction
    #[arg(long = "interaction")]
    interactions: Vec<f64>,

    /// Behave like a client without largest-contentful-paint support
    #[arg(long)]
    no_lcp: bool,

    /// Report the client as offline
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.url.as_deref())?;
    let endpoint: Url = config.delivery.endpoint.parse()?;
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client.get(endpoint.join("/status")?).send().await?;
            print_response(res).await?;
        }
        Commands::Send { file } => {
            let body = tokio::fs::read(&file).await?;
            serde_json::from_slice::<Value>(&body)?;
            let res = client
                .post(endpoint)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Simulate(args) => {
            logging::init_logging(&config.observability.log_level);
            simulate(&config, args).await?;
        }
    }

    Ok(())
}

/// Config file (or defaults) with `VITALS_*` overrides, then `--url` on top.
fn resolve_config(path: Option<&Path>, url: Option<&str>) -> Result<VitalsConfig, ConfigError> {
    let mut config = load_or_default(path)?;
    if let Some(url) = url {
        set_public_base_url(&mut config, url);
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

async fn simulate(config: &VitalsConfig, args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let network = NetworkStatus::new(!args.offline);
    let delivery = DeliveryClient::from_config(&config.delivery, network.clone())?;

    let device = DeviceContext {
        user_agent: format!("vitals-cli/{}", env!("CARGO_PKG_VERSION")),
        connection_type: Some("4g".to_string()),
        language: Some("en-US".to_string()),
        ..DeviceContext::default()
    };
    let mut feed = EntryFeed::new(device, network);
    if args.no_lcp {
        feed = feed.without(EntryType::LargestContentfulPaint);
    }
    let feed = Arc::new(feed);

    let mut settings = SessionSettings::from(&config.collector);
    if let Some(policy) = args.policy {
        settings.policy = policy.into();
    }
    let (view, handle) = PageView::start(feed.clone(), args.page_url, args.page_type, settings);
    let session = {
        let delivery = delivery.clone();
        tokio::spawn(async move { view.run(&delivery).await })
    };

    feed.push(PerformanceEntry::Navigation(NavigationTiming {
        request_start: 5.0,
        response_start: 5.0 + args.ttfb,
        load_event_end: args.load_event_end,
    }));
    feed.push(PerformanceEntry::Paint {
        name: "first-contentful-paint".to_string(),
        start_time: args.fcp,
    });
    feed.push(PerformanceEntry::LayoutShift {
        value: args.cls,
        had_recent_input: false,
    });
    feed.push(PerformanceEntry::LargestContentfulPaint {
        start_time: args.lcp,
    });

    for (i, duration) in args.interactions.iter().enumerate() {
        handle.interaction();
        tokio::time::sleep(Duration::from_millis(50)).await;
        feed.push(PerformanceEntry::Event {
            interaction_id: Some(i as u64 + 1),
            duration: *duration,
        });
    }

    match session.await? {
        SessionOutcome::Finalized {
            trigger,
            record,
            delivery: outcome,
        } => {
            println!("Finalized by {}: {}", trigger, outcome);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        SessionOutcome::Abandoned { record_id } => {
            println!("Page view {} abandoned", record_id);
        }
    }
    drop(handle);
    delivery.drain(Duration::from_secs(5)).await;
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: endpoint returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
