use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use pricewatch::config::AppConfig;
use pricewatch::fetcher::PageFetcher;
use pricewatch::monitor::PriceMonitor;
use pricewatch::notify::{EmailNotifier, LogNotifier, NotificationSink};
use pricewatch::scheduler::MonitorLoop;
use pricewatch::store::{ProductStore, SqliteProductStore};
use pricewatch::web::{self, AppState};

#[derive(Parser)]
#[command(name = "pricewatch", version, about = "Amazon/Flipkart price tracking and alerting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the dashboard and the periodic monitor (default)
    Serve,
    /// Start tracking a product URL
    Add { url: String },
    /// Run one reconciliation pass and print the summary
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    // The guard flushes buffered log lines on drop
    let _guard = init_tracing(&config)?;
    info!("Starting pricewatch...");

    if config.metrics.enabled {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], config.metrics.port))
            .install()?;
        info!(port = config.metrics.port, "Prometheus exporter listening");
    }

    let store: Arc<dyn ProductStore> =
        Arc::new(SqliteProductStore::connect(&config.database).await?);

    let sink: Arc<dyn NotificationSink> =
        match EmailNotifier::from_config(&config.notifications.smtp)? {
            Some(notifier) => Arc::new(notifier),
            None => {
                info!("SMTP not configured; alerts go to the application log");
                Arc::new(LogNotifier)
            }
        };

    let fetcher = PageFetcher::new(&config.fetcher)?;
    let monitor = Arc::new(PriceMonitor::new(Arc::clone(&store), sink, fetcher));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let handle = MonitorLoop::new(Arc::clone(&monitor), &config.monitor).spawn();

            let state = AppState { monitor, store, config };
            web::serve(state).await?;

            handle.shutdown().await;
            info!("Shutting down...");
        }
        Command::Add { url } => {
            let product = monitor.add_product(&url).await?;
            println!(
                "Tracking {} ({}) at {}",
                product.name, product.platform, product.url
            );
        }
        Command::Check => {
            let summary = monitor.run_pass().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(&config.logging.directory)?;

    let file_appender =
        tracing_appender::rolling::daily(&config.logging.directory, "pricewatch.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pricewatch=debug,tower_http=info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}
