// Shared fixtures for the integration suite: a real SQLite-backed store,
// a recording notification sink, and stubbed product pages served over
// wiremock.

pub mod scheduler_tests;

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use rust_decimal::Decimal;
use tower::{Service, ServiceExt};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch::AppError;
use pricewatch::config::{
    AppConfig, DatabaseConfig, FetcherConfig, LoggingConfig, MetricsConfig, MonitorConfig,
    NotificationsConfig, ServerConfig, SmtpConfig,
};
use pricewatch::detector::Direction;
use pricewatch::fetcher::PageFetcher;
use pricewatch::models::{Platform, Product};
use pricewatch::monitor::PriceMonitor;
use pricewatch::notify::NotificationSink;
use pricewatch::store::{ProductStore, SqliteProductStore};
use pricewatch::web::AppState;

pub fn get_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: 5,
        },
        fetcher: FetcherConfig {
            request_timeout: 5,
            user_agent: "Mozilla/5.0 (integration tests)".to_string(),
        },
        monitor: MonitorConfig { check_interval: 600 },
        notifications: NotificationsConfig {
            smtp: SmtpConfig {
                host: "smtp.gmail.com".to_string(),
                port: 465,
                username: None,
                password: None,
                from_address: None,
                to_address: None,
                from_name: "Pricewatch".to_string(),
                use_tls: true,
            },
        },
        metrics: MetricsConfig {
            enabled: false,
            port: 9001,
        },
        logging: LoggingConfig {
            directory: "logs".to_string(),
        },
    }
}

pub async fn create_test_store() -> anyhow::Result<Arc<SqliteProductStore>> {
    let config = get_test_config();
    Ok(Arc::new(SqliteProductStore::connect(&config.database).await?))
}

pub fn create_test_monitor(
    store: Arc<SqliteProductStore>,
    sink: Arc<RecordingSink>,
) -> anyhow::Result<Arc<PriceMonitor>> {
    let config = get_test_config();
    let fetcher = PageFetcher::new(&config.fetcher)?;
    Ok(Arc::new(PriceMonitor::new(store, sink, fetcher)))
}

pub async fn create_test_app_state(
    store: Arc<SqliteProductStore>,
    sink: Arc<RecordingSink>,
) -> anyhow::Result<AppState> {
    let monitor = create_test_monitor(Arc::clone(&store), sink)?;
    let store: Arc<dyn ProductStore> = store;
    Ok(AppState {
        monitor,
        store,
        config: get_test_config(),
    })
}

/// One notification delivery attempt observed by the sink.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    PriceChange {
        name: String,
        old_price: Decimal,
        new_price: Decimal,
        direction: Direction,
    },
    NoChangesSummary,
}

/// Captures every delivery attempt so tests can assert on notification
/// behavior across a whole pass. The failing variant still records the
/// attempt before reporting the delivery as broken.
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
    fail_deliveries: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_deliveries: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_deliveries: true,
        }
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn price_change_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, SinkEvent::PriceChange { .. }))
            .count()
    }

    pub fn summary_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, SinkEvent::NoChangesSummary))
            .count()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send_price_change(
        &self,
        product: &Product,
        old_price: Decimal,
        direction: Direction,
    ) -> pricewatch::Result<()> {
        self.events.lock().unwrap().push(SinkEvent::PriceChange {
            name: product.name.clone(),
            old_price,
            new_price: product.price,
            direction,
        });
        if self.fail_deliveries {
            return Err(AppError::Notification("delivery refused".to_string()));
        }
        Ok(())
    }

    async fn send_no_changes_summary(&self) -> pricewatch::Result<()> {
        self.events.lock().unwrap().push(SinkEvent::NoChangesSummary);
        if self.fail_deliveries {
            return Err(AppError::Notification("delivery refused".to_string()));
        }
        Ok(())
    }
}

/// Inserts a product directly, bypassing the add flow, so passes can start
/// from a known stored price.
pub async fn track_product(
    store: &SqliteProductStore,
    url: &str,
    name: &str,
    price: &str,
    platform: Platform,
) -> anyhow::Result<Product> {
    let product = Product::new(url, name, dec(price), platform);
    store.insert(&product).await?;
    Ok(product)
}

pub async fn serve_page(server: &MockServer, route: &str, markup: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(markup))
        .mount(server)
        .await;
}

pub fn flipkart_page(name: &str, price: &str) -> String {
    format!(
        r#"<html><body>
            <span class="VU-ZEz">{name}</span>
            <div class="Nx9bqj">₹{price}</div>
        </body></html>"#
    )
}

pub fn amazon_page(title: &str, whole: &str, fraction: &str) -> String {
    format!(
        r#"<html><body>
            <span id="productTitle">{title}</span>
            <span class="a-price-whole">{whole}</span>
            <span class="a-price-fraction">{fraction}</span>
        </body></html>"#
    )
}

pub fn page_without_price(name: &str) -> String {
    format!(r#"<html><body><span class="VU-ZEz">{name}</span></body></html>"#)
}

/// Helper to make JSON API requests against the test app
pub async fn make_request(
    app: &mut Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> anyhow::Result<Response> {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder.body(Body::from(body.unwrap_or_default()))?;

    let response = ServiceExt::<Request<Body>>::ready(app).await?.call(request).await?;
    Ok(response)
}

/// Helper to submit the dashboard add-product form
pub async fn make_form_request(
    app: &mut Router,
    uri: &str,
    body: String,
) -> anyhow::Result<Response> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))?;

    let response = ServiceExt::<Request<Body>>::ready(app).await?.call(request).await?;
    Ok(response)
}

pub async fn response_body_string(response: Response) -> anyhow::Result<String> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Helper to wait for async operations
pub async fn wait_for_condition<F, Fut>(mut condition: F, timeout_seconds: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_secs(timeout_seconds);

    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    false
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}
