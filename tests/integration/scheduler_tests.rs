use std::sync::Arc;
use std::time::Duration;

use pricewatch::config::MonitorConfig;
use pricewatch::models::Platform;
use pricewatch::scheduler::MonitorLoop;
use pricewatch::store::ProductStore;
use wiremock::MockServer;

use super::*;

#[tokio::test]
async fn test_spawned_loop_reconciles_on_schedule() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    serve_page(&server, "/phone/p/1", flipkart_page("Pixel 8a", "899")).await;

    let store = create_test_store().await?;
    let sink = Arc::new(RecordingSink::new());
    let monitor = create_test_monitor(Arc::clone(&store), Arc::clone(&sink))?;

    let url = format!("{}/phone/p/1", server.uri());
    track_product(&store, &url, "Pixel 8a", "999.99", Platform::Flipkart).await?;

    let handle = MonitorLoop::new(monitor, &MonitorConfig { check_interval: 1 }).spawn();

    let updated = wait_for_condition(
        || {
            let store = Arc::clone(&store);
            let url = url.clone();
            async move {
                matches!(
                    store.find_by_url(&url).await,
                    Ok(Some(product)) if product.price == dec("899.00")
                )
            }
        },
        5,
    )
    .await;
    handle.shutdown().await;

    assert!(updated, "scheduled pass should have persisted the new price");
    assert!(sink.price_change_count() >= 1);
    Ok(())
}

#[tokio::test]
async fn test_shutdown_stops_future_passes() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    serve_page(&server, "/phone/p/1", flipkart_page("Pixel 8a", "999.99")).await;

    let store = create_test_store().await?;
    let sink = Arc::new(RecordingSink::new());
    let monitor = create_test_monitor(Arc::clone(&store), Arc::clone(&sink))?;

    let url = format!("{}/phone/p/1", server.uri());
    track_product(&store, &url, "Pixel 8a", "999.99", Platform::Flipkart).await?;

    let handle = MonitorLoop::new(monitor, &MonitorConfig { check_interval: 1 }).spawn();

    let first_pass_done = wait_for_condition(
        || {
            let server = &server;
            async move {
                server
                    .received_requests()
                    .await
                    .map(|requests| !requests.is_empty())
                    .unwrap_or(false)
            }
        },
        5,
    )
    .await;
    assert!(first_pass_done, "loop should have fetched at least once");

    // shutdown joins the task, so no request can be in flight afterwards
    handle.shutdown().await;
    let at_shutdown = server.received_requests().await.map(|r| r.len()).unwrap_or(0);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let later = server.received_requests().await.map(|r| r.len()).unwrap_or(0);
    assert_eq!(later, at_shutdown);
    Ok(())
}
