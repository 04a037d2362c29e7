use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

use coinsignal::config::MarketConfig;
use coinsignal::market::{MarketDataClient, MarketFeed};

fn test_config(url: &str) -> MarketConfig {
    MarketConfig {
        api_url: url.to_string(),
        top_limit: 50,
        poll_interval_secs: 60,
        request_timeout_secs: 5,
    }
}

fn client_for(url: &str) -> MarketDataClient {
    // tiny backoff so retry exhaustion stays fast
    MarketDataClient::new(&test_config(url)).with_backoff_base(Duration::from_millis(10))
}

fn rows_json(count: usize, start: usize) -> String {
    let rows: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("coin{}", start + i),
                "symbol": format!("c{}", start + i),
                "current_price": 10.0 + i as f64,
                "price_change_24h": 0.5,
                "price_change_percentage_24h": 2.5,
                "total_volume": 1_000.0,
                "market_cap": 50_000.0,
            })
        })
        .collect();
    serde_json::to_string(&rows).unwrap()
}

#[tokio::test]
async fn test_list_top_markets_pages_past_provider_cap() {
    let mut server = mockito::Server::new_async().await;

    let page1 = server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("per_page".into(), "250".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rows_json(250, 0))
        .create_async()
        .await;

    let page2 = server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("per_page".into(), "50".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rows_json(50, 250))
        .create_async()
        .await;

    let client = client_for(&server.url());
    let snapshots = client.list_top_markets(300).await.unwrap();

    assert_eq!(snapshots.len(), 300);
    assert_eq!(snapshots[0].symbol, "C0");
    assert_eq!(snapshots[0].price, 10.0);
    assert_eq!(snapshots[0].pct_change_24h, 2.5);
    assert_eq!(snapshots[299].symbol, "C299");

    page1.assert_async().await;
    page2.assert_async().await;
}

#[tokio::test]
async fn test_list_top_markets_stops_on_short_page() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rows_json(2, 0))
        .create_async()
        .await;

    let page2 = server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let snapshots = client.list_top_markets(300).await.unwrap();

    assert_eq!(snapshots.len(), 2);
    page2.assert_async().await;
}

#[tokio::test]
async fn test_retry_exhaustion_falls_back_to_sample_data() {
    let mut server = mockito::Server::new_async().await;

    // initial attempt + 3 retries
    let failing = server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(4)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let snapshots = client.list_top_markets(50).await.unwrap();

    // never an empty state: the built-in sample comes back
    let symbols: Vec<&str> = snapshots.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "ETH", "BNB", "SOL", "XRP"]);

    failing.assert_async().await;
}

#[tokio::test]
async fn test_global_stats_parses_provider_shape() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/global")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": {
                    "total_market_cap": { "usd": 2.5e12, "eur": 2.2e12 },
                    "total_volume": { "usd": 9.0e10 },
                    "market_cap_percentage": { "btc": 52.3, "eth": 16.1 }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server.url());
    let stats = client.global_stats().await.unwrap();

    assert_eq!(stats.total_market_cap, 2.5e12);
    assert_eq!(stats.total_volume, 9.0e10);
    assert_eq!(stats.btc_dominance_pct, 52.3);
}

#[tokio::test]
async fn test_global_stats_falls_back_when_unreachable() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/global")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(4)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let stats = client.global_stats().await.unwrap();

    // sample-derived stats, BTC dominant
    assert!(stats.total_market_cap > 0.0);
    assert!(stats.btc_dominance_pct > 50.0);
}
