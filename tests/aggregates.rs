//! Multi-query views: the portfolio overview and the price ticker.

mod common;

use common::*;
use chainfolio_sdk::error::ErrorKind;
use chainfolio_sdk::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn wallet() -> EvmAddress {
    EvmAddress::parse(WALLET).unwrap()
}

fn symbol(s: &str) -> TokenSymbol {
    TokenSymbol::parse(s).unwrap()
}

#[tokio::test(start_paused = true)]
async fn overview_combines_supported_chains_only() {
    let upstream = MockUpstream::new();
    // "chain_id=1" is a prefix of "chain_id=137", so the longer pattern goes first
    upstream.json("chain_id=137", 200, &current_value_body(5.0));
    upstream.json("chain_id=1", 200, &current_value_body(20.0));
    let client = client(&upstream);

    let mut overview = client
        .portfolio()
        .overview(&wallet(), [ChainId(1), ChainId(137), ChainId(11155111)]);
    assert_eq!(overview.chains(), vec![ChainId(1), ChainId(137)]);

    let first = overview.snapshot();
    assert!(first.is_loading);

    let settled = overview.wait_settled().await;
    assert!(!settled.is_loading);
    assert!(settled.error.is_none());
    assert_eq!(settled.per_chain.len(), 2);
    assert_eq!(settled.total_usd().to_string(), "25");
    assert_eq!(upstream.calls(), 2);
    assert_eq!(upstream.calls_to("chain_id=11155111"), 0);
}

#[tokio::test(start_paused = true)]
async fn overview_chain_change_reuses_cached_members() {
    let upstream = MockUpstream::new();
    upstream.json("chain_id=8453", 200, &current_value_body(1.0));
    upstream.json("chain_id=1", 200, &current_value_body(2.0));
    let client = client(&upstream);

    let mut overview = client.portfolio().overview(&wallet(), [ChainId(1)]);
    overview.wait_settled().await;
    assert_eq!(upstream.calls(), 1);

    overview.set_chains([ChainId(1), ChainId(8453)]);
    let growing = overview.snapshot();
    assert_eq!(growing.per_chain.len(), 1);
    assert!(!growing.is_loading, "chain 1 stays on screen");
    assert!(growing.is_refetching);

    let settled = overview.wait_settled().await;
    assert_eq!(settled.per_chain.len(), 2);
    assert_eq!(upstream.calls(), 2);
    assert_eq!(upstream.calls_to("chain_id=8453"), 1);
}

#[tokio::test(start_paused = true)]
async fn overview_reports_member_failure_next_to_loaded_chains() {
    let upstream = MockUpstream::new();
    upstream.route(
        "chain_id=137",
        Reply::Delayed(Duration::from_millis(50), 500, "down".into()),
    );
    upstream.json("chain_id=1", 200, &current_value_body(7.0));
    let client = client_with_retry(&upstream, RetryPolicy::none());

    let mut overview = client.portfolio().overview(&wallet(), [ChainId(1), ChainId(137)]);
    let settled = overview.wait_settled().await;

    assert_eq!(settled.per_chain.len(), 1);
    assert!(settled.per_chain.contains_key(&ChainId(1)));
    let err = settled.error.expect("failed member surfaces");
    assert_eq!(err.kind, ErrorKind::UpstreamError);
}

fn ticker_client(upstream: &Arc<MockUpstream>) -> ChainfolioClient {
    let directory = StaticTokenDirectory::new()
        .with(ChainId(1), symbol("WETH"), EvmAddress::parse(WETH).unwrap())
        .with(ChainId(1), symbol("USDC"), EvmAddress::parse(USDC).unwrap());
    ChainfolioClient::builder()
        .base_url("https://upstream.test")
        .api_key("test-key")
        .transport(upstream.clone())
        .token_directory(Arc::new(directory))
        .build()
        .unwrap()
}

fn prices_body() -> String {
    format!(r#"{{"{WETH}":"3120.55","{USDC}":"0.9998"}}"#)
}

#[tokio::test(start_paused = true)]
async fn ticker_prices_each_symbol_once() {
    let upstream = MockUpstream::new();
    upstream.route(
        "/price/v1.1/1",
        Reply::Delayed(Duration::from_millis(20), 200, prices_body()),
    );
    let client = ticker_client(&upstream);

    let mut ticker = client.prices().ticker(ChainId(1), [symbol("WETH"), symbol("USDC")]);
    let settled = ticker.wait_settled().await;

    assert!(settled.error.is_none());
    assert_eq!(settled.quotes.len(), 2);
    assert_eq!(settled.quotes[&symbol("WETH")].price_usd.to_string(), "3120.55");
    assert_eq!(settled.quotes[&symbol("USDC")].price_usd.to_string(), "0.9998");
    assert_eq!(upstream.calls(), 2);

    // a one-off quote is served from the ticker's cache
    let quote = client.prices().quote(ChainId(1), &symbol("WETH")).await.unwrap();
    assert_eq!(quote.token.as_str(), WETH);
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn ticker_symbol_without_address_is_a_validation_error() {
    let upstream = MockUpstream::new();
    upstream.json("/price/v1.1/1", 200, &prices_body());
    let client = ticker_client(&upstream);

    let mut ticker = client.prices().ticker(ChainId(1), [symbol("WETH"), symbol("DOGE")]);
    let settled = ticker.wait_settled().await;

    assert_eq!(settled.quotes.len(), 1);
    let err = settled.error.expect("unknown symbol surfaces");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(upstream.calls(), 1);

    ticker.set_symbols([symbol("WETH")]);
    assert_eq!(ticker.symbols(), vec![symbol("WETH")]);
    let snapshot = ticker.snapshot();
    assert!(snapshot.error.is_none());
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn focus_revalidates_only_watched_queries() {
    let upstream = MockUpstream::new();
    upstream.json("chain_id=1", 200, &current_value_body(3.0));
    upstream.json("/events", 200, &events_body(1));
    let client = client(&upstream);

    client.history().events(&wallet(), ChainId(1), 10).await.unwrap();
    let mut overview = client.portfolio().overview(&wallet(), [ChainId(1)]);
    overview.wait_settled().await;
    assert_eq!(upstream.calls(), 2);

    assert_eq!(client.query().on_focus(), 1);
    let settled = overview.wait_settled().await;
    assert_eq!(settled.per_chain.len(), 1);
    assert_eq!(upstream.calls_to("current_value"), 2);
    assert_eq!(upstream.calls_to("/events"), 1);
}
