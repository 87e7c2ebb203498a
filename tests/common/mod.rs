//! Shared fixtures: an in-process upstream that answers by URL pattern.

#![allow(dead_code)]

use async_trait::async_trait;
use chainfolio_sdk::client::ChainfolioClient;
use chainfolio_sdk::http::{Transport, TransportError, UpstreamRequest, UpstreamResponse};
use chainfolio_sdk::query::RetryPolicy;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub const WALLET: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
pub const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
pub const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

#[derive(Clone)]
pub enum Reply {
    Json(u16, String),
    Delayed(Duration, u16, String),
    Hang,
}

/// Answers the first route whose pattern is a substring of the URL.
#[derive(Default)]
pub struct MockUpstream {
    routes: Mutex<Vec<(String, Reply)>>,
    log: Mutex<Vec<(Instant, UpstreamRequest)>>,
}

impl MockUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, pattern: &str, reply: Reply) {
        self.routes.lock().unwrap().push((pattern.to_string(), reply));
    }

    pub fn reset_routes(&self) {
        self.routes.lock().unwrap().clear();
    }

    pub fn json(&self, pattern: &str, status: u16, body: &str) {
        self.route(pattern, Reply::Json(status, body.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn calls_to(&self, pattern: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, r)| r.url.contains(pattern))
            .count()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.log.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.log.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }
}

#[async_trait]
impl Transport for MockUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let reply = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());
        self.log.lock().unwrap().push((Instant::now(), request.clone()));
        match reply {
            Some(Reply::Json(status, body)) => Ok(UpstreamResponse { status, body }),
            Some(Reply::Delayed(delay, status, body)) => {
                tokio::time::sleep(delay).await;
                Ok(UpstreamResponse { status, body })
            }
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(TransportError::Connect(format!("no route for {}", request.url))),
        }
    }
}

pub fn client(upstream: &Arc<MockUpstream>) -> ChainfolioClient {
    ChainfolioClient::builder()
        .base_url("https://upstream.test")
        .api_key("test-key")
        .transport(upstream.clone())
        .build()
        .unwrap()
}

pub fn client_with_retry(upstream: &Arc<MockUpstream>, retry: RetryPolicy) -> ChainfolioClient {
    ChainfolioClient::builder()
        .base_url("https://upstream.test")
        .api_key("test-key")
        .transport(upstream.clone())
        .retry(retry)
        .build()
        .unwrap()
}

pub fn current_value_body(total: f64) -> String {
    format!(
        r#"{{"result":{{"total":{total},"by_chain":[{{"chain_id":1,"chain_name":"Ethereum","value":{total}}}]}}}}"#
    )
}

pub fn events_body(count: usize) -> String {
    let items: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"id":"ev{i}","timeMs":{},"direction":"in","details":{{"txHash":"0x{:064x}","chainId":1,"status":"completed","type":"Transfer"}}}}"#,
                1_700_000_000_000i64 + i as i64 * 1000,
                i + 1
            )
        })
        .collect();
    format!(r#"{{"items":[{}],"cache_counter":1}}"#, items.join(","))
}
