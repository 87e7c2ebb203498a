//! HTTP surface — the gateway operations as axum routes under `/api`.
//!
//! Successful responses carry the upstream JSON untouched plus the
//! resource's `Cache-Control`. Failures return the [`ErrorEnvelope`] as JSON
//! with a status derived from its kind. Each route answers its own CORS
//! preflight.

use crate::chain::ChainSupport;
use crate::config::ServerConfig;
use crate::error::{ErrorEnvelope, ErrorKind};
use crate::http::{GatewayResponse, ProviderHttp};
use crate::shared::{ChainId, EvmAddress, TimeRange, TokenAmount, TxHash};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub gateway: ProviderHttp,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::AuthError => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::UpstreamError | ErrorKind::NetworkError | ErrorKind::ParseError => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::NetworkTimeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        let status = status_for(self.kind);
        (
            status,
            [(CACHE_CONTROL, HeaderValue::from_static("no-store"))],
            Json(self),
        )
            .into_response()
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let cache_control = HeaderValue::from_str(&self.cache_control.header_value())
            .unwrap_or_else(|_| HeaderValue::from_static("no-store"));
        (StatusCode::OK, [(CACHE_CONTROL, cache_control)], Json(self.data)).into_response()
    }
}

type ApiResult = Result<GatewayResponse, ErrorEnvelope>;

pub fn app_router(gateway: ProviderHttp, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState { gateway });
    let origins = allow_origin(&config.cors_allow);
    let route = |method: Method, router: MethodRouter<Arc<AppState>>| {
        router.layer(
            CorsLayer::new()
                .allow_origin(origins.clone())
                .allow_methods([method, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION]),
        )
    };

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/chains", route(Method::GET, get(list_chains)))
        .route("/portfolio/current-value", route(Method::GET, get(current_value)))
        .route("/portfolio/value-history", route(Method::GET, get(value_history)))
        .route("/prices/{chain_id}", route(Method::POST, post(token_prices)))
        .route("/history/{address}/events", route(Method::GET, get(transaction_events)))
        .route(
            "/history/{chain_id}/transaction/{tx_hash}",
            route(Method::GET, get(transaction_detail)),
        )
        .route("/swap/{chain_id}/quote", route(Method::GET, get(swap_quote)))
        .route("/swap/{chain_id}/allowance", route(Method::GET, get(allowance)));

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn allow_origin(configured: &[String]) -> AllowOrigin {
    if configured.is_empty() || configured.iter().any(|o| o == "*") {
        return AllowOrigin::from(Any);
    }
    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(origins)
}

// ── Parameter parsing ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Params {
    address: Option<String>,
    chain_id: Option<String>,
    timerange: Option<String>,
    limit: Option<String>,
    src: Option<String>,
    dst: Option<String>,
    amount: Option<String>,
    token_address: Option<String>,
    wallet_address: Option<String>,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ErrorEnvelope> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ErrorEnvelope::validation(format!("missing query parameter `{}`", name)))
}

fn parse_limit(raw: Option<&str>) -> Result<u32, ErrorEnvelope> {
    match raw {
        None => Ok(crate::shared::HistoryLimit::default().get()),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ErrorEnvelope::validation(format!("limit must be an integer, got {:?}", raw))),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChainEntry {
    id: u64,
    short_name: &'static str,
    is_testnet: bool,
    support: ChainSupport,
}

async fn list_chains(State(state): State<Arc<AppState>>) -> Json<Vec<ChainEntry>> {
    let registry = state.gateway.chains();
    Json(
        registry
            .all()
            .iter()
            .map(|c| ChainEntry {
                id: c.id,
                short_name: c.short_name,
                is_testnet: c.is_testnet,
                support: registry.classify(c.chain_id()),
            })
            .collect(),
    )
}

async fn current_value(State(state): State<Arc<AppState>>, Query(p): Query<Params>) -> ApiResult {
    let address = EvmAddress::parse(required(&p.address, "address")?)?;
    let chain_id: ChainId = required(&p.chain_id, "chainId")?.parse()?;
    state.gateway.current_value(&address, chain_id).await
}

async fn value_history(State(state): State<Arc<AppState>>, Query(p): Query<Params>) -> ApiResult {
    let address = EvmAddress::parse(required(&p.address, "address")?)?;
    let chain_id: ChainId = required(&p.chain_id, "chainId")?.parse()?;
    let range = match p.timerange.as_deref() {
        Some(raw) => raw.parse::<TimeRange>()?,
        None => TimeRange::default(),
    };
    state.gateway.value_history(&address, chain_id, range).await
}

#[derive(Debug, Deserialize)]
struct PriceBody {
    tokens: Vec<String>,
}

async fn token_prices(
    State(state): State<Arc<AppState>>,
    Path(chain_id): Path<String>,
    body: Result<Json<PriceBody>, JsonRejection>,
) -> ApiResult {
    let chain_id: ChainId = chain_id.parse()?;
    let Json(body) = body.map_err(|e| ErrorEnvelope::validation(e.body_text()))?;
    let tokens = body
        .tokens
        .iter()
        .map(|t| EvmAddress::parse(t))
        .collect::<Result<Vec<_>, _>>()?;
    state.gateway.token_prices(chain_id, &tokens).await
}

async fn transaction_events(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(p): Query<Params>,
) -> ApiResult {
    let address = EvmAddress::parse(&address)?;
    let chain_id: ChainId = required(&p.chain_id, "chainId")?.parse()?;
    let limit = parse_limit(p.limit.as_deref())?;
    state.gateway.transaction_events(&address, chain_id, limit).await
}

async fn transaction_detail(
    State(state): State<Arc<AppState>>,
    Path((chain_id, tx_hash)): Path<(String, String)>,
) -> ApiResult {
    let chain_id: ChainId = chain_id.parse()?;
    let tx_hash = TxHash::parse(&tx_hash)?;
    state.gateway.transaction_detail(chain_id, &tx_hash).await
}

async fn swap_quote(
    State(state): State<Arc<AppState>>,
    Path(chain_id): Path<String>,
    Query(p): Query<Params>,
) -> ApiResult {
    let chain_id: ChainId = chain_id.parse()?;
    let src = EvmAddress::parse(required(&p.src, "src")?)?;
    let dst = EvmAddress::parse(required(&p.dst, "dst")?)?;
    let amount = TokenAmount::parse(required(&p.amount, "amount")?)?;
    state.gateway.swap_quote(chain_id, &src, &dst, &amount).await
}

async fn allowance(
    State(state): State<Arc<AppState>>,
    Path(chain_id): Path<String>,
    Query(p): Query<Params>,
) -> ApiResult {
    let chain_id: ChainId = chain_id.parse()?;
    let token = EvmAddress::parse(required(&p.token_address, "tokenAddress")?)?;
    let wallet = EvmAddress::parse(required(&p.wallet_address, "walletAddress")?)?;
    state.gateway.allowance(chain_id, &token, &wallet).await
}
