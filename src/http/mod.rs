//! Request gateway — `ProviderHttp` over a pluggable transport.

pub mod client;
pub mod transport;

pub use client::{GatewayResponse, ProviderHttp, MAX_PRICE_TOKENS};
pub use transport::{Method, Transport, TransportError, UpstreamRequest, UpstreamResponse};

#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
