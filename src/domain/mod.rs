//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Typed models handed to the UI
//! - `wire.rs` — Raw serde structs matching upstream responses
//! - `convert.rs` — Wire → typed conversions; failures become `PARSE_ERROR`
//! - `client.rs` — Sub-client reading through the query cache

pub mod history;
pub mod portfolio;
pub mod price;
pub mod swap;

use crate::error::ErrorEnvelope;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;

/// Boxed upstream read as handed to the query cache.
pub(crate) type Fetch<T> = BoxFuture<'static, Result<T, ErrorEnvelope>>;

/// Decode a passed-through upstream body into its wire type.
pub(crate) fn decode<W: DeserializeOwned>(
    resource: crate::resource::ResourceKind,
    body: serde_json::Value,
) -> Result<W, ErrorEnvelope> {
    serde_json::from_value(body).map_err(|e| {
        ErrorEnvelope::parse(format!("unexpected {} response shape: {}", resource, e))
    })
}

/// Check a base-unit integer string coming back from upstream.
pub(crate) fn base_units(field: &str, value: String) -> Result<String, ErrorEnvelope> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ErrorEnvelope::parse(format!(
            "{} is not a base-unit integer: {:?}",
            field, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resource::ResourceKind;

    #[derive(Debug, serde::Deserialize)]
    struct Shape {
        #[allow(dead_code)]
        total: f64,
    }

    #[test]
    fn test_decode_shape_mismatch_is_parse_error() {
        let err = decode::<Shape>(ResourceKind::CurrentValue, serde_json::json!({"x": 1}))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert!(err.message.contains("current_value"));
    }

    #[test]
    fn test_base_units() {
        assert_eq!(base_units("dstAmount", "1000".into()).unwrap(), "1000");
        assert!(base_units("dstAmount", "".into()).is_err());
        assert!(base_units("dstAmount", "1e18".into()).is_err());
    }
}
