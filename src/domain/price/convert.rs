//! Conversions from wire types to price models.

use super::wire::PriceMapResponse;
use super::TokenPrices;
use crate::error::ErrorEnvelope;
use crate::shared::{ChainId, EvmAddress};

impl TokenPrices {
    /// Upstream keys are checksummed or lowercase; both normalize to the
    /// same [`EvmAddress`].
    pub(crate) fn from_wire(chain_id: ChainId, wire: PriceMapResponse) -> Result<Self, ErrorEnvelope> {
        let prices = wire
            .into_iter()
            .map(|(token, price)| {
                let token = EvmAddress::parse(&token)
                    .map_err(|_| ErrorEnvelope::parse(format!("price keyed by non-address {:?}", token)))?;
                Ok((token, price))
            })
            .collect::<Result<_, ErrorEnvelope>>()?;
        Ok(Self { chain_id, prices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decode;
    use crate::error::ErrorKind;
    use crate::resource::ResourceKind;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_string_and_number_prices() {
        let body = serde_json::json!({
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2": "3456.78",
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48": 1.0001
        });
        let wire: PriceMapResponse = decode(ResourceKind::TokenPrice, body).unwrap();
        let prices = TokenPrices::from_wire(ChainId(1), wire).unwrap();
        let weth = EvmAddress::parse("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap();
        assert_eq!(prices.get(&weth), Some(Decimal::from_str("3456.78").unwrap()));
        assert_eq!(prices.prices.len(), 2);
    }

    #[test]
    fn test_bad_key_is_parse_error() {
        let mut wire = PriceMapResponse::new();
        wire.insert("eth".into(), Decimal::ONE);
        let err = TokenPrices::from_wire(ChainId(1), wire).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
    }
}
