//! Conversions from wire types to swap models.

use super::wire::{AllowanceResponse, QuoteResponse};
use super::{Allowance, SwapQuote};
use crate::domain::base_units;
use crate::error::ErrorEnvelope;
use crate::shared::{ChainId, EvmAddress, TokenAmount};

impl SwapQuote {
    pub(crate) fn from_wire(
        chain_id: ChainId,
        src: EvmAddress,
        dst: EvmAddress,
        src_amount: TokenAmount,
        wire: QuoteResponse,
    ) -> Result<Self, ErrorEnvelope> {
        Ok(Self {
            chain_id,
            src,
            dst,
            src_amount,
            dst_amount: base_units("dstAmount", wire.dst_amount)?,
            src_decimals: wire.src_token.and_then(|t| t.decimals),
            dst_decimals: wire.dst_token.and_then(|t| t.decimals),
            gas: wire.gas,
        })
    }
}

impl Allowance {
    pub(crate) fn from_wire(
        chain_id: ChainId,
        token: EvmAddress,
        wallet: EvmAddress,
        wire: AllowanceResponse,
    ) -> Result<Self, ErrorEnvelope> {
        Ok(Self {
            chain_id,
            token,
            wallet,
            amount: base_units("allowance", wire.allowance)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decode;
    use crate::error::ErrorKind;
    use crate::resource::ResourceKind;

    fn usdc() -> EvmAddress {
        EvmAddress::parse("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap()
    }

    fn weth() -> EvmAddress {
        EvmAddress::parse("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap()
    }

    #[test]
    fn test_quote_with_token_info() {
        let body = serde_json::json!({
            "dstAmount": "289637581029485",
            "srcToken": {"address": usdc().as_str(), "symbol": "USDC", "decimals": 6},
            "dstToken": {"address": weth().as_str(), "symbol": "WETH", "decimals": 18},
            "gas": 185000
        });
        let wire: QuoteResponse = decode(ResourceKind::SwapQuote, body).unwrap();
        let amount = TokenAmount::parse("1000000").unwrap();
        let quote = SwapQuote::from_wire(ChainId(1), usdc(), weth(), amount, wire).unwrap();
        assert_eq!(quote.dst_amount, "289637581029485");
        assert_eq!(quote.src_decimals, Some(6));
        assert_eq!(quote.dst_decimals, Some(18));
        assert_eq!(quote.gas, Some(185000));
    }

    #[test]
    fn test_non_integer_allowance_is_parse_error() {
        let wire = AllowanceResponse {
            allowance: "12.5".into(),
        };
        let err = Allowance::from_wire(ChainId(1), usdc(), weth(), wire).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
    }
}
