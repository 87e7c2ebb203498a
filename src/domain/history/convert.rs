//! Conversions from wire types to history models.

use super::wire::{HistoryEventWire, HistoryEventsResponse, TokenActionWire};
use super::{Direction, TokenAction, TransactionEvent, TransactionHistory};
use crate::domain::base_units;
use crate::error::ErrorEnvelope;
use crate::shared::{ChainId, TxHash};

impl TryFrom<HistoryEventWire> for TransactionEvent {
    type Error = ErrorEnvelope;

    fn try_from(e: HistoryEventWire) -> Result<Self, Self::Error> {
        let details = e.details;
        let tx_hash = TxHash::parse(&details.tx_hash)
            .map_err(|_| ErrorEnvelope::parse(format!("malformed txHash {:?}", details.tx_hash)))?;
        let fee = details
            .fee_in_smallest_native
            .map(|fee| base_units("feeInSmallestNative", fee))
            .transpose()?;
        Ok(Self {
            id: e.id,
            time: e.time_ms,
            chain_id: ChainId(details.chain_id),
            tx_hash,
            block_number: details.block_number,
            direction: Direction::from_wire(e.direction.as_deref()),
            kind: details.kind,
            status: details.status,
            from: details.from_address,
            to: details.to_address,
            fee,
            token_actions: details.token_actions.into_iter().map(TokenAction::from).collect(),
        })
    }
}

impl From<TokenActionWire> for TokenAction {
    fn from(a: TokenActionWire) -> Self {
        Self {
            token: a.address.to_ascii_lowercase(),
            standard: a.standard,
            from: a.from_address,
            to: a.to_address,
            amount: a.amount,
            direction: Direction::from_wire(a.direction.as_deref()),
        }
    }
}

impl TransactionHistory {
    pub(crate) fn from_wire(
        chain_id: ChainId,
        limit: u32,
        wire: HistoryEventsResponse,
    ) -> Result<Self, ErrorEnvelope> {
        let mut events = wire
            .items
            .into_iter()
            .map(TransactionEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        events.sort_by(|a, b| b.time.cmp(&a.time));
        Ok(Self {
            chain_id,
            limit,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decode;
    use crate::error::ErrorKind;
    use crate::resource::ResourceKind;

    const HASH: &str = "0x8f2b0c1f8f4b9d2c6a3e5d7f1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e";

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "items": [
                {
                    "id": "older",
                    "timeMs": 1700000000000i64,
                    "direction": "out",
                    "details": {
                        "txHash": HASH,
                        "chainId": 1,
                        "blockNumber": 18500000,
                        "status": "completed",
                        "type": "Transfer",
                        "feeInSmallestNative": "420000000000000",
                        "tokenActions": [{
                            "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                            "standard": "ERC20",
                            "amount": "1000000",
                            "direction": "Out"
                        }]
                    }
                },
                {
                    "id": "newer",
                    "timeMs": 1700000600000i64,
                    "direction": "in",
                    "details": {"txHash": HASH, "chainId": 1, "status": "failed"}
                }
            ],
            "cache_counter": 3
        })
    }

    #[test]
    fn test_history_sorted_newest_first() {
        let wire: HistoryEventsResponse = decode(ResourceKind::TransactionEvents, sample()).unwrap();
        let history = TransactionHistory::from_wire(ChainId(1), 50, wire).unwrap();
        assert_eq!(history.events.len(), 2);
        assert_eq!(history.events[0].id.as_deref(), Some("newer"));
        assert!(history.events[0].is_failed());
        assert!(history.is_complete());

        let older = &history.events[1];
        assert_eq!(older.direction, Direction::Out);
        assert_eq!(older.fee.as_deref(), Some("420000000000000"));
        assert_eq!(older.token_actions[0].token, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        assert_eq!(older.token_actions[0].direction, Direction::Out);
        assert_eq!(older.time.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_bad_hash_is_parse_error() {
        let mut body = sample();
        body["items"][0]["details"]["txHash"] = serde_json::json!("0x1234");
        let wire: HistoryEventsResponse = decode(ResourceKind::TransactionEvents, body).unwrap();
        let err = TransactionHistory::from_wire(ChainId(1), 50, wire).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
    }
}
