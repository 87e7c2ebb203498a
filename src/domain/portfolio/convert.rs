//! Conversions from wire types to portfolio models.

use super::wire::{CurrentValueResponse, ValueChartResponse};
use super::{ChainValue, CurrentValue, ValueHistory, ValuePoint};
use crate::shared::{ChainId, EvmAddress, TimeRange};

impl CurrentValue {
    pub(crate) fn from_wire(
        address: EvmAddress,
        chain_id: ChainId,
        wire: CurrentValueResponse,
    ) -> Self {
        Self {
            address,
            chain_id,
            total_usd: wire.result.total,
            by_chain: wire
                .result
                .by_chain
                .into_iter()
                .map(|c| ChainValue {
                    chain_id: ChainId(c.chain_id),
                    chain_name: c.chain_name,
                    value_usd: c.value,
                })
                .collect(),
        }
    }
}

impl ValueHistory {
    pub(crate) fn from_wire(
        address: EvmAddress,
        chain_id: ChainId,
        range: TimeRange,
        wire: ValueChartResponse,
    ) -> Self {
        let mut points: Vec<ValuePoint> = wire
            .result
            .into_iter()
            .map(|p| ValuePoint {
                time: p.timestamp,
                value_usd: p.value_usd,
            })
            .collect();
        points.sort_by_key(|p| p.time);
        Self {
            address,
            chain_id,
            range,
            points,
        }
    }
}
