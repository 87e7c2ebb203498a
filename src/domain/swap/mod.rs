//! Swap domain — indicative quotes and router allowances. Read-only: nothing
//! here builds or submits transactions.

pub mod client;
pub mod convert;
pub mod wire;

use crate::shared::{ChainId, EvmAddress, TokenAmount};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub chain_id: ChainId,
    pub src: EvmAddress,
    pub dst: EvmAddress,
    pub src_amount: TokenAmount,
    /// Base units of `dst`.
    pub dst_amount: String,
    pub src_decimals: Option<u8>,
    pub dst_decimals: Option<u8>,
    pub gas: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allowance {
    pub chain_id: ChainId,
    pub token: EvmAddress,
    pub wallet: EvmAddress,
    /// Base units.
    pub amount: String,
}

impl Allowance {
    pub fn is_zero(&self) -> bool {
        self.amount.bytes().all(|b| b == b'0')
    }

    /// Whether `needed` base units are already approved. Compares as
    /// arbitrary-length integers.
    pub fn covers(&self, needed: &TokenAmount) -> bool {
        let have = self.amount.trim_start_matches('0');
        let need = needed.as_str().trim_start_matches('0');
        have.len() > need.len() || (have.len() == need.len() && have >= need)
    }
}
