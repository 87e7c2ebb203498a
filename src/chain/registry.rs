//! Default chain table.
//!
//! `provider_supported` reflects which networks the upstream portfolio API
//! indexes. Testnets are listed so they can be recognized and warned about,
//! not so they can be queried.

use super::ChainDescriptor;

const fn mainnet(id: u64, short_name: &'static str, provider_supported: bool) -> ChainDescriptor {
    ChainDescriptor {
        id,
        short_name,
        is_testnet: false,
        provider_supported,
    }
}

const fn testnet(id: u64, short_name: &'static str) -> ChainDescriptor {
    ChainDescriptor {
        id,
        short_name,
        is_testnet: true,
        provider_supported: false,
    }
}

pub const DEFAULT_CHAINS: &[ChainDescriptor] = &[
    // Provider-supported mainnets, in suggestion order.
    mainnet(1, "eth", true),
    mainnet(42161, "arb1", true),
    mainnet(10, "oeth", true),
    mainnet(8453, "base", true),
    mainnet(137, "matic", true),
    mainnet(56, "bnb", true),
    mainnet(43114, "avax", true),
    mainnet(100, "gno", true),
    mainnet(324, "zksync", true),
    mainnet(59144, "linea", true),
    mainnet(250, "ftm", true),
    mainnet(1313161554, "aurora", true),
    mainnet(8217, "klay", true),
    // Known mainnets the provider does not index.
    mainnet(1101, "zkevm", false),
    mainnet(5000, "mantle", false),
    mainnet(534352, "scr", false),
    mainnet(81457, "blast", false),
    mainnet(42220, "celo", false),
    // Testnets.
    testnet(11155111, "sep"),
    testnet(17000, "holesky"),
    testnet(5, "gor"),
    testnet(97, "bnbt"),
    testnet(80002, "amoy"),
    testnet(421614, "arb-sep"),
    testnet(11155420, "opsep"),
    testnet(84532, "basesep"),
    testnet(43113, "fuji"),
];
