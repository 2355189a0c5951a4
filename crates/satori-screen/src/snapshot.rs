//! One aggregated reading of wallet, network and price data.

use serde::{Deserialize, Serialize};

/// Assets tracked on the screen. Anything else an address holds is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Satori,
    Lollipop,
}

impl Asset {
    pub const ALL: [Asset; 2] = [Asset::Satori, Asset::Lollipop];

    /// Ticker symbol as reported by the explorer
    pub fn symbol(self) -> &'static str {
        match self {
            Asset::Satori => "SATORI",
            Asset::Lollipop => "LOLLIPOP",
        }
    }
}

/// Per-asset totals over all configured addresses
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetBalances {
    #[serde(rename = "SATORI", default)]
    pub satori: f64,
    #[serde(rename = "LOLLIPOP", default)]
    pub lollipop: f64,
}

impl AssetBalances {
    pub fn get(&self, asset: Asset) -> f64 {
        match asset {
            Asset::Satori => self.satori,
            Asset::Lollipop => self.lollipop,
        }
    }

    pub fn add(&mut self, asset: Asset, amount: f64) {
        match asset {
            Asset::Satori => self.satori += amount,
            Asset::Lollipop => self.lollipop += amount,
        }
    }
}

/// Network statistics; every field is independently optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkStats {
    pub stake_requirement: Option<f64>,
    pub neuron_version: Option<String>,
    pub competing_neurons: Option<u64>,
}

/// Immutable reading produced once per aggregation cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Seconds since the Unix epoch (UTC)
    pub timestamp: u64,
    /// Native coin balance summed over all addresses
    pub balance: f64,
    pub asset_balances: AssetBalances,
    pub price: Option<f64>,
    pub neuron_version: Option<String>,
    pub competing_neuron_count: Option<u64>,
    pub stake_requirement: Option<f64>,
}

impl Snapshot {
    pub fn new(
        timestamp: u64,
        balance: f64,
        asset_balances: AssetBalances,
        stats: NetworkStats,
        price: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            balance,
            asset_balances,
            price,
            neuron_version: stats.neuron_version,
            competing_neuron_count: stats.competing_neurons,
            stake_requirement: stats.stake_requirement,
        }
    }

    /// Whether any network statistic is present
    pub fn has_network_stats(&self) -> bool {
        self.neuron_version.is_some()
            || self.competing_neuron_count.is_some()
            || self.stake_requirement.is_some()
    }
}
