//! Collects one snapshot from all remote sources.
//!
//! Aggregation never fails: each source degrades to its default and the
//! failure is logged.

use embedded_hal::delay::DelayNs;

use crate::keepalive::KeepAlive;
use crate::snapshot::{AssetBalances, NetworkStats, Snapshot};
use crate::sources::{
    parse_address_info, parse_network_stats, parse_price, AddressInfo, Endpoints, FetchError,
    HttpClient, JSON_HEADERS, PRICE_HEADERS,
};

/// Retry policy for address lookups
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    pub endpoints: Endpoints,
    /// Total attempts per address, including the first
    pub address_attempts: u32,
    /// Pause between attempts
    pub retry_backoff_ms: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            address_attempts: 3,
            retry_backoff_ms: 2_000,
        }
    }
}

pub struct Aggregator<C, D> {
    client: C,
    delay: D,
    config: AggregatorConfig,
}

impl<C, D> Aggregator<C, D>
where
    C: HttpClient,
    D: DelayNs,
{
    pub fn new(client: C, delay: D, config: AggregatorConfig) -> Self {
        Self {
            client,
            delay,
            config,
        }
    }

    /// Fetch everything and build the snapshot stamped with `timestamp`
    pub fn aggregate<K: KeepAlive>(
        &mut self,
        addresses: &[String],
        timestamp: u64,
        keepalive: &mut K,
    ) -> Snapshot {
        let mut balance = 0.0;
        let mut assets = AssetBalances::default();
        for address in addresses {
            if let Some(info) = self.fetch_address(address, keepalive) {
                balance += info.balance;
                assets.satori += info.assets.satori;
                assets.lollipop += info.assets.lollipop;
            }
        }

        let stats = self.fetch_network_stats(keepalive);
        let price = self.fetch_price(keepalive);

        log::info!(
            "Aggregated: balance={:.2} SATORI={:.2} price={:?} neurons={:?}",
            balance,
            assets.satori,
            price,
            stats.competing_neurons
        );
        Snapshot::new(timestamp, balance, assets, stats, price)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Bounded retries; `None` once every attempt failed
    fn fetch_address<K: KeepAlive>(&mut self, address: &str, keepalive: &mut K) -> Option<AddressInfo> {
        let url = self.config.endpoints.address_url(address);
        let attempts = self.config.address_attempts.max(1);

        for attempt in 1..=attempts {
            keepalive.feed();
            match self
                .client
                .get(&url, JSON_HEADERS)
                .and_then(|body| parse_address_info(&body))
            {
                Ok(info) => return Some(info),
                Err(err) => {
                    log::warn!(
                        "Address {} attempt {}/{} failed: {}",
                        address,
                        attempt,
                        attempts,
                        err
                    );
                    if attempt < attempts {
                        keepalive.feed();
                        self.delay.delay_ms(self.config.retry_backoff_ms);
                    }
                }
            }
        }
        log::warn!("Address {} contributes nothing this cycle", address);
        None
    }

    fn fetch_network_stats<K: KeepAlive>(&mut self, keepalive: &mut K) -> NetworkStats {
        keepalive.feed();
        let url = self.config.endpoints.network_stats.clone();
        self.fetch_once(&url, JSON_HEADERS, parse_network_stats)
            .unwrap_or_else(|err| {
                log::warn!("Network stats unavailable: {}", err);
                NetworkStats::default()
            })
    }

    fn fetch_price<K: KeepAlive>(&mut self, keepalive: &mut K) -> Option<f64> {
        keepalive.feed();
        let url = self.config.endpoints.price.clone();
        self.fetch_once(&url, PRICE_HEADERS, parse_price)
            .map_err(|err| log::warn!("Price unavailable: {}", err))
            .ok()
    }

    fn fetch_once<T>(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        parse: fn(&[u8]) -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let body = self.client.get(url, headers)?;
        parse(&body)
    }
}
