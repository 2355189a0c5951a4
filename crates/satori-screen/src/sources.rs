//! Remote data sources: HTTP seam and payload parsing.
//!
//! Three public JSON endpoints feed the screen:
//!
//! - address explorer: `{"balance": .., "assets": {"SATORI": .., ..}}`
//! - network report: `{"Current Staking Requirement": .., "Current Neuron
//!   Version": .., "Competing Neurons": ..}`, which may contain bare `NaN`
//! - exchange ticker: `{"avg_price": ..}`
//!
//! Numbers may arrive as JSON numbers or numeric strings.

use serde_json::Value;

use crate::snapshot::{Asset, AssetBalances, NetworkStats};

/// Largest response body accepted from any endpoint
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, TLS or read failure
    Transport(String),
    /// Non-200 response
    Status(u16),
    ResponseTooLarge(usize),
    /// Body is not the expected JSON shape
    Parse(String),
}

impl core::fmt::Display for FetchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "Transport error: {}", msg),
            FetchError::Status(code) => write!(f, "HTTP {}", code),
            FetchError::ResponseTooLarge(size) => {
                write!(f, "Response too large: {} bytes", size)
            }
            FetchError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Blocking HTTP GET
///
/// Implementations return the body of a 200 response and an error for
/// everything else.
pub trait HttpClient {
    fn get(&mut self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, FetchError>;
}

/// Endpoint URLs
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    /// Address lookup; the address is appended
    pub address_prefix: String,
    pub network_stats: String,
    pub price: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            address_prefix: String::from("https://evr.cryptoscope.io/api/getaddress/?address="),
            network_stats: String::from(
                "https://satorinet.io/reports/daily/stats/predictors/latest",
            ),
            price: String::from("https://safe.trade/api/v2/trade/public/tickers/satoriusdt"),
        }
    }
}

impl Endpoints {
    pub fn address_url(&self, address: &str) -> String {
        format!("{}{}", self.address_prefix, address)
    }
}

pub const JSON_HEADERS: &[(&str, &str)] = &[("Accept", "application/json")];

/// The ticker rejects requests without a browser-like agent
pub const PRICE_HEADERS: &[(&str, &str)] =
    &[("User-Agent", "Mozilla/5.0"), ("Accept", "application/json")];

/// Balance and tracked assets held by one address
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AddressInfo {
    pub balance: f64,
    pub assets: AssetBalances,
}

pub fn parse_address_info(body: &[u8]) -> Result<AddressInfo, FetchError> {
    let value: Value = parse_json(body)?;
    let balance = match value.get("balance") {
        None | Some(Value::Null) => 0.0,
        Some(raw) => number(raw)
            .ok_or_else(|| FetchError::Parse(format!("balance is not numeric: {}", raw)))?,
    };

    let mut assets = AssetBalances::default();
    if let Some(held) = value.get("assets").and_then(Value::as_object) {
        for asset in Asset::ALL {
            if let Some(amount) = held.get(asset.symbol()).and_then(number) {
                assets.add(asset, amount);
            }
        }
    }
    Ok(AddressInfo { balance, assets })
}

/// Parse the network report. Missing, `null`, `NaN` or non-numeric fields
/// become `None` individually.
pub fn parse_network_stats(body: &[u8]) -> Result<NetworkStats, FetchError> {
    let text = core::str::from_utf8(body).map_err(|err| FetchError::Parse(err.to_string()))?;
    let normalized = nan_to_null(text);
    let value: Value = parse_json(normalized.as_bytes())?;

    let neuron_version = value
        .get("Current Neuron Version")
        .and_then(|raw| match raw {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    Ok(NetworkStats {
        stake_requirement: value.get("Current Staking Requirement").and_then(number),
        neuron_version,
        competing_neurons: value
            .get("Competing Neurons")
            .and_then(number)
            .filter(|n| *n >= 0.0)
            .map(|n| n as u64),
    })
}

pub fn parse_price(body: &[u8]) -> Result<f64, FetchError> {
    let value: Value = parse_json(body)?;
    value
        .get("avg_price")
        .and_then(number)
        .ok_or_else(|| FetchError::Parse(String::from("avg_price missing or not numeric")))
}

fn parse_json(body: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(body).map_err(|err| FetchError::Parse(err.to_string()))
}

/// Finite number from a JSON number or numeric string
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Replace bare `NaN` tokens with `null`, leaving string contents alone
fn nan_to_null(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
        } else if rest.starts_with("NaN") {
            out.push_str("null");
            rest = &rest[3..];
            continue;
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}
