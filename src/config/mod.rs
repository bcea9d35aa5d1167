use clap::Parser;
use ethers::types::{Address, TxHash};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codec::parse_address;
use crate::domain::{to_base_units, OrderInput};
use crate::execution::errors::SdkError;
use crate::sdk::{SaltSource, SdkConfig, DEFAULT_API_URL};

/* =======================
CLI ARGS
======================= */

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "limit-orders.json")]
    pub config: PathBuf,

    /// Fill this order hash as taker instead of running the maker flow
    #[arg(long)]
    pub fill: Option<String>,

    /// Partial fill amount in taker-asset base units (full fill when omitted)
    #[arg(long, requires = "fill")]
    pub fill_amount: Option<String>,
}

/* =======================
MAIN CONFIG
======================= */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sdk: SdkSettings,
    pub order: OrderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkSettings {
    pub chain_id: u64,
    pub api_url: String,

    /// Settlement contract override, for chains without a known deployment
    #[serde(default)]
    pub verifying_contract: Option<String>,

    #[serde(default)]
    pub salt_source: SaltSource,

    #[serde(default = "default_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// The order the maker flow places. Amounts are human units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSettings {
    pub maker_asset: String,
    pub maker_decimals: u32,
    pub maker_amount: Decimal,

    pub taker_asset: String,
    pub taker_decimals: u32,
    pub taker_amount: Decimal,

    /// Private order counterparty; open to anyone when unset
    #[serde(default)]
    pub taker: Option<String>,

    /// 0 = never expires
    pub ttl_secs: u64,

    #[serde(default = "default_nonce")]
    pub nonce: u128,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_nonce() -> u128 {
    1
}

/* =======================
DEFAULT CONFIG
======================= */

impl Default for Config {
    fn default() -> Self {
        Self {
            sdk: SdkSettings {
                chain_id: 1,
                api_url: DEFAULT_API_URL.to_string(),
                verifying_contract: None,
                salt_source: SaltSource::Local,
                http_timeout_secs: default_timeout_secs(),
            },
            order: OrderSettings {
                // DAI → HEX
                maker_asset: "0x6B175474E89094C44Da98b954EedeAC495271d0F".to_string(),
                maker_decimals: 18,
                maker_amount: dec!(1),
                taker_asset: "0x2b591e99afe9f32eaa6214f7b7629768c40eeb39".to_string(),
                taker_decimals: 8,
                taker_amount: dec!(8),
                taker: None,
                ttl_secs: 7 * 24 * 60 * 60,
                nonce: default_nonce(),
            },
        }
    }
}

/* =======================
LOAD / CREATE CONFIG
======================= */

impl Config {
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            let cfg = Config::default();
            let content = serde_json::to_string_pretty(&cfg)?;
            std::fs::write(path, content)?;
            Ok(cfg)
        }
    }
}

impl SdkSettings {
    /// Capability-less [`SdkConfig`]; the binary attaches fetcher and caller.
    pub fn to_sdk_config(&self) -> Result<SdkConfig<TxHash>, SdkError> {
        let mut config = SdkConfig::new(self.chain_id)
            .with_api_url(self.api_url.as_str())
            .with_salt_source(self.salt_source);
        if let Some(contract) = self.verifying_contract.as_deref() {
            config = config.with_verifying_contract(parse_address("verifyingContract", contract)?);
        }
        Ok(config)
    }
}

impl OrderSettings {
    /// Wire-level input for `maker`, expiring `ttl_secs` after `now`.
    pub fn to_order_input(&self, maker: Address, now: u64) -> Result<OrderInput, SdkError> {
        let expiry = if self.ttl_secs == 0 {
            0
        } else {
            now + self.ttl_secs
        };

        Ok(OrderInput {
            nonce: self.nonce,
            expiry,
            maker_asset: self.maker_asset.clone(),
            taker_asset: self.taker_asset.clone(),
            maker_amount: to_base_units(self.maker_amount, self.maker_decimals)?,
            taker_amount: to_base_units(self.taker_amount, self.taker_decimals)?,
            maker: format!("{:?}", maker),
            taker: self.taker.clone(),
        })
    }
}

// ==================================================
// ENVIRONMENT HELPERS
// ==================================================

impl Config {
    /// Read-only unless READ_ONLY=false: nothing is signed on chain or posted.
    pub fn is_read_only() -> bool {
        std::env::var("READ_ONLY")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true)
    }
}
