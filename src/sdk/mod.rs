//! SDK configuration and composition.
//!
//! A client is assembled from an [`SdkConfig`] and any subset of the
//! method-group constructors:
//!
//! ```ignore
//! let sdk = partial_sdk!(
//!     config,
//!     construct_build_limit_order,
//!     construct_sign_limit_order,
//!     construct_post_limit_order,
//! );
//! let signable = sdk.build_limit_order(input).await?;
//! ```

pub mod compose;

use std::fmt;
use std::sync::Arc;

use ethers::types::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::client::Fetcher;
use crate::codec;
use crate::execution::errors::SdkError;
use crate::execution::ContractCaller;

pub use compose::{
    construct_full_sdk, construct_partial_sdk, MethodConstructor, MethodFuture, PartialSdk,
    SdkMethods,
};

pub const DEFAULT_API_URL: &str = "https://api.paraswap.io/ft";

/// Where the order nonce (the salt packed into `nonceAndMeta`) comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaltSource {
    /// Use `OrderInput::nonce` as given. Builds are fully deterministic.
    #[default]
    Local,
    /// Replace the nonce with a random 64-bit value.
    Random,
    /// Reserve a nonce from the backend with one `GET /orders/nonce` round-trip.
    Server,
}

/// Shared, immutable configuration every composed method closes over.
///
/// Capabilities are optional so that partial configurations (for example a
/// read-only config without a contract caller) can still be composed. A
/// method that needs a missing capability fails when it is called.
pub struct SdkConfig<Tx = TxHash> {
    pub chain_id: u64,
    pub api_url: String,
    pub verifying_contract: Option<Address>,
    pub salt_source: SaltSource,
    pub fetcher: Option<Arc<dyn Fetcher>>,
    pub contract_caller: Option<Arc<dyn ContractCaller<TxResult = Tx>>>,
}

impl<Tx> Clone for SdkConfig<Tx> {
    fn clone(&self) -> Self {
        Self {
            chain_id: self.chain_id,
            api_url: self.api_url.clone(),
            verifying_contract: self.verifying_contract,
            salt_source: self.salt_source,
            fetcher: self.fetcher.clone(),
            contract_caller: self.contract_caller.clone(),
        }
    }
}

impl<Tx> fmt::Debug for SdkConfig<Tx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("chain_id", &self.chain_id)
            .field("api_url", &self.api_url)
            .field("verifying_contract", &self.verifying_contract)
            .field("salt_source", &self.salt_source)
            .field("fetcher", &self.fetcher.is_some())
            .field("contract_caller", &self.contract_caller.is_some())
            .finish()
    }
}

impl<Tx: Send + 'static> SdkConfig<Tx> {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            api_url: DEFAULT_API_URL.to_string(),
            verifying_contract: None,
            salt_source: SaltSource::Local,
            fetcher: None,
            contract_caller: None,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_verifying_contract(mut self, verifying_contract: Address) -> Self {
        self.verifying_contract = Some(verifying_contract);
        self
    }

    pub fn with_salt_source(mut self, salt_source: SaltSource) -> Self {
        self.salt_source = salt_source;
        self
    }

    pub fn with_fetcher<F: Fetcher + 'static>(self, fetcher: F) -> Self {
        self.with_shared_fetcher(Arc::new(fetcher))
    }

    /// Same as [`with_fetcher`](Self::with_fetcher), for a fetcher shared
    /// between several configurations.
    pub fn with_shared_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_contract_caller<C>(self, caller: C) -> Self
    where
        C: ContractCaller<TxResult = Tx> + 'static,
    {
        self.with_shared_contract_caller(Arc::new(caller))
    }

    pub fn with_shared_contract_caller(
        mut self,
        caller: Arc<dyn ContractCaller<TxResult = Tx>>,
    ) -> Self {
        self.contract_caller = Some(caller);
        self
    }

    pub fn fetcher(&self) -> Result<&Arc<dyn Fetcher>, SdkError> {
        self.fetcher.as_ref().ok_or_else(|| {
            SdkError::Configuration("this method requires a fetcher, none was configured".into())
        })
    }

    pub fn contract_caller(&self) -> Result<&Arc<dyn ContractCaller<TxResult = Tx>>, SdkError> {
        self.contract_caller.as_ref().ok_or_else(|| {
            SdkError::Configuration(
                "this method requires a contract caller, none was configured".into(),
            )
        })
    }

    /// Settlement contract: the configured override, else the known deployment.
    pub fn settlement_address(&self) -> Result<Address, SdkError> {
        if let Some(address) = self.verifying_contract {
            return Ok(address);
        }
        codec::settlement_address(self.chain_id).ok_or_else(|| {
            SdkError::Configuration(format!(
                "no settlement contract known for chain {}, set verifying_contract",
                self.chain_id
            ))
        })
    }

    pub(crate) fn api(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}
