pub mod errors;
pub mod ethers_caller;
pub mod orders;

use async_trait::async_trait;
use ethers::abi::{Abi, Token};
use ethers::types::transaction::eip712::TypedData;
use ethers::types::{Address, Signature};
use serde_json::from_slice;

pub use errors::{ContractCallError, ErrorKind, SdkError};
pub use ethers_caller::EthersContractCaller;

// ==================================================
// ABI LOADERS
// ==================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractAbi {
    /// AugustusRFQ settlement contract.
    Settlement,
    Erc20,
}

impl ContractAbi {
    pub fn load(&self) -> Result<Abi, ContractCallError> {
        let raw: &[u8] = match self {
            ContractAbi::Settlement => include_bytes!("../../abi/augustus_rfq.json"),
            ContractAbi::Erc20 => include_bytes!("../../abi/erc20.json"),
        };
        from_slice(raw).map_err(|e| ContractCallError::Abi(e.to_string()))
    }
}

/// One state-changing contract call.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCallInput {
    pub address: Address,
    pub abi: ContractAbi,
    pub method: &'static str,
    pub args: Vec<Token>,
}

// ==================================================
// CONTRACT CALLER CAPABILITY
// ==================================================

/// Chain capability, bound to the acting account.
///
/// `TxResult` is whatever the implementation returns for a submitted
/// transaction: a hash, a pending handle, or a mined receipt.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    type TxResult: Send + 'static;

    fn account(&self) -> Address;

    async fn transact(&self, call: ContractCallInput) -> Result<Self::TxResult, ContractCallError>;

    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature, ContractCallError>;
}
