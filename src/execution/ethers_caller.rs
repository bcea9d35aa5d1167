use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::contract::{Contract, ContractError};
use ethers::middleware::SignerMiddleware;
use ethers::providers::Middleware;
use ethers::signers::Signer;
use ethers::types::transaction::eip712::TypedData;
use ethers::types::{Address, Signature, TxHash, U256};
use log::debug;

use super::{ContractAbi, ContractCallError, ContractCallInput, ContractCaller};

/// [`ContractCaller`] over an ethers `SignerMiddleware` (typically
/// `SignerMiddleware<Provider<Http>, LocalWallet>`). The acting account is
/// the signer's address.
///
/// Returns the transaction hash once the node accepts the transaction; it
/// does not wait for the receipt.
pub struct EthersContractCaller<M, S> {
    client: Arc<SignerMiddleware<M, S>>,
}

impl<M, S> Clone for EthersContractCaller<M, S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

fn classify<M: Middleware>(err: ContractError<M>) -> ContractCallError {
    if err.is_revert() {
        ContractCallError::Revert(err.to_string())
    } else {
        ContractCallError::Transport(err.to_string())
    }
}

impl<M: Middleware + 'static, S: Signer + 'static> EthersContractCaller<M, S> {
    pub fn new(client: Arc<SignerMiddleware<M, S>>) -> Self {
        Self { client }
    }

    /// ERC-20 allowance `owner` → `spender`. Read-only.
    pub async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ContractCallError> {
        let erc20 = Contract::new(token, ContractAbi::Erc20.load()?, self.client.clone());
        erc20
            .method::<_, U256>("allowance", (owner, spender))
            .map_err(|e| ContractCallError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl<M: Middleware + 'static, S: Signer + 'static> ContractCaller for EthersContractCaller<M, S> {
    type TxResult = TxHash;

    fn account(&self) -> Address {
        self.client.address()
    }

    async fn transact(&self, call: ContractCallInput) -> Result<TxHash, ContractCallError> {
        let contract = Contract::new(call.address, call.abi.load()?, self.client.clone());

        let tx = contract
            .method::<_, Token>(call.method, call.args.as_slice())
            .map_err(|e| ContractCallError::Abi(e.to_string()))?
            .from(self.account());

        let pending = tx.send().await.map_err(classify)?;
        let tx_hash = pending.tx_hash();
        debug!("{} sent to {:?}: {:?}", call.method, call.address, tx_hash);

        Ok(tx_hash)
    }

    async fn sign_typed_data(
        &self,
        typed_data: &TypedData,
    ) -> Result<Signature, ContractCallError> {
        self.client
            .signer()
            .sign_typed_data(typed_data)
            .await
            .map_err(|e| ContractCallError::Signer(e.to_string()))
    }
}
