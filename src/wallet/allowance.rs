use std::sync::Arc;

use ethers::abi::Token;

use crate::codec::{parse_address, parse_uint};
use crate::execution::{ContractAbi, ContractCallInput};
use crate::logging::log_tx;
use crate::sdk::{SdkConfig, SdkMethods};

// ===============================
// ERC-20 APPROVAL
// ===============================

/// `approve_token_for_limit_order(amount, token)`: lets the settlement
/// contract pull `amount` base units of `token` from the caller's account.
/// A zero amount revokes the allowance.
pub fn construct_approve_token_for_limit_order<Tx: Send + 'static>(
    config: &Arc<SdkConfig<Tx>>,
) -> SdkMethods<Tx> {
    let config = config.clone();

    SdkMethods::default().with_approve_token_for_limit_order(move |amount: String, token: String| {
        let config = config.clone();
        async move {
            let amount = parse_uint("amount", &amount, true)?;
            let token = parse_address("token", &token)?;

            let caller = config.contract_caller()?;
            let spender = config.settlement_address()?;
            let tx = caller
                .transact(ContractCallInput {
                    address: token,
                    abi: ContractAbi::Erc20,
                    method: "approve",
                    args: vec![Token::Address(spender), Token::Uint(amount)],
                })
                .await?;

            log_tx("approve", &format!("{} of {:?} for {:?}", amount, token, spender));
            Ok(tx)
        }
    })
}
