use std::sync::Arc;

use log::debug;

use crate::domain::SignableOrderData;
use crate::execution::errors::SdkError;
use crate::sdk::{SdkConfig, SdkMethods};

/// `sign_limit_order`: EIP-712 signature from the caller's account, as a
/// 0x-prefixed 65-byte hex string. Only the order's maker may sign it.
pub fn construct_sign_limit_order<Tx: Send + 'static>(
    config: &Arc<SdkConfig<Tx>>,
) -> SdkMethods<Tx> {
    let config = config.clone();

    SdkMethods::default().with_sign_limit_order(move |signable: SignableOrderData| {
        let config = config.clone();
        async move {
            let caller = config.contract_caller()?;
            let account = caller.account();
            if account != signable.data.maker {
                return Err(SdkError::Signing(format!(
                    "account {:?} cannot sign for maker {:?}",
                    account, signable.data.maker
                )));
            }

            let typed_data = signable.to_typed_data()?;
            let signature = caller
                .sign_typed_data(&typed_data)
                .await
                .map_err(|e| SdkError::Signing(e.to_string()))?;

            debug!("🔏 signed order {}", signable.order_hash());
            Ok(format!("0x{}", hex::encode(signature.to_vec())))
        }
    })
}
