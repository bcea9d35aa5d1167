use std::sync::Arc;

use ethers::abi::Token;
use ethers::types::U256;

use crate::codec::{parse_order_hash, parse_signature_bytes, parse_uint};
use crate::domain::{FillLimitOrderInput, OrderData};
use crate::execution::errors::SdkError;
use crate::execution::{ContractAbi, ContractCallInput};
use crate::logging::log_tx;
use crate::sdk::{SdkConfig, SdkMethods};

/// The settlement contract's `Order` tuple, in ABI field order.
pub fn order_tuple(order: &OrderData) -> Result<Token, SdkError> {
    let nonce_and_meta = parse_uint("nonceAndMeta", &order.nonce_and_meta, true)?;
    let maker_amount = parse_uint("makerAmount", &order.maker_amount, false)?;
    let taker_amount = parse_uint("takerAmount", &order.taker_amount, false)?;

    Ok(Token::Tuple(vec![
        Token::Uint(nonce_and_meta),
        Token::Uint(U256::from(order.expiry)),
        Token::Address(order.maker_asset),
        Token::Address(order.taker_asset),
        Token::Address(order.maker),
        Token::Address(order.taker),
        Token::Uint(maker_amount),
        Token::Uint(taker_amount),
    ]))
}

fn order_hash_token(order_hash: &str) -> Result<Token, SdkError> {
    Ok(Token::FixedBytes(parse_order_hash(order_hash)?.to_vec()))
}

fn fill_call(order: &FillLimitOrderInput) -> Result<(&'static str, Vec<Token>), SdkError> {
    let tuple = order_tuple(&order.order_data)?;
    let signature = Token::Bytes(parse_signature_bytes(&order.signature)?);

    match order.fill_amount.as_deref() {
        None => Ok(("fillOrder", vec![tuple, signature])),
        Some(amount) => {
            let fill = parse_uint("fillAmount", amount, false)?;
            let total = parse_uint("takerAmount", &order.order_data.taker_amount, false)?;
            if fill > total {
                return Err(SdkError::validation(format!(
                    "fillAmount {} exceeds takerAmount {}",
                    fill, total
                )));
            }
            Ok(("partialFillOrder", vec![tuple, signature, Token::Uint(fill)]))
        }
    }
}

// ==================================================
// CANCEL
// ==================================================

/// `cancel_limit_order` and `cancel_limit_order_bulk`.
pub fn construct_cancel_limit_order<Tx: Send + 'static>(
    config: &Arc<SdkConfig<Tx>>,
) -> SdkMethods<Tx> {
    let single = config.clone();
    let bulk = config.clone();

    SdkMethods::default()
        .with_cancel_limit_order(move |order_hash: String| {
            let config = single.clone();
            async move {
                let hash = order_hash_token(&order_hash)?;
                let caller = config.contract_caller()?;
                let tx = caller
                    .transact(ContractCallInput {
                        address: config.settlement_address()?,
                        abi: ContractAbi::Settlement,
                        method: "cancelOrder",
                        args: vec![hash],
                    })
                    .await?;
                log_tx("cancelOrder", &order_hash);
                Ok(tx)
            }
        })
        .with_cancel_limit_order_bulk(move |order_hashes: Vec<String>| {
            let config = bulk.clone();
            async move {
                if order_hashes.is_empty() {
                    return Err(SdkError::validation("no order hashes to cancel"));
                }
                let hashes = order_hashes
                    .iter()
                    .map(|hash| order_hash_token(hash))
                    .collect::<Result<Vec<_>, _>>()?;

                let caller = config.contract_caller()?;
                let tx = caller
                    .transact(ContractCallInput {
                        address: config.settlement_address()?,
                        abi: ContractAbi::Settlement,
                        method: "cancelOrders",
                        args: vec![Token::Array(hashes)],
                    })
                    .await?;
                log_tx("cancelOrders", &format!("{} orders", order_hashes.len()));
                Ok(tx)
            }
        })
}

// ==================================================
// FILL
// ==================================================

/// `fill_limit_order`: full fill, or partial when `fill_amount` is set.
pub fn construct_fill_limit_order<Tx: Send + 'static>(
    config: &Arc<SdkConfig<Tx>>,
) -> SdkMethods<Tx> {
    let config = config.clone();

    SdkMethods::default().with_fill_limit_order(move |input: FillLimitOrderInput| {
        let config = config.clone();
        async move {
            let (method, args) = fill_call(&input)?;
            let caller = config.contract_caller()?;
            let tx = caller
                .transact(ContractCallInput {
                    address: config.settlement_address()?,
                    abi: ContractAbi::Settlement,
                    method,
                    args,
                })
                .await?;
            log_tx(method, &input.order_data.order_hash);
            Ok(tx)
        }
    })
}
