//! Order codec: human-readable [`OrderInput`] → chain-verifiable
//! [`SignableOrderData`], and signed data → [`LimitOrderToSend`].

pub mod typed_data;

use std::sync::Arc;

use ethers::types::{Address, U256};
use log::{debug, warn};
use serde_json::Value;

use crate::domain::{
    now_ts, LimitOrderToSend, OrderData, OrderDomain, OrderInput, SignableOrderData,
};
use crate::execution::errors::SdkError;
use crate::sdk::{SaltSource, SdkConfig, SdkMethods};

pub use typed_data::{
    encode_order_hash, order_message, order_types, recover_signer, DOMAIN_NAME, DOMAIN_VERSION,
    ORDER_PRIMARY_TYPE,
};

// ==================================================
// SETTLEMENT DEPLOYMENTS
// ==================================================

const SETTLEMENT_CONTRACTS: [(u64, &str); 7] = [
    (1, "0xe92b586627ccA7a83dC919cc7127196d70f55a06"),
    (10, "0x0927FD43a7a87E3E8b81Df2c44B03C4756849F6D"),
    (56, "0x8DcDfe88EF0351f27437284D0710cD65b64554c6"),
    (137, "0xF3CD476C3C4D3Ac5cA2724767f269070CA09A043"),
    (250, "0x2DF17455B96Dde3618FD6B1C3a9AA06D6aB89347"),
    (42161, "0x0927FD43a7a87E3E8b81Df2c44B03C4756849F6D"),
    (43114, "0x34302c4267d0dA0A8c65510282Cc22E9e39df51f"),
];

/// Known settlement (AugustusRFQ) deployment for `chain_id`.
pub fn settlement_address(chain_id: u64) -> Option<Address> {
    SETTLEMENT_CONTRACTS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .and_then(|(_, address)| address.parse().ok())
}

// ==================================================
// FIELD VALIDATION
// ==================================================

const NONCE_BITS: u32 = 96;

pub fn parse_address(field: &str, value: &str) -> Result<Address, SdkError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SdkError::validation(format!("{} is required", field)));
    }
    let hex_part = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| SdkError::validation(format!("{} must be 0x-prefixed: {}", field, value)))?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SdkError::validation(format!(
            "{} is not a valid address: {}",
            field, value
        )));
    }
    hex_part
        .parse::<Address>()
        .map_err(|e| SdkError::validation(format!("{} is not a valid address: {}", field, e)))
}

/// Parses a base-10 uint256. Leading zeros are accepted and dropped.
pub fn parse_uint(field: &str, value: &str, allow_zero: bool) -> Result<U256, SdkError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SdkError::validation(format!("{} is required", field)));
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(SdkError::validation(format!(
            "{} must be a base-10 integer, got {:?}",
            field, value
        )));
    }
    let parsed = U256::from_dec_str(value)
        .map_err(|_| SdkError::validation(format!("{} does not fit in uint256", field)))?;
    if parsed.is_zero() && !allow_zero {
        return Err(SdkError::validation(format!("{} must be positive", field)));
    }
    Ok(parsed)
}

pub fn parse_order_hash(value: &str) -> Result<[u8; 32], SdkError> {
    let bytes = decode_hex("orderHash", value)?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        SdkError::validation(format!("orderHash must be 32 bytes, got {}", bytes.len()))
    })
}

pub fn parse_signature_bytes(value: &str) -> Result<Vec<u8>, SdkError> {
    let bytes = decode_hex("signature", value)?;
    if bytes.len() != 65 {
        return Err(SdkError::validation(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, SdkError> {
    let value = value.trim();
    let hex_part = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(hex_part).map_err(|e| SdkError::validation(format!("{} is not hex: {}", field, e)))
}

// ==================================================
// BUILD
// ==================================================

struct ValidatedOrder {
    expiry: u64,
    maker_asset: Address,
    taker_asset: Address,
    maker: Address,
    taker: Address,
    maker_amount: U256,
    taker_amount: U256,
}

fn validate_order_input(input: &OrderInput, now: u64) -> Result<ValidatedOrder, SdkError> {
    let maker = parse_address("maker", &input.maker)?;
    if maker.is_zero() {
        return Err(SdkError::validation("maker cannot be the zero address"));
    }

    let maker_asset = parse_address("makerAsset", &input.maker_asset)?;
    let taker_asset = parse_address("takerAsset", &input.taker_asset)?;
    if maker_asset == taker_asset {
        return Err(SdkError::validation("makerAsset and takerAsset must differ"));
    }

    let taker = match input.taker.as_deref() {
        Some(taker) => parse_address("taker", taker)?,
        None => Address::zero(),
    };

    let maker_amount = parse_uint("makerAmount", &input.maker_amount, false)?;
    let taker_amount = parse_uint("takerAmount", &input.taker_amount, false)?;

    // settlement rejects it; the build itself stays a function of the input
    if input.expiry != 0 && input.expiry <= now {
        warn!("⚠️ expiry {} is not in the future (now {})", input.expiry, now);
    }

    Ok(ValidatedOrder {
        expiry: input.expiry,
        maker_asset,
        taker_asset,
        maker,
        taker,
        maker_amount,
        taker_amount,
    })
}

/// `(nonce << 160) | taker`
pub fn nonce_and_meta(nonce: u128, taker: Address) -> Result<U256, SdkError> {
    if nonce >> NONCE_BITS != 0 {
        return Err(SdkError::validation(format!(
            "nonce {} does not fit in {} bits",
            nonce, NONCE_BITS
        )));
    }
    Ok((U256::from(nonce) << 160) | U256::from_big_endian(taker.as_bytes()))
}

fn assemble(
    order: ValidatedOrder,
    nonce: u128,
    chain_id: u64,
    verifying_contract: Address,
) -> Result<SignableOrderData, SdkError> {
    let data = OrderData {
        nonce_and_meta: nonce_and_meta(nonce, order.taker)?.to_string(),
        expiry: order.expiry,
        maker_asset: order.maker_asset,
        taker_asset: order.taker_asset,
        maker: order.maker,
        taker: order.taker,
        maker_amount: order.maker_amount.to_string(),
        taker_amount: order.taker_amount.to_string(),
        order_hash: String::new(),
    };

    let mut signable = SignableOrderData {
        domain: OrderDomain {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        },
        types: order_types(),
        data,
    };
    signable.data.order_hash = encode_order_hash(signable.digest()?);

    Ok(signable)
}

/// Pure build step. `nonce` replaces `input.nonce`, so callers decide the
/// salt source; `now` is only used to warn about an already-passed expiry.
pub fn build_signable_order(
    input: &OrderInput,
    nonce: u128,
    chain_id: u64,
    verifying_contract: Address,
    now: u64,
) -> Result<SignableOrderData, SdkError> {
    let order = validate_order_input(input, now)?;
    assemble(order, nonce, chain_id, verifying_contract)
}

/// Re-derives the signable form of an already built order, e.g. one read
/// back from the backend. The stored `orderHash` is recomputed.
pub fn signable_from_order_data(
    data: &OrderData,
    chain_id: u64,
    verifying_contract: Address,
) -> Result<SignableOrderData, SdkError> {
    let mut signable = SignableOrderData {
        domain: OrderDomain {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        },
        types: order_types(),
        data: data.clone(),
    };
    signable.data.order_hash = encode_order_hash(signable.digest()?);
    Ok(signable)
}

pub fn to_limit_order_to_send(
    signable: &SignableOrderData,
    signature: impl Into<String>,
) -> LimitOrderToSend {
    LimitOrderToSend {
        data: signable.data.clone(),
        chain_id: signable.domain.chain_id,
        signature: signature.into(),
    }
}

async fn reserve_nonce<Tx: Send + 'static>(
    config: &SdkConfig<Tx>,
    maker: Address,
) -> Result<u128, SdkError> {
    let fetcher = config.fetcher()?;
    let url = url::Url::parse_with_params(
        &config.api("/orders/nonce"),
        &[
            ("maker", format!("{:?}", maker)),
            ("chainId", config.chain_id.to_string()),
        ],
    )
    .map_err(|e| SdkError::Configuration(format!("invalid api url: {}", e)))?;

    let response = fetcher.get(url.as_str()).await?;
    let nonce = match response.get("nonce") {
        Some(Value::String(nonce)) => nonce.parse::<u128>().ok(),
        Some(Value::Number(nonce)) => nonce.as_u64().map(u128::from),
        _ => None,
    };

    let nonce = nonce
        .ok_or_else(|| SdkError::submission(format!("backend returned no nonce: {}", response)))?;
    if nonce >> NONCE_BITS != 0 {
        return Err(SdkError::submission(format!(
            "backend returned an out-of-range nonce {}",
            nonce
        )));
    }
    Ok(nonce)
}

pub fn construct_build_limit_order<Tx: Send + 'static>(
    config: &Arc<SdkConfig<Tx>>,
) -> SdkMethods<Tx> {
    let config = config.clone();

    SdkMethods::default().with_build_limit_order(move |input: OrderInput| {
        let config = config.clone();
        async move {
            let verifying_contract = config.settlement_address()?;
            let order = validate_order_input(&input, now_ts())?;

            let nonce = match config.salt_source {
                SaltSource::Local => input.nonce,
                SaltSource::Random => u128::from(rand::random::<u64>()),
                SaltSource::Server => reserve_nonce(&config, order.maker).await?,
            };

            let signable = assemble(order, nonce, config.chain_id, verifying_contract)?;
            debug!(
                "built order {} for maker {:?} (nonce {})",
                signable.data.order_hash, signable.data.maker, nonce
            );
            Ok(signable)
        }
    })
}
