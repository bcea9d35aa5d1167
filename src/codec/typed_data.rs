use std::collections::BTreeMap;
use std::str::FromStr;

use ethers::types::transaction::eip712::{Eip712, Eip712DomainType, TypedData, Types};
use ethers::types::{Address, Signature, H256};
use serde_json::{json, Value};

use crate::domain::{OrderData, SignableOrderData};
use crate::execution::errors::SdkError;

pub const DOMAIN_NAME: &str = "AUGUSTUS RFQ";
pub const DOMAIN_VERSION: &str = "1";
pub const ORDER_PRIMARY_TYPE: &str = "OrderRFQ";

/// Field order matters: it defines the type string the contract hashes.
const ORDER_FIELDS: [(&str, &str); 8] = [
    ("nonceAndMeta", "uint256"),
    ("expiry", "uint128"),
    ("makerAsset", "address"),
    ("takerAsset", "address"),
    ("maker", "address"),
    ("taker", "address"),
    ("makerAmount", "uint256"),
    ("takerAmount", "uint256"),
];

pub fn order_types() -> Types {
    let fields = ORDER_FIELDS
        .iter()
        .map(|(name, ty)| Eip712DomainType {
            name: name.to_string(),
            r#type: ty.to_string(),
        })
        .collect();

    let mut types = BTreeMap::new();
    types.insert(ORDER_PRIMARY_TYPE.to_string(), fields);
    types
}

/// The signed struct: every canonical field except `orderHash`.
pub fn order_message(data: &OrderData) -> Value {
    json!({
        "nonceAndMeta": data.nonce_and_meta,
        "expiry": data.expiry,
        "makerAsset": data.maker_asset,
        "takerAsset": data.taker_asset,
        "maker": data.maker,
        "taker": data.taker,
        "makerAmount": data.maker_amount,
        "takerAmount": data.taker_amount,
    })
}

impl SignableOrderData {
    /// `eth_signTypedData_v4` payload for this order.
    pub fn to_typed_data(&self) -> Result<TypedData, SdkError> {
        let payload = json!({
            "domain": {
                "name": self.domain.name,
                "version": self.domain.version,
                "chainId": self.domain.chain_id,
                "verifyingContract": self.domain.verifying_contract,
            },
            "types": self.types,
            "primaryType": ORDER_PRIMARY_TYPE,
            "message": order_message(&self.data),
        });

        serde_json::from_value(payload)
            .map_err(|e| SdkError::validation(format!("cannot build typed data: {}", e)))
    }

    /// Full EIP-712 digest: `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct)`.
    pub fn digest(&self) -> Result<[u8; 32], SdkError> {
        self.to_typed_data()?
            .encode_eip712()
            .map_err(|e| SdkError::validation(format!("cannot hash order: {}", e)))
    }
}

pub fn encode_order_hash(digest: [u8; 32]) -> String {
    format!("0x{}", hex::encode(digest))
}

/// Recovers the address that produced `signature` over this order.
pub fn recover_signer(signable: &SignableOrderData, signature: &str) -> Result<Address, SdkError> {
    let signature = Signature::from_str(signature)
        .map_err(|e| SdkError::validation(format!("malformed signature: {}", e)))?;
    let digest = signable.digest()?;

    signature
        .recover(H256::from(digest))
        .map_err(|e| SdkError::validation(format!("cannot recover signer: {}", e)))
}
