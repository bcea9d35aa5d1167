use ethers::types::transaction::eip712::Types;
use ethers::types::Address;
use serde::{Deserialize, Serialize};

// ==================================================
// ORDER INTENT
// ==================================================

/// Human-readable order intent, as supplied by the maker.
///
/// Addresses and amounts stay as strings here; they are validated and
/// canonicalized when the order is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    /// Unique per maker. Must fit in 96 bits.
    pub nonce: u128,
    /// Unix timestamp in seconds. `0` means the order never expires.
    pub expiry: u64,
    pub maker_asset: String,
    pub taker_asset: String,
    /// Base-unit integer amount as a decimal string.
    pub maker_amount: String,
    pub taker_amount: String,
    pub maker: String,
    /// Restricts who may fill the order. `None` lets anyone fill it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker: Option<String>,
}

// ==================================================
// SIGNABLE ORDER
// ==================================================

/// EIP-712 domain of the settlement contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

/// Canonical order fields, in the exact shape the contract hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    /// `(nonce << 160) | taker`, as a decimal string.
    pub nonce_and_meta: String,
    pub expiry: u64,
    pub maker_asset: Address,
    pub taker_asset: Address,
    pub maker: Address,
    pub taker: Address,
    pub maker_amount: String,
    pub taker_amount: String,
    /// EIP-712 digest of the fields above. Not part of the signed struct.
    pub order_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignableOrderData {
    pub domain: OrderDomain,
    pub types: Types,
    pub data: OrderData,
}

impl SignableOrderData {
    pub fn order_hash(&self) -> &str {
        &self.data.order_hash
    }
}

// ==================================================
// WIRE FORMAT
// ==================================================

/// Order body accepted by `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitOrderToSend {
    #[serde(flatten)]
    pub data: OrderData,
    pub chain_id: u64,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Open and fillable.
    Limit,
    Filled,
    Cancelled,
    Expired,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Limit => "LIMIT",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Expired => "EXPIRED",
        }
    }
}

/// Backend's stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedOrder {
    pub order_hash: String,
    pub nonce_and_meta: String,
    pub expiry: u64,
    pub maker_asset: Address,
    pub taker_asset: Address,
    pub maker: Address,
    pub taker: Address,
    pub maker_amount: String,
    pub taker_amount: String,
    pub chain_id: u64,
    pub signature: String,
    #[serde(rename = "type")]
    pub status: OrderStatus,
    /// Remaining taker-asset amount that can still be filled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fillable_balance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl From<&PostedOrder> for OrderData {
    fn from(order: &PostedOrder) -> Self {
        OrderData {
            nonce_and_meta: order.nonce_and_meta.clone(),
            expiry: order.expiry,
            maker_asset: order.maker_asset,
            taker_asset: order.taker_asset,
            maker: order.maker,
            taker: order.taker,
            maker_amount: order.maker_amount.clone(),
            taker_amount: order.taker_amount.clone(),
            order_hash: order.order_hash.clone(),
        }
    }
}

// ==================================================
// QUERIES + FILLS
// ==================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrdersFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker: Option<Address>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl LimitOrdersFilter {
    pub fn maker(mut self, maker: Address) -> Self {
        self.maker = Some(maker);
        self
    }

    pub fn taker(mut self, taker: Address) -> Self {
        self.taker = Some(taker);
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillLimitOrderInput {
    pub order_data: OrderData,
    pub signature: String,
    /// Taker-asset amount for a partial fill. `None` fills the whole order.
    pub fill_amount: Option<String>,
}

impl FillLimitOrderInput {
    pub fn full(order_data: impl Into<OrderData>, signature: impl Into<String>) -> Self {
        Self {
            order_data: order_data.into(),
            signature: signature.into(),
            fill_amount: None,
        }
    }

    pub fn partial(
        order_data: impl Into<OrderData>,
        signature: impl Into<String>,
        fill_amount: impl Into<String>,
    ) -> Self {
        Self {
            order_data: order_data.into(),
            signature: signature.into(),
            fill_amount: Some(fill_amount.into()),
        }
    }
}
