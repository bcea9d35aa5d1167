//! In-memory order backend and settlement contract.
//!
//! [`Simulator`] hands out a [`MockFetcher`] (the `/orders` API) and one
//! [`MockContractCaller`] per account (the RFQ contract plus ERC-20
//! approvals). Both sides share one state, so a cancel or fill on "chain"
//! is visible through the API, the way the real indexer would report it.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip712::TypedData;
use ethers::types::{Address, Signature, U256};
use limit_order_sdk::codec::{recover_signer, signable_from_order_data};
use limit_order_sdk::domain::{now_ts, OrderData, OrderStatus, PostedOrder};
use limit_order_sdk::{
    construct_full_sdk, ContractAbi, ContractCallError, ContractCallInput, ContractCaller,
    Fetcher, FetcherError, LimitOrderToSend, OrderInput, PartialSdk, SaltSource, SdkConfig,
};
use serde_json::{json, Value};
use url::Url;

pub const CHAIN_ID: u64 = 31337;
pub const API_URL: &str = "http://sim.local/ft";

// anvil accounts #0 and #1
pub const MAKER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TAKER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
pub const HEX: &str = "0x2b591e99afe9f32eaa6214f7b7629768c40eeb39";

pub fn settlement() -> Address {
    Address::repeat_byte(0x5e)
}

pub fn wallet(key: &str) -> LocalWallet {
    key.parse::<LocalWallet>().unwrap().with_chain_id(CHAIN_ID)
}

pub fn order_input(maker: Address, nonce: u128) -> OrderInput {
    OrderInput {
        nonce,
        expiry: now_ts() + 7 * 24 * 60 * 60,
        maker_asset: DAI.to_string(),
        taker_asset: HEX.to_string(),
        maker_amount: "1000000000000000000".to_string(),
        taker_amount: "8000000000000000000".to_string(),
        maker: format!("{:?}", maker),
        taker: None,
    }
}

/// One submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimTx {
    pub id: u64,
    pub method: &'static str,
    pub from: Address,
}

// ==================================================
// SHARED STATE
// ==================================================

#[derive(Default)]
struct State {
    orders: BTreeMap<String, PostedOrder>,
    cancelled: HashSet<String>,
    filled: HashMap<String, U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    next_nonce: u128,
    txs: Vec<SimTx>,
    posts: usize,
}

impl State {
    fn record(&mut self, method: &'static str, from: Address) -> SimTx {
        let tx = SimTx {
            id: self.txs.len() as u64 + 1,
            method,
            from,
        };
        self.txs.push(tx.clone());
        tx
    }

    fn set_status(&mut self, order_hash: &str, status: OrderStatus) {
        if let Some(order) = self.orders.get_mut(order_hash) {
            order.status = status;
        }
    }
}

#[derive(Clone, Default)]
pub struct Simulator {
    state: Arc<Mutex<State>>,
}

impl Simulator {
    pub fn new() -> Self {
        let sim = Self::default();
        sim.state.lock().unwrap().next_nonce = 1_000;
        sim
    }

    pub fn fetcher(&self) -> MockFetcher {
        MockFetcher {
            state: self.state.clone(),
        }
    }

    pub fn caller(&self, wallet: LocalWallet) -> MockContractCaller {
        MockContractCaller {
            state: self.state.clone(),
            wallet,
        }
    }

    pub fn config(&self, key: &str) -> SdkConfig<SimTx> {
        SdkConfig::new(CHAIN_ID)
            .with_api_url(API_URL)
            .with_verifying_contract(settlement())
            .with_fetcher(self.fetcher())
            .with_contract_caller(self.caller(wallet(key)))
    }

    pub fn sdk(&self, key: &str) -> PartialSdk<SimTx> {
        construct_full_sdk(self.config(key))
    }

    pub fn sdk_with_salt(&self, key: &str, salt_source: SaltSource) -> PartialSdk<SimTx> {
        construct_full_sdk(self.config(key).with_salt_source(salt_source))
    }

    pub fn tx_count(&self) -> usize {
        self.state.lock().unwrap().txs.len()
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().unwrap().posts
    }

    pub fn is_cancelled(&self, order_hash: &str) -> bool {
        self.state.lock().unwrap().cancelled.contains(order_hash)
    }

    pub fn filled(&self, order_hash: &str) -> U256 {
        let state = self.state.lock().unwrap();
        state.filled.get(order_hash).copied().unwrap_or_default()
    }

    pub fn allowance(&self, token: &str, owner: Address) -> U256 {
        let token: Address = token.parse().unwrap();
        let state = self.state.lock().unwrap();
        state
            .allowances
            .get(&(token, owner, settlement()))
            .copied()
            .unwrap_or_default()
    }
}

// ==================================================
// BACKEND
// ==================================================

pub struct MockFetcher {
    state: Arc<Mutex<State>>,
}

fn http_error(status: u16, message: &str, code: &str) -> FetcherError {
    FetcherError::Http {
        status,
        body: json!({ "error": message, "code": code }),
    }
}

fn order_path(url: &str) -> Result<(Url, Vec<String>), FetcherError> {
    let url = Url::parse(url).map_err(|e| FetcherError::Network(e.to_string()))?;
    let rest = url
        .path()
        .strip_prefix("/ft/orders")
        .ok_or_else(|| http_error(404, "no such route", "NOT_FOUND"))?;
    let segments = rest
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    Ok((url, segments))
}

fn query(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<Value, FetcherError> {
        let (url, segments) = order_path(url)?;
        let mut state = self.state.lock().unwrap();

        match segments.as_slice() {
            [] => {
                let maker = query(&url, "maker").map(|m| m.parse::<Address>().unwrap());
                let taker = query(&url, "taker").map(|t| t.parse::<Address>().unwrap());
                let status = query(&url, "type");
                let orders: Vec<&PostedOrder> = state
                    .orders
                    .values()
                    .filter(|o| maker.map_or(true, |m| o.maker == m))
                    .filter(|o| taker.map_or(true, |t| o.taker == t))
                    .filter(|o| status.as_deref().map_or(true, |s| o.status.as_str() == s))
                    .collect();
                Ok(json!({ "orders": orders }))
            }
            [nonce] if nonce == "nonce" => {
                let nonce = state.next_nonce;
                state.next_nonce += 1;
                Ok(json!({ "nonce": nonce.to_string() }))
            }
            [hash] => match state.orders.get(hash.as_str()) {
                Some(order) => Ok(json!({ "order": order })),
                None => Err(http_error(404, "order not found", "NOT_FOUND")),
            },
            _ => Err(http_error(404, "no such route", "NOT_FOUND")),
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, FetcherError> {
        let (_, segments) = order_path(url)?;
        if !segments.is_empty() {
            return Err(http_error(404, "no such route", "NOT_FOUND"));
        }

        let order: LimitOrderToSend = serde_json::from_value(body.clone())
            .map_err(|e| http_error(400, &e.to_string(), "BAD_REQUEST"))?;
        if order.chain_id != CHAIN_ID {
            return Err(http_error(400, "unsupported chain", "BAD_REQUEST"));
        }

        let signable = signable_from_order_data(&order.data, order.chain_id, settlement())
            .map_err(|e| http_error(400, &e.to_string(), "BAD_REQUEST"))?;
        if signable.data.order_hash != order.data.order_hash {
            return Err(http_error(400, "orderHash mismatch", "INVALID_HASH"));
        }
        match recover_signer(&signable, &order.signature) {
            Ok(signer) if signer == order.data.maker => {}
            _ => return Err(http_error(400, "invalid signature", "INVALID_SIGNATURE")),
        }

        let mut state = self.state.lock().unwrap();
        if state.orders.contains_key(&order.data.order_hash) {
            return Err(http_error(409, "order already exists", "DUPLICATE_ORDER"));
        }
        state.posts += 1;

        let data = order.data;
        let posted = PostedOrder {
            order_hash: data.order_hash.clone(),
            nonce_and_meta: data.nonce_and_meta,
            expiry: data.expiry,
            maker_asset: data.maker_asset,
            taker_asset: data.taker_asset,
            maker: data.maker,
            taker: data.taker,
            maker_amount: data.maker_amount,
            taker_amount: data.taker_amount.clone(),
            chain_id: order.chain_id,
            signature: order.signature,
            status: OrderStatus::Limit,
            fillable_balance: Some(data.taker_amount),
            created_at: Some(now_ts() as i64),
            updated_at: None,
        };
        state.orders.insert(posted.order_hash.clone(), posted.clone());

        Ok(json!({ "order": posted }))
    }
}

// ==================================================
// CHAIN
// ==================================================

pub struct MockContractCaller {
    state: Arc<Mutex<State>>,
    wallet: LocalWallet,
}

fn revert(reason: &str) -> ContractCallError {
    ContractCallError::Revert(reason.to_string())
}

fn hash_arg(token: &Token) -> Result<String, ContractCallError> {
    match token {
        Token::FixedBytes(bytes) if bytes.len() == 32 => Ok(format!("0x{}", hex::encode(bytes))),
        other => Err(ContractCallError::Abi(format!("expected bytes32, got {:?}", other))),
    }
}

fn uint_arg(token: &Token) -> Result<U256, ContractCallError> {
    match token {
        Token::Uint(value) => Ok(*value),
        other => Err(ContractCallError::Abi(format!("expected uint, got {:?}", other))),
    }
}

fn address_arg(token: &Token) -> Result<Address, ContractCallError> {
    match token {
        Token::Address(value) => Ok(*value),
        other => Err(ContractCallError::Abi(format!("expected address, got {:?}", other))),
    }
}

fn order_arg(token: &Token) -> Result<OrderData, ContractCallError> {
    let fields = match token {
        Token::Tuple(fields) if fields.len() == 8 => fields,
        other => {
            return Err(ContractCallError::Abi(format!(
                "expected order tuple, got {:?}",
                other
            )))
        }
    };
    Ok(OrderData {
        nonce_and_meta: uint_arg(&fields[0])?.to_string(),
        expiry: uint_arg(&fields[1])?.as_u64(),
        maker_asset: address_arg(&fields[2])?,
        taker_asset: address_arg(&fields[3])?,
        maker: address_arg(&fields[4])?,
        taker: address_arg(&fields[5])?,
        maker_amount: uint_arg(&fields[6])?.to_string(),
        taker_amount: uint_arg(&fields[7])?.to_string(),
        order_hash: String::new(),
    })
}

impl MockContractCaller {
    fn cancel(&self, state: &mut State, hashes: Vec<String>) -> Result<(), ContractCallError> {
        let from = self.wallet.address();
        for hash in &hashes {
            if let Some(order) = state.orders.get(hash) {
                if order.maker != from {
                    return Err(revert("only maker can cancel"));
                }
            }
        }
        for hash in hashes {
            state.set_status(&hash, OrderStatus::Cancelled);
            state.cancelled.insert(hash);
        }
        Ok(())
    }

    fn fill(
        &self,
        state: &mut State,
        order: OrderData,
        signature: &[u8],
        amount: Option<U256>,
    ) -> Result<(), ContractCallError> {
        let from = self.wallet.address();
        let signable = signable_from_order_data(&order, CHAIN_ID, settlement())
            .map_err(|e| revert(&e.to_string()))?;
        let hash = signable.data.order_hash.clone();

        let signature = format!("0x{}", hex::encode(signature));
        match recover_signer(&signable, &signature) {
            Ok(signer) if signer == order.maker => {}
            _ => return Err(revert("invalid signature")),
        }
        if state.cancelled.contains(&hash) {
            return Err(revert("order cancelled"));
        }
        if order.expiry != 0 && order.expiry <= now_ts() {
            return Err(revert("order expired"));
        }
        if !order.taker.is_zero() && order.taker != from {
            return Err(revert("private order"));
        }

        let maker_total = U256::from_dec_str(&order.maker_amount).unwrap();
        let taker_total = U256::from_dec_str(&order.taker_amount).unwrap();
        let already = state.filled.get(&hash).copied().unwrap_or_default();
        let remaining = taker_total - already;

        let fill = match amount {
            None if already.is_zero() => taker_total,
            None => return Err(revert("order already partially filled")),
            Some(amount) if amount > remaining => return Err(revert("fill exceeds remaining")),
            Some(amount) => amount,
        };
        if remaining.is_zero() {
            return Err(revert("order filled"));
        }
        let maker_pays = maker_total * fill / taker_total;

        let taker_key = (order.taker_asset, from, settlement());
        let maker_key = (order.maker_asset, order.maker, settlement());
        let taker_allowance = state.allowances.get(&taker_key).copied().unwrap_or_default();
        let maker_allowance = state.allowances.get(&maker_key).copied().unwrap_or_default();
        if taker_allowance < fill {
            return Err(revert("taker allowance too low"));
        }
        if maker_allowance < maker_pays {
            return Err(revert("maker allowance too low"));
        }

        state.allowances.insert(taker_key, taker_allowance - fill);
        state.allowances.insert(maker_key, maker_allowance - maker_pays);
        let filled = already + fill;
        state.filled.insert(hash.clone(), filled);

        let left = taker_total - filled;
        if let Some(posted) = state.orders.get_mut(&hash) {
            posted.fillable_balance = Some(left.to_string());
        }
        if left.is_zero() {
            state.set_status(&hash, OrderStatus::Filled);
        }
        Ok(())
    }
}

#[async_trait]
impl ContractCaller for MockContractCaller {
    type TxResult = SimTx;

    fn account(&self) -> Address {
        self.wallet.address()
    }

    async fn transact(&self, call: ContractCallInput) -> Result<SimTx, ContractCallError> {
        // the caller must be able to encode what it sends
        call.abi
            .load()?
            .function(call.method)
            .and_then(|f| f.encode_input(&call.args))
            .map_err(|e| ContractCallError::Abi(e.to_string()))?;

        let from = self.wallet.address();
        let mut state = self.state.lock().unwrap();

        match (call.abi, call.method) {
            (ContractAbi::Erc20, "approve") => {
                let spender = address_arg(&call.args[0])?;
                let amount = uint_arg(&call.args[1])?;
                state.allowances.insert((call.address, from, spender), amount);
            }
            (ContractAbi::Settlement, method) => {
                if call.address != settlement() {
                    return Err(ContractCallError::Transport("no contract at address".into()));
                }
                match method {
                    "cancelOrder" => {
                        let hash = hash_arg(&call.args[0])?;
                        self.cancel(&mut state, vec![hash])?;
                    }
                    "cancelOrders" => {
                        let hashes = match &call.args[0] {
                            Token::Array(items) => items
                                .iter()
                                .map(hash_arg)
                                .collect::<Result<Vec<_>, _>>()?,
                            other => {
                                return Err(ContractCallError::Abi(format!(
                                    "expected bytes32[], got {:?}",
                                    other
                                )))
                            }
                        };
                        self.cancel(&mut state, hashes)?;
                    }
                    "fillOrder" | "partialFillOrder" => {
                        let order = order_arg(&call.args[0])?;
                        let signature = match &call.args[1] {
                            Token::Bytes(bytes) => bytes.clone(),
                            other => {
                                return Err(ContractCallError::Abi(format!(
                                    "expected bytes, got {:?}",
                                    other
                                )))
                            }
                        };
                        let amount = match call.args.get(2) {
                            Some(token) => Some(uint_arg(token)?),
                            None => None,
                        };
                        self.fill(&mut state, order, &signature, amount)?;
                    }
                    other => {
                        return Err(ContractCallError::Abi(format!("unknown method {}", other)))
                    }
                }
            }
            (abi, method) => {
                return Err(ContractCallError::Abi(format!("{:?} has no {}", abi, method)))
            }
        }

        Ok(state.record(call.method, from))
    }

    async fn sign_typed_data(
        &self,
        typed_data: &TypedData,
    ) -> Result<Signature, ContractCallError> {
        self.wallet
            .sign_typed_data(typed_data)
            .await
            .map_err(|e| ContractCallError::Signer(e.to_string()))
    }
}
