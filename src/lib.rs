//! Composable SDK for limit orders settled by an RFQ contract.
//!
//! Orders are built and hashed locally ([`codec`]), signed with EIP-712
//! ([`wallet::signer`]), posted to the order backend ([`client`]) and
//! cancelled or filled on chain ([`execution`]). Each of those is a method
//! group; [`sdk::construct_partial_sdk`] assembles any subset of them over a
//! shared [`sdk::SdkConfig`].

pub mod client;
pub mod codec;
pub mod config;
pub mod domain;
pub mod execution;
pub mod logging;
pub mod sdk;
pub mod wallet;

pub use client::orders::{construct_get_limit_orders, construct_post_limit_order};
pub use client::{Fetcher, FetcherError, ReqwestFetcher};
pub use codec::{
    build_signable_order, construct_build_limit_order, recover_signer, signable_from_order_data,
    to_limit_order_to_send,
};
pub use domain::{
    FillLimitOrderInput, LimitOrderToSend, LimitOrdersFilter, OrderData, OrderDomain, OrderInput,
    OrderStatus, PostedOrder, SignableOrderData,
};
pub use execution::orders::{construct_cancel_limit_order, construct_fill_limit_order};
pub use execution::{
    ContractAbi, ContractCallError, ContractCallInput, ContractCaller, ErrorKind,
    EthersContractCaller, SdkError,
};
pub use sdk::{
    construct_full_sdk, construct_partial_sdk, MethodConstructor, PartialSdk, SaltSource,
    SdkConfig, SdkMethods, DEFAULT_API_URL,
};
pub use wallet::{construct_approve_token_for_limit_order, construct_sign_limit_order};
