use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::client::orders::{construct_get_limit_orders, construct_post_limit_order};
use crate::codec::construct_build_limit_order;
use crate::domain::{
    FillLimitOrderInput, LimitOrderToSend, LimitOrdersFilter, OrderInput, PostedOrder,
    SignableOrderData,
};
use crate::execution::errors::SdkError;
use crate::execution::orders::{construct_cancel_limit_order, construct_fill_limit_order};
use crate::sdk::SdkConfig;
use crate::wallet::allowance::construct_approve_token_for_limit_order;
use crate::wallet::signer::construct_sign_limit_order;

pub type MethodFuture<T> = BoxFuture<'static, Result<T, SdkError>>;

type Method<A, T> = Arc<dyn Fn(A) -> MethodFuture<T> + Send + Sync>;
type Method2<A, B, T> = Arc<dyn Fn(A, B) -> MethodFuture<T> + Send + Sync>;

/// A method-group constructor: receives the shared configuration, returns
/// the methods it provides.
pub type MethodConstructor<Tx> = fn(&Arc<SdkConfig<Tx>>) -> SdkMethods<Tx>;

// ==================================================
// METHOD TABLE
// ==================================================

/// Partial method table. Every slot a constructor leaves as `None` is
/// inherited from the constructors listed before it.
pub struct SdkMethods<Tx> {
    pub build_limit_order: Option<Method<OrderInput, SignableOrderData>>,
    pub sign_limit_order: Option<Method<SignableOrderData, String>>,
    pub post_limit_order: Option<Method<LimitOrderToSend, PostedOrder>>,
    pub get_limit_orders: Option<Method<LimitOrdersFilter, Vec<PostedOrder>>>,
    pub get_limit_order_by_hash: Option<Method<String, PostedOrder>>,
    pub cancel_limit_order: Option<Method<String, Tx>>,
    pub cancel_limit_order_bulk: Option<Method<Vec<String>, Tx>>,
    pub fill_limit_order: Option<Method<FillLimitOrderInput, Tx>>,
    pub approve_token_for_limit_order: Option<Method2<String, String, Tx>>,
}

impl<Tx> Default for SdkMethods<Tx> {
    fn default() -> Self {
        Self {
            build_limit_order: None,
            sign_limit_order: None,
            post_limit_order: None,
            get_limit_orders: None,
            get_limit_order_by_hash: None,
            cancel_limit_order: None,
            cancel_limit_order_bulk: None,
            fill_limit_order: None,
            approve_token_for_limit_order: None,
        }
    }
}

impl<Tx> Clone for SdkMethods<Tx> {
    fn clone(&self) -> Self {
        Self {
            build_limit_order: self.build_limit_order.clone(),
            sign_limit_order: self.sign_limit_order.clone(),
            post_limit_order: self.post_limit_order.clone(),
            get_limit_orders: self.get_limit_orders.clone(),
            get_limit_order_by_hash: self.get_limit_order_by_hash.clone(),
            cancel_limit_order: self.cancel_limit_order.clone(),
            cancel_limit_order_bulk: self.cancel_limit_order_bulk.clone(),
            fill_limit_order: self.fill_limit_order.clone(),
            approve_token_for_limit_order: self.approve_token_for_limit_order.clone(),
        }
    }
}

fn method<A, T, F, Fut>(f: F) -> Method<A, T>
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, SdkError>> + Send + 'static,
{
    Arc::new(move |arg| f(arg).boxed())
}

impl<Tx: Send + 'static> SdkMethods<Tx> {
    /// Union of two tables. Slots set in `later` win.
    pub fn merge(self, later: SdkMethods<Tx>) -> SdkMethods<Tx> {
        SdkMethods {
            build_limit_order: later.build_limit_order.or(self.build_limit_order),
            sign_limit_order: later.sign_limit_order.or(self.sign_limit_order),
            post_limit_order: later.post_limit_order.or(self.post_limit_order),
            get_limit_orders: later.get_limit_orders.or(self.get_limit_orders),
            get_limit_order_by_hash: later
                .get_limit_order_by_hash
                .or(self.get_limit_order_by_hash),
            cancel_limit_order: later.cancel_limit_order.or(self.cancel_limit_order),
            cancel_limit_order_bulk: later
                .cancel_limit_order_bulk
                .or(self.cancel_limit_order_bulk),
            fill_limit_order: later.fill_limit_order.or(self.fill_limit_order),
            approve_token_for_limit_order: later
                .approve_token_for_limit_order
                .or(self.approve_token_for_limit_order),
        }
    }

    pub fn method_names(&self) -> Vec<&'static str> {
        let slots = [
            ("build_limit_order", self.build_limit_order.is_some()),
            ("sign_limit_order", self.sign_limit_order.is_some()),
            ("post_limit_order", self.post_limit_order.is_some()),
            ("get_limit_orders", self.get_limit_orders.is_some()),
            ("get_limit_order_by_hash", self.get_limit_order_by_hash.is_some()),
            ("cancel_limit_order", self.cancel_limit_order.is_some()),
            ("cancel_limit_order_bulk", self.cancel_limit_order_bulk.is_some()),
            ("fill_limit_order", self.fill_limit_order.is_some()),
            (
                "approve_token_for_limit_order",
                self.approve_token_for_limit_order.is_some(),
            ),
        ];
        slots
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }

    // ==================================================
    // BUILDERS
    // ==================================================

    pub fn with_build_limit_order<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(OrderInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SignableOrderData, SdkError>> + Send + 'static,
    {
        self.build_limit_order = Some(method(f));
        self
    }

    pub fn with_sign_limit_order<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(SignableOrderData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, SdkError>> + Send + 'static,
    {
        self.sign_limit_order = Some(method(f));
        self
    }

    pub fn with_post_limit_order<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(LimitOrderToSend) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PostedOrder, SdkError>> + Send + 'static,
    {
        self.post_limit_order = Some(method(f));
        self
    }

    pub fn with_get_limit_orders<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(LimitOrdersFilter) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<PostedOrder>, SdkError>> + Send + 'static,
    {
        self.get_limit_orders = Some(method(f));
        self
    }

    pub fn with_get_limit_order_by_hash<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PostedOrder, SdkError>> + Send + 'static,
    {
        self.get_limit_order_by_hash = Some(method(f));
        self
    }

    pub fn with_cancel_limit_order<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Tx, SdkError>> + Send + 'static,
    {
        self.cancel_limit_order = Some(method(f));
        self
    }

    pub fn with_cancel_limit_order_bulk<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Tx, SdkError>> + Send + 'static,
    {
        self.cancel_limit_order_bulk = Some(method(f));
        self
    }

    pub fn with_fill_limit_order<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(FillLimitOrderInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Tx, SdkError>> + Send + 'static,
    {
        self.fill_limit_order = Some(method(f));
        self
    }

    /// `f(amount, token_address)`.
    pub fn with_approve_token_for_limit_order<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Tx, SdkError>> + Send + 'static,
    {
        self.approve_token_for_limit_order =
            Some(Arc::new(move |amount, token| f(amount, token).boxed()));
        self
    }
}

// ==================================================
// COMPOSED CLIENT
// ==================================================

/// One flat client built from any subset of method groups.
pub struct PartialSdk<Tx> {
    config: Arc<SdkConfig<Tx>>,
    methods: SdkMethods<Tx>,
}

impl<Tx> Clone for PartialSdk<Tx> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            methods: self.methods.clone(),
        }
    }
}

fn missing(name: &str) -> SdkError {
    SdkError::Configuration(format!("method {} was not composed into this sdk", name))
}

/// Merges the tables produced by `constructors`, in order. For a method
/// provided more than once, the last constructor wins. Capabilities are
/// not checked here; methods report missing ones when called.
pub fn construct_partial_sdk<Tx: Send + 'static>(
    config: SdkConfig<Tx>,
    constructors: &[MethodConstructor<Tx>],
) -> PartialSdk<Tx> {
    let config = Arc::new(config);
    let methods = constructors
        .iter()
        .fold(SdkMethods::default(), |acc, construct| {
            acc.merge(construct(&config))
        });

    PartialSdk { config, methods }
}

/// Every limit-order method group.
pub fn construct_full_sdk<Tx: Send + 'static>(config: SdkConfig<Tx>) -> PartialSdk<Tx> {
    construct_partial_sdk(
        config,
        &[
            construct_build_limit_order,
            construct_sign_limit_order,
            construct_post_limit_order,
            construct_get_limit_orders,
            construct_cancel_limit_order,
            construct_fill_limit_order,
            construct_approve_token_for_limit_order,
        ],
    )
}

/// Variadic form of [`construct_partial_sdk`].
#[macro_export]
macro_rules! partial_sdk {
    ($config:expr $(, $constructor:expr)* $(,)?) => {
        $crate::sdk::construct_partial_sdk($config, &[$($constructor),*])
    };
}

impl<Tx: Send + 'static> PartialSdk<Tx> {
    pub fn config(&self) -> &SdkConfig<Tx> {
        &self.config
    }

    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.method_names().contains(&name)
    }

    pub fn method_names(&self) -> Vec<&'static str> {
        self.methods.method_names()
    }

    pub async fn build_limit_order(
        &self,
        input: OrderInput,
    ) -> Result<SignableOrderData, SdkError> {
        let f = self
            .methods
            .build_limit_order
            .as_ref()
            .ok_or_else(|| missing("build_limit_order"))?;
        f(input).await
    }

    pub async fn sign_limit_order(&self, signable: SignableOrderData) -> Result<String, SdkError> {
        let f = self
            .methods
            .sign_limit_order
            .as_ref()
            .ok_or_else(|| missing("sign_limit_order"))?;
        f(signable).await
    }

    pub async fn post_limit_order(&self, order: LimitOrderToSend) -> Result<PostedOrder, SdkError> {
        let f = self
            .methods
            .post_limit_order
            .as_ref()
            .ok_or_else(|| missing("post_limit_order"))?;
        f(order).await
    }

    pub async fn get_limit_orders(
        &self,
        filter: LimitOrdersFilter,
    ) -> Result<Vec<PostedOrder>, SdkError> {
        let f = self
            .methods
            .get_limit_orders
            .as_ref()
            .ok_or_else(|| missing("get_limit_orders"))?;
        f(filter).await
    }

    pub async fn get_limit_order_by_hash(
        &self,
        order_hash: impl Into<String>,
    ) -> Result<PostedOrder, SdkError> {
        let f = self
            .methods
            .get_limit_order_by_hash
            .as_ref()
            .ok_or_else(|| missing("get_limit_order_by_hash"))?;
        f(order_hash.into()).await
    }

    pub async fn cancel_limit_order(&self, order_hash: impl Into<String>) -> Result<Tx, SdkError> {
        let f = self
            .methods
            .cancel_limit_order
            .as_ref()
            .ok_or_else(|| missing("cancel_limit_order"))?;
        f(order_hash.into()).await
    }

    pub async fn cancel_limit_order_bulk(&self, order_hashes: Vec<String>) -> Result<Tx, SdkError> {
        let f = self
            .methods
            .cancel_limit_order_bulk
            .as_ref()
            .ok_or_else(|| missing("cancel_limit_order_bulk"))?;
        f(order_hashes).await
    }

    pub async fn fill_limit_order(&self, input: FillLimitOrderInput) -> Result<Tx, SdkError> {
        let f = self
            .methods
            .fill_limit_order
            .as_ref()
            .ok_or_else(|| missing("fill_limit_order"))?;
        f(input).await
    }

    pub async fn approve_token_for_limit_order(
        &self,
        amount: impl Into<String>,
        token_address: impl Into<String>,
    ) -> Result<Tx, SdkError> {
        let f = self
            .methods
            .approve_token_for_limit_order
            .as_ref()
            .ok_or_else(|| missing("approve_token_for_limit_order"))?;
        f(amount.into(), token_address.into()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::errors::ErrorKind;
    use ethers::types::TxHash;

    fn tagged<Tx: Send + 'static>(tag: &'static str) -> SdkMethods<Tx> {
        SdkMethods::default().with_sign_limit_order(move |_| async move { Ok(tag.to_string()) })
    }

    fn construct_a(_: &Arc<SdkConfig<TxHash>>) -> SdkMethods<TxHash> {
        tagged("a")
    }

    fn construct_b(_: &Arc<SdkConfig<TxHash>>) -> SdkMethods<TxHash> {
        tagged("b")
    }

    fn construct_nothing(_: &Arc<SdkConfig<TxHash>>) -> SdkMethods<TxHash> {
        SdkMethods::default()
    }

    #[test]
    fn test_empty_composition_has_no_methods() {
        let sdk = construct_partial_sdk::<TxHash>(SdkConfig::new(1), &[]);
        assert!(sdk.method_names().is_empty());
    }

    #[tokio::test]
    async fn test_uncomposed_method_is_configuration_error() {
        let sdk = construct_partial_sdk::<TxHash>(SdkConfig::new(1), &[]);
        let err = sdk.cancel_limit_order(format!("0x{}", "00".repeat(32))).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_later_constructor_wins() {
        let ab = partial_sdk!(SdkConfig::new(1), construct_a, construct_b);
        let ba = partial_sdk!(SdkConfig::new(1), construct_b, construct_a);

        let signable = dummy_signable();
        assert_eq!(ab.sign_limit_order(signable.clone()).await.unwrap(), "b");
        assert_eq!(ba.sign_limit_order(signable).await.unwrap(), "a");
    }

    #[tokio::test]
    async fn test_empty_table_does_not_erase_earlier_methods() {
        let sdk = partial_sdk!(SdkConfig::new(1), construct_a, construct_nothing);
        assert!(sdk.has_method("sign_limit_order"));
        assert_eq!(sdk.sign_limit_order(dummy_signable()).await.unwrap(), "a");
    }

    #[test]
    fn test_full_sdk_composes_every_method() {
        let sdk = construct_full_sdk::<TxHash>(SdkConfig::new(1));
        assert_eq!(sdk.method_names().len(), 9);
    }

    fn dummy_signable() -> SignableOrderData {
        let input = OrderInput {
            nonce: 1,
            expiry: 0,
            maker_asset: format!("0x{}", "11".repeat(20)),
            taker_asset: format!("0x{}", "22".repeat(20)),
            maker_amount: "1".to_string(),
            taker_amount: "2".to_string(),
            maker: format!("0x{}", "33".repeat(20)),
            taker: None,
        };
        crate::codec::build_signable_order(
            &input,
            input.nonce,
            1,
            ethers::types::Address::repeat_byte(0x44),
            0,
        )
        .unwrap()
    }
}
