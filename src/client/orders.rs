use std::sync::Arc;

use log::debug;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::codec::parse_order_hash;
use crate::domain::{LimitOrderToSend, LimitOrdersFilter, PostedOrder};
use crate::execution::errors::SdkError;
use crate::logging::{log_rejection, log_submitted};
use crate::sdk::{SdkConfig, SdkMethods};

// ==================================================
// RESPONSE SHAPES
// ==================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderResponse {
    Wrapped { order: PostedOrder },
    Bare(PostedOrder),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrdersResponse {
    Wrapped { orders: Vec<PostedOrder> },
    Bare(Vec<PostedOrder>),
}

fn decode_order(value: Value) -> Result<PostedOrder, SdkError> {
    match serde_json::from_value::<OrderResponse>(value) {
        Ok(OrderResponse::Wrapped { order }) | Ok(OrderResponse::Bare(order)) => Ok(order),
        Err(e) => Err(SdkError::submission(format!("unexpected order response: {}", e))),
    }
}

fn decode_orders(value: Value) -> Result<Vec<PostedOrder>, SdkError> {
    match serde_json::from_value::<OrdersResponse>(value) {
        Ok(OrdersResponse::Wrapped { orders }) | Ok(OrdersResponse::Bare(orders)) => Ok(orders),
        Err(e) => Err(SdkError::submission(format!("unexpected orders response: {}", e))),
    }
}

fn orders_url(api_url: &str, chain_id: u64, filter: &LimitOrdersFilter) -> Result<Url, SdkError> {
    let mut params = vec![("chainId", chain_id.to_string())];
    if let Some(maker) = filter.maker {
        params.push(("maker", format!("{:?}", maker)));
    }
    if let Some(taker) = filter.taker {
        params.push(("taker", format!("{:?}", taker)));
    }
    if let Some(status) = filter.status {
        params.push(("type", status.as_str().to_string()));
    }

    Url::parse_with_params(&format!("{}/orders", api_url), &params)
        .map_err(|e| SdkError::Configuration(format!("invalid api url: {}", e)))
}

// ==================================================
// POST
// ==================================================

/// `post_limit_order`: submits a signed order. Not retried; a duplicate
/// `orderHash` is rejected by the backend and surfaces as a submission error.
pub fn construct_post_limit_order<Tx: Send + 'static>(
    config: &Arc<SdkConfig<Tx>>,
) -> SdkMethods<Tx> {
    let config = config.clone();

    SdkMethods::default().with_post_limit_order(move |order: LimitOrderToSend| {
        let config = config.clone();
        async move {
            let fetcher = config.fetcher()?;
            if order.signature.trim().is_empty() {
                return Err(SdkError::validation("order is not signed"));
            }
            let body = serde_json::to_value(&order)
                .map_err(|e| SdkError::validation(format!("cannot encode order: {}", e)))?;

            let response = match fetcher.post(&config.api("/orders"), &body).await {
                Ok(response) => response,
                Err(e) => {
                    log_rejection(&format!("order {} → {}", order.data.order_hash, e.message()));
                    return Err(e.into());
                }
            };

            let posted = decode_order(response)?;
            log_submitted(&posted.order_hash);
            Ok(posted)
        }
    })
}

// ==================================================
// GET
// ==================================================

/// `get_limit_orders` and `get_limit_order_by_hash`.
pub fn construct_get_limit_orders<Tx: Send + 'static>(
    config: &Arc<SdkConfig<Tx>>,
) -> SdkMethods<Tx> {
    let by_filter = config.clone();
    let by_hash = config.clone();

    SdkMethods::default()
        .with_get_limit_orders(move |filter: LimitOrdersFilter| {
            let config = by_filter.clone();
            async move {
                let fetcher = config.fetcher()?;
                let url = orders_url(&config.api_url, config.chain_id, &filter)?;
                let orders = decode_orders(fetcher.get(url.as_str()).await?)?;
                debug!("{} orders matched {:?}", orders.len(), filter);
                Ok(orders)
            }
        })
        .with_get_limit_order_by_hash(move |order_hash: String| {
            let config = by_hash.clone();
            async move {
                let fetcher = config.fetcher()?;
                parse_order_hash(&order_hash)?;
                let url = config.api(&format!("/orders/{}", order_hash.trim()));
                decode_order(fetcher.get(&url).await?)
            }
        })
}
