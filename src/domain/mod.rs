pub mod amount;
pub mod order;
pub mod time;

pub use amount::{format_units, to_base_units};
pub use order::{
    FillLimitOrderInput, LimitOrderToSend, LimitOrdersFilter, OrderData, OrderDomain, OrderInput,
    OrderStatus, PostedOrder, SignableOrderData,
};
pub use time::{expiry_after, now_ts, time_remaining};
