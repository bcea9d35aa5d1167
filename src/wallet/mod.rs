pub mod allowance;
pub mod signer;

pub use allowance::construct_approve_token_for_limit_order;
pub use signer::construct_sign_limit_order;
