use log::{error, info};

pub fn log_rejection(reason: &str) {
    error!("❌ Rejected: {}", reason);
}

pub fn log_submitted(order_hash: &str) {
    info!("📨 Order posted: {}", order_hash);
}

pub fn log_tx(method: &str, subject: &str) {
    info!("⛓️ {} sent: {}", method, subject);
}

pub fn log_success(msg: &str) {
    info!("✅ {}", msg);
}
