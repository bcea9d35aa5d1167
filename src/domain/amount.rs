use rust_decimal::Decimal;

use crate::execution::errors::SdkError;

const MAX_DECIMALS: u32 = 28;

fn scale(decimals: u32) -> Result<Decimal, SdkError> {
    if decimals > MAX_DECIMALS {
        return Err(SdkError::validation(format!(
            "token decimals {} exceed supported precision ({})",
            decimals, MAX_DECIMALS
        )));
    }
    let mut factor = Decimal::ONE;
    for _ in 0..decimals {
        factor = factor
            .checked_mul(Decimal::TEN)
            .ok_or_else(|| SdkError::validation("decimal scale overflow"))?;
    }
    Ok(factor)
}

/// Converts a human amount (e.g. `1.5` DAI) to a base-unit integer string.
///
/// Amounts that would need rounding are rejected.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<String, SdkError> {
    if amount <= Decimal::ZERO {
        return Err(SdkError::validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }

    let scaled = amount
        .checked_mul(scale(decimals)?)
        .ok_or_else(|| SdkError::validation(format!("amount {} is too large", amount)))?;

    if !scaled.fract().is_zero() {
        return Err(SdkError::validation(format!(
            "amount {} has more than {} decimal places",
            amount, decimals
        )));
    }

    Ok(scaled.trunc().normalize().to_string())
}

/// Inverse of [`to_base_units`], for display.
pub fn format_units(base_units: &str, decimals: u32) -> Result<Decimal, SdkError> {
    let raw: Decimal = base_units
        .trim()
        .parse()
        .map_err(|e| SdkError::validation(format!("invalid amount {:?}: {}", base_units, e)))?;

    raw.checked_div(scale(decimals)?)
        .map(|d| d.normalize())
        .ok_or_else(|| SdkError::validation(format!("cannot scale amount {}", base_units)))
}
