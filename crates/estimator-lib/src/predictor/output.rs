//! Output formatting for price estimates

/// Decimal places kept on a price estimate
pub const PRICE_DECIMALS: i32 = 2;

/// `2^52 / 100`: above this `value * 100` has no fractional part left
const ROUNDING_LIMIT: f64 = 45_035_996_273_704.96;

/// Round to two decimals, ties away from zero.
///
/// The tie rule applies to `value * 100` as computed in `f64`, so the
/// result follows that product rather than the exact decimal expansion:
/// `0.015` (stored as `0.01499..`) scales to exactly `1.5` and rounds up,
/// while `2.675` scales to `267.49999..` and rounds down. Values too large
/// to carry cents are returned unchanged.
pub fn round_price(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= ROUNDING_LIMIT {
        return value;
    }
    let scale = 10f64.powi(PRICE_DECIMALS);
    (value * scale).round() / scale
}
