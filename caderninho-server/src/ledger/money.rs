//! Money helpers
//!
//! Amounts are stored as `f64` and computed as `Decimal`, rounded half-up to
//! two places on the way back.

use rust_decimal::prelude::*;

use crate::db::repository::order::NewOrderItem;
use crate::utils::{AppError, AppResult, ErrorCode};

const DECIMAL_PLACES: u32 = 2;

/// Maximum unit price
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum quantity per order line
pub const MAX_QUANTITY: i64 = 9999;
/// Maximum single cash movement or payment
pub const MAX_AMOUNT: f64 = 10_000_000.0;

/// Convert f64 to Decimal for calculation
///
/// Inputs are validated with [`require_finite`] at the boundary; a
/// non-finite value reaching this point is logged and treated as zero.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round to cents
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to cents
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_else(|| {
        tracing::error!(value = %value, "Decimal out of f64 range, defaulting to zero");
        0.0
    })
}

/// Sum stored amounts without accumulating float error
pub fn sum_amounts(values: impl IntoIterator<Item = f64>) -> Decimal {
    round_money(values.into_iter().map(to_decimal).sum())
}

/// `Σ quantity × price` over order lines
pub fn order_total(items: &[NewOrderItem]) -> Decimal {
    round_money(
        items
            .iter()
            .map(|i| to_decimal(i.price) * Decimal::from(i.quantity))
            .sum(),
    )
}

/// Compare a client-supplied amount against a computed one at cent precision
pub fn amounts_match(sent: f64, expected: Decimal) -> bool {
    round_money(to_decimal(sent)) == round_money(expected)
}

#[inline]
pub fn require_finite(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(
            AppError::validation(format!("{field} must be a finite number, got {value}"))
                .with_detail("field", field),
        );
    }
    Ok(())
}

/// Catalog price: finite, `0 <= price <= MAX_PRICE`
pub fn validate_price(price: f64) -> AppResult<()> {
    require_finite(price, "price")?;
    if !(0.0..=MAX_PRICE).contains(&price) {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("price must be between 0 and {MAX_PRICE}, got {price}"),
        )
        .with_detail("field", "price"));
    }
    Ok(())
}

/// Order line quantity: `1..=MAX_QUANTITY`
pub fn validate_quantity(quantity: i64, index: usize) -> AppResult<()> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("quantity must be between 1 and {MAX_QUANTITY}, got {quantity}"),
        )
        .with_detail("field", "quantity")
        .with_detail("index", index));
    }
    Ok(())
}

/// Strictly positive movement amount
pub fn validate_amount(amount: f64, field: &str) -> AppResult<()> {
    require_finite(amount, field)?;
    if amount <= 0.0 || amount > MAX_AMOUNT {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be greater than 0 and at most {MAX_AMOUNT}, got {amount}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Zero allowed, negative not
pub fn validate_non_negative(amount: f64, field: &str) -> AppResult<()> {
    require_finite(amount, field)?;
    if !(0.0..=MAX_AMOUNT).contains(&amount) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be between 0 and {MAX_AMOUNT}, got {amount}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, quantity: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: 1,
            product_name: "x".into(),
            quantity,
            price,
        }
    }

    #[test]
    fn decimal_sum_avoids_float_drift() {
        assert_ne!(0.1_f64 + 0.2_f64, 0.3);
        assert_eq!(to_f64(to_decimal(0.1) + to_decimal(0.2)), 0.3);
        assert_eq!(to_f64(sum_amounts(std::iter::repeat_n(0.01, 1000))), 10.0);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(to_f64(Decimal::new(1005, 3)), 1.01);
        assert_eq!(to_f64(Decimal::new(1004, 3)), 1.0);
    }

    #[test]
    fn order_total_multiplies_lines() {
        let items = [line(4.5, 2), line(0.35, 3), line(10.0, 1)];
        assert_eq!(to_f64(order_total(&items)), 20.05);
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn amount_match_at_cent_precision() {
        assert!(amounts_match(80.0, Decimal::new(8000, 2)));
        assert!(amounts_match(0.1 + 0.2, Decimal::new(30, 2)));
        assert!(!amounts_match(79.99, Decimal::new(8000, 2)));
    }

    #[test]
    fn validators() {
        assert!(validate_price(0.0).is_ok());
        assert_eq!(
            validate_price(-0.01).unwrap_err().code,
            ErrorCode::ProductInvalidPrice
        );
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(MAX_PRICE + 1.0).is_err());

        assert!(validate_quantity(1, 0).is_ok());
        assert!(validate_quantity(0, 0).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1, 0).is_err());

        assert!(validate_amount(0.01, "amount").is_ok());
        assert!(validate_amount(0.0, "amount").is_err());
        assert!(validate_amount(f64::INFINITY, "amount").is_err());

        assert!(validate_non_negative(0.0, "initial_balance").is_ok());
        assert!(validate_non_negative(-1.0, "initial_balance").is_err());
    }
}
