//! Coupon Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{domain::coupons::errors::CouponsServiceError, uuids::TypedUuid};

/// Coupon UUID
pub type CouponUuid = TypedUuid<Coupon>;

/// Coupon Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount_percentage: u8,
    pub minimum_amount: u64,
    pub max_usage: u32,
    pub used_count: u32,
    pub expires_at: Timestamp,
    pub is_active: bool,
    pub description: Option<String>,
}

impl Coupon {
    /// Active, unexpired and below its usage cap.
    #[must_use]
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.is_active && now < self.expires_at && self.used_count < self.max_usage
    }

    /// Price this coupon against `order_amount`, freezing the discount.
    ///
    /// # Errors
    ///
    /// Returns the first rule the coupon fails: inactive, expired, usage cap
    /// reached, or an order below the minimum amount.
    pub fn apply_to(
        &self,
        order_amount: u64,
        now: Timestamp,
    ) -> Result<AppliedCoupon, CouponsServiceError> {
        if !self.is_active {
            return Err(CouponsServiceError::Inactive);
        }

        if now >= self.expires_at {
            return Err(CouponsServiceError::Expired);
        }

        if self.used_count >= self.max_usage {
            return Err(CouponsServiceError::UsageExceeded);
        }

        if order_amount < self.minimum_amount {
            return Err(CouponsServiceError::BelowMinimum {
                minimum: self.minimum_amount,
            });
        }

        Ok(AppliedCoupon {
            code: self.code.clone(),
            discount_percentage: self.discount_percentage,
            discount_amount: discount_for(order_amount, self.discount_percentage),
        })
    }
}

/// A coupon priced at the moment it was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_percentage: u8,
    pub discount_amount: u64,
}

/// New Coupon Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub code: String,
    pub discount_percentage: u8,
    pub minimum_amount: u64,
    pub max_usage: u32,
    pub expires_at: Timestamp,
    pub description: Option<String>,
}

/// Outcome of redeeming a coupon for one checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// Usage counter incremented.
    Redeemed,

    /// This checkout already redeemed the coupon; nothing changed.
    AlreadyRedeemed,
}

/// Codes are stored upper-cased and trimmed.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// `round(amount * percentage / 100)`, rounding half away from zero.
#[must_use]
pub fn discount_for(amount: u64, percentage: u8) -> u64 {
    let scaled = u128::from(amount) * u128::from(percentage.min(100));

    u64::try_from((scaled + 50) / 100).unwrap_or(u64::MAX)
}

/// Sum of frozen discounts.
#[must_use]
pub fn total_discount(applied: &[AppliedCoupon]) -> u64 {
    applied
        .iter()
        .fold(0_u64, |sum, coupon| sum.saturating_add(coupon.discount_amount))
}
