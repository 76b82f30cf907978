//! Coupons service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::coupons::{
        errors::CouponsServiceError,
        models::{AppliedCoupon, Coupon, CouponUuid, NewCoupon, Redemption, normalize_code},
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    async fn validate(
        &self,
        code: &str,
        order_amount: u64,
        already_applied: &[String],
    ) -> Result<AppliedCoupon, CouponsServiceError> {
        let code = ensure_not_applied(code, already_applied)?;

        let mut tx = self.db.begin().await?;

        let coupon = self
            .repository
            .find_by_code(&mut tx, &code)
            .await?
            .ok_or(CouponsServiceError::NotFound)?;

        tx.commit().await?;

        coupon.apply_to(order_amount, Timestamp::now())
    }

    async fn redeem(&self, code: &str, reference: &str) -> Result<Redemption, CouponsServiceError> {
        let code = normalize_code(code);

        let mut tx = self.db.begin().await?;

        let coupon = self.repository.lock_by_code(&mut tx, &code).await?;

        if !self
            .repository
            .record_redemption(&mut tx, coupon.uuid, reference)
            .await?
        {
            tx.commit().await?;

            info!(coupon = %coupon.code, reference, "coupon already redeemed for this checkout");

            return Ok(Redemption::AlreadyRedeemed);
        }

        if !self
            .repository
            .increment_used_count(&mut tx, coupon.uuid)
            .await?
        {
            tx.rollback().await?;

            warn!(coupon = %coupon.code, reference, "coupon usage cap reached at redemption");

            return Err(CouponsServiceError::UsageExceeded);
        }

        tx.commit().await?;

        Ok(Redemption::Redeemed)
    }

    async fn create_coupon(&self, coupon: NewCoupon) -> Result<Coupon, CouponsServiceError> {
        let coupon = NewCoupon {
            code: normalize_code(&coupon.code),
            ..coupon
        };

        if coupon.code.is_empty() {
            return Err(CouponsServiceError::InvalidCode);
        }

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_coupon(&mut tx, CouponUuid::new(), &coupon)
            .await?;

        tx.commit().await?;

        Ok(created)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Check a code against an order amount and the codes already applied,
    /// returning the discount frozen at this moment.
    async fn validate(
        &self,
        code: &str,
        order_amount: u64,
        already_applied: &[String],
    ) -> Result<AppliedCoupon, CouponsServiceError>;

    /// Count one use of a coupon for the checkout identified by `reference`.
    ///
    /// Repeated calls with the same reference are no-ops, and the counter never
    /// passes the coupon's usage cap.
    async fn redeem(&self, code: &str, reference: &str) -> Result<Redemption, CouponsServiceError>;

    /// Create a coupon.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<Coupon, CouponsServiceError>;
}

/// Normalise `code` and reject it when an equal code is already applied.
pub(crate) fn ensure_not_applied(
    code: &str,
    already_applied: &[String],
) -> Result<String, CouponsServiceError> {
    let code = normalize_code(code);

    if code.is_empty() {
        return Err(CouponsServiceError::InvalidCode);
    }

    if already_applied
        .iter()
        .any(|applied| normalize_code(applied) == code)
    {
        return Err(CouponsServiceError::DuplicateCoupon);
    }

    Ok(code)
}
