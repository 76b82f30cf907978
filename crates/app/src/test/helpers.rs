//! Test Helpers

use jiff::{SignedDuration, Timestamp};
use sqlx::query;
use testresult::TestResult;
use uuid::Uuid;

use crate::{
    domain::{
        accounts::{
            AccountsService,
            models::{AccountUuid, NewAccount},
        },
        catalog::models::{CollectionUuid, ProductUuid},
        coupons::{
            CouponsService,
            models::{Coupon, NewCoupon},
        },
        orders::models::{
            NewOrder, OrderItemType, OrderStatus, OrderUuid, PaymentMethod, PaymentStatus,
        },
    },
    test::{TestContext, fixtures},
};

pub(crate) async fn create_account(ctx: &TestContext, email: &str) -> TestResult<AccountUuid> {
    let uuid = AccountUuid::new();

    ctx.accounts
        .create_account(NewAccount {
            uuid,
            username: format!("buyer_{}", uuid.into_uuid().simple()),
            email: Some(email.to_string()),
            phone: None,
            credential_hash: "not-a-real-hash".to_string(),
            email_verified: true,
        })
        .await?;

    Ok(uuid)
}

/// A gaming card at `level`.
pub(crate) async fn create_card(ctx: &TestContext, level: u32) -> TestResult<ProductUuid> {
    let uuid = ProductUuid::new();

    query(
        "INSERT INTO products (uuid, name, kind, level, price) \
         VALUES ($1, $2, 'gaming', $3, 100)",
    )
    .bind(uuid.into_uuid())
    .bind(format!("Card {level}"))
    .bind(i32::try_from(level)?)
    .execute(ctx.db.pool())
    .await?;

    Ok(uuid)
}

pub(crate) async fn create_collection(ctx: &TestContext, name: &str) -> TestResult<CollectionUuid> {
    let uuid = CollectionUuid::new();

    query(
        "INSERT INTO collections (uuid, name, kind, base_price) \
         VALUES ($1, $2, 'gaming', 100)",
    )
    .bind(uuid.into_uuid())
    .bind(name)
    .execute(ctx.db.pool())
    .await?;

    Ok(uuid)
}

/// An active coupon worth ten percent, valid for a day.
pub(crate) async fn create_coupon(
    ctx: &TestContext,
    code: &str,
    max_usage: u32,
) -> TestResult<Coupon> {
    let coupon = ctx
        .coupons
        .create_coupon(NewCoupon {
            code: code.to_string(),
            discount_percentage: 10,
            minimum_amount: 0,
            max_usage,
            expires_at: Timestamp::now().checked_add(SignedDuration::from_hours(24))?,
            description: None,
        })
        .await?;

    Ok(coupon)
}

/// A confirmed prepaid order for one plain item.
pub(crate) fn new_order(account: AccountUuid, gateway_intent_id: Option<&str>) -> NewOrder {
    NewOrder {
        uuid: OrderUuid::new(),
        account,
        lines: vec![fixtures::order_line(OrderItemType::Item, Uuid::now_v7(), None)],
        subtotal: 49_900,
        shipping_cost: 0,
        applied_coupons: Vec::new(),
        status: OrderStatus::Confirmed,
        payment_method: PaymentMethod::Gateway,
        payment_status: PaymentStatus::Paid,
        gateway_intent_id: gateway_intent_id.map(str::to_string),
        gateway_payment_id: Some("pay_test".to_string()),
        shipping_address: fixtures::address(),
        note: "Payment verified".to_string(),
    }
}
