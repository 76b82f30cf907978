//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use serde_json::{Value, json};
use uuid::Uuid;

use storefront_app::{
    context::AppContext,
    database::MockDatabaseHealth,
    domain::{
        carts::{
            MockCartsService,
            models::{Cart, CartLine, CartLineUuid, LineItem, Variant},
        },
        checkout::MockCheckoutService,
        orders::{
            MockOrdersService,
            models::{
                Actor, Order, OrderItemType, OrderLine, OrderStatus, PaymentMethod, PaymentStatus,
                ShippingAddress, StatusEntry, Tracking,
            },
        },
    },
};

use crate::{errors, state::State};

fn service(app: AppContext, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(State::from_app_context(app)))
            .push(route),
    )
    .catcher(errors::catcher())
}

pub(crate) fn health_service(database: MockDatabaseHealth, route: Router) -> Service {
    service(
        AppContext {
            database: Arc::new(database),
            carts: Arc::new(MockCartsService::new()),
            checkout: Arc::new(MockCheckoutService::new()),
            orders: Arc::new(MockOrdersService::new()),
        },
        route,
    )
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    service(
        AppContext {
            database: Arc::new(MockDatabaseHealth::new()),
            carts: Arc::new(carts),
            checkout: Arc::new(MockCheckoutService::new()),
            orders: Arc::new(MockOrdersService::new()),
        },
        route,
    )
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    service(
        AppContext {
            database: Arc::new(MockDatabaseHealth::new()),
            carts: Arc::new(MockCartsService::new()),
            checkout: Arc::new(MockCheckoutService::new()),
            orders: Arc::new(orders),
        },
        route,
    )
}

pub(crate) fn checkout_service(checkout: MockCheckoutService, route: Router) -> Service {
    service(
        AppContext {
            database: Arc::new(MockDatabaseHealth::new()),
            carts: Arc::new(MockCartsService::new()),
            checkout: Arc::new(checkout),
            orders: Arc::new(MockOrdersService::new()),
        },
        route,
    )
}

/// A cart holding two units of one product.
pub(crate) fn make_cart(key: &str) -> Cart {
    Cart {
        key: key.to_string(),
        lines: vec![CartLine {
            uuid: CartLineUuid::new(),
            item: LineItem::Item {
                product: Uuid::now_v7().into(),
            },
            name: "Midnight Case".to_string(),
            image: None,
            quantity: 2,
            unit_price: 49_900,
            variant: Variant {
                brand: Some("Apple".to_string()),
                model: Some("iPhone 15".to_string()),
            },
        }],
        coupons: Vec::new(),
    }
}

fn make_shipping_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Asha Rao".to_string(),
        phone: "9876543210".to_string(),
        email: "asha@example.com".to_string(),
        address_line1: "12 MG Road".to_string(),
        address_line2: None,
        city: "Pune".to_string(),
        state: "Maharashtra".to_string(),
        zip_code: "411001".to_string(),
        country: "India".to_string(),
        landmark: None,
    }
}

pub(crate) fn shipping_address_json() -> Value {
    json!({
        "full_name": "Asha Rao",
        "phone": "9876543210",
        "email": "asha@example.com",
        "address_line1": "12 MG Road",
        "city": "Pune",
        "state": "Maharashtra",
        "zip_code": "411001",
    })
}

/// A confirmed prepaid order for two units of one product.
pub(crate) fn make_order(uuid: Uuid) -> Order {
    Order {
        uuid: uuid.into(),
        order_number: "ORD-2026-0001".to_string(),
        account: Uuid::now_v7().into(),
        lines: vec![OrderLine {
            item_type: OrderItemType::Item,
            reference: Uuid::now_v7(),
            collection: None,
            product_name: "Midnight Case".to_string(),
            image: None,
            unit_price: 49_900,
            quantity: 2,
            phone_model: "iPhone 15".to_string(),
            variant: Variant::default(),
            custom_design: None,
        }],
        subtotal: 99_800,
        shipping_cost: 0,
        discount_total: 0,
        total_amount: 99_800,
        applied_coupons: Vec::new(),
        status: OrderStatus::Confirmed,
        payment_method: PaymentMethod::Gateway,
        payment_status: PaymentStatus::Paid,
        gateway_intent_id: Some("order_abc".to_string()),
        gateway_payment_id: Some("pay_123".to_string()),
        shipping_address: make_shipping_address(),
        shipment: None,
        tracking: Tracking::default(),
        cancellation_reason: None,
        cancelled_by: None,
        history: vec![StatusEntry {
            status: OrderStatus::Confirmed,
            note: "Payment verified".to_string(),
            actor: Actor::System,
            recorded_at: Timestamp::UNIX_EPOCH,
        }],
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
