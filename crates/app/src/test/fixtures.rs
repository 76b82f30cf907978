//! Fixture builders

use jiff::Timestamp;
use uuid::Uuid;

use crate::domain::{
    accounts::models::{Account, AccountUuid},
    carts::models::Variant,
    catalog::models::CollectionUuid,
    orders::models::{
        Order, OrderItemType, OrderLine, OrderStatus, OrderUuid, PaymentMethod, PaymentStatus,
        ShippingAddress, SourceCollection, Tracking,
    },
};

pub(crate) fn account(uuid: AccountUuid) -> Account {
    Account {
        uuid,
        username: "asha_1".to_string(),
        email: Some("asha@example.com".to_string()),
        phone: None,
        email_verified: true,
        score: 0,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Asha Rao".to_string(),
        phone: "9876543210".to_string(),
        email: "asha@example.com".to_string(),
        address_line1: "12 MG Road".to_string(),
        address_line2: None,
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        zip_code: "560001".to_string(),
        country: "India".to_string(),
        landmark: None,
    }
}

pub(crate) fn source_collection(name: &str) -> SourceCollection {
    SourceCollection {
        uuid: CollectionUuid::new(),
        name: name.to_string(),
        image: None,
    }
}

pub(crate) fn order_line(
    item_type: OrderItemType,
    reference: Uuid,
    collection: Option<&SourceCollection>,
) -> OrderLine {
    OrderLine {
        item_type,
        reference,
        collection: collection.cloned(),
        product_name: format!("Line {reference}"),
        image: None,
        unit_price: 49_900,
        quantity: 1,
        phone_model: "Universal".to_string(),
        variant: Variant::default(),
        custom_design: None,
    }
}

pub(crate) fn order(payment_method: PaymentMethod, lines: Vec<OrderLine>) -> Order {
    let subtotal = lines.iter().map(OrderLine::line_total).sum();

    Order {
        uuid: OrderUuid::new(),
        order_number: "ORD-2026-0003".to_string(),
        account: AccountUuid::new(),
        lines,
        subtotal,
        shipping_cost: 0,
        discount_total: 0,
        total_amount: subtotal,
        applied_coupons: Vec::new(),
        status: OrderStatus::Confirmed,
        payment_method,
        payment_status: PaymentStatus::Pending,
        gateway_intent_id: None,
        gateway_payment_id: None,
        shipping_address: address(),
        shipment: None,
        tracking: Tracking::default(),
        cancellation_reason: None,
        cancelled_by: None,
        history: Vec::new(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
