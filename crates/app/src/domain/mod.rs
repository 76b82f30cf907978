//! Storefront Domain Concerns

pub mod accounts;
pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod expansion;
pub mod fulfillment;
pub mod identity;
pub mod orders;
