//! Carts

pub(crate) mod coupons;
pub(crate) mod errors;
mod handlers;
pub(crate) mod lines;
pub(crate) mod models;

pub(crate) use handlers::*;
