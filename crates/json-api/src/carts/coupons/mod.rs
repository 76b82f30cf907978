//! Cart Coupons

mod handlers;

pub(crate) use handlers::*;
