//! Order Shipments

mod handlers;

pub(crate) use handlers::*;
