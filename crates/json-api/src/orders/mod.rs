//! Orders

pub(crate) mod errors;
mod handlers;
pub(crate) mod models;
pub(crate) mod shipment;

pub(crate) use handlers::*;
