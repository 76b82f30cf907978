//! Storefront checkout, order and fulfillment domain with its persistence and
//! gateway clients.

pub mod context;
pub mod database;
pub mod domain;
pub mod gateways;

#[cfg(test)]
mod test;

mod uuids;
