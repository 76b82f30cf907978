//! Post-payment Fulfillment

pub mod plan;
pub mod service;

pub use service::*;
