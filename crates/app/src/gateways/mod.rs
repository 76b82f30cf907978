//! Clients for the external payment gateway and shipment dispatcher.

pub mod payments;
pub mod shipping;
