//! Buyer Identity

pub mod errors;
pub mod models;
pub mod service;

pub use errors::IdentityError;
pub use service::*;
