//! Collection Expansion

pub mod errors;
pub mod selection;
pub mod service;

pub use errors::ExpansionError;
pub use service::*;
