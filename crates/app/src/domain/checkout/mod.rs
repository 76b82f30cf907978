//! Checkout

pub mod errors;
pub mod intents;
pub mod models;
mod repository;
pub mod service;

pub use errors::{CheckoutError, IntentsServiceError};
pub use intents::*;
pub use service::*;
