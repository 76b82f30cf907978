//! Depot helper extensions.

use std::{any::Any, sync::Arc};

use salvo::prelude::{Depot, StatusError};

use crate::{observability::REQUEST_ID_DEPOT_KEY, state::State};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// The injected application state.
    fn state(&self) -> Result<&Arc<State>, StatusError> {
        self.obtain_or_500::<Arc<State>>()
    }

    /// Request id assigned by the logging middleware, if it ran.
    fn request_id(&self) -> Option<&str>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn request_id(&self) -> Option<&str> {
        self.get::<String>(REQUEST_ID_DEPOT_KEY)
            .ok()
            .map(String::as_str)
    }
}
