//! Result helper extensions for HTTP handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::warn;

pub(crate) trait ResultExt<T> {
    /// Map any error to a bad request carrying `message`.
    fn or_400(self, message: &str) -> Result<T, StatusError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_400(self, message: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            warn!("{message}: {error}");

            StatusError::bad_request().brief(message)
        })
    }
}
