//! Order Handlers

pub(crate) mod cancel;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod leaderboard;
pub(crate) mod status;
pub(crate) mod tracking;
