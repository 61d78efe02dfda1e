pub(crate) mod auth;
pub(crate) mod owner;
pub(crate) mod router;
pub(crate) mod spotify;
