pub(crate) mod clock;
pub(crate) mod credential;
pub(crate) mod manager;
pub(crate) mod oauth;
pub(crate) mod store;
