//! User access token models returned by token providers.

pub mod secret;
pub mod user;
