//! Caller identities, token request parameters, and user token models.

pub mod caller;
pub mod id;
pub mod parameters;
pub mod token;

pub use caller::*;
pub use id::*;
pub use parameters::*;
pub use token::{secret::*, user::*};
