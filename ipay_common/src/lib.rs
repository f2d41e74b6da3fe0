//! Value types shared by the payments engine, the server and the admin tools.
mod amount;

pub mod helpers;
mod secret;

pub use amount::{Amount, AmountParseError};
pub use secret::Secret;
