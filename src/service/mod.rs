//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate the credential store and the token allow-list.

mod account;
mod session;

pub use account::{AccountService, NewUser};
pub use session::{IssuedToken, SessionService};
