//! Session bootstrap module
//!
//! Undocumented endpoints usually expect the headers a browser session
//! carries: a guest token minted by a JSON endpoint, or a CSRF token
//! embedded in the landing page. Each configured step harvests one token
//! and turns it into a request header.

mod authenticator;
mod types;

pub use authenticator::{resolve_headers, Authenticator};
pub use types::AuthStep;
