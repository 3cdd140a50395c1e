//! CLI command implementations.

pub mod inspect;
pub mod mirror;
pub mod parse_response;
pub mod simulate;

use padsync_engine::{CookieIdentity, Identity, IdentityProvider};

/// Resolves the identity named on the command line.
pub fn resolve_identity(
    user: Option<String>,
    cookie: Option<String>,
) -> Result<Identity, Box<dyn std::error::Error>> {
    let identity = match (user, cookie) {
        (Some(user), _) => Identity::new(user).resolve()?,
        (None, Some(cookie)) => CookieIdentity::new(cookie).resolve()?,
        (None, None) => return Err("either --user or --cookie is required".into()),
    };
    Ok(identity)
}
