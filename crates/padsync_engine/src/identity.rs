//! User identity resolution.

use crate::error::{SyncError, SyncResult};

/// Name of the session cookie carrying the user identity.
pub const SESSION_COOKIE: &str = "c";

/// The user a sync session is attributed to.
///
/// The user id keys both the local mirror and every server request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Server-side user id.
    pub user_id: String,
    /// Account email, if known.
    pub email: Option<String>,
}

impl Identity {
    /// Creates an identity with a user id only.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
        }
    }

    /// Sets the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Something that can produce the session's identity.
pub trait IdentityProvider {
    /// Resolves the identity.
    ///
    /// # Errors
    ///
    /// Returns `IdentityUnresolved` if no usable identity is available.
    fn resolve(&self) -> SyncResult<Identity>;
}

impl IdentityProvider for Identity {
    fn resolve(&self) -> SyncResult<Identity> {
        if self.user_id.trim().is_empty() {
            return Err(SyncError::IdentityUnresolved("empty user id".into()));
        }
        Ok(self.clone())
    }
}

/// Identity read from a `Cookie` header.
///
/// The session cookie value has the form `<userId>-<token>-<email>` where
/// the email is percent-encoded. Both the user id and the email must be
/// present.
///
/// # Example
///
/// ```rust
/// use padsync_engine::{CookieIdentity, IdentityProvider};
///
/// let identity = CookieIdentity::new("theme=dark; c=42-f00d-alice%40example.com")
///     .resolve()
///     .unwrap();
/// assert_eq!(identity.user_id, "42");
/// assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct CookieIdentity {
    header: String,
}

impl CookieIdentity {
    /// Wraps a raw `Cookie` header value.
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
    }
}

impl IdentityProvider for CookieIdentity {
    fn resolve(&self) -> SyncResult<Identity> {
        let value = self
            .cookie(SESSION_COOKIE)
            .ok_or_else(|| SyncError::IdentityUnresolved("no session cookie".into()))?;

        let mut parts = value.splitn(3, '-');
        let user_id = parts.next().unwrap_or_default();
        let _token = parts.next();
        let raw_email = parts.next().unwrap_or_default();

        let email = urlencoding::decode(raw_email)
            .map_err(|e| SyncError::IdentityUnresolved(format!("bad email encoding: {e}")))?;

        if user_id.is_empty() || email.is_empty() {
            return Err(SyncError::IdentityUnresolved(
                "session cookie missing user id or email".into(),
            ));
        }

        Ok(Identity::new(user_id).with_email(email.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identity() {
        let identity = Identity::new("7").resolve().unwrap();
        assert_eq!(identity.user_id, "7");
        assert_eq!(identity.email, None);

        assert!(matches!(
            Identity::new("  ").resolve(),
            Err(SyncError::IdentityUnresolved(_))
        ));
    }

    #[test]
    fn cookie_identity() {
        let identity = CookieIdentity::new("c=42-abc-bob%40example.com").resolve().unwrap();
        assert_eq!(identity.user_id, "42");
        assert_eq!(identity.email.as_deref(), Some("bob@example.com"));
    }

    #[test]
    fn cookie_email_may_contain_dashes() {
        let identity = CookieIdentity::new("c=42-abc-first-last%40example.com")
            .resolve()
            .unwrap();
        assert_eq!(identity.email.as_deref(), Some("first-last@example.com"));
    }

    #[test]
    fn missing_cookie() {
        let err = CookieIdentity::new("theme=dark").resolve().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn incomplete_cookie() {
        assert!(CookieIdentity::new("c=42").resolve().is_err());
        assert!(CookieIdentity::new("c=42-token-").resolve().is_err());
        assert!(CookieIdentity::new("c=-token-a%40b.c").resolve().is_err());
    }

    #[test]
    fn cookie_lookup_ignores_similar_names() {
        let identity = CookieIdentity::new("cc=1-x-wrong%40x.y; c=2-y-right%40x.y")
            .resolve()
            .unwrap();
        assert_eq!(identity.user_id, "2");
    }
}
