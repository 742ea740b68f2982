use std::fmt;

/// Bearer credential of the signed-in user.
///
/// The token itself is opaque: it is never inspected or validated on the
/// client, the backend answers `401` when it is no longer acceptable.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// Key under which the token is kept in the persistent app storage.
    pub const STORAGE_KEY: &'static str = "token";

    /// Restores a session from the persisted value. An empty value means
    /// the user logged out last time.
    pub fn from_stored(stored: Option<String>) -> Self {
        Self {
            token: stored.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let mut session = Self::default();
        session.sign_in(token);
        session
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn sign_in(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
    }

    pub fn sign_out(&mut self) {
        self.token = None;
    }

    /// Value written back to the persistent storage.
    pub fn to_stored(&self) -> String {
        self.token.clone().unwrap_or_default()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stored_value_is_signed_out() {
        assert!(!Session::from_stored(None).is_authenticated());
        assert!(!Session::from_stored(Some(String::new())).is_authenticated());
        assert!(!Session::from_stored(Some("  ".to_string())).is_authenticated());
    }

    #[test]
    fn test_sign_in_and_out_round_trip_through_storage() {
        let mut session = Session::default();
        session.sign_in("abc.def");
        assert_eq!(session.token(), Some("abc.def"));

        let restored = Session::from_stored(Some(session.to_stored()));
        assert_eq!(restored, session);

        session.sign_out();
        assert_eq!(session.to_stored(), "");
        assert!(!Session::from_stored(Some(session.to_stored())).is_authenticated());
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let session = Session::with_token("secret-token");
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("redacted"));
    }
}
