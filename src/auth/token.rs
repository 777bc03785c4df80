//! Defines the token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Proof of a successful log-in that is valid until `expires_at`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Token {
    /// When the session ends.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A token that expires `duration` from now.
    ///
    /// Returns `None` if the expiry would overflow.
    pub fn new(duration: Duration) -> Option<Self> {
        OffsetDateTime::now_utc()
            .checked_add(duration)
            .map(|expires_at| Self { expires_at })
    }

    /// Whether the session has ended at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use crate::auth::token::Token;

    #[test]
    fn serialise_token() {
        let token = Token {
            expires_at: datetime!(2025-12-21 00:00:00 UTC),
        };

        let serialized = serde_json::to_string(&token).unwrap();

        assert_eq!(serialized, r#"{"expires_at":"2025-12-21T00:00:00Z"}"#);
        assert_eq!(serde_json::from_str::<Token>(&serialized).unwrap(), token);
    }

    #[test]
    fn expiry() {
        let token = Token {
            expires_at: datetime!(2025-12-21 03:54:00 UTC),
        };

        assert!(!token.is_expired(datetime!(2025-12-21 03:53:59 UTC)));
        assert!(token.is_expired(datetime!(2025-12-21 03:54:00 UTC)));
    }

    #[test]
    fn new_expires_after_duration() {
        let token = Token::new(Duration::minutes(5)).unwrap();

        assert!(!token.is_expired(time::OffsetDateTime::now_utc()));
    }
}
