//! Access token wire format and in-memory session state
//!
//! The backend answers login, register and refresh calls with the same
//! [`TokenResponse`] shape. [`Session`] is the client's view of it: the
//! opaque access token, its computed expiry, and whether the user is
//! authenticated.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TokenResponse
// ---------------------------------------------------------------------------

/// Body returned by `/auth/login`, `/auth/register` and `/auth/refresh`.
///
/// `expires_in` is a lifetime in seconds. Some backend builds omit it, in
/// which case the configured default lifetime applies.
///
/// # Examples
///
/// ```
/// use surveyflow::auth::token::TokenResponse;
///
/// let resp: TokenResponse =
///     serde_json::from_str(r#"{"access_token":"abc","expires_in":900}"#).unwrap();
/// assert_eq!(resp.access_token, "abc");
/// assert_eq!(resp.expires_in, Some(900));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// Opaque bearer credential.
    pub access_token: String,

    /// Lifetime of `access_token` in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Client-side session state.
///
/// Owned by [`SessionManager`](crate::auth::SessionManager); other components
/// only ever see clones returned by
/// [`snapshot`](crate::auth::SessionManager::snapshot).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Current access token, if any.
    pub access_token: Option<String>,

    /// UTC instant at which `access_token` expires.
    pub expires_at: Option<DateTime<Utc>>,

    /// Whether the user is signed in.
    pub authenticated: bool,
}

impl Session {
    /// Builds an authenticated session from a token response received at
    /// `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use surveyflow::auth::token::{Session, TokenResponse};
    ///
    /// let now = Utc::now();
    /// let session = Session::from_token(
    ///     TokenResponse { access_token: "t".into(), expires_in: Some(120) },
    ///     900,
    ///     now,
    /// );
    /// assert!(session.authenticated);
    /// assert_eq!(session.expires_at, Some(now + Duration::seconds(120)));
    /// ```
    pub fn from_token(token: TokenResponse, default_expires_in: u64, now: DateTime<Utc>) -> Self {
        let lifetime = token.expires_in.unwrap_or(default_expires_in);
        Self {
            access_token: Some(token.access_token),
            expires_at: Some(now + Duration::seconds(lifetime as i64)),
            authenticated: true,
        }
    }

    /// Delay until the background refresh should fire.
    ///
    /// Computed as `max(expires_at - now - lead, 0)`. Returns `None` when
    /// either the token or the expiry is absent, meaning no timer should be
    /// armed.
    pub fn refresh_delay(&self, lead: Duration, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.access_token.as_ref()?;
        let expires_at = self.expires_at?;
        let remaining = expires_at - now - lead;
        Some(remaining.to_std().unwrap_or(std::time::Duration::ZERO))
    }

    /// Returns `true` once `expires_at` has passed. Sessions without an
    /// expiry never expire on their own.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: Option<u64>) -> TokenResponse {
        TokenResponse {
            access_token: "tok".to_string(),
            expires_in,
        }
    }

    #[test]
    fn test_from_token_uses_default_lifetime_when_missing() {
        let now = Utc::now();
        let session = Session::from_token(token(None), 900, now);
        assert_eq!(session.expires_at, Some(now + Duration::seconds(900)));
        assert_eq!(session.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_token_response_without_expires_in_parses() {
        let resp: TokenResponse = serde_json::from_str(r#"{"access_token":"x"}"#).unwrap();
        assert_eq!(resp.expires_in, None);
    }

    #[test]
    fn test_refresh_delay_subtracts_lead() {
        let now = Utc::now();
        let session = Session::from_token(token(Some(600)), 900, now);
        let delay = session.refresh_delay(Duration::seconds(60), now).unwrap();
        assert_eq!(delay, std::time::Duration::from_secs(540));
    }

    #[test]
    fn test_refresh_delay_clamps_to_zero() {
        let now = Utc::now();
        let session = Session::from_token(token(Some(30)), 900, now);
        let delay = session.refresh_delay(Duration::seconds(60), now).unwrap();
        assert_eq!(delay, std::time::Duration::ZERO);
    }

    #[test]
    fn test_refresh_delay_none_without_token() {
        let session = Session {
            access_token: None,
            expires_at: Some(Utc::now()),
            authenticated: false,
        };
        assert!(session
            .refresh_delay(Duration::seconds(60), Utc::now())
            .is_none());
        assert!(Session::default()
            .refresh_delay(Duration::seconds(60), Utc::now())
            .is_none());
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let session = Session::from_token(token(Some(10)), 900, now);
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::seconds(10)));
        assert!(!Session::default().is_expired(now));
    }
}
