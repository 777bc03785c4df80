//! Defines functions for handling user authentication with cookies.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::Token};

/// The name of the private cookie that holds the [Token].
pub(crate) const COOKIE_TOKEN: &str = "token";

/// Add an auth cookie that expires `duration` from now to the cookie jar.
///
/// # Errors
///
/// Returns an [Error::TokenError] if the expiry overflows or the token cannot
/// be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = Token::new(duration).ok_or_else(|| expiry_overflow(duration))?;

    set_token_cookie(jar, token)
}

fn expiry_overflow(duration: Duration) -> Error {
    Error::TokenError(format!("now plus {duration} overflows"))
}

fn set_token_cookie(jar: PrivateCookieJar, token: Token) -> Result<PrivateCookieJar, Error> {
    let token_string = serde_json::to_string(&token)
        .map_err(|error| Error::TokenError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .expires(token.expires_at)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Replace the auth cookie with one that has already expired, which removes
/// it on the client.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the token from the auth cookie in `jar`.
///
/// # Errors
///
/// Returns an [Error::NotAuthenticated] if the cookie is missing, could not be
/// decrypted, does not hold a token or the token has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::NotAuthenticated)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::NotAuthenticated)?;

    if token.is_expired(OffsetDateTime::now_utc()) {
        return Err(Error::NotAuthenticated);
    }

    Ok(token)
}

/// Set the expiry of the auth cookie in `jar` to the later of now plus
/// `duration` and the cookie's current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns an [Error::NotAuthenticated] if there is no valid token in `jar`, or
/// an [Error::TokenError] if the new expiry overflows.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let current = get_token_from_cookies(&jar)?;
    let extended = Token::new(duration).ok_or_else(|| expiry_overflow(duration))?;

    let token = Token {
        expires_at: max(current.expires_at, extended.expires_at),
    };

    set_token_cookie(jar, token)
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            Token,
            cookie::{
                COOKIE_TOKEN, extend_auth_cookie_duration_if_needed, get_token_from_cookies,
                invalidate_auth_cookie, set_auth_cookie,
            },
        },
    };

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(Key::generate())
    }

    #[test]
    fn set_cookie_holds_valid_token() {
        let jar = set_auth_cookie(get_jar(), Duration::minutes(5)).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();

        let remaining = token.expires_at - OffsetDateTime::now_utc();
        assert!(remaining > Duration::minutes(4) && remaining <= Duration::minutes(5));
    }

    #[test]
    fn set_cookie_fails_when_expiry_overflows() {
        let result = set_auth_cookie(get_jar(), Duration::MAX);

        assert!(
            matches!(result, Err(Error::TokenError(_))),
            "want a token error, got {:?}",
            result.map(|_| ())
        );
    }

    #[test]
    fn missing_cookie_is_not_authenticated() {
        assert_eq!(
            get_token_from_cookies(&get_jar()),
            Err(Error::NotAuthenticated)
        );
    }

    #[test]
    fn expired_token_is_not_authenticated() {
        let jar = set_auth_cookie(get_jar(), Duration::seconds(-1)).unwrap();

        assert_eq!(get_token_from_cookies(&jar), Err(Error::NotAuthenticated));
    }

    #[test]
    fn invalidated_cookie_is_not_authenticated() {
        let jar = set_auth_cookie(get_jar(), Duration::minutes(5)).unwrap();

        let jar = invalidate_auth_cookie(jar);

        assert_eq!(jar.get(COOKIE_TOKEN).unwrap().value(), "deleted");
        assert_eq!(get_token_from_cookies(&jar), Err(Error::NotAuthenticated));
    }

    #[test]
    fn extend_pushes_expiry_forward() {
        let jar = set_auth_cookie(get_jar(), Duration::minutes(1)).unwrap();

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(30)).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        assert!(token.expires_at - OffsetDateTime::now_utc() > Duration::minutes(29));
    }

    #[test]
    fn extend_keeps_later_expiry() {
        let jar = set_auth_cookie(get_jar(), Duration::days(7)).unwrap();
        let Token { expires_at: before } = get_token_from_cookies(&jar).unwrap();

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(5)).unwrap();

        assert_eq!(get_token_from_cookies(&jar).unwrap().expires_at, before);
    }
}
