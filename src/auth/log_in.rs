//! Handlers for logging in and out.
//!
//! A successful log-in sets an encrypted cookie holding a [Token](crate::auth::Token),
//! which the auth guard checks on every protected route.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        cookie::{invalidate_auth_cookie, set_auth_cookie},
        get_password_hash,
    },
    db::lock_connection,
};

/// How long the auth cookie should last if the user asks to be remembered.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection holding the password hash.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The body of a log-in request.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// The plain text password.
    pub password: String,
    /// Keep the session alive for a week instead of the configured duration.
    #[serde(default)]
    pub remember_me: bool,
}

/// Handler for log-in requests.
///
/// Sets the auth cookie and responds with 204 No Content if the password is
/// correct.
///
/// # Errors
///
/// Responds with 401 Unauthorized if no password has been set or the password
/// is wrong, and 500 if the password could not be checked.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Json(log_in_data): Json<LogInData>,
) -> Response {
    let password_hash = {
        let connection = match lock_connection(&state.db_connection) {
            Ok(connection) => connection,
            Err(error) => return error.into_response(),
        };

        match get_password_hash(&connection) {
            Ok(Some(password_hash)) => password_hash,
            Ok(None) => {
                tracing::warn!("Log-in attempted before a password was set.");
                return Error::PasswordNotSet.into_response();
            }
            Err(error) => return error.into_response(),
        }
    };

    match password_hash.verify(&log_in_data.password) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("Log-in attempted with an incorrect password.");
            return Error::InvalidCredentials.into_response();
        }
        Err(error) => {
            return Error::HashingError(error.to_string()).into_response();
        }
    }

    let cookie_duration = if log_in_data.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    match set_auth_cookie(jar, cookie_duration) {
        Ok(jar) => (jar, StatusCode::NO_CONTENT).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Invalidate the auth cookie, ending the session.
pub async fn post_log_out(jar: PrivateCookieJar) -> Response {
    (invalidate_auth_cookie(jar), StatusCode::NO_CONTENT).into_response()
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        body::to_bytes,
        extract::State,
        http::{StatusCode, header::SET_COOKIE},
        response::Response,
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{
            PasswordHash,
            cookie::COOKIE_TOKEN,
            log_in::{LogInData, LogInState, post_log_in, post_log_out},
            set_password_hash,
        },
        test_utils::get_test_connection,
    };

    const TEST_PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_state(with_password: bool) -> LogInState {
        let connection = get_test_connection();

        if with_password {
            let password_hash = PasswordHash::from_raw_password(TEST_PASSWORD, 4).unwrap();
            set_password_hash(&password_hash, &connection).unwrap();
        }

        LogInState {
            cookie_key: Key::generate(),
            cookie_duration: Duration::minutes(30),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn new_log_in_request(state: LogInState, password: &str, remember_me: bool) -> Response {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(
            State(state),
            jar,
            Json(LogInData {
                password: password.to_owned(),
                remember_me,
            }),
        )
        .await
    }

    #[track_caller]
    fn get_token_cookie(response: &Response) -> Cookie<'static> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|header| Cookie::parse(header.to_str().unwrap().to_owned()).unwrap())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
            .expect("response should set the token cookie")
    }

    #[track_caller]
    fn assert_expires_after(cookie: &Cookie<'_>, duration: Duration) {
        let expected = OffsetDateTime::now_utc() + duration;
        let expires = cookie.expires_datetime().unwrap();

        assert!(
            (expires - expected).abs() < Duration::seconds(5),
            "got expiry {expires}, want about {expected}"
        );
    }

    async fn get_error_message(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        json["error"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn log_in_succeeds_with_correct_password() {
        let state = get_test_state(true);
        let cookie_duration = state.cookie_duration;

        let response = new_log_in_request(state, TEST_PASSWORD, false).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_expires_after(&get_token_cookie(&response), cookie_duration);
    }

    #[tokio::test]
    async fn remember_me_extends_session() {
        let state = get_test_state(true);

        let response = new_log_in_request(state, TEST_PASSWORD, true).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_expires_after(&get_token_cookie(&response), Duration::days(7));
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let state = get_test_state(true);

        let response = new_log_in_request(state, "wrongpassword", false).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(get_error_message(response).await, "invalid password");
    }

    #[tokio::test]
    async fn log_in_fails_without_password_set() {
        let state = get_test_state(false);

        let response = new_log_in_request(state, TEST_PASSWORD, false).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_error_message(response).await,
            "no password has been set for this server"
        );
    }

    #[tokio::test]
    async fn log_out_expires_cookie() {
        let jar = PrivateCookieJar::new(Key::generate());

        let response = post_log_out(jar).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookie = get_token_cookie(&response);
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
