use super::*;

#[test]
fn env_bool_parses_common_spellings() {
    // SAFETY: test-local variable name, no concurrent reader.
    unsafe { std::env::set_var("FLEETDESK_TEST_BOOL", "TRUE") };
    assert_eq!(env_bool("FLEETDESK_TEST_BOOL"), Some(true));
    unsafe { std::env::set_var("FLEETDESK_TEST_BOOL", "0") };
    assert_eq!(env_bool("FLEETDESK_TEST_BOOL"), Some(false));
    unsafe { std::env::set_var("FLEETDESK_TEST_BOOL", " yes ") };
    assert_eq!(env_bool("FLEETDESK_TEST_BOOL"), Some(true));
    unsafe { std::env::set_var("FLEETDESK_TEST_BOOL", "banana") };
    assert_eq!(env_bool("FLEETDESK_TEST_BOOL"), None);
    unsafe { std::env::remove_var("FLEETDESK_TEST_BOOL") };
    assert_eq!(env_bool("FLEETDESK_TEST_BOOL"), None);
}

#[test]
fn session_cookie_is_http_only_lax() {
    let cookie = session_cookie("token-value".into());
    assert_eq!(cookie.name(), "session_token");
    assert_eq!(cookie.value(), "token-value");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(
        cookie.same_site(),
        Some(axum_extra::extract::cookie::SameSite::Lax)
    );
}

#[test]
fn auth_errors_map_to_expected_statuses() {
    use crate::services::auth::AuthError;
    use axum::response::Response;

    fn status_of(response: Response) -> StatusCode {
        response.status()
    }

    assert_eq!(status_of(auth_error_response(&AuthError::InvalidEmail)), StatusCode::BAD_REQUEST);
    assert_eq!(status_of(auth_error_response(&AuthError::WeakPassword)), StatusCode::BAD_REQUEST);
    assert_eq!(status_of(auth_error_response(&AuthError::EmailTaken)), StatusCode::CONFLICT);
    assert_eq!(
        status_of(auth_error_response(&AuthError::InvalidCredentials)),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        status_of(auth_error_response(&AuthError::Hash("x".into()))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
