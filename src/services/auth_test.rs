use super::*;

#[test]
fn normalize_email_trims_and_lowercases() {
    assert_eq!(
        normalize_email("  Workshop@Fleet.Test "),
        Some("workshop@fleet.test".to_owned())
    );
}

#[test]
fn normalize_email_rejects_malformed() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("   "), None);
    assert_eq!(normalize_email("no-at-sign"), None);
    assert_eq!(normalize_email("@domain"), None);
    assert_eq!(normalize_email("local@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

#[test]
fn name_from_email_uses_local_part() {
    assert_eq!(name_from_email("mechanic@fleet.test"), "mechanic");
}

#[test]
fn hash_then_verify_round_trip() {
    let hash = hash_password("correct horse battery").expect("hash");
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "correct horse battery"));
    assert!(!verify_password(&hash, "wrong password"));
}

#[test]
fn hashes_are_salted() {
    let a = hash_password("same input").expect("hash");
    let b = hash_password("same input").expect("hash");
    assert_ne!(a, b);
}

#[test]
fn verify_rejects_garbage_hash() {
    assert!(!verify_password("not-a-phc-string", "anything"));
    assert!(!verify_password("", "anything"));
}

#[tokio::test]
async fn sign_up_rejects_bad_email_before_touching_db() {
    let state = crate::state::test_helpers::test_app_state();
    let err = sign_up(&state.pool, "nope", None, "long enough password")
        .await
        .expect_err("invalid email");
    assert!(matches!(err, AuthError::InvalidEmail));
}

#[tokio::test]
async fn sign_up_rejects_short_password_before_touching_db() {
    let state = crate::state::test_helpers::test_app_state();
    let err = sign_up(&state.pool, "ok@fleet.test", None, "short")
        .await
        .expect_err("weak password");
    assert!(matches!(err, AuthError::WeakPassword));
}

#[tokio::test]
async fn sign_in_normalization_failure_is_invalid_credentials() {
    let state = crate::state::test_helpers::test_app_state();
    let err = sign_in(&state.pool, "not-an-email", "whatever password")
        .await
        .expect_err("invalid credentials");
    assert!(matches!(err, AuthError::InvalidCredentials));
}
