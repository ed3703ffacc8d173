//! Tests for the domain user model.

use super::*;
use rstest::rstest;
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

fn sample_user() -> User {
    User::new(
        UserId::new(VALID_ID).expect("valid id"),
        DisplayName::new("Ada Lovelace").expect("valid name"),
        Email::new("Ada@Example.com").expect("valid email"),
        PasswordCredential::hash("secret1"),
    )
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn rejects_invalid_ids(#[case] id: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(id), Err(expected));
}

#[rstest]
#[case("")]
#[case("   ")]
fn rejects_blank_display_names(#[case] name: &str) {
    assert_eq!(
        DisplayName::new(name),
        Err(UserValidationError::EmptyDisplayName)
    );
}

#[test]
fn display_names_are_trimmed() {
    let name = DisplayName::new("  Grace Hopper ").expect("valid name");
    assert_eq!(name.as_ref(), "Grace Hopper");
    assert_eq!(name.first_name(), "Grace");
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("  ", UserValidationError::EmptyEmail)]
#[case("ada", UserValidationError::InvalidEmail)]
#[case("ada@", UserValidationError::InvalidEmail)]
#[case("a@b@c", UserValidationError::InvalidEmail)]
#[case("ada lovelace@example.com", UserValidationError::InvalidEmail)]
fn rejects_invalid_emails(#[case] email: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::new(email), Err(expected));
}

#[rstest]
#[case("ada@example.com", true)]
#[case("ADA@EXAMPLE.COM", true)]
#[case("  ada@example.com  ", true)]
#[case("ada@example.org", false)]
fn email_matching_ignores_case(#[case] candidate: &str, #[case] expected: bool) {
    let email = Email::new("Ada@Example.com").expect("valid email");
    assert_eq!(email.matches(candidate), expected);
}

#[test]
fn validation_errors_map_to_invalid_request_with_field() {
    let err: Error = UserValidationError::InvalidEmail.into();
    assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    assert_eq!(err.details(), Some(&json!({ "field": "email" })));
}

#[test]
fn users_serialise_with_password_hash() {
    let user = sample_user();
    let value = serde_json::to_value(&user).expect("serialise user");

    assert_eq!(value["id"], json!(VALID_ID));
    assert_eq!(value["name"], json!("Ada Lovelace"));
    assert_eq!(value["email"], json!("Ada@Example.com"));
    assert!(value.get("password").is_none());
    let hash = value["passwordHash"].as_str().expect("hash string");
    assert!(hash.starts_with("sha256$"));

    let decoded: User = serde_json::from_value(value).expect("deserialise user");
    assert_eq!(decoded, user);
}

#[test]
fn legacy_records_with_plaintext_password_load() {
    let value = json!({
        "id": VALID_ID,
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "password": "secret1"
    });
    let user: User = serde_json::from_value(value).expect("legacy record");
    assert!(user.credential().is_legacy());
    assert!(user.credential().verify("secret1"));
}

#[test]
fn records_without_credentials_are_rejected() {
    let value = json!({
        "id": VALID_ID,
        "name": "Ada Lovelace",
        "email": "ada@example.com"
    });
    let result: Result<User, _> = serde_json::from_value(value);
    assert!(result.is_err());
}

#[test]
fn profile_omits_credential() {
    let profile = sample_user().profile();
    let value = serde_json::to_value(&profile).expect("serialise profile");
    assert_eq!(
        value,
        json!({ "id": VALID_ID, "name": "Ada Lovelace", "email": "Ada@Example.com" })
    );
}
