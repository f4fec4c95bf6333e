//! Decoding of note service responses.
//!
//! Every body is parsed here so that a malformed response surfaces as
//! [`StoreError::Protocol`] instead of a half-filled struct further up.
//! Error bodies follow the service's `{"detail": ...}` convention, where
//! `detail` is either a message or a list of field validation errors.

use notes::{Note, StoreError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::accounts::{AuthToken, User};

fn parse<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, StoreError> {
    serde_json::from_slice(body).map_err(|e| StoreError::Protocol(format!("{what}: {e}")))
}

fn check_note(note: Note) -> Result<Note, StoreError> {
    if note.id.trim().is_empty() {
        return Err(StoreError::Protocol("note: empty id".to_string()));
    }
    if let Some(sensitivity) = &note.sensitivity {
        if sensitivity.sensitivity_score > 100 {
            return Err(StoreError::Protocol(format!(
                "note {}: sensitivity score {} out of range",
                note.id, sensitivity.sensitivity_score
            )));
        }
    }
    Ok(note)
}

pub fn parse_note(body: &[u8]) -> Result<Note, StoreError> {
    check_note(parse(body, "note")?)
}

pub fn parse_notes(body: &[u8]) -> Result<Vec<Note>, StoreError> {
    parse::<Vec<Note>>(body, "note list")?
        .into_iter()
        .map(check_note)
        .collect()
}

pub fn parse_user(body: &[u8]) -> Result<User, StoreError> {
    parse(body, "user")
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

pub fn parse_token(body: &[u8]) -> Result<AuthToken, StoreError> {
    let response: TokenResponse = parse(body, "token")?;
    if let Some(kind) = &response.token_type {
        if !kind.eq_ignore_ascii_case("bearer") {
            return Err(StoreError::Protocol(format!("token: unsupported type {kind}")));
        }
    }
    AuthToken::new(response.access_token)
        .ok_or_else(|| StoreError::Protocol("token: empty access_token".to_string()))
}

/// The human-readable `detail` of an error body, if there is one.
pub fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::String(message) => Some(message.clone()),
        Value::Array(errors) => {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

/// Map a non-success status and its body to a [`StoreError`].
pub fn status_error(status: u16, body: &[u8]) -> StoreError {
    let detail = error_detail(body);
    match status {
        404 => StoreError::NotFound,
        401 => StoreError::Unauthorized,
        400..=499 => StoreError::Rejected {
            status,
            detail: detail.unwrap_or_else(|| format!("request failed with status {status}")),
        },
        _ => StoreError::Server {
            status,
            detail: detail.unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = r#"{
        "id": "n1",
        "user_id": "u1",
        "title": "Diary",
        "content": "[Encrypted content - Password required to view]",
        "is_encrypted": true,
        "created_at": 1700000000.5,
        "updated_at": 1700000100.0,
        "sensitivity": {"sensitivity_score": 72, "explanation": "Contains a bank PIN"}
    }"#;

    #[test]
    fn parses_locked_note_with_sensitivity() {
        let note = parse_note(NOTE.as_bytes()).unwrap();
        assert!(note.is_locked());
        assert_eq!(note.sensitivity.unwrap().sensitivity_score, 72);
    }

    #[test]
    fn sensitivity_is_optional() {
        let body = r#"[{"id":"n2","user_id":"u1","title":"t","content":"c",
            "is_encrypted":false,"created_at":1,"updated_at":2}]"#;
        let notes = parse_notes(body.as_bytes()).unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].sensitivity.is_none());
    }

    #[test]
    fn malformed_bodies_are_protocol_errors() {
        let missing_title = r#"{"id":"n1","user_id":"u1","content":"c",
            "is_encrypted":false,"created_at":1,"updated_at":2}"#;
        assert!(matches!(
            parse_note(missing_title.as_bytes()),
            Err(StoreError::Protocol(_))
        ));

        let bad_score = NOTE.replace("72", "140");
        assert!(matches!(
            parse_note(bad_score.as_bytes()),
            Err(StoreError::Protocol(_))
        ));

        assert!(matches!(parse_note(b"<html>"), Err(StoreError::Protocol(_))));
    }

    #[test]
    fn token_requires_bearer_and_value() {
        let token = parse_token(br#"{"access_token":"abc","token_type":"bearer"}"#).unwrap();
        assert_eq!(token.expose(), "abc");
        assert!(parse_token(br#"{"access_token":"","token_type":"bearer"}"#).is_err());
        assert!(parse_token(br#"{"access_token":"abc","token_type":"mac"}"#).is_err());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_error(404, b""), StoreError::NotFound);
        assert_eq!(status_error(401, b"{}"), StoreError::Unauthorized);
        assert_eq!(
            status_error(
                400,
                br#"{"detail":"Failed to decrypt note: Decryption failed"}"#
            ),
            StoreError::Rejected {
                status: 400,
                detail: "Failed to decrypt note: Decryption failed".to_string()
            }
        );
        assert!(matches!(
            status_error(503, b"bad gateway"),
            StoreError::Server { status: 503, .. }
        ));
    }

    #[test]
    fn validation_list_details_are_joined() {
        let body = br#"{"detail":[
            {"loc":["body","title"],"msg":"field required","type":"value_error.missing"},
            {"loc":["body","content"],"msg":"field required","type":"value_error.missing"}
        ]}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("field required; field required")
        );
        assert!(matches!(
            status_error(422, body),
            StoreError::Rejected { status: 422, .. }
        ));
    }
}
