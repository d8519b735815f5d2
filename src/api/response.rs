//! Shared decoding of server replies.
//!
//! Every JSON endpoint answers with the expected payload, an
//! `{"error": "..."}` object, or a `{"form_errors": {...}}` object. The
//! decoder folds those three shapes (plus HTTP and transport failures) into
//! one [`Outcome`].

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Key of form-level validation messages.
pub const FORM_LEVEL: &str = "__all__";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },

    /// `error` field of a JSON reply.
    #[error("{0}")]
    Server(String),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unexpected page: {0}")]
    Page(String),
}

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn form_level(&self) -> &[String] {
        self.field(FORM_LEVEL)
    }

    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Field-scoped messages, skipping the form-level key.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .filter(|(name, _)| name.as_str() != FORM_LEVEL)
            .map(|(name, errors)| (name.as_str(), errors.as_slice()))
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for FormErrors {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Result of one API call.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Invalid(FormErrors),
    Failed(ApiError),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Invalid(errors) => Outcome::Invalid(errors),
            Outcome::Failed(err) => Outcome::Failed(err),
        }
    }
}

impl<T> From<ApiError> for Outcome<T> {
    fn from(err: ApiError) -> Self {
        Outcome::Failed(err)
    }
}

impl<T> From<reqwest::Error> for Outcome<T> {
    fn from(err: reqwest::Error) -> Self {
        Outcome::Failed(err.into())
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    form_errors: Option<FormErrors>,
}

/// Decode a reply body received with `status`.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Outcome<T> {
    if !status.is_success() {
        return Outcome::Failed(ApiError::Status {
            status,
            body: body.trim().to_string(),
        });
    }

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return Outcome::Failed(e.into()),
    };

    if value.is_object() {
        if let Ok(envelope) = Envelope::deserialize(&value) {
            if let Some(error) = envelope.error.filter(|e| !e.is_empty()) {
                return Outcome::Failed(ApiError::Server(error));
            }
            if let Some(errors) = envelope.form_errors {
                return Outcome::Invalid(errors);
            }
        }
    }

    match serde_json::from_value(value) {
        Ok(payload) => Outcome::Ok(payload),
        Err(e) => Outcome::Failed(e.into()),
    }
}

/// Read a full response and decode it.
pub async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Outcome<T> {
    let status = response.status();
    match response.text().await {
        Ok(body) => decode(status, &body),
        Err(e) => Outcome::Failed(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        entry: u64,
    }

    #[test]
    fn test_decode_payload() {
        match decode::<Entry>(StatusCode::OK, r#"{"entry": 42}"#) {
            Outcome::Ok(e) => assert_eq!(e, Entry { entry: 42 }),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_field() {
        match decode::<Entry>(StatusCode::OK, r#"{"error": "Not logged in"}"#) {
            Outcome::Failed(ApiError::Server(msg)) => assert_eq!(msg, "Not logged in"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_form_errors() {
        let body = r#"{"form_errors": {"__all__": ["Overlaps"], "start": ["Required"]}}"#;
        match decode::<Entry>(StatusCode::OK, body) {
            Outcome::Invalid(errors) => {
                assert_eq!(errors.form_level(), ["Overlaps".to_string()]);
                assert_eq!(errors.field("start"), ["Required".to_string()]);
                assert!(errors.field("end").is_empty());
                let fields: Vec<_> = errors.fields().map(|(name, _)| name).collect();
                assert_eq!(fields, vec!["start"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_http_status() {
        match decode::<Entry>(StatusCode::BAD_REQUEST, "No user found\n") {
            Outcome::Failed(err) => assert_eq!(err.to_string(), "400 Bad Request: No user found"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_error_is_not_a_failure() {
        let body = r#"{"error": "", "entry": 3}"#;
        assert!(matches!(decode::<Entry>(StatusCode::OK, body), Outcome::Ok(Entry { entry: 3 })));
    }

    #[test]
    fn test_decode_array_payload() {
        let out: Outcome<Vec<u32>> = decode(StatusCode::OK, "[1, 2]");
        assert!(matches!(out, Outcome::Ok(v) if v == vec![1, 2]));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode::<Entry>(StatusCode::OK, "<html>"),
            Outcome::Failed(ApiError::Decode(_))
        ));
    }
}
