//! Replaying adapters that serve recorded interactions from cassettes.

pub mod generation_service;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;
use crate::error::DesignError;

/// Retrieve the next recorded output for a given port and method.
///
/// # Errors
///
/// Returns an error if the cassette has no more interactions for the pair.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, DesignError> {
    let mut guard = replayer
        .lock()
        .map_err(|e| DesignError::Api { status: 0, message: format!("Replayer lock poisoned: {e}") })?;
    guard
        .next_interaction(port, method)
        .map(|interaction| interaction.output.clone())
        .map_err(|message| DesignError::Api { status: 0, message })
}

/// Deserialize a replayed output as `Result<T, DesignError>`.
///
/// Accepts `{"Err": {"kind", "message"}}` as written by the recorder, a plain
/// `{"Err": "message"}`, `{"Ok": value}`, or a bare value.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, DesignError> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        return Err(match err_val {
            serde_json::Value::String(message) => {
                DesignError::from_recorded("service", message.clone())
            }
            other => {
                let kind = other.get("kind").and_then(|k| k.as_str()).unwrap_or("service");
                let message = other
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("replayed error")
                    .to_string();
                DesignError::from_recorded(kind, message)
            }
        });
    }
    let ok = output.get("Ok").or_else(|| output.get("ok")).cloned();
    serde_json::from_value(ok.unwrap_or(output))
        .map_err(|e| DesignError::MalformedResponse(format!("Replayed output does not match: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_value() {
        let text: String = replay_result(json!({"Ok": "rustic"})).unwrap();
        assert_eq!(text, "rustic");
    }

    #[test]
    fn bare_value() {
        let text: String = replay_result(json!("bare")).unwrap();
        assert_eq!(text, "bare");
    }

    #[test]
    fn structured_error_keeps_kind() {
        let err = replay_result::<String>(json!({"Err": {"kind": "empty_result", "message": "none"}}))
            .unwrap_err();
        assert!(matches!(err, DesignError::EmptyResult(ref m) if m == "none"));
    }

    #[test]
    fn plain_error_is_service_error() {
        let err = replay_result::<String>(json!({"Err": "503 unavailable"})).unwrap_err();
        assert_eq!(err.category(), "service");
        assert!(err.to_string().contains("503 unavailable"));
    }

    #[test]
    fn mismatched_shape_is_malformed() {
        let err = replay_result::<String>(json!({"Ok": {"text": 1}})).unwrap_err();
        assert!(matches!(err, DesignError::MalformedResponse(_)));
    }
}
