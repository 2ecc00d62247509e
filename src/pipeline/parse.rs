//! Recover a JSON object from the model's raw reply.
//!
//! Models are asked for bare JSON but do not always comply. The reply is
//! classified in a fixed order:
//!
//! 1. Starts with `{` → the whole reply must be a JSON object.
//! 2. Contains a fenced block (` ``` ` or ` ```json `) wrapping an object →
//!    the wrapped object must parse.
//! 3. Anything else → the reply is kept verbatim under `rawResponse`.
//!
//! Once steps 1 or 2 have matched a JSON-looking span, a parse error is a
//! real failure and is returned as [`ExtractError::MalformedJson`]; it never
//! degrades to the `rawResponse` fallback.

use crate::envelope::StructuredResult;
use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Key under which unstructured replies are returned.
pub const RAW_RESPONSE_KEY: &str = "rawResponse";

static RE_FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

/// Classify and parse the model reply.
pub fn parse_model_output(raw: &str) -> Result<StructuredResult, ExtractError> {
    let text = raw.trim();

    if text.starts_with('{') {
        debug!("Model reply is bare JSON");
        return parse_object(text);
    }

    if let Some(caps) = RE_FENCED_JSON.captures(text) {
        debug!("Model reply contains a fenced JSON block");
        return parse_object(&caps[1]);
    }

    debug!("No JSON found in model reply; returning raw text");
    let mut result = StructuredResult::new();
    result.insert(RAW_RESPONSE_KEY.to_string(), Value::String(text.to_string()));
    Ok(result)
}

fn parse_object(span: &str) -> Result<StructuredResult, ExtractError> {
    serde_json::from_str(span).map_err(|source| ExtractError::MalformedJson { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> StructuredResult {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn bare_json() {
        let out = parse_model_output(r#"{"a":1}"#).unwrap();
        assert_eq!(out, obj(json!({"a": 1})));
    }

    #[test]
    fn bare_json_with_surrounding_whitespace() {
        let out = parse_model_output("\n  {\"a\": {\"b\": [1, true, null]}}  \n").unwrap();
        assert_eq!(out, obj(json!({"a": {"b": [1, true, null]}})));
    }

    #[test]
    fn fenced_json() {
        let out = parse_model_output("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(out, obj(json!({"a": 1})));
    }

    #[test]
    fn fenced_without_language_tag_and_with_prose() {
        let raw = "Here is the data:\n```\n{\"name\": \"Jane\"}\n```\nLet me know!";
        let out = parse_model_output(raw).unwrap();
        assert_eq!(out, obj(json!({"name": "Jane"})));
    }

    #[test]
    fn fenced_nested_object() {
        let raw = "```json\n{\"applicant\": {\"fullName\": \"Jane Doe\"}, \"ok\": true}\n```";
        let out = parse_model_output(raw).unwrap();
        assert_eq!(
            out,
            obj(json!({"applicant": {"fullName": "Jane Doe"}, "ok": true}))
        );
    }

    #[test]
    fn free_text_falls_back_to_raw_response() {
        let out = parse_model_output("no json here").unwrap();
        assert_eq!(out, obj(json!({"rawResponse": "no json here"})));
    }

    #[test]
    fn fenced_invalid_json_is_an_error() {
        let err = parse_model_output("```json\n{\"a\":1,}\n```").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedJson { .. }), "got: {err:?}");
    }

    #[test]
    fn bare_invalid_json_is_an_error() {
        let err = parse_model_output("{\"a\": 1").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedJson { .. }));
    }

    #[test]
    fn bare_json_with_trailing_prose_is_an_error() {
        let err = parse_model_output("{\"a\": 1}\nHope this helps").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedJson { .. }));
    }

    #[test]
    fn fence_without_object_falls_back() {
        let raw = "```json\n[1, 2, 3]\n```";
        let out = parse_model_output(raw).unwrap();
        assert_eq!(out, obj(json!({"rawResponse": raw})));
    }
}
