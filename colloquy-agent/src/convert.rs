use serde_json::Value;

use crate::types::AgentResponse;

/// Text used when no reply field is present in an otherwise successful response.
pub const FALLBACK_REPLY: &str = "Unable to generate response";

/// Renders a JSON value as reply text. Strings are taken verbatim.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Returns `value` unless it is absent or JSON `null`.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Extracts the reply text from an agent response envelope.
///
/// Fields are tried in order, first present wins:
/// `response.result`, `response.response`, `response` when it is a string,
/// top-level `raw_response`, and finally [`FALLBACK_REPLY`].
pub fn interpret_response(response: &AgentResponse) -> String {
    let body = present(response.response.as_ref());

    present(body.and_then(|b| b.get("result")))
        .or_else(|| present(body.and_then(|b| b.get("response"))))
        .or_else(|| body.filter(|b| b.is_string()))
        .or_else(|| present(response.raw_response.as_ref()))
        .map(value_to_text)
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> AgentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_result_field() {
        let resp = parse(json!({"success": true, "response": {"result": "Hi"}}));
        assert_eq!(interpret_response(&resp), "Hi");
    }

    #[test]
    fn test_plain_string_response() {
        let resp = parse(json!({"success": true, "response": "Hi"}));
        assert_eq!(interpret_response(&resp), "Hi");
    }

    #[test]
    fn test_raw_response_fallback() {
        let resp = parse(json!({"success": true, "raw_response": "Hi"}));
        assert_eq!(interpret_response(&resp), "Hi");
    }

    #[test]
    fn test_nothing_present() {
        let resp = parse(json!({"success": true}));
        assert_eq!(interpret_response(&resp), FALLBACK_REPLY);
    }

    #[test]
    fn test_result_beats_nested_response() {
        let resp = parse(json!({
            "success": true,
            "response": {"result": "first", "response": "second"},
            "raw_response": "third"
        }));
        assert_eq!(interpret_response(&resp), "first");
    }

    #[test]
    fn test_nested_response_beats_raw() {
        let resp = parse(json!({
            "success": true,
            "response": {"response": "second"},
            "raw_response": "third"
        }));
        assert_eq!(interpret_response(&resp), "second");
    }

    #[test]
    fn test_null_result_is_absent() {
        let resp = parse(json!({
            "success": true,
            "response": {"result": null},
            "raw_response": "raw"
        }));
        assert_eq!(interpret_response(&resp), "raw");
    }

    #[test]
    fn test_object_without_known_fields_falls_through() {
        let resp = parse(json!({"success": true, "response": {"other": 1}}));
        assert_eq!(interpret_response(&resp), FALLBACK_REPLY);
    }

    #[test]
    fn test_non_string_result_is_rendered_as_json() {
        let resp = parse(json!({"success": true, "response": {"result": {"answer": 42}}}));
        assert_eq!(interpret_response(&resp), r#"{"answer":42}"#);
    }

    #[test]
    fn test_missing_success_defaults_false() {
        let resp = parse(json!({"response": "Hi"}));
        assert!(!resp.success);
    }
}
