//! Parse oracle output into raw record values

use crate::error::ExtractorError;
use serde_json::Value;
use tracing::debug;

/// Parse the oracle's text response into the raw elements of its JSON array
///
/// Elements are returned untouched; mapping and validation happen in the
/// gatekeeper.
pub fn parse_oracle_response(response: &str) -> Result<Vec<Value>, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    match json {
        Value::Array(items) => {
            debug!("Oracle returned {} elements", items.len());
            Ok(items)
        }
        _ => Err(ExtractorError::InvalidFormat("Expected JSON array".to_string())),
    }
}

/// Extract JSON from response, handling markdown code blocks and stray prose
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let body = trimmed
            .split_once('\n')
            .map(|(_, rest)| rest)
            .ok_or_else(|| ExtractorError::InvalidFormat("Empty code block".to_string()))?;
        let body = body.trim_end();
        let body = body.strip_suffix("```").unwrap_or(body);
        return Ok(body.trim());
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    // Models sometimes add a sentence before or after the array
    match (trimmed.find('['), trimmed.rfind(']')) {
        (Some(start), Some(end)) if start < end => Ok(&trimmed[start..=end]),
        _ => Err(ExtractorError::InvalidFormat(
            "No JSON array found in oracle output".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let items = parse_oracle_response(r#"[{"log_date": "2024-11-14"}, {"x": 1}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["log_date"], "2024-11-14");
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n[\n  {\"time_slot\": \"morning\"}\n]\n```";
        let items = parse_oracle_response(response).unwrap();
        assert_eq!(items[0]["time_slot"], "morning");
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let response = "Here are the rows:\n[{\"a\": 1}]\nLet me know if you need more.";
        assert_eq!(parse_oracle_response(response).unwrap().len(), 1);
    }

    #[test]
    fn test_object_is_not_a_batch() {
        let result = parse_oracle_response(r#"{"log_date": "2024-11-14"}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_not_json() {
        assert!(parse_oracle_response("This is not JSON").is_err());
        assert!(parse_oracle_response("```").is_err());
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_oracle_response("[]").unwrap().is_empty());
    }
}
