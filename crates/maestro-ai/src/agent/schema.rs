//! Structured-output enforcement helpers.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::error::{AiError, Result};

/// System-prompt suffix instructing the model to reply with schema-conforming
/// JSON only.
pub fn schema_instructions<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    let rendered = serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string());
    format!(
        "\n\nRespond with a single JSON object conforming to this JSON Schema. \
No prose before or after the JSON.\n\n{rendered}"
    )
}

/// Fix prompt sent back after a parse failure.
pub fn schema_fix_prompt(error: &str) -> String {
    format!(
        "Your previous reply did not parse against the required schema: {error}\n\
Reply again with only the corrected JSON object. Do not change fields that were already valid."
    )
}

/// Parse the assistant reply into `T`, tolerating code fences and
/// surrounding prose.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T> {
    let candidate = extract_json(text)
        .ok_or_else(|| AiError::Schema("no JSON object found in reply".to_string()))?;
    serde_json::from_str(candidate).map_err(|e| AiError::Schema(e.to_string()))
}

/// Slice out the first top-level JSON object in the text.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Verdict {
        ready: bool,
        label: String,
    }

    #[test]
    fn parses_bare_json() {
        let verdict: Verdict = parse_structured(r#"{"ready": true, "label": "go"}"#).unwrap();
        assert!(verdict.ready);
    }

    #[test]
    fn parses_fenced_json_with_prose() {
        let reply = "Here you go:\n```json\n{\"ready\": false, \"label\": \"wait\"}\n```\nDone.";
        let verdict: Verdict = parse_structured(reply).unwrap();
        assert_eq!(verdict.label, "wait");
    }

    #[test]
    fn nested_braces_and_strings_are_balanced() {
        let reply = r#"{"ready": true, "label": "braces {inside} \"quoted\""} trailing"#;
        let extracted = extract_json(reply).unwrap();
        assert!(extracted.ends_with('}'));
        let verdict: Verdict = parse_structured(reply).unwrap();
        assert_eq!(verdict.label, "braces {inside} \"quoted\"");
    }

    #[test]
    fn missing_json_is_a_schema_error() {
        let err = parse_structured::<Verdict>("no json here").unwrap_err();
        assert!(matches!(err, AiError::Schema(_)));
    }

    #[test]
    fn instructions_embed_the_schema() {
        let text = schema_instructions::<Verdict>();
        assert!(text.contains("ready"));
        assert!(text.contains("label"));
    }
}
