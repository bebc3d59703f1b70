//! Structured Response Extraction
//!
//! Pulls JSON payloads out of free-form model output. Models wrap their answers
//! in code fences, prose, or a `{"result": ...}` envelope; everything here
//! tolerates that and reports a typed [`ExtractError`] instead of panicking.
//!
//! Callers that must never fail use [`recover_or_default`], which degrades to
//! `T::default()` and logs a warning.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Failure to locate or decode a JSON payload in model output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("No JSON object found")]
    NoJsonObject,
    #[error("No complete JSON object found")]
    IncompleteJson,
    #[error("No JSON array found")]
    NoJsonArray,
    #[error("No complete JSON array found")]
    IncompleteArray,
    #[error("Invalid JSON payload: {0}")]
    Parse(String),
}

/// Strip a surrounding markdown code fence (```` ```json ... ``` ````).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

enum Unbalanced {
    Missing,
    Incomplete,
}

/// Balanced-delimiter scan starting at the first `open`.
///
/// Delimiters inside string literals are ignored; a backslash inside a string
/// escapes the next character, so `\"` does not end the string.
fn balanced_span(text: &str, open: char, close: char) -> Result<&str, Unbalanced> {
    let start = text.find(open).ok_or(Unbalanced::Missing)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in text[start..].char_indices() {
        if ch == '"' && !escape {
            in_string = !in_string;
        } else if ch == '\\' && in_string {
            escape = !escape;
            continue;
        } else if !in_string {
            if ch == open {
                depth += 1;
            } else if ch == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(&text[start..start + offset + ch.len_utf8()]);
                }
            }
        }
        escape = false;
    }

    Err(Unbalanced::Incomplete)
}

/// First balanced `{...}` block of `text`.
pub fn extract_json_block(text: &str) -> Result<&str, ExtractError> {
    balanced_span(text, '{', '}').map_err(|e| match e {
        Unbalanced::Missing => ExtractError::NoJsonObject,
        Unbalanced::Incomplete => ExtractError::IncompleteJson,
    })
}

/// First balanced `[...]` block of `text`.
pub fn extract_json_array(text: &str) -> Result<&str, ExtractError> {
    balanced_span(text, '[', ']').map_err(|e| match e {
        Unbalanced::Missing => ExtractError::NoJsonArray,
        Unbalanced::Incomplete => ExtractError::IncompleteArray,
    })
}

/// A payload either bare or wrapped under a `"result"` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { result: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { result } => result,
            Envelope::Bare(value) => value,
        }
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    serde_json::from_str::<Envelope<T>>(text)
        .map(Envelope::into_inner)
        .map_err(|e| ExtractError::Parse(e.to_string()))
}

/// Decode a `T` from model output.
///
/// Tries the fence-stripped text as a whole, then the first balanced object
/// or array (whichever opens first), then the other one.
pub fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let stripped = strip_code_fences(text);
    if let Ok(value) = decode::<T>(stripped) {
        return Ok(value);
    }

    let object_first = match (stripped.find('{'), stripped.find('[')) {
        (Some(obj), Some(arr)) => obj < arr,
        (None, Some(_)) => false,
        _ => true,
    };
    let extractors: [fn(&str) -> Result<&str, ExtractError>; 2] = if object_first {
        [extract_json_block, extract_json_array]
    } else {
        [extract_json_array, extract_json_block]
    };

    let mut last_error: Option<ExtractError> = None;
    for extractor in extractors {
        match extractor(stripped) {
            Ok(span) => match decode::<T>(span) {
                Ok(value) => return Ok(value),
                Err(e) => last_error = Some(e),
            },
            Err(e) => {
                if last_error.is_none() {
                    last_error = Some(e);
                }
            }
        }
    }

    Err(last_error.unwrap_or(ExtractError::NoJsonObject))
}

/// Decode a `T`, falling back to `T::default()` with a warning.
pub fn recover_or_default<T: DeserializeOwned + Default>(text: &str, context: &str) -> T {
    match parse_payload(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(context, error = %e, "Malformed model response, using default");
            T::default()
        }
    }
}

/// Deserializers for fields models emit either as numbers or numeric strings.
pub mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    fn to_f64(value: NumberOrString) -> Result<f64, String> {
        match value {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("expected a number, got {:?}", s)),
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        to_f64(NumberOrString::deserialize(deserializer)?).map_err(D::Error::custom)
    }

    pub fn optional_number<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Option::<NumberOrString>::deserialize(deserializer)?
            .map(to_f64)
            .transpose()
            .map_err(D::Error::custom)
    }

    /// A 1-based line number.
    pub fn line<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let n = number(deserializer)?;
        if n < 1.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
            return Err(D::Error::custom(format!("invalid line number {}", n)));
        }
        Ok(n as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn test_extract_from_prose() {
        let text = "Sure! Here is the answer: {\"a\": {\"b\": 1}} hope that helps {\"c\": 2}";
        assert_eq!(extract_json_block(text).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"{"code": "if x { return }", "end": "}}}"} trailing"#;
        assert_eq!(
            extract_json_block(text).unwrap(),
            r#"{"code": "if x { return }", "end": "}}}"}"#
        );
    }

    #[test]
    fn test_escaped_quote_does_not_toggle_string() {
        let text = r#"{"msg": "say \"}\" now", "n": 1}"#;
        let span = extract_json_block(text).unwrap();
        assert_eq!(span, text);
        let value: serde_json::Value = serde_json::from_str(span).unwrap();
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn test_escaped_backslash_before_quote_ends_string() {
        let text = r#"{"path": "C:\\", "n": 2} extra"#;
        assert_eq!(extract_json_block(text).unwrap(), r#"{"path": "C:\\", "n": 2}"#);
    }

    #[test]
    fn test_missing_and_incomplete() {
        assert_eq!(extract_json_block("no json here"), Err(ExtractError::NoJsonObject));
        assert_eq!(
            extract_json_block("{\"a\": {\"b\": 1}"),
            Err(ExtractError::IncompleteJson)
        );
        assert_eq!(
            extract_json_block("{\"a\": \"unterminated }"),
            Err(ExtractError::IncompleteJson)
        );
        assert_eq!(ExtractError::NoJsonObject.to_string(), "No JSON object found");
        assert_eq!(
            ExtractError::IncompleteJson.to_string(),
            "No complete JSON object found"
        );
    }

    #[test]
    fn test_array_extraction() {
        let text = "findings:\n[{\"s\": \"]\"}, [1, 2]] done";
        assert_eq!(extract_json_array(text).unwrap(), "[{\"s\": \"]\"}, [1, 2]]");
        assert_eq!(extract_json_array("{}"), Err(ExtractError::NoJsonArray));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  plain  "), "plain");
    }

    #[test]
    fn test_parse_payload_envelopes() {
        let bare: Probe = parse_payload("{\"name\": \"x\"}").unwrap();
        assert_eq!(bare.name, "x");

        let wrapped: Probe = parse_payload("```json\n{\"result\": {\"name\": \"y\"}}\n```").unwrap();
        assert_eq!(wrapped.name, "y");

        let list: Vec<Probe> = parse_payload("Result:\n[{\"name\": \"a\"}, {\"name\": \"b\"}]").unwrap();
        assert_eq!(list.len(), 2);

        let wrapped_list: Vec<Probe> =
            parse_payload("{\"result\": [{\"name\": \"c\"}]}").unwrap();
        assert_eq!(wrapped_list[0].name, "c");
    }

    #[test]
    fn test_recover_or_default_never_panics() {
        let inputs = [
            "",
            "garbage",
            "{",
            "}{",
            "[[[",
            "{\"name\": 5}",
            "```json\n```",
            "{\"a\": \"\\\"}",
        ];
        for input in inputs {
            let probe: Probe = recover_or_default(input, "test");
            assert_eq!(probe, Probe::default(), "input {:?}", input);
        }
    }

    #[derive(Debug, Deserialize)]
    struct Lenient {
        #[serde(deserialize_with = "lenient::number")]
        score: f64,
        #[serde(deserialize_with = "lenient::line")]
        line: u32,
        #[serde(default, deserialize_with = "lenient::optional_number")]
        extra: Option<f64>,
    }

    #[test]
    fn test_lenient_numbers() {
        let v: Lenient = serde_json::from_str(r#"{"score": "4", "line": "74"}"#).unwrap();
        assert_eq!(v.score, 4.0);
        assert_eq!(v.line, 74);
        assert_eq!(v.extra, None);

        let v: Lenient = serde_json::from_str(r#"{"score": 6.5, "line": 3, "extra": "2"}"#).unwrap();
        assert_eq!(v.extra, Some(2.0));

        assert!(serde_json::from_str::<Lenient>(r#"{"score": "high", "line": 1}"#).is_err());
        assert!(serde_json::from_str::<Lenient>(r#"{"score": 1, "line": 0}"#).is_err());
        assert!(serde_json::from_str::<Lenient>(r#"{"score": 1, "line": 2.5}"#).is_err());
    }
}
