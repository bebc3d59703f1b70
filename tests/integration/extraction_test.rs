//! Extraction Integration Tests
//!
//! Model output is free-form; these cover the shapes seen in practice and the
//! ones that must degrade instead of failing.

use review_cascade_core::{
    extract_json_block, number_lines, parse_payload, recover_or_default, strip_line_numbers,
    ExtractError, Language, SourceFile,
};

// ============================================================================
// Balanced extraction
// ============================================================================

#[test]
fn test_first_object_is_taken_from_chatty_output() {
    let reply = "Sure! Here it is:\n{\"a\": {\"b\": \"}\"}}\nand another {\"c\": 1}";
    assert_eq!(extract_json_block(reply).unwrap(), "{\"a\": {\"b\": \"}\"}}");
}

#[test]
fn test_quote_escapes_inside_strings() {
    let reply = r#"{"msg": "say \"{hi}\" to \\", "n": 2} trailing"#;
    assert_eq!(
        extract_json_block(reply).unwrap(),
        r#"{"msg": "say \"{hi}\" to \\", "n": 2}"#
    );
}

#[test]
fn test_truncated_output_is_incomplete() {
    assert_eq!(
        extract_json_block("{\"report\": [{\"issue\": \"x\""),
        Err(ExtractError::IncompleteJson)
    );
    assert_eq!(
        extract_json_block("I could not review this file."),
        Err(ExtractError::NoJsonObject)
    );
}

// ============================================================================
// Typed decoding
// ============================================================================

#[test]
fn test_fenced_and_wrapped_language_reply() {
    let reply = "```json\n{\"result\": {\"major_language\": \"Python\", \"minor_languages\": [\"SQL\"]}}\n```";
    let language: Language = parse_payload(reply).unwrap();
    assert_eq!(language, Language::new("Python", vec!["SQL".to_string()]));
}

#[test]
fn test_malformed_reply_recovers_to_default() {
    let language: Language = recover_or_default("{\"major_language\": ", "language detection");
    assert_eq!(language, Language::default());
    assert!(language.route().is_err());

    let list: Vec<serde_json::Value> = recover_or_default("no findings today", "dry review");
    assert!(list.is_empty());
}

// ============================================================================
// Line numbering
// ============================================================================

#[test]
fn test_numbering_round_trip() {
    let content = "import os\n\nprint(os.getcwd())  # 12: not a prefix";
    let numbered = number_lines(content);
    assert!(numbered.starts_with("0001: import os\n0002: \n0003: print"));
    assert_eq!(strip_line_numbers(&numbered), content);

    let source = SourceFile::from_content("cwd.py", content).unwrap();
    assert_eq!(source.numbered(), numbered);
    assert_eq!(source.line_count(), 3);
}
