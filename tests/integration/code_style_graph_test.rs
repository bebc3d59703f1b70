//! Code Style Graph Integration Tests

use std::sync::Arc;

use review_cascade::services::graph::{CodeStyleGraph, GraphNode, MechanicalMerger};
use review_cascade_core::{Severity, SourceFile};
use review_cascade_llm::{LlmError, ScriptedProvider, TextGenerationClient};
use review_cascade_scanners::{FindingSource, FixedScanner, RawFinding};

const CATEGORY: &str = "Code Style and Consistency";

const LOADER: &str = "import os\n\
def load(path):\n    \
    f = open(path)\n    \
    data = f.read()\n    \
    return eval(data)\n\
\n\
def main():\n    \
    print(load(os.environ['CFG']))\n\
\n\
main()\n";

fn refactor_reply() -> String {
    serde_json::json!({
        "overall_issue_summary": "The loader evaluates file content.",
        "overall_refactor_summary": "Replaced eval with json parsing.",
        "evaluation_details": [{
            "start_line_number": 5,
            "end_line_number": 5,
            "original_code_snippet": "    return eval(data)",
            "refactored_code_snippet": "    return json.loads(data)",
            "issue_summary": "eval on untrusted input",
            "severity": "Critical",
            "score": 1
        }]
    })
    .to_string()
}

/// Replies keyed on what each prompt asks for.
fn style_provider(major_language: &'static str) -> Arc<ScriptedProvider> {
    Arc::new(ScriptedProvider::from_fn(move |prompt| {
        let reply = if prompt.contains("language identification expert") {
            format!(r#"{{"major_language": "{}", "minor_languages": []}}"#, major_language)
        } else if prompt.contains("scoring lint findings") {
            r#"{"score": [1]}"#.to_string()
        } else if prompt.contains("reviewing SQL") {
            r#"{"violations": 1, "base_score": 6, "issues": [
                {"start_line": 5, "end_line": 5, "severity": "Critical", "score": 2, "description": "Dynamic query text"}
            ]}"#
            .to_string()
        } else if prompt.contains("checking inline comments") {
            r#"{"report": []}"#.to_string()
        } else if prompt.contains("Fix each issue") {
            refactor_reply()
        } else {
            return Err(LlmError::InvalidRequest {
                message: "unexpected prompt".to_string(),
            });
        };
        Ok(reply)
    }))
}

fn eval_finding() -> RawFinding {
    RawFinding {
        source: FindingSource::Pylint,
        start_line: 5,
        end_line: 5,
        severity: Severity::Critical,
        code: "W0123".to_string(),
        snippet: "    return eval(data)".to_string(),
        message: "Use of eval".to_string(),
    }
}

// ============================================================================
// Python path
// ============================================================================

#[tokio::test]
async fn test_python_file_with_one_critical_finding() {
    let provider = style_provider("Python");
    let pylint = Arc::new(FixedScanner::with_findings(
        FindingSource::Pylint,
        vec![eval_finding()],
    ));
    let graph = CodeStyleGraph::new(
        Arc::new(TextGenerationClient::new(provider.clone())),
        pylint.clone(),
        Arc::new(MechanicalMerger),
    );
    let source = SourceFile::from_content("loader.py", LOADER).unwrap();
    assert_eq!(source.line_count(), 10);

    let state = graph.run(&source, CATEGORY).await.unwrap();

    assert_eq!(
        state.visited(),
        &[
            GraphNode::Start,
            GraphNode::LanguageDetection,
            GraphNode::PythonCheck,
            GraphNode::InlineCommentsCheck,
            GraphNode::ReportMerger,
            GraphNode::RefactorCode,
            GraphNode::End,
        ]
    );
    assert_eq!(pylint.scan_count(), 1);

    let language_report = state.language_report().unwrap();
    assert_eq!(language_report.violation_count, 1);
    assert_eq!(language_report.issues[0].score, 1.0);

    let merged = state.merged_report().unwrap();
    assert_eq!(merged.violation_count, 1);
    assert_eq!(merged.issues[0].severity, Severity::Critical);
    assert_eq!(merged.issues[0].span(), (5, 5));

    let evaluation = state.into_evaluation().unwrap();
    assert_eq!(evaluation.violation_count, 1);
    assert_eq!(evaluation.evaluation_score, Some(1.0));
    assert_eq!(
        evaluation.details[0].refactored_snippet.as_deref(),
        Some("    return json.loads(data)")
    );

    // detection, lint scoring, inline comments, refactor
    assert_eq!(provider.call_count(), 4);
}

// ============================================================================
// SQL path
// ============================================================================

#[tokio::test]
async fn test_sql_major_routes_to_sql_check_despite_extension() {
    let provider = style_provider("SQL");
    let pylint = Arc::new(FixedScanner::with_findings(
        FindingSource::Pylint,
        vec![eval_finding()],
    ));
    let graph = CodeStyleGraph::new(
        Arc::new(TextGenerationClient::new(provider.clone())),
        pylint.clone(),
        Arc::new(MechanicalMerger),
    );
    let source = SourceFile::from_content("queries.py", LOADER).unwrap();

    let state = graph.run(&source, CATEGORY).await.unwrap();

    assert!(state.visited().contains(&GraphNode::SqlPythonCheck));
    assert!(!state.visited().contains(&GraphNode::PythonCheck));
    assert_eq!(pylint.scan_count(), 0);

    let report = state.language_report().unwrap();
    assert_eq!(report.violation_count, 1);
    assert_eq!(report.base_score, Some(6.0));
    // mean of the SQL review's 6 and the inline check's fixed 8
    assert_eq!(state.merged_report().unwrap().base_score, Some(7.0));
}

#[tokio::test]
async fn test_provider_failure_fails_the_category() {
    let provider = Arc::new(ScriptedProvider::from_fn(|_| {
        Err(LlmError::AuthenticationFailed {
            message: "bad key".to_string(),
        })
    }));
    let graph = CodeStyleGraph::new(
        Arc::new(TextGenerationClient::new(provider)),
        Arc::new(FixedScanner::clean(FindingSource::Pylint)),
        Arc::new(MechanicalMerger),
    );
    let source = SourceFile::from_content("loader.py", LOADER).unwrap();

    assert!(graph.run(&source, CATEGORY).await.is_err());
}
