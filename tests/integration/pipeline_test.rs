//! Pipeline Integration Tests
//!
//! A full run over a small directory: every category, the repository
//! aggregation and the JSON report on disk.

use std::path::PathBuf;
use std::sync::Arc;

use review_cascade::{
    FileOutcome, MergeStrategy, ReviewCategory, ReviewConfig, ReviewPipeline, Scanners,
};
use review_cascade_core::Severity;
use review_cascade_llm::{CancellationToken, LlmError, ScriptedProvider};
use review_cascade_scanners::{FindingSource, FixedScanner, RawFinding};

const SERVICE: &str = "import os\n\
import subprocess\n\
\n\
def run(cmd):\n    \
    return subprocess.call(cmd, shell=True)\n\
\n\
run(os.environ['CMD'])\n";

fn finding(source: FindingSource, line: u32, message: &str) -> RawFinding {
    RawFinding {
        source,
        start_line: line,
        end_line: line,
        severity: Severity::Critical,
        code: "B602".to_string(),
        snippet: "    return subprocess.call(cmd, shell=True)".to_string(),
        message: message.to_string(),
    }
}

fn refactor_reply() -> String {
    serde_json::json!({
        "overall_issue_summary": "Shell command built from the environment.",
        "overall_refactor_summary": "Pass an argument list without a shell.",
        "evaluation_details": [{
            "start_line_number": 5,
            "end_line_number": 5,
            "original_code_snippet": "    return subprocess.call(cmd, shell=True)",
            "refactored_code_snippet": "    return subprocess.call(shlex.split(cmd))",
            "issue_summary": "shell=True with external input",
            "severity": "Critical",
            "score": 1
        }]
    })
    .to_string()
}

/// Answers every prompt kind a run issues, keyed on its wording.
fn responder(prompt: &str) -> Result<String, LlmError> {
    let reply = if prompt.contains("Below are three issue summaries") {
        "Holistic issues.".to_string()
    } else if prompt.contains("Below are three summaries") {
        "Holistic fixes.".to_string()
    } else if prompt.contains("code quality analysis assistant") {
        "Category narrative.".to_string()
    } else if prompt.contains("chief code quality architect") {
        r#"{"evaluation_issue_summary": "File issues.", "evaluation_refactor_summary": "File fixes."}"#
            .to_string()
    } else if prompt.contains("application security analyst") {
        r#"{"risk_score": 2}"#.to_string()
    } else if prompt.contains("focused on input validation") {
        "[]".to_string()
    } else if prompt.contains("enforcing clean-code principles") {
        r#"[{"start_line_number": 2, "end_line_number": 3, "original_code_snippet": "import subprocess",
             "issue_summary": "Process helper belongs in a shared module", "severity": "Moderate", "score": 4}]"#
            .to_string()
    } else if prompt.contains("language identification expert") {
        r#"{"major_language": "Python", "minor_languages": []}"#.to_string()
    } else if prompt.contains("scoring lint findings") {
        r#"{"score": [1]}"#.to_string()
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
}

fn scanners() -> Scanners {
    Scanners {
        pylint: Arc::new(FixedScanner::with_findings(
            FindingSource::Pylint,
            vec![finding(FindingSource::Pylint, 5, "Avoid shell=True")],
        )),
        bandit: Arc::new(FixedScanner::with_findings(
            FindingSource::Bandit,
            vec![finding(
                FindingSource::Bandit,
                5,
                "subprocess call with shell=True identified",
            )],
        )),
        secrets: Arc::new(FixedScanner::clean(FindingSource::DetectSecrets)),
    }
}

#[tokio::test]
async fn test_full_run_writes_repository_report() {
    let workspace = tempfile::tempdir().unwrap();
    let service = workspace.path().join("service.py");
    let notes = workspace.path().join("notes.txt");
    std::fs::write(&service, SERVICE).unwrap();
    std::fs::write(&notes, "not reviewable").unwrap();

    let config = ReviewConfig {
        output_dir: workspace.path().join("reports"),
        merge_strategy: MergeStrategy::Mechanical,
        ..Default::default()
    };
    let provider = Arc::new(ScriptedProvider::from_fn(responder));
    let pipeline = ReviewPipeline::with_provider(
        config,
        provider.clone(),
        scanners(),
        CancellationToken::new(),
    );

    let inputs: Vec<PathBuf> = vec![service.clone(), notes.clone()];
    let summary = pipeline.run(&inputs).await.unwrap();

    // Outcomes: three categories per file, the unsupported file fails all three
    assert_eq!(summary.files_reviewed, 2);
    assert_eq!(summary.report.outcomes.len(), 6);
    assert_eq!(summary.failures().count(), 3);
    assert_eq!(summary.failed_files, vec![notes.display().to_string()]);
    assert!(summary
        .report
        .outcomes
        .iter()
        .filter(|o| o.filename == service.display().to_string())
        .all(|o| o.outcome == FileOutcome::Succeeded));

    // File and line level rows
    assert_eq!(summary.report.files.len(), 3);
    assert!(summary.report.files.iter().all(|r| r.violations == 1));
    assert_eq!(summary.report.lines.len(), 3);
    let security_line = summary
        .report
        .lines
        .iter()
        .find(|l| l.category == ReviewCategory::Security)
        .unwrap();
    assert_eq!(security_line.score, 2.0);
    assert_eq!(security_line.severity, Severity::Critical);

    // Repository table: one row per category plus the overall row
    let rows = &summary.report.repository;
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].review_category, "Code Style and Consistency");
    assert_eq!(rows[0].ai_review_score, Some(1.0));
    assert_eq!(rows[1].ai_review_score, Some(4.0));
    assert_eq!(rows[2].ai_review_score, Some(2.0));
    assert_eq!(rows[2].ai_reviewer_comments, "Category narrative.");

    let overall = &rows[3];
    assert_eq!(overall.review_category, "Overall");
    assert_eq!(overall.vulnerabilities_flagged, 3);
    let score = overall.ai_review_score.unwrap();
    assert!((score - 7.0 / 3.0).abs() < 1e-9);
    assert_eq!(overall.ai_reviewer_comments, "Holistic issues.");
    assert_eq!(overall.ai_suggested_fixes, "Holistic fixes.");

    // Report on disk
    assert!(summary.report_path.starts_with(workspace.path().join("reports")));
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary.report_path).unwrap()).unwrap();
    assert_eq!(written["repository"].as_array().unwrap().len(), 4);
    assert_eq!(written["run_id"], summary.report.run_id.as_str());

    assert!(provider
        .prompts()
        .iter()
        .all(|p| !p.contains("not reviewable")));
}

#[tokio::test]
async fn test_cancelled_run_stops_before_reviewing() {
    let workspace = tempfile::tempdir().unwrap();
    let service = workspace.path().join("service.py");
    std::fs::write(&service, SERVICE).unwrap();

    let config = ReviewConfig {
        output_dir: workspace.path().join("reports"),
        merge_strategy: MergeStrategy::Mechanical,
        ..Default::default()
    };
    let provider = Arc::new(ScriptedProvider::from_fn(responder));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let pipeline = ReviewPipeline::with_provider(config, provider.clone(), scanners(), cancel);

    let err = pipeline.run(&[service]).await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(provider.call_count(), 0);
    assert!(!workspace.path().join("reports").exists());
}

#[tokio::test]
async fn test_unsupported_language_fails_the_whole_file() {
    let workspace = tempfile::tempdir().unwrap();
    let script = workspace.path().join("deploy.py");
    std::fs::write(&script, "#!/bin/sh\necho deploying\n").unwrap();

    let config = ReviewConfig {
        output_dir: workspace.path().join("reports"),
        merge_strategy: MergeStrategy::Mechanical,
        ..Default::default()
    };
    let provider = Arc::new(ScriptedProvider::from_fn(|prompt| {
        if prompt.contains("language identification expert") {
            Ok(r#"{"major_language": "Bash", "minor_languages": []}"#.to_string())
        } else {
            responder(prompt)
        }
    }));
    let pipeline = ReviewPipeline::with_provider(
        config,
        provider.clone(),
        scanners(),
        CancellationToken::new(),
    );

    let summary = pipeline.run(&[script.clone()]).await.unwrap();

    assert_eq!(summary.report.outcomes.len(), 3);
    assert!(summary.report.outcomes.iter().all(|o| matches!(
        &o.outcome,
        FileOutcome::Failed { reason } if reason == "Unsupported language: Bash"
    )));
    assert!(summary.report.files.is_empty());
    assert_eq!(summary.failed_files, vec![script.display().to_string()]);
    // only the detection call; no category has files to narrate
    assert_eq!(provider.call_count(), 1);
}
