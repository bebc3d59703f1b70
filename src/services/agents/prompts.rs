//! Review Prompts
//!
//! Prompt builders for every generation call in the pipeline. Each prompt
//! pins down the JSON shape the matching parser in `wire.rs` accepts.

use review_cascade_core::Issue;
use review_cascade_scanners::RawFinding;

/// Serialize issues the way the merge and refactor prompts expect them.
pub fn issues_json(issues: &[Issue]) -> String {
    let items: Vec<serde_json::Value> = issues
        .iter()
        .map(|i| {
            serde_json::json!({
                "start_line_number": i.start_line,
                "end_line_number": i.end_line,
                "severity": i.severity.as_str(),
                "score": i.score,
                "issue": i.description,
            })
        })
        .collect();
    serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
}

pub fn language_detection(numbered_code: &str) -> String {
    format!(
        r#"You are a programming language identification expert.

Identify the primary (major) language of the source file below and any other
languages embedded in it (minor languages), e.g. SQL inside Python strings.
Use canonical names such as "Python", "SQL", "Bash", "JSON".

Respond only with JSON in this exact format:
{{"major_language": "Python", "minor_languages": ["SQL"]}}

Source file (each line is prefixed with its line number):
```
{}
```"#,
        numbered_code
    )
}

/// Batch scoring of pylint findings: one score per finding, same order.
pub fn lint_scoring(numbered_code: &str, findings: &[RawFinding]) -> String {
    let listed: Vec<serde_json::Value> = findings
        .iter()
        .enumerate()
        .map(|(idx, f)| {
            serde_json::json!({
                "index": idx,
                "start_line_number": f.start_line,
                "end_line_number": f.end_line,
                "severity": f.severity.as_str(),
                "issue": f.message,
            })
        })
        .collect();
    format!(
        r#"You are a senior Python reviewer scoring lint findings for code style and consistency.

Score every finding from 0 to 8, where lower means more harmful. Keep each
score inside the band of its severity:
- Critical: 0-2
- Moderate: 3-5
- Minor: 6-8

Return exactly one score per finding, in the same order as the input.
Respond only with JSON: {{"score": [4, 7, 1]}}

Findings:
{}

Source file:
```
{}
```"#,
        serde_json::to_string_pretty(&listed).unwrap_or_else(|_| "[]".to_string()),
        numbered_code
    )
}

/// Generation-only style review for SQL and Python embedding SQL.
pub fn sql_python_style(numbered_code: &str) -> String {
    format!(
        r#"You are a senior data engineer reviewing SQL (standalone or embedded in Python)
for code style and consistency: keyword casing, naming conventions, indentation,
aliasing, SELECT *, unqualified columns, hard-to-read nesting and formatting
of embedded queries.

Scoring: each issue gets a score from 0 to 8 (Critical 0-2, Moderate 3-5, Minor 6-8).
"base_score" is your overall 0-8 rating of the file.

Respond only with JSON in this exact format:
{{
  "violations": 2,
  "base_score": 5.5,
  "issues": [
    {{"start_line": 3, "end_line": 5, "severity": "Moderate", "score": 4, "description": "Mixed keyword casing"}}
  ]
}}

Source file:
```
{}
```"#,
        numbered_code
    )
}

pub fn inline_comments(numbered_code: &str) -> String {
    format!(
        r#"You are a code reviewer checking inline comments and docstrings.

Flag comments that are misleading, outdated, commented-out code, TODO/FIXME
left behind, or missing documentation on non-trivial functions and queries.

Respond only with JSON in this exact format:
{{"report": [{{"start_line_number": 4, "end_line_number": 4, "issue": "Comment contradicts the code below"}}]}}
Return {{"report": []}} when there is nothing to flag.

Source file:
```
{}
```"#,
        numbered_code
    )
}

/// Ask the model to coalesce two issue lists for the same file.
pub fn merge_reports(first: &[Issue], second: &[Issue]) -> String {
    format!(
        r#"You are consolidating two code review reports for the same file.

Rules:
- Issues with the same start and end line become one issue.
- Join their descriptions with "; ".
- Keep the most severe severity (Critical > Moderate > Minor).
- Keep the lowest score.
- Drop exact duplicates. Do not invent new issues.

Respond only with JSON in this exact format:
{{"report": [{{"score": 2, "severity": "Critical", "start_line": 3, "end_line": 3, "issue_description": "..."}}]}}

Report A:
{}

Report B:
{}"#,
        issues_json(first),
        issues_json(second)
    )
}

/// Refactor every listed issue and explain the changes.
pub fn refactor(numbered_code: &str, issues: &[Issue], language: &str) -> String {
    format!(
        r#"You are a senior {language} engineer. Fix each issue listed below in the given file.

For every issue return the original snippet, a refactored snippet that fixes
it, a one-sentence summary, and keep the issue's severity and score unchanged.
Then summarize the issues overall and the refactoring overall (3-5 sentences each).

Respond only with JSON in this exact format:
{{
  "overall_issue_summary": "...",
  "overall_refactor_summary": "...",
  "evaluation_details": [
    {{
      "start_line_number": 3,
      "end_line_number": 5,
      "original_code_snippet": "...",
      "refactored_code_snippet": "...",
      "issue_summary": "...",
      "severity": "Moderate",
      "score": 4
    }}
  ]
}}

Issues:
{issues}

Source file:
```
{code}
```"#,
        language = language,
        issues = issues_json(issues),
        code = numbered_code
    )
}

const FINDING_FORMAT: &str = r#"[
  {
    "start_line_number": 10,
    "end_line_number": 14,
    "original_code_snippet": "...",
    "issue_summary": "...",
    "severity": "Moderate",
    "score": 4
  }
]"#;

pub fn dry_python(numbered_code: &str) -> String {
    format!(
        r#"You are a senior software architect enforcing clean-code principles on a Python file.

Review for:
- DRY: duplicated logic or near-identical blocks that belong in a helper.
- Modularity: functions or classes doing more than one thing.
- Reusable utilities: repeated logging, validation, config parsing or connection setup.
- Hardcoded configuration: timeouts, ports, URLs, paths or credentials in code.

Scoring: Critical 0-2, Moderate 3-5, Minor 6-8.
Respond only with a JSON array in this format (empty array when clean):
{}

Source file:
```
{}
```"#,
        FINDING_FORMAT, numbered_code
    )
}

pub fn dry_sql(numbered_code: &str) -> String {
    format!(
        r#"You are a senior database engineer reviewing a SQL script for DRY and modularity.

Review for repeated subqueries that belong in CTEs or views, copy-pasted
CASE expressions, repeated literal filters that should be parameters, and
monolithic scripts that should be split into reusable units.

Scoring: Critical 0-2, Moderate 3-5, Minor 6-8.
Respond only with a JSON array in this format (empty array when clean):
{}

Source file:
```
{}
```"#,
        FINDING_FORMAT, numbered_code
    )
}

/// Score one pre-classified security finding.
pub fn risk_score(numbered_code: &str, finding: &RawFinding) -> String {
    format!(
        r#"You are an application security analyst. A scanner ({tool}) reported the
finding below. Assess its real risk in the context of the file and assign a
risk score from 0 to 8, where lower is more dangerous. Stay within the band
of the reported severity ({severity}): Critical 0-2, Moderate 3-5, Minor 6-8.

Respond only with JSON: {{"risk_score": 2}}

Finding at lines {start}-{end}: {message}
Flagged code:
```
{snippet}
```

Source file:
```
{code}
```"#,
        tool = finding.source.display_name(),
        severity = finding.severity,
        start = finding.start_line,
        end = finding.end_line,
        message = finding.message,
        snippet = finding.snippet,
        code = numbered_code
    )
}

pub fn input_validation(numbered_code: &str) -> String {
    format!(
        r#"You are an application security reviewer focused on input validation in Python.

Flag untrusted input (CLI args, environment, files, HTTP, user prompts) reaching
SQL, shell commands, file paths, deserialization or eval without validation
or sanitization. Ignore issues a linter like bandit already reports verbatim.

Scoring: Critical 0-2, Moderate 3-5, Minor 6-8.
Respond only with a JSON array in this format (empty array when clean):
{}

Source file:
```
{}
```"#,
        FINDING_FORMAT, numbered_code
    )
}

pub fn sql_security(numbered_code: &str) -> String {
    format!(
        r#"You are a database security reviewer. Review the SQL script for injection
risks (dynamic SQL, string concatenation), excessive privileges (GRANT ALL,
superuser use), hardcoded credentials, unprotected DELETE/UPDATE without
WHERE, and exposure of sensitive columns.

Scoring: Critical 0-2, Moderate 3-5, Minor 6-8.
Respond only with a JSON array in this format (empty array when clean):
{}

Source file:
```
{}
```"#,
        FINDING_FORMAT, numbered_code
    )
}

/// Per-file narrative over a category's findings.
pub fn evaluation_summary(findings_json: &str) -> String {
    format!(
        r#"You are a chief code quality architect. Summarize the review findings of a
single file: the overall quality, the most common or most severe issues, and
what the refactoring should change. 3-5 sentences each.

Respond only with JSON in this exact format:
{{"evaluation_issue_summary": "...", "evaluation_refactor_summary": "..."}}

Findings:
{}"#,
        findings_json
    )
}

pub fn category_issue_summary(topic: &str, file_summaries: &str) -> String {
    format!(
        r#"You are a code quality analysis assistant. Write an overall summary of the
issues found in a repository for the topic "{topic}", based on these per-file
summaries:
------------------------
{summaries}
------------------------
Highlight the most significant or frequent issues, recurring patterns and any
critical problems. Describe concerns only, not fixes. Return a single plain
paragraph with no lists or formatting."#,
        topic = topic,
        summaries = file_summaries
    )
}

pub fn category_refactor_summary(topic: &str, file_summaries: &str) -> String {
    format!(
        r#"You are a code quality analysis assistant. Write an overall summary of the
refactoring changes made across a repository for the topic "{topic}", based on
these per-file summaries of changes:
------------------------
{summaries}
------------------------
Describe the most impactful changes and recurring refactor patterns. Describe
only changes that were made. Return a single plain paragraph with no lists or
formatting."#,
        topic = topic,
        summaries = file_summaries
    )
}

pub fn repository_issue_summary(style: &str, dry: &str, security: &str) -> String {
    format!(
        r#"You are a code quality analysis assistant. Below are three issue summaries
for the same codebase. Write a concise, holistic assessment of its overall
quality and the systemic problems across all three areas. Do not suggest
changes. Return plain text only.

Code Style and Consistency:
{}

DRY and Modularity:
{}

Security Compliance:
{}"#,
        style, dry, security
    )
}

pub fn repository_refactor_summary(style: &str, dry: &str, security: &str) -> String {
    format!(
        r#"You are a code quality analysis assistant. Below are three summaries of the
refactoring already applied to a codebase. Write a concise, high-level summary
of how the refactoring improved maintainability, readability, structure and
security. Return plain text only.

Code Style and Consistency:
{}

DRY and Modularity:
{}

Security Compliance:
{}"#,
        style, dry, security
    )
}
