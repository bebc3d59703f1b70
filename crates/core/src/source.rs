//! Source Files
//!
//! Loading of reviewable files and the zero-padded line-number annotation
//! (`"0001: first line"`) every prompt is built from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Kind of reviewable source, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Python,
    Sql,
}

impl SourceKind {
    /// Extensions accepted for review
    pub const SUPPORTED_EXTENSIONS: [&'static str; 2] = ["py", "sql"];

    pub fn from_path(path: &Path) -> Option<SourceKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "py" => Some(SourceKind::Python),
            "sql" => Some(SourceKind::Sql),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::Python => "Python",
            SourceKind::Sql => "SQL",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A loaded source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Name shown in reports (the path as given)
    pub name: String,
    pub kind: SourceKind,
    pub content: String,
}

impl SourceFile {
    /// Read a UTF-8 `.py`/`.sql` file from disk.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CoreError::not_found(path.display().to_string()));
        }
        let kind = SourceKind::from_path(path).ok_or_else(|| {
            CoreError::unsupported_file(format!(
                "{} (supported extensions: .py, .sql)",
                path.display()
            ))
        })?;
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8(bytes).map_err(|_| {
            CoreError::unsupported_file(format!("{} is not valid UTF-8", path.display()))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            name: path.display().to_string(),
            kind,
            content,
        })
    }

    /// Build a source file from in-memory content.
    pub fn from_content(path: impl AsRef<Path>, content: impl Into<String>) -> CoreResult<Self> {
        let path = path.as_ref();
        let kind = SourceKind::from_path(path)
            .ok_or_else(|| CoreError::unsupported_file(path.display().to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            name: path.display().to_string(),
            kind,
            content: content.into(),
        })
    }

    /// Content annotated with line numbers.
    pub fn numbered(&self) -> String {
        number_lines(&self.content)
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Prefix every line with its 1-based, zero-padded (width 4) number.
pub fn number_lines(content: &str) -> String {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:04}: {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a numbered line into its line number and original text.
pub fn parse_line_prefix(line: &str) -> Option<(u32, &str)> {
    let (prefix, rest) = line.split_once(": ")?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok().map(|n| (n, rest))
}

/// Remove the annotation added by [`number_lines`]. Unnumbered lines pass through.
pub fn strip_line_numbers(numbered: &str) -> String {
    numbered
        .lines()
        .map(|line| parse_line_prefix(line).map_or(line, |(_, rest)| rest))
        .collect::<Vec<_>>()
        .join("\n")
}
