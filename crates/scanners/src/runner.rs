//! Scanner Process Runner
//!
//! Runs one external tool against one file with a timeout and classifies
//! the outcome.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::error::{ScannerError, ScannerResult};
use crate::models::{ScanOutput, ScannerCommand};

/// Run `command` with `file` appended to its arguments.
///
/// A non-zero exit is not an error by itself: linters exit non-zero whenever
/// they find something. Only an exit code above the command's threshold
/// together with diagnostics on stderr counts as a tool failure.
pub async fn run_scanner(command: &ScannerCommand, file: &Path) -> ScannerResult<ScanOutput> {
    let start = Instant::now();

    let mut cmd = Command::new(&command.command);
    cmd.args(&command.args)
        .arg(file)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(tool = %command.command, file = %file.display(), "Running scanner");

    let timeout_duration = Duration::from_secs(command.timeout_secs);
    let output = match timeout(timeout_duration, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScannerError::NotInstalled {
                tool: command.command.clone(),
            });
        }
        Ok(Err(e)) => return Err(ScannerError::Io(e)),
        Err(_) => {
            return Err(ScannerError::Timeout {
                tool: command.command.clone(),
                seconds: command.timeout_secs,
            });
        }
    };

    let scan = ScanOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: truncate_output(&output.stdout, command.max_output_size),
        stderr: truncate_output(&output.stderr, command.max_output_size),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    if scan.is_tool_failure(command.failure_exit_threshold) {
        return Err(ScannerError::ToolFailure {
            tool: command.command.clone(),
            exit_code: scan.exit_code,
            stderr: scan.stderr.trim().to_string(),
        });
    }

    tracing::debug!(
        tool = %command.command,
        exit_code = scan.exit_code,
        duration_ms = scan.duration_ms,
        "Scanner finished"
    );
    Ok(scan)
}

/// Truncate output to max size, on a char boundary
fn truncate_output(bytes: &[u8], max: usize) -> String {
    let s = String::from_utf8_lossy(bytes);
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}\n... (output truncated)", &s[..cut])
    } else {
        s.into_owned()
    }
}
