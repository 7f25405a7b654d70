//! Running the engine and classifying what it did.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::orchestrator::CancelHandle;

use super::engine::EncodingEngine;
use super::types::{EncodeError, EncodeResult, EngineOutput};

/// Longest engine output line kept, in bytes.
pub const MAX_LINE_BYTES: usize = 512;

/// Upper bound for a diagnostic tail, in bytes.
pub const MAX_TAIL_BYTES: usize = 4096;

/// Run the engine once. No retry: any failure is terminal.
///
/// Every non-blank output line is passed to `on_line` before the outcome
/// is classified, so callers can log the engine's last words on failure.
pub fn execute(
    engine: &dyn EncodingEngine,
    args: &[String],
    timeout: Option<Duration>,
    cancel: &CancelHandle,
    tail_lines: usize,
    mut on_line: impl FnMut(&str),
) -> EncodeResult<EngineOutput> {
    let output = engine
        .run(args, timeout, cancel)
        .map_err(|source| EncodeError::Spawn {
            tool: engine.program().to_string(),
            source,
        })?;

    for line in output_lines(&output.stderr) {
        on_line(line);
    }

    classify(engine.program(), &output, timeout, tail_lines)?;
    Ok(output)
}

/// Map a raw engine outcome to success or a terminal error.
pub fn classify(
    tool: &str,
    output: &EngineOutput,
    timeout: Option<Duration>,
    tail_lines: usize,
) -> EncodeResult<()> {
    if output.cancelled {
        return Err(EncodeError::Cancelled {
            tool: tool.to_string(),
        });
    }
    if output.timed_out {
        return Err(EncodeError::TimedOut {
            tool: tool.to_string(),
            timeout: timeout.unwrap_or_default(),
        });
    }

    match output.exit_code {
        Some(0) => Ok(()),
        code => Err(EncodeError::NonZeroExit {
            tool: tool.to_string(),
            exit_code: code.unwrap_or(-1),
            tail: diagnostic_tail(&output.stderr, tail_lines),
        }),
    }
}

/// Non-blank lines of engine output, each cut to [`MAX_LINE_BYTES`].
///
/// ffmpeg rewrites its progress line with `\r`, so both `\r` and `\n`
/// end a line.
pub fn output_lines(stderr: &str) -> impl Iterator<Item = &str> {
    stderr
        .split(|c| c == '\r' || c == '\n')
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| truncate_at_boundary(line, MAX_LINE_BYTES))
}

/// Last `max_lines` output lines, at most [`MAX_TAIL_BYTES`] in total.
pub fn diagnostic_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output_lines(stderr).collect();

    let mut start = lines.len();
    let mut bytes = 0;
    while start > 0 && lines.len() - start < max_lines {
        let next = bytes + lines[start - 1].len() + 1;
        if next > MAX_TAIL_BYTES + 1 {
            break;
        }
        bytes = next;
        start -= 1;
    }
    lines[start..].join("\n")
}

fn truncate_at_boundary(line: &str, max_bytes: usize) -> &str {
    if line.len() <= max_bytes {
        return line;
    }
    let mut end = max_bytes;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Check that a reported success left a non-empty output file.
pub fn verify_output(path: &Path) -> EncodeResult<u64> {
    let meta = fs::metadata(path).map_err(|_| EncodeError::OutputMissing(path.to_path_buf()))?;
    if !meta.is_file() {
        return Err(EncodeError::OutputMissing(path.to_path_buf()));
    }
    if meta.len() == 0 {
        return Err(EncodeError::OutputEmpty(path.to_path_buf()));
    }
    Ok(meta.len())
}
