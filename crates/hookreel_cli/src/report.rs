//! Reporting the job result to the CI result channel.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use hookreel_core::models::JobResult;

/// Publish a successful result.
///
/// Appends `video_file=` / `video_size=` to the `GITHUB_OUTPUT` file when
/// one is given, otherwise prints the legacy `::set-output` command.
/// Failed results publish nothing.
pub fn publish(result: &JobResult, github_output: Option<&Path>) -> io::Result<()> {
    if !result.is_success() {
        return Ok(());
    }

    match github_output {
        Some(path) => {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            write_outputs(&mut file, result)
        }
        None => {
            if let Some(line) = legacy_output_line(result) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

/// `key=value` lines for the outputs file.
pub fn write_outputs<W: Write>(writer: &mut W, result: &JobResult) -> io::Result<()> {
    if let Some(ref path) = result.output_path {
        writeln!(writer, "video_file={}", path.display())?;
    }
    if let Some(size) = result.output_size {
        writeln!(writer, "video_size={}", size)?;
    }
    Ok(())
}

pub fn legacy_output_line(result: &JobResult) -> Option<String> {
    result
        .output_path
        .as_ref()
        .map(|path| format!("::set-output name=video_file::{}", path.display()))
}

/// Human-readable summary for stderr.
pub fn summary(result: &JobResult) -> String {
    let mut lines = Vec::new();
    match (&result.output_path, result.output_size) {
        (Some(path), Some(size)) => {
            lines.push(format!("Output: {} ({} bytes)", path.display(), size))
        }
        _ => lines.push(format!("Job '{}' failed", result.job_name)),
    }
    if let Some(topology) = result.topology {
        lines.push(format!("Topology: {}", topology));
    }
    for note in &result.diagnostics {
        lines.push(format!("  - {}", note));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn done() -> JobResult {
        JobResult::done("reel", PathBuf::from("out/final.mp4"), 4096)
    }

    #[test]
    fn appends_to_outputs_file() {
        let dir = tempdir().unwrap();
        let outputs = dir.path().join("github_output");
        std::fs::write(&outputs, "previous=1\n").unwrap();

        publish(&done(), Some(&outputs)).unwrap();

        let content = std::fs::read_to_string(&outputs).unwrap();
        assert_eq!(
            content,
            "previous=1\nvideo_file=out/final.mp4\nvideo_size=4096\n"
        );
    }

    #[test]
    fn failure_publishes_nothing() {
        let dir = tempdir().unwrap();
        let outputs = dir.path().join("github_output");

        publish(&JobResult::failed("reel", "boom"), Some(&outputs)).unwrap();

        assert!(!outputs.exists());
        assert!(legacy_output_line(&JobResult::failed("reel", "boom")).is_none());
    }

    #[test]
    fn legacy_line_names_output() {
        assert_eq!(
            legacy_output_line(&done()).as_deref(),
            Some("::set-output name=video_file::out/final.mp4")
        );
    }

    #[test]
    fn summary_lists_diagnostics() {
        let mut result = JobResult::failed("reel", "Input 2 failed after 3 attempt(s)");
        result.diagnostics.push("fetch input 0 attempt 1: HTTP 503".to_string());

        let text = summary(&result);
        assert!(text.starts_with("Job 'reel' failed"));
        assert!(text.contains("  - Input 2 failed"));
        assert!(text.contains("HTTP 503"));
    }
}
