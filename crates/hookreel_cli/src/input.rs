//! Job input from flags and environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use hookreel_core::config::Settings;
use hookreel_core::models::{JobSpec, OverlaySpec};

/// Parse the `VIDEO_URLS` JSON array.
///
/// An absent or blank value is an empty list, so the job driver reports
/// the input count like any other wrong count.
pub fn parse_locators(raw: Option<&str>) -> Result<Vec<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json)
            .context("VIDEO_URLS must be a JSON array of strings"),
    }
}

/// Build the job spec with caption styles from `[overlay]`.
pub fn build_job_spec(
    locators: Vec<String>,
    hook: &str,
    title: &str,
    output: Option<PathBuf>,
    settings: &Settings,
) -> JobSpec {
    let overlay = OverlaySpec::new(
        hook,
        title,
        settings.overlay.hook.clone(),
        settings.overlay.title.clone(),
    );
    let output = output.unwrap_or_else(|| PathBuf::from(&settings.paths.output_file));
    JobSpec::new(locators, overlay, output)
}
