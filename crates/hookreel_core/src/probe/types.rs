//! Types for probe operations.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for probe operations.
///
/// Never fatal for a job: callers treat it as "no audio".
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    TimedOut { tool: String, timeout: Duration },

    #[error("Failed to parse probe output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Which streams an inspection reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSelection {
    /// Audio streams only.
    Audio,
    /// Every stream.
    All,
}

/// One stream of an inspected file, for the diagnostic trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Stream index (ffprobe ordering).
    pub index: usize,
    /// Codec type (video, audio, subtitle, data).
    pub codec_type: String,
    /// Codec name (e.g., "h264", "aac").
    pub codec_name: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    pub duration_secs: Option<f64>,
}

impl StreamSummary {
    /// One-line description, e.g. `#0 video h264 1080x1920 20.00s`.
    pub fn describe(&self) -> String {
        let mut line = format!("#{} {} {}", self.index, self.codec_type, self.codec_name);
        if let (Some(w), Some(h)) = (self.width, self.height) {
            line.push_str(&format!(" {}x{}", w, h));
        }
        if let Some(rate) = self.sample_rate {
            line.push_str(&format!(" {} Hz", rate));
        }
        if let Some(channels) = self.channels {
            line.push_str(&format!(" {} ch", channels));
        }
        if let Some(duration) = self.duration_secs {
            line.push_str(&format!(" {:.2}s", duration));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_video_and_audio_streams() {
        let video = StreamSummary {
            index: 0,
            codec_type: "video".to_string(),
            codec_name: "h264".to_string(),
            width: Some(1080),
            height: Some(1920),
            duration_secs: Some(20.0),
            ..StreamSummary::default()
        };
        assert_eq!(video.describe(), "#0 video h264 1080x1920 20.00s");

        let audio = StreamSummary {
            index: 1,
            codec_type: "audio".to_string(),
            codec_name: "aac".to_string(),
            sample_rate: Some(48000),
            channels: Some(2),
            ..StreamSummary::default()
        };
        assert_eq!(audio.describe(), "#1 audio aac 48000 Hz 2 ch");
    }
}
