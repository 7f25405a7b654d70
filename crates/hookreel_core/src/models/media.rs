//! Media-related data structures (fetched clips and their audio report).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Audio stream report for one clip.
///
/// `present == false` is a normal outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Whether the clip carries at least one audio stream.
    pub present: bool,
    /// Codec name of the first audio stream (e.g., "aac").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Sample rate in Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    /// Channel count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
}

impl AudioInfo {
    /// Report for a clip without audio (also the fail-open default).
    pub fn absent() -> Self {
        Self::default()
    }

    /// Report for a clip with an audio stream of unknown attributes.
    pub fn present() -> Self {
        Self {
            present: true,
            ..Self::default()
        }
    }

    /// One-line description for logs.
    pub fn describe(&self) -> String {
        if !self.present {
            return "no audio".to_string();
        }

        let mut parts = vec![self.codec.clone().unwrap_or_else(|| "unknown".to_string())];
        if let Some(rate) = self.sample_rate {
            parts.push(format!("{} Hz", rate));
        }
        if let Some(channels) = self.channels {
            parts.push(format!("{} ch", channels));
        }
        parts.join(", ")
    }
}

/// A clip fetched into the job work directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAsset {
    /// Concatenation position, 0-based.
    pub ordinal: usize,
    /// Path inside the work directory.
    pub path: PathBuf,
    /// Size on disk in bytes (always > 0 once fetched).
    pub size_bytes: u64,
    /// Audio report, filled in by the probe step.
    #[serde(default)]
    pub audio: AudioInfo,
}

impl LocalAsset {
    /// Create an asset right after fetching, before probing.
    pub fn fetched(ordinal: usize, path: PathBuf, size_bytes: u64) -> Self {
        Self {
            ordinal,
            path,
            size_bytes,
            audio: AudioInfo::absent(),
        }
    }

    /// Attach the probe result.
    pub fn with_audio(mut self, audio: AudioInfo) -> Self {
        self.audio = audio;
        self
    }

    pub fn has_audio(&self) -> bool {
        self.audio.present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_audio() {
        let info = AudioInfo {
            present: true,
            codec: Some("aac".to_string()),
            sample_rate: Some(44100),
            channels: Some(2),
        };
        assert_eq!(info.describe(), "aac, 44100 Hz, 2 ch");
        assert_eq!(AudioInfo::absent().describe(), "no audio");
    }

    #[test]
    fn fetched_asset_starts_without_audio() {
        let asset = LocalAsset::fetched(1, PathBuf::from("video_1.mp4"), 10);
        assert!(!asset.has_audio());
        assert!(asset.with_audio(AudioInfo::present()).has_audio());
    }
}
