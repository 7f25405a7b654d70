//! Declarative pipeline plan handed from the planner to the renderer.
//!
//! A plan holds no ffmpeg syntax. It says which streams are normalized,
//! how they are merged, where the audio comes from and which captions are
//! drawn; `plan::render_filter_graph` turns it into engine syntax.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::{AudioPairing, Topology};
use super::overlay::Caption;

/// Output frame every clip is scaled and padded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTarget {
    pub width: u32,
    pub height: u32,
}

impl FrameTarget {
    /// 1080x1920 portrait.
    pub const VERTICAL_HD: FrameTarget = FrameTarget {
        width: 1080,
        height: 1920,
    };
}

/// Audio normalization applied to one clip before concat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioResample {
    pub sample_rate: u32,
    pub sample_format: String,
    pub channel_layout: String,
}

impl Default for AudioResample {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            sample_format: "fltp".to_string(),
            channel_layout: "stereo".to_string(),
        }
    }
}

/// Per-clip transform stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStage {
    /// Concatenation position; also the engine input index.
    pub ordinal: usize,
    /// Local clip path.
    pub path: PathBuf,
    /// Frame the video is normalized to.
    pub frame: FrameTarget,
    /// Audio normalization, present only when audio is paired in concat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioResample>,
}

impl AssetStage {
    /// Graph label of the normalized video stream.
    pub fn video_label(&self) -> String {
        format!("v{}", self.ordinal)
    }

    /// Graph label of the normalized audio stream.
    pub fn audio_label(&self) -> String {
        format!("a{}", self.ordinal)
    }
}

/// Concatenation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStage {
    /// Ordinals in concat order.
    pub order: Vec<usize>,
    pub pairing: AudioPairing,
}

impl MergeStage {
    pub fn segment_count(&self) -> usize {
        self.order.len()
    }

    pub fn includes_audio(&self) -> bool {
        self.pairing == AudioPairing::Joint
    }
}

/// Synthesized replacement audio: a quiet tone with fades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub frequency_hz: u32,
    pub sample_rate: u32,
    /// Linear gain applied to the tone.
    pub volume: f64,
    /// Declared length of the generated track.
    pub duration_secs: f64,
    pub fade_in_secs: f64,
    pub fade_out_secs: f64,
    /// Silence between the end of the fade-out and the declared end.
    pub fade_out_margin_secs: f64,
}

impl ToneSpec {
    /// Second at which the fade-out begins.
    pub fn fade_out_start(&self) -> f64 {
        (self.duration_secs - self.fade_out_margin_secs - self.fade_out_secs).max(0.0)
    }

    /// Second at which the fade-out reaches silence.
    pub fn fade_out_end(&self) -> f64 {
        self.fade_out_start() + self.fade_out_secs
    }
}

impl Default for ToneSpec {
    fn default() -> Self {
        Self {
            frequency_hz: 440,
            sample_rate: 48_000,
            volume: 0.1,
            duration_secs: 20.0,
            fade_in_secs: 1.0,
            fade_out_secs: 2.0,
            fade_out_margin_secs: 2.0,
        }
    }
}

/// Where the output audio stream comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    /// Generated tone (topology A).
    Synthesized(ToneSpec),
    /// Audio concatenated alongside video (topology B).
    Concatenated,
    /// No audio stream in the output.
    Absent,
}

/// Caption overlays applied in order to the merged video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStage {
    pub captions: Vec<Caption>,
}

/// Output encode parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeParams {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Move the container index to the front for progressive download.
    pub faststart: bool,
    /// Stop at the end of the shortest output stream.
    pub shortest: bool,
}

impl EncodeParams {
    /// H.264 CRF 23 / AAC 128k / faststart.
    pub fn standard() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "fast".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            faststart: true,
            shortest: false,
        }
    }
}

/// Complete plan for one encode invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinePlan {
    pub topology: Topology,
    /// Per-clip stages in ordinal order.
    pub assets: Vec<AssetStage>,
    pub merge: MergeStage,
    pub audio: AudioSource,
    pub overlay: OverlayStage,
    pub encode: EncodeParams,
}

impl PipelinePlan {
    /// Whether the output will carry an audio stream.
    pub fn has_audio_output(&self) -> bool {
        !matches!(self.audio, AudioSource::Absent)
    }

    /// Source audio exists but cannot be kept because some clip is silent.
    pub fn drops_source_audio(&self) -> bool {
        self.topology == Topology::PreservedAudio && !self.merge.includes_audio()
    }

    /// Input paths in engine input order.
    pub fn input_paths(&self) -> Vec<&PathBuf> {
        self.assets.iter().map(|a| &a.path).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tone_fades_out_before_the_end() {
        let tone = ToneSpec::default();
        assert_eq!(tone.fade_out_start(), 16.0);
        assert_eq!(tone.fade_out_end(), 18.0);
        assert!(tone.duration_secs - tone.fade_out_end() >= 2.0);
    }

    #[test]
    fn fade_out_start_never_negative() {
        let tone = ToneSpec {
            duration_secs: 1.0,
            ..ToneSpec::default()
        };
        assert_eq!(tone.fade_out_start(), 0.0);
    }

    #[test]
    fn labels_use_ordinal() {
        let stage = AssetStage {
            ordinal: 2,
            path: PathBuf::from("video_2.mp4"),
            frame: FrameTarget::VERTICAL_HD,
            audio: None,
        };
        assert_eq!(stage.video_label(), "v2");
        assert_eq!(stage.audio_label(), "a2");
    }
}
