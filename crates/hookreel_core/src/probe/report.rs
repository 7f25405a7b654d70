//! Turning inspection JSON into audio reports and stream summaries.

use std::path::Path;

use serde_json::Value;

use crate::models::{AudioInfo, LocalAsset};

use super::engine::InspectionEngine;
use super::types::{ProbeResult, StreamSelection, StreamSummary};

/// Probe one clip for audio.
///
/// Errors are returned as-is; callers that need fail-open behaviour map
/// them to [`AudioInfo::absent`].
pub fn probe_audio(engine: &dyn InspectionEngine, path: &Path) -> ProbeResult<AudioInfo> {
    let report = engine.inspect(path, StreamSelection::Audio)?;
    Ok(parse_audio_report(&report))
}

/// Extract the audio report from inspection JSON.
///
/// An empty or missing stream list means no audio. Attributes come from the
/// first audio stream.
pub fn parse_audio_report(report: &Value) -> AudioInfo {
    let first_audio = report
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|streams| {
            streams.iter().find(|stream| {
                stream
                    .get("codec_type")
                    .and_then(|t| t.as_str())
                    .map_or(true, |t| t == "audio")
            })
        });

    let Some(stream) = first_audio else {
        return AudioInfo::absent();
    };

    AudioInfo {
        present: true,
        codec: stream
            .get("codec_name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        sample_rate: stream
            .get("sample_rate")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok()),
        channels: stream
            .get("channels")
            .and_then(|v| v.as_u64())
            .and_then(|c| u8::try_from(c).ok()),
    }
}

/// Job-level audio decision: true if any clip carries audio.
pub fn has_real_audio(assets: &[LocalAsset]) -> bool {
    assets.iter().any(LocalAsset::has_audio)
}

/// List every stream of an inspected file.
pub fn summarize_streams(report: &Value) -> Vec<StreamSummary> {
    let Some(streams) = report.get("streams").and_then(|s| s.as_array()) else {
        return Vec::new();
    };

    streams
        .iter()
        .enumerate()
        .map(|(position, stream)| StreamSummary {
            index: stream
                .get("index")
                .and_then(|i| i.as_u64())
                .and_then(|i| usize::try_from(i).ok())
                .unwrap_or(position),
            codec_type: stream
                .get("codec_type")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            codec_name: stream
                .get("codec_name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            width: stream
                .get("width")
                .and_then(|v| v.as_u64())
                .and_then(|w| u32::try_from(w).ok()),
            height: stream
                .get("height")
                .and_then(|v| v.as_u64())
                .and_then(|h| u32::try_from(h).ok()),
            sample_rate: stream
                .get("sample_rate")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse().ok()),
            channels: stream
                .get("channels")
                .and_then(|v| v.as_u64())
                .and_then(|c| u8::try_from(c).ok()),
            duration_secs: stream
                .get("duration")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse().ok()),
        })
        .collect()
}

/// Inspect a finished output and summarize its streams.
pub fn inspect_output(
    engine: &dyn InspectionEngine,
    path: &Path,
) -> ProbeResult<Vec<StreamSummary>> {
    let report = engine.inspect(path, StreamSelection::All)?;
    Ok(summarize_streams(&report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeInspector;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn empty_stream_list_means_no_audio() {
        assert_eq!(parse_audio_report(&json!({ "streams": [] })), AudioInfo::absent());
        assert_eq!(parse_audio_report(&json!({})), AudioInfo::absent());
    }

    #[test]
    fn reads_first_audio_stream() {
        let report = json!({
            "streams": [{
                "index": 1,
                "codec_type": "audio",
                "codec_name": "aac",
                "sample_rate": "44100",
                "channels": 2
            }]
        });

        let info = parse_audio_report(&report);
        assert!(info.present);
        assert_eq!(info.codec.as_deref(), Some("aac"));
        assert_eq!(info.sample_rate, Some(44100));
        assert_eq!(info.channels, Some(2));
    }

    #[test]
    fn out_of_range_channel_count_is_dropped() {
        let report = json!({
            "streams": [{ "codec_type": "audio", "codec_name": "pcm_s16le", "channels": 300 }]
        });

        let info = parse_audio_report(&report);
        assert!(info.present);
        assert_eq!(info.channels, None);
        assert_eq!(summarize_streams(&report)[0].channels, None);
    }

    #[test]
    fn ignores_non_audio_streams() {
        let report = json!({
            "streams": [{ "index": 0, "codec_type": "video", "codec_name": "h264" }]
        });
        assert!(!parse_audio_report(&report).present);
    }

    #[test]
    fn any_audio_selects_real_audio() {
        let silent = LocalAsset::fetched(0, PathBuf::from("video_0.mp4"), 1);
        let loud = LocalAsset::fetched(1, PathBuf::from("video_1.mp4"), 1)
            .with_audio(AudioInfo::present());

        assert!(!has_real_audio(&[silent.clone(), silent.clone()]));
        assert!(has_real_audio(&[silent, loud]));
    }

    #[test]
    fn probe_uses_engine_report() {
        let inspector = FakeInspector::new().with_audio("video_0.mp4");
        let info = probe_audio(&inspector, Path::new("/work/video_0.mp4")).unwrap();
        assert!(info.present);

        let silent = probe_audio(&inspector, Path::new("/work/video_1.mp4")).unwrap();
        assert!(!silent.present);
    }

    #[test]
    fn probe_errors_are_returned() {
        let inspector = FakeInspector::new().failing("video_2.mp4");
        assert!(probe_audio(&inspector, Path::new("/work/video_2.mp4")).is_err());
    }

    #[test]
    fn summarizes_output_streams() {
        let report = json!({
            "streams": [
                { "index": 0, "codec_type": "video", "codec_name": "h264",
                  "width": 1080, "height": 1920, "duration": "20.000000" },
                { "index": 1, "codec_type": "audio", "codec_name": "aac",
                  "sample_rate": "48000", "channels": 2 }
            ]
        });

        let streams = summarize_streams(&report);
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].width, Some(1080));
        assert_eq!(streams[0].duration_secs, Some(20.0));
        assert_eq!(streams[1].sample_rate, Some(48000));
    }
}
