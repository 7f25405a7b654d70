//! Topology decision: probed assets + overlay in, declarative plan out.

use thiserror::Error;

use crate::models::{
    AssetStage, AudioPairing, AudioResample, AudioSource, EncodeParams, FrameTarget, LocalAsset,
    MergeStage, OverlaySpec, OverlayStage, PipelinePlan, ToneSpec, Topology, REQUIRED_INPUTS,
};
use crate::probe::has_real_audio;

/// Error types for plan building.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Planning needs the full batch.
    #[error("Expected {expected} assets, got {actual}")]
    WrongAssetCount { expected: usize, actual: usize },

    /// Ordinals must be exactly 0..N with no gaps or repeats.
    #[error("Asset ordinals must be 0..{expected}, got {ordinals:?}")]
    BadOrdinals {
        expected: usize,
        ordinals: Vec<usize>,
    },
}

/// Build the pipeline plan for a complete batch.
///
/// No clip has audio: topology A, video-only concat plus a synthesized tone,
/// cut to the shorter stream. Any clip has audio: topology B, every clip's
/// audio resampled and concatenated alongside its video. If some clip in a
/// topology B batch is silent, concat cannot pair streams and falls back to
/// video only, so the output has no audio.
///
/// Captions with empty text are left out of the overlay stage.
pub fn build_pipeline_plan(
    assets: &[LocalAsset],
    overlay: &OverlaySpec,
) -> Result<PipelinePlan, PlanError> {
    if assets.len() != REQUIRED_INPUTS {
        return Err(PlanError::WrongAssetCount {
            expected: REQUIRED_INPUTS,
            actual: assets.len(),
        });
    }

    let mut ordered: Vec<&LocalAsset> = assets.iter().collect();
    ordered.sort_by_key(|a| a.ordinal);

    let ordinals: Vec<usize> = ordered.iter().map(|a| a.ordinal).collect();
    if ordinals.iter().enumerate().any(|(i, &o)| i != o) {
        return Err(PlanError::BadOrdinals {
            expected: REQUIRED_INPUTS,
            ordinals,
        });
    }

    let topology = Topology::for_audio(has_real_audio(assets));
    let pairing = match topology {
        Topology::PreservedAudio if ordered.iter().all(|a| a.has_audio()) => AudioPairing::Joint,
        _ => AudioPairing::VideoOnly,
    };

    if topology == Topology::PreservedAudio && pairing == AudioPairing::VideoOnly {
        let silent: Vec<usize> = ordered
            .iter()
            .filter(|a| !a.has_audio())
            .map(|a| a.ordinal)
            .collect();
        tracing::warn!(
            ?silent,
            "Some inputs have no audio; concatenating video only, output will be silent"
        );
    }

    let asset_stages = ordered
        .iter()
        .map(|asset| AssetStage {
            ordinal: asset.ordinal,
            path: asset.path.clone(),
            frame: FrameTarget::VERTICAL_HD,
            audio: (pairing == AudioPairing::Joint).then(AudioResample::default),
        })
        .collect();

    let audio = match (topology, pairing) {
        (Topology::SynthesizedAudio, _) => AudioSource::Synthesized(ToneSpec::default()),
        (Topology::PreservedAudio, AudioPairing::Joint) => AudioSource::Concatenated,
        (Topology::PreservedAudio, AudioPairing::VideoOnly) => AudioSource::Absent,
    };

    let mut encode = EncodeParams::standard();
    encode.shortest = topology == Topology::SynthesizedAudio;

    let captions = overlay
        .captions()
        .into_iter()
        .filter(|caption| !caption.text.is_empty())
        .cloned()
        .collect();

    Ok(PipelinePlan {
        topology,
        assets: asset_stages,
        merge: MergeStage { order: ordinals, pairing },
        audio,
        overlay: OverlayStage { captions },
        encode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudioInfo, CaptionRole};
    use std::path::PathBuf;

    fn assets(audio: [bool; 4]) -> Vec<LocalAsset> {
        audio
            .iter()
            .enumerate()
            .map(|(i, &has_audio)| {
                let info = if has_audio {
                    AudioInfo::present()
                } else {
                    AudioInfo::absent()
                };
                LocalAsset::fetched(i, PathBuf::from(format!("video_{}.mp4", i)), 1024)
                    .with_audio(info)
            })
            .collect()
    }

    fn overlay() -> OverlaySpec {
        OverlaySpec::with_default_style("HELLO", "WORLD")
    }

    #[test]
    fn silent_batch_selects_synthesized_audio() {
        let plan = build_pipeline_plan(&assets([false; 4]), &overlay()).unwrap();

        assert_eq!(plan.topology, Topology::SynthesizedAudio);
        assert_eq!(plan.merge.pairing, AudioPairing::VideoOnly);
        assert!(plan.encode.shortest);
        match &plan.audio {
            AudioSource::Synthesized(tone) => {
                assert!(tone.duration_secs - tone.fade_out_end() >= 2.0);
            }
            other => panic!("expected synthesized audio, got {:?}", other),
        }
    }

    #[test]
    fn any_audio_selects_preserved_audio_in_ordinal_order() {
        let plan = build_pipeline_plan(&assets([true; 4]), &overlay()).unwrap();

        assert_eq!(plan.topology, Topology::PreservedAudio);
        assert_eq!(plan.merge.pairing, AudioPairing::Joint);
        assert_eq!(plan.merge.order, vec![0, 1, 2, 3]);
        assert_eq!(plan.audio, AudioSource::Concatenated);
        assert!(!plan.encode.shortest);
        assert!(plan.assets.iter().all(|a| a.audio.is_some()));
    }

    #[test]
    fn shuffled_assets_are_ordered_by_ordinal() {
        let mut batch = assets([true; 4]);
        batch.reverse();

        let plan = build_pipeline_plan(&batch, &overlay()).unwrap();
        let ordinals: Vec<usize> = plan.assets.iter().map(|a| a.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
        assert_eq!(plan.assets[0].path, PathBuf::from("video_0.mp4"));
    }

    #[test]
    fn partly_silent_batch_drops_audio() {
        let plan = build_pipeline_plan(&assets([true, false, true, true]), &overlay()).unwrap();

        assert_eq!(plan.topology, Topology::PreservedAudio);
        assert_eq!(plan.merge.pairing, AudioPairing::VideoOnly);
        assert_eq!(plan.audio, AudioSource::Absent);
        assert!(!plan.has_audio_output());
        assert!(plan.drops_source_audio());
    }

    #[test]
    fn partial_batch_is_rejected() {
        let err = build_pipeline_plan(&assets([false; 4])[..3], &overlay()).unwrap_err();
        assert_eq!(
            err,
            PlanError::WrongAssetCount {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn duplicate_ordinals_are_rejected() {
        let mut batch = assets([false; 4]);
        batch[3].ordinal = 2;
        assert!(matches!(
            build_pipeline_plan(&batch, &overlay()),
            Err(PlanError::BadOrdinals { .. })
        ));
    }

    #[test]
    fn empty_captions_are_skipped() {
        let overlay = OverlaySpec::with_default_style("", "WORLD");
        let plan = build_pipeline_plan(&assets([false; 4]), &overlay).unwrap();

        assert_eq!(plan.overlay.captions.len(), 1);
        assert_eq!(plan.overlay.captions[0].role, CaptionRole::Title);
    }
}
