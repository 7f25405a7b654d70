//! Renders a [`PipelinePlan`] into ffmpeg `-filter_complex` syntax.

use crate::models::{AssetStage, AudioSource, Caption, PipelinePlan, ToneSpec};

use super::escape::escape_drawtext_text;

/// Graph label of the final video stream.
pub const VIDEO_OUT: &str = "vout";
/// Graph label of the final audio stream.
pub const AUDIO_OUT: &str = "aout";

/// Label of the concatenated video before captions.
const VIDEO_CONCAT: &str = "vcat";

/// Render the complete filter graph for `plan`.
///
/// Chains are separated by `;` in this order: per-clip video, per-clip
/// audio (joint pairing only), concat, captions, synthesized tone.
pub fn render_filter_graph(plan: &PipelinePlan) -> String {
    let mut chains = Vec::new();

    for stage in &plan.assets {
        chains.push(video_chain(stage));
    }
    for stage in &plan.assets {
        if let Some(chain) = audio_chain(stage) {
            chains.push(chain);
        }
    }

    let has_captions = !plan.overlay.captions.is_empty();
    let concat_video = if has_captions { VIDEO_CONCAT } else { VIDEO_OUT };
    chains.push(concat_chain(plan, concat_video));

    if has_captions {
        let overlays: Vec<String> = plan.overlay.captions.iter().map(drawtext).collect();
        chains.push(format!(
            "[{}]{}[{}]",
            VIDEO_CONCAT,
            overlays.join(","),
            VIDEO_OUT
        ));
    }

    if let AudioSource::Synthesized(tone) = &plan.audio {
        chains.push(tone_chain(tone));
    }

    chains.join(";")
}

/// Scale into the target frame keeping aspect, pad to center, square pixels.
fn video_chain(stage: &AssetStage) -> String {
    let (w, h) = (stage.frame.width, stage.frame.height);
    format!(
        "[{input}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1[{label}]",
        input = stage.ordinal,
        w = w,
        h = h,
        label = stage.video_label()
    )
}

fn audio_chain(stage: &AssetStage) -> Option<String> {
    let resample = stage.audio.as_ref()?;
    Some(format!(
        "[{}:a]aresample={},aformat=sample_fmts={}:channel_layouts={}[{}]",
        stage.ordinal,
        resample.sample_rate,
        resample.sample_format,
        resample.channel_layout,
        stage.audio_label()
    ))
}

fn concat_chain(plan: &PipelinePlan, video_label: &str) -> String {
    let joint = plan.merge.includes_audio();
    let mut inputs = String::new();

    for ordinal in &plan.merge.order {
        let Some(stage) = plan.assets.iter().find(|a| a.ordinal == *ordinal) else {
            continue;
        };
        inputs.push_str(&format!("[{}]", stage.video_label()));
        if joint {
            inputs.push_str(&format!("[{}]", stage.audio_label()));
        }
    }

    let outputs = if joint {
        format!("[{}][{}]", video_label, AUDIO_OUT)
    } else {
        format!("[{}]", video_label)
    };

    format!(
        "{}concat=n={}:v=1:a={}{}",
        inputs,
        plan.merge.segment_count(),
        u8::from(joint),
        outputs
    )
}

fn drawtext(caption: &Caption) -> String {
    let style = &caption.style;
    format!(
        "drawtext=expansion=none:text={}:fontfile={}:fontsize={}:fontcolor={}:\
         borderw={}:bordercolor={}:x=(w-text_w)/2:y={}:enable='{}'",
        escape_drawtext_text(&caption.text),
        escape_drawtext_text(&style.font_file),
        style.font_size,
        escape_drawtext_text(&style.font_color),
        style.border_width,
        escape_drawtext_text(&style.border_color),
        caption.anchor.y_expr(),
        caption.window.enable_expr()
    )
}

fn tone_chain(tone: &ToneSpec) -> String {
    format!(
        "sine=frequency={}:sample_rate={}:duration={},volume={},\
         afade=t=in:st=0:d={},afade=t=out:st={}:d={}[{}]",
        tone.frequency_hz,
        tone.sample_rate,
        tone.duration_secs,
        tone.volume,
        tone.fade_in_secs,
        tone.fade_out_start(),
        tone.fade_out_secs,
        AUDIO_OUT
    )
}
