//! ffmpeg argument builder.
//!
//! Builds the argument vector (without the program name) for the single
//! encode invocation:
//!
//! ```text
//! -y -hide_banner -i in0 .. -i in3 -filter_complex GRAPH -map [vout]
//! [-map [aout]] -c:v .. -preset .. -crf .. [-c:a .. -b:a ..]
//! [-movflags +faststart] [-shortest] OUTPUT
//! ```

use std::path::Path;

use crate::models::PipelinePlan;

use super::graph::{render_filter_graph, AUDIO_OUT, VIDEO_OUT};

/// Builder for ffmpeg command-line arguments.
pub struct FfmpegCommandBuilder<'a> {
    plan: &'a PipelinePlan,
    output_path: &'a Path,
}

impl<'a> FfmpegCommandBuilder<'a> {
    pub fn new(plan: &'a PipelinePlan, output_path: &'a Path) -> Self {
        Self { plan, output_path }
    }

    /// Build the complete argument list.
    pub fn build(&self) -> Vec<String> {
        let mut tokens = vec!["-y".to_string(), "-hide_banner".to_string()];

        for path in self.plan.input_paths() {
            tokens.push("-i".to_string());
            tokens.push(path.to_string_lossy().to_string());
        }

        tokens.push("-filter_complex".to_string());
        tokens.push(render_filter_graph(self.plan));

        tokens.push("-map".to_string());
        tokens.push(format!("[{}]", VIDEO_OUT));
        if self.plan.has_audio_output() {
            tokens.push("-map".to_string());
            tokens.push(format!("[{}]", AUDIO_OUT));
        }

        self.add_encode_options(&mut tokens);

        tokens.push(self.output_path.to_string_lossy().to_string());
        tokens
    }

    fn add_encode_options(&self, tokens: &mut Vec<String>) {
        let encode = &self.plan.encode;

        tokens.push("-c:v".to_string());
        tokens.push(encode.video_codec.clone());
        tokens.push("-preset".to_string());
        tokens.push(encode.preset.clone());
        tokens.push("-crf".to_string());
        tokens.push(encode.crf.to_string());

        if self.plan.has_audio_output() {
            tokens.push("-c:a".to_string());
            tokens.push(encode.audio_codec.clone());
            tokens.push("-b:a".to_string());
            tokens.push(encode.audio_bitrate.clone());
        }

        if encode.faststart {
            tokens.push("-movflags".to_string());
            tokens.push("+faststart".to_string());
        }

        if encode.shortest {
            tokens.push("-shortest".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudioInfo, LocalAsset, OverlaySpec};
    use crate::plan::build_pipeline_plan;
    use std::path::PathBuf;

    fn plan_for(audio: [bool; 4], hook: &str) -> PipelinePlan {
        let assets: Vec<LocalAsset> = audio
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                LocalAsset::fetched(i, PathBuf::from(format!("/work/video_{}.mp4", i)), 1)
                    .with_audio(if a { AudioInfo::present() } else { AudioInfo::absent() })
            })
            .collect();
        build_pipeline_plan(&assets, &OverlaySpec::with_default_style(hook, "WORLD")).unwrap()
    }

    fn position(tokens: &[String], needle: &str) -> usize {
        tokens.iter().position(|t| t == needle).unwrap()
    }

    #[test]
    fn builds_silent_batch_command() {
        let plan = plan_for([false; 4], "HELLO");
        let tokens = FfmpegCommandBuilder::new(&plan, Path::new("final.mp4")).build();

        assert_eq!(&tokens[..2], ["-y", "-hide_banner"]);
        let inputs: Vec<&String> = tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| *i > 0 && tokens[i - 1] == "-i")
            .map(|(_, t)| t)
            .collect();
        assert_eq!(
            inputs,
            [
                "/work/video_0.mp4",
                "/work/video_1.mp4",
                "/work/video_2.mp4",
                "/work/video_3.mp4"
            ]
        );

        let maps: Vec<&String> = tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| *i > 0 && tokens[i - 1] == "-map")
            .map(|(_, t)| t)
            .collect();
        assert_eq!(maps, ["[vout]", "[aout]"]);

        assert!(tokens.contains(&"-shortest".to_string()));
        assert_eq!(tokens.last().map(String::as_str), Some("final.mp4"));
        assert!(position(&tokens, "-shortest") < tokens.len() - 1);
    }

    #[test]
    fn uses_fixed_encode_parameters() {
        let plan = plan_for([true; 4], "HELLO");
        let tokens = FfmpegCommandBuilder::new(&plan, Path::new("final.mp4")).build();
        let joined = tokens.join(" ");

        assert!(joined.contains("-c:v libx264 -preset fast -crf 23"));
        assert!(joined.contains("-c:a aac -b:a 128k"));
        assert!(joined.contains("-movflags +faststart"));
        assert!(!tokens.contains(&"-shortest".to_string()));
    }

    #[test]
    fn silent_output_maps_no_audio() {
        let plan = plan_for([true, false, false, false], "HELLO");
        let tokens = FfmpegCommandBuilder::new(&plan, Path::new("final.mp4")).build();

        assert!(!tokens.contains(&"[aout]".to_string()));
        assert!(!tokens.contains(&"-c:a".to_string()));
    }

    #[test]
    fn quote_characters_reach_the_argument_vector() {
        let plan = plan_for([false; 4], "Don't \"stop\"");
        let tokens = FfmpegCommandBuilder::new(&plan, Path::new("final.mp4")).build();

        let graph = &tokens[position(&tokens, "-filter_complex") + 1];
        assert!(graph.contains(r#"text=Don\\\'t "stop":"#));
    }
}
