//! Caption overlays drawn on top of the concatenated video.

use serde::{Deserialize, Serialize};

use super::enums::CaptionRole;

/// Hook caption window, seconds on the output timeline.
pub const HOOK_WINDOW: TimeWindow = TimeWindow {
    start_secs: 0.0,
    end_secs: 3.0,
};

/// Title caption window, seconds on the output timeline.
pub const TITLE_WINDOW: TimeWindow = TimeWindow {
    start_secs: 17.0,
    end_secs: 20.0,
};

/// Closed time interval on the output timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl TimeWindow {
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs,
        }
    }

    /// Whether `t` falls inside the window (both ends inclusive, like
    /// ffmpeg's `between`).
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_secs && t <= self.end_secs
    }

    /// ffmpeg timeline expression for this window.
    pub fn enable_expr(&self) -> String {
        format!("between(t,{},{})", self.start_secs, self.end_secs)
    }
}

/// Vertical placement of a caption. Captions are always centered
/// horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionAnchor {
    /// `offset` pixels below the top edge.
    Top { offset: u32 },
    /// `offset` pixels above the bottom edge.
    Bottom { offset: u32 },
}

impl CaptionAnchor {
    /// drawtext `y` expression.
    pub fn y_expr(&self) -> String {
        match self {
            CaptionAnchor::Top { offset } => offset.to_string(),
            CaptionAnchor::Bottom { offset } => format!("h-{}", offset),
        }
    }
}

/// Font and stroke parameters for one caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Path to a TrueType font file.
    pub font_file: String,
    pub font_size: u32,
    pub font_color: String,
    pub border_width: u32,
    pub border_color: String,
}

impl TextStyle {
    /// Large yellow bold text used for the hook.
    pub fn hook_default() -> Self {
        Self {
            font_file: "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf".to_string(),
            font_size: 80,
            font_color: "yellow".to_string(),
            border_width: 4,
            border_color: "black".to_string(),
        }
    }

    /// Smaller white text used for the title.
    pub fn title_default() -> Self {
        Self {
            font_file: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
            font_size: 50,
            font_color: "white".to_string(),
            border_width: 3,
            border_color: "black".to_string(),
        }
    }
}

/// One caption: verbatim text, when it shows, where and how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub role: CaptionRole,
    /// Caller-supplied text, kept verbatim.
    pub text: String,
    pub window: TimeWindow,
    pub anchor: CaptionAnchor,
    pub style: TextStyle,
}

/// Both captions of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySpec {
    pub hook: Caption,
    pub title: Caption,
}

impl OverlaySpec {
    /// Build the overlay with the fixed windows and placements.
    pub fn new(
        hook_text: impl Into<String>,
        title_text: impl Into<String>,
        hook_style: TextStyle,
        title_style: TextStyle,
    ) -> Self {
        Self {
            hook: Caption {
                role: CaptionRole::Hook,
                text: hook_text.into(),
                window: HOOK_WINDOW,
                anchor: CaptionAnchor::Top { offset: 150 },
                style: hook_style,
            },
            title: Caption {
                role: CaptionRole::Title,
                text: title_text.into(),
                window: TITLE_WINDOW,
                anchor: CaptionAnchor::Bottom { offset: 150 },
                style: title_style,
            },
        }
    }

    /// Build the overlay with the stock fonts.
    pub fn with_default_style(hook_text: impl Into<String>, title_text: impl Into<String>) -> Self {
        Self::new(
            hook_text,
            title_text,
            TextStyle::hook_default(),
            TextStyle::title_default(),
        )
    }

    /// Captions in drawing order (hook first).
    pub fn captions(&self) -> [&Caption; 2] {
        [&self.hook, &self.title]
    }
}
