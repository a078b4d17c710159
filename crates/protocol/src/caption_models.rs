//! Caption generation options.
//!
//! These options shape the caption+hashtag request sent to the text model.
//! Defaults mirror the values used by the daily automation run.

use serde::{Deserialize, Serialize};

/// Voice the caption should be written in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Casual,
    Professional,
    Playful,
    Bold,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tone::Casual => "casual",
            Tone::Professional => "professional",
            Tone::Playful => "playful",
            Tone::Bold => "bold",
        };
        write!(f, "{name}")
    }
}

/// Options for one caption generation call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionOptions {
    /// Voice of the caption.
    pub tone: Tone,

    /// Upper bound on returned hashtags; extras are dropped.
    pub max_hashtags: usize,

    /// Upper bound on caption length in characters.
    pub max_caption_length: usize,

    /// Free-text audience hint passed through to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,

    /// Ask the model to close with a call to action.
    pub include_call_to_action: bool,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            tone: Tone::default(),
            max_hashtags: 10,
            max_caption_length: 300,
            target_audience: None,
            include_call_to_action: true,
        }
    }
}
