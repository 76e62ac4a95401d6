//! Gemini Live API configuration constants and types.

use serde::{Deserialize, Serialize};

/// Gemini Live API WebSocket endpoint (BidiGenerateContent).
pub const GEMINI_LIVE_URL: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Default Live model.
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-live-2.5-flash-preview";

/// Sample rate the Live API expects for realtime audio input.
pub const GEMINI_INPUT_SAMPLE_RATE: u32 = 16000;

/// Sample rate of the audio the Live API produces.
pub const GEMINI_OUTPUT_SAMPLE_RATE: u32 = 24000;

/// MIME type declared on every realtime audio input frame.
pub const GEMINI_INPUT_MIME_TYPE: &str = "audio/pcm;rate=16000";

/// Default time allowed for the setup handshake.
pub const GEMINI_DEFAULT_SETUP_TIMEOUT_MS: u64 = 15_000;

/// System instruction sent at setup when none is configured.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = concat!(
    "You are a friendly motorcycle-buying assistant for India. ",
    "Auto-detect the user's spoken language and reply in the SAME language. ",
    "Supported: English (en), Hindi (hi), Marathi (mr), Gujarati (gu), Bengali (bn), Tamil (ta), Telugu (te). ",
    "Cover ALL brands and models (Hero, Honda, TVS, Yamaha, Bajaj, KTM, Royal Enfield, Suzuki, Aprilia, Jawa, Triumph, Harley-Davidson, Revolt, etc.). ",
    "Do NOT bias toward any single brand unless the user asks for it. ",
    "When the user asks about 'a bike' generically, briefly ask 1–2 clarifying questions (budget range, use case: city/long ride, fuel/EV preference) before recommending. ",
    "Provide short, conversational answers with key specs (engine/EV motor, power/torque, mileage/range, seat height, weight), pros/cons, and rough on-road price. ",
    "If an exact price/availability is uncertain, say it's approximate and suggest checking a local dealer. ",
    "Switch language immediately if the user switches; avoid mixing languages unless the user does.",
);

/// Response modalities accepted by the Live API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    /// Spoken audio output
    #[default]
    Audio,
    /// Text output
    Text,
}

impl Modality {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "AUDIO",
            Self::Text => "TEXT",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Self::Text,
            _ => Self::Audio,
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Qualify a model identifier with the `models/` resource prefix the Live API
/// requires in the setup message.
pub fn model_resource_name(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("projects/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_parsing() {
        assert_eq!(Modality::from_str_or_default("audio"), Modality::Audio);
        assert_eq!(Modality::from_str_or_default("TEXT"), Modality::Text);
        assert_eq!(Modality::from_str_or_default("video"), Modality::Audio);
    }

    #[test]
    fn test_modality_serialization() {
        let json = serde_json::to_string(&vec![Modality::Audio]).unwrap();
        assert_eq!(json, r#"["AUDIO"]"#);
    }

    #[test]
    fn test_model_resource_name() {
        assert_eq!(
            model_resource_name("gemini-live-2.5-flash-preview"),
            "models/gemini-live-2.5-flash-preview"
        );
        assert_eq!(
            model_resource_name("models/gemini-live-2.5-flash-preview"),
            "models/gemini-live-2.5-flash-preview"
        );
    }

    #[test]
    fn test_input_mime_type_matches_sample_rate() {
        assert!(GEMINI_INPUT_MIME_TYPE.ends_with(&GEMINI_INPUT_SAMPLE_RATE.to_string()));
    }

    #[test]
    fn test_default_instruction_lists_languages() {
        for code in ["(en)", "(hi)", "(mr)", "(gu)", "(bn)", "(ta)", "(te)"] {
            assert!(DEFAULT_SYSTEM_INSTRUCTION.contains(code), "missing {code}");
        }
    }
}
