//! Voice catalog.
//!
//! The allow-list of voice ids a job may request. Mobile-friendly aliases
//! and provider-prefixed Kokoro ids live side by side in one flat list;
//! membership is an exact string match, never a prefix match.

/// Voice gender as presented to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

/// Metadata for one accepted voice id.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    /// Identifier passed to the engine (e.g., "am_adam", "alex")
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    pub gender: Gender,
    /// Short style description
    pub style: &'static str,
    /// Whether this is a mobile-friendly alias rather than a provider id
    pub alias: bool,
}

const fn voice(
    id: &'static str,
    name: &'static str,
    gender: Gender,
    style: &'static str,
) -> VoiceInfo {
    VoiceInfo {
        id,
        name,
        gender,
        style,
        alias: false,
    }
}

const fn alias(
    id: &'static str,
    name: &'static str,
    gender: Gender,
    style: &'static str,
) -> VoiceInfo {
    VoiceInfo {
        id,
        name,
        gender,
        style,
        alias: true,
    }
}

/// Every voice id the worker accepts, in presentation order.
pub const VOICES: &[VoiceInfo] = &[
    // Mobile friendly ids (backward compatibility)
    alias("alex", "Alex", Gender::Male, "Narration"),
    alias("sarah", "Sarah", Gender::Female, "Storytelling"),
    alias("james", "James", Gender::Male, "Documentary"),
    alias("emma", "Emma", Gender::Female, "Conversational"),
    // Female voices (af_)
    voice("af_alloy", "Alloy", Gender::Female, "Balanced"),
    voice("af_aoede", "Aoede", Gender::Female, "Melodic"),
    voice("af_bella", "Bella", Gender::Female, "Conversational"),
    voice("af_heart", "Heart", Gender::Female, "Warm"),
    voice("af_jessica", "Jessica", Gender::Female, "Professional"),
    voice("af_kore", "Kore", Gender::Female, "Youthful"),
    voice("af_nicole", "Nicole", Gender::Female, "Friendly"),
    voice("af_nova", "Nova", Gender::Female, "Energetic"),
    voice("af_river", "River", Gender::Female, "Calm"),
    voice("af_sarah", "Sarah", Gender::Female, "Clear"),
    voice("af_sky", "Sky", Gender::Female, "Bright"),
    // Male voices (am_)
    voice("am_adam", "Adam", Gender::Male, "Narration"),
    voice("am_echo", "Echo", Gender::Male, "Resonant"),
    voice("am_eric", "Eric", Gender::Male, "Authoritative"),
    voice("am_fenrir", "Fenrir", Gender::Male, "Deep"),
    voice("am_liam", "Liam", Gender::Male, "Casual"),
    voice("am_michael", "Michael", Gender::Male, "Documentary"),
    voice("am_onyx", "Onyx", Gender::Male, "Rich"),
    voice("am_puck", "Puck", Gender::Male, "Playful"),
];

/// Find a voice by exact id.
pub fn get_voice(id: &str) -> Option<&'static VoiceInfo> {
    VOICES.iter().find(|v| v.id == id)
}

/// Whether `id` is on the allow-list.
pub fn is_valid_voice(id: &str) -> bool {
    get_voice(id).is_some()
}

pub fn list_voices() -> &'static [VoiceInfo] {
    VOICES
}

/// Comma-separated list of every accepted id, used in error messages.
pub fn allow_list() -> String {
    VOICES.iter().map(|v| v.id).collect::<Vec<_>>().join(", ")
}
