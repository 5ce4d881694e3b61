//! Units streamed by a synthesis engine.
//!
//! Engines do not agree on how a token looks: some name the display text
//! `text`, others `word`; timestamps arrive as `start_ts`/`end_ts` or
//! `start`/`end`, as numbers or numeric strings, or not at all; a token may
//! even be a bare string. [`RawToken`] keeps every candidate field as an
//! optional so the stitcher can resolve them with a fixed alias order.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One streamed unit: a waveform chunk and the tokens spoken in it.
///
/// Token timestamps are relative to the start of this segment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SynthesisSegment {
    #[serde(default, alias = "audio")]
    pub waveform: Option<Vec<f32>>,
    #[serde(default)]
    pub tokens: Option<Vec<RawToken>>,
}

impl SynthesisSegment {
    pub fn new(waveform: Vec<f32>, tokens: Vec<RawToken>) -> Self {
        Self {
            waveform: Some(waveform),
            tokens: Some(tokens),
        }
    }

    /// Segment carrying audio but no token list.
    pub fn audio_only(waveform: Vec<f32>) -> Self {
        Self {
            waveform: Some(waveform),
            tokens: None,
        }
    }

    /// Segment carrying tokens but no audio.
    pub fn tokens_only(tokens: Vec<RawToken>) -> Self {
        Self {
            waveform: None,
            tokens: Some(tokens),
        }
    }

    /// Number of samples in this segment's waveform (0 if absent).
    pub fn sample_count(&self) -> usize {
        self.waveform.as_ref().map_or(0, Vec::len)
    }
}

/// A token as reported by the engine, before alias resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawToken {
    pub text: Option<String>,
    pub word: Option<String>,
    pub start_ts: Option<f64>,
    pub start: Option<f64>,
    pub end_ts: Option<f64>,
    pub end: Option<f64>,
    /// String form of the whole token: a bare `"hello"` as-is, a record as
    /// compact JSON. Last resort for the display text.
    pub repr: Option<String>,
}

impl RawToken {
    /// Token with `text`, `start` and `end` set.
    pub fn timed(text: &str, start: f64, end: f64) -> Self {
        Self {
            text: Some(text.to_string()),
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    /// Token with `text`, `start_ts` and `end_ts` set.
    pub fn timed_ts(text: &str, start_ts: f64, end_ts: f64) -> Self {
        Self {
            text: Some(text.to_string()),
            start_ts: Some(start_ts),
            end_ts: Some(end_ts),
            ..Default::default()
        }
    }
}

impl<'de> Deserialize<'de> for RawToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(RawToken::from_value(&Value::deserialize(deserializer)?))
    }
}

impl RawToken {
    /// Build a token from any JSON value.
    ///
    /// Records keep their own fields plus their compact JSON form as `repr`;
    /// scalars become `repr` alone; `null` yields an empty token.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(fields) => RawToken {
                text: fields.get("text").and_then(lenient_text),
                word: fields.get("word").and_then(lenient_text),
                start_ts: fields.get("start_ts").and_then(lenient_seconds),
                start: fields.get("start").and_then(lenient_seconds),
                end_ts: fields.get("end_ts").and_then(lenient_seconds),
                end: fields.get("end").and_then(lenient_seconds),
                repr: Some(value.to_string()),
            },
            Value::Null => RawToken::default(),
            scalar => RawToken {
                repr: scalar_text(scalar),
                ..Default::default()
            },
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accept a number or a numeric string; anything else is treated as missing.
fn lenient_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_token(json: &str) -> RawToken {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_record_with_all_fields() {
        let token = parse_token(
            r#"{"text": "Hi", "word": "hi", "start_ts": 0.1, "start": 0.2, "end_ts": 0.3, "end": 0.4}"#,
        );
        assert_eq!(token.text.as_deref(), Some("Hi"));
        assert_eq!(token.word.as_deref(), Some("hi"));
        assert_eq!(token.start_ts, Some(0.1));
        assert_eq!(token.start, Some(0.2));
        assert_eq!(token.end_ts, Some(0.3));
        assert_eq!(token.end, Some(0.4));
    }

    #[test]
    fn test_record_keeps_json_form_as_repr() {
        let token = parse_token(r#"{"phonemes": "hə", "start_ts": 0.1, "end_ts": 0.3}"#);
        assert_eq!(token.text, None);
        assert_eq!(token.word, None);
        let repr: Value = serde_json::from_str(token.repr.as_deref().unwrap()).unwrap();
        assert_eq!(
            repr,
            serde_json::json!({"phonemes": "hə", "start_ts": 0.1, "end_ts": 0.3})
        );
        assert_eq!(token.start_ts, Some(0.1));
    }

    #[test]
    fn test_numeric_token_repr() {
        assert_eq!(parse_token("42").repr.as_deref(), Some("42"));
        assert_eq!(parse_token("true").repr.as_deref(), Some("true"));
    }

    #[test]
    fn test_record_with_missing_fields() {
        let token = parse_token(r#"{"word": "there"}"#);
        assert_eq!(token.text, None);
        assert_eq!(token.word.as_deref(), Some("there"));
        assert_eq!(token.start_ts, None);
        assert_eq!(token.end, None);
    }

    #[test]
    fn test_numeric_strings_coerced() {
        let token = parse_token(r#"{"text": "x", "start": "0.25", "end": " 1.5 "}"#);
        assert_eq!(token.start, Some(0.25));
        assert_eq!(token.end, Some(1.5));
    }

    #[test]
    fn test_unparseable_timestamps_are_missing() {
        let token = parse_token(r#"{"text": "x", "start_ts": "soon", "end_ts": [1], "end": null}"#);
        assert_eq!(token.start_ts, None);
        assert_eq!(token.end_ts, None);
        assert_eq!(token.end, None);
    }

    #[test]
    fn test_integer_timestamps() {
        let token = parse_token(r#"{"text": "x", "start": 1, "end": 2}"#);
        assert_eq!(token.start, Some(1.0));
        assert_eq!(token.end, Some(2.0));
    }

    #[test]
    fn test_bare_string_token_kept_as_repr() {
        let token = parse_token(r#""hello""#);
        assert_eq!(token.repr.as_deref(), Some("hello"));
        assert_eq!(token.text, None);
    }

    #[test]
    fn test_null_token_has_nothing() {
        let token = parse_token("null");
        assert_eq!(token, RawToken::default());
    }

    #[test]
    fn test_segment_with_audio_alias() {
        let segment: SynthesisSegment =
            serde_json::from_str(r#"{"audio": [0.0, 0.5], "tokens": [{"text": "a"}]}"#).unwrap();
        assert_eq!(segment.waveform, Some(vec![0.0, 0.5]));
        assert_eq!(segment.tokens.as_ref().map(Vec::len), Some(1));
        assert_eq!(segment.sample_count(), 2);
    }

    #[test]
    fn test_segment_with_nulls() {
        let segment: SynthesisSegment =
            serde_json::from_str(r#"{"audio": null, "tokens": null}"#).unwrap();
        assert_eq!(segment, SynthesisSegment::default());
        assert_eq!(segment.sample_count(), 0);
    }

    #[test]
    fn test_segment_with_no_fields() {
        let segment: SynthesisSegment = serde_json::from_str("{}").unwrap();
        assert_eq!(segment, SynthesisSegment::default());
    }
}
