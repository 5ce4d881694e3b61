//! Timeline stitcher for per-segment token batches.
//!
//! Engines report token timestamps relative to the segment they were spoken
//! in. The stitcher carries a running clock across segments and shifts each
//! batch onto one request-wide timeline:
//! - Field names are resolved through fixed alias tables
//! - Tokens with blank text are dropped
//! - Order is preserved; no sorting, overlap correction or deduplication
//! - The clock moves to the end of the last emitted token of each segment

use crate::defaults::TIMESTAMP_DECIMALS;
use crate::pipeline::types::AlignedToken;
use crate::synthesis::segment::{RawToken, SynthesisSegment};

type TextField = fn(&RawToken) -> Option<&str>;
type TimeField = fn(&RawToken) -> Option<f64>;

fn text_field(token: &RawToken) -> Option<&str> {
    token.text.as_deref()
}

fn word_field(token: &RawToken) -> Option<&str> {
    token.word.as_deref()
}

fn repr_field(token: &RawToken) -> Option<&str> {
    token.repr.as_deref()
}

fn start_ts_field(token: &RawToken) -> Option<f64> {
    token.start_ts
}

fn start_field(token: &RawToken) -> Option<f64> {
    token.start
}

fn end_ts_field(token: &RawToken) -> Option<f64> {
    token.end_ts
}

fn end_field(token: &RawToken) -> Option<f64> {
    token.end
}

/// Display text candidates, highest priority first.
const TEXT_ALIASES: &[(&str, TextField)] = &[
    ("text", text_field),
    ("word", word_field),
    ("repr", repr_field),
];

/// Start time candidates, highest priority first.
const START_ALIASES: &[(&str, TimeField)] = &[("start_ts", start_ts_field), ("start", start_field)];

/// End time candidates, highest priority first.
const END_ALIASES: &[(&str, TimeField)] = &[("end_ts", end_ts_field), ("end", end_field)];

/// First non-empty text alias, trimmed.
///
/// Selection happens before trimming: a whitespace-only `text` is chosen
/// over `word` and then trims to empty, which drops the token.
pub fn resolve_text(token: &RawToken) -> &str {
    TEXT_ALIASES
        .iter()
        .filter_map(|(_, field)| field(token))
        .find(|text| !text.is_empty())
        .map_or("", str::trim)
}

/// First usable timestamp among `aliases`, else 0.0.
///
/// Negative and non-finite values are treated as missing.
fn resolve_time(token: &RawToken, aliases: &[(&str, TimeField)]) -> f64 {
    aliases
        .iter()
        .filter_map(|(_, field)| field(token))
        .find(|secs| secs.is_finite() && *secs >= 0.0)
        .unwrap_or(0.0)
}

pub fn resolve_start(token: &RawToken) -> f64 {
    resolve_time(token, START_ALIASES)
}

pub fn resolve_end(token: &RawToken) -> f64 {
    resolve_time(token, END_ALIASES)
}

/// Round seconds to the timestamp precision (milliseconds).
///
/// Exact halves go to the even millisecond (`0.0625` → `0.062`). Rounding
/// works on the scaled product, so a value within one ulp of a half may
/// land on the other side of it compared to exact decimal rounding.
pub fn round_secs(secs: f64) -> f64 {
    let scale = 10f64.powi(TIMESTAMP_DECIMALS);
    (secs * scale).round_ties_even() / scale
}

/// Request-scoped stitcher. Build one per job.
#[derive(Debug, Default)]
pub struct TimelineStitcher {
    clock: f64,
    tokens: Vec<AlignedToken>,
    dropped: usize,
}

impl TimelineStitcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place one segment's tokens on the timeline.
    ///
    /// Returns the tokens emitted for this segment.
    pub fn consume_segment(&mut self, segment: &SynthesisSegment) -> &[AlignedToken] {
        let first = self.tokens.len();

        let Some(raw_tokens) = segment.tokens.as_deref() else {
            return &[];
        };

        for raw in raw_tokens {
            let text = resolve_text(raw);
            if text.is_empty() {
                self.dropped += 1;
                tracing::trace!(?raw, "Dropping token without text");
                continue;
            }

            self.tokens.push(AlignedToken {
                text: text.to_string(),
                start_secs: round_secs(self.clock + resolve_start(raw)),
                end_secs: round_secs(self.clock + resolve_end(raw)),
            });
        }

        let emitted = &self.tokens[first..];
        if let Some(last) = emitted.last() {
            self.clock = last.end_secs;
        }
        emitted
    }

    /// End time of the last emitted token (0.0 before any).
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn tokens(&self) -> &[AlignedToken] {
        &self.tokens
    }

    /// Number of tokens dropped for lack of text.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_tokens(self) -> Vec<AlignedToken> {
        self.tokens
    }
}
