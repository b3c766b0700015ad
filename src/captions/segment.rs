use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Words per caption card in [`SegmentationMode::Timed`].
pub const WORDS_PER_CHUNK: usize = 3;

// Sentence-ending punctuation followed by whitespace. Abbreviations such as
// "Mr. Smith" split too.
static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence break pattern"));

/// One timed span of caption text. Offsets are seconds from the start of
/// the narration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSegment {
    pub index: usize,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl CaptionSegment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SegmentationMode {
    /// One segment per whitespace-delimited word.
    Word,
    /// One segment per sentence, timed by character share.
    Sentence,
    /// Fixed three-word cards.
    #[default]
    Timed,
}

impl SegmentationMode {
    /// Unknown modes segment as `timed`.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "word" => Self::Word,
            "sentence" => Self::Sentence,
            _ => Self::Timed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Sentence => "sentence",
            Self::Timed => "timed",
        }
    }
}

impl From<String> for SegmentationMode {
    fn from(value: String) -> Self {
        Self::parse_lossy(&value)
    }
}

/// Splits narration into contiguous segments covering `[0, total_duration]`.
///
/// Empty (or whitespace-only) text and non-positive or non-finite durations
/// yield no segments.
pub fn generate_segments(
    text: &str,
    total_duration: f64,
    mode: SegmentationMode,
) -> Vec<CaptionSegment> {
    let text = text.trim();
    if text.is_empty() || !total_duration.is_finite() || total_duration <= 0.0 {
        return Vec::new();
    }

    match mode {
        SegmentationMode::Word => {
            let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
            let weights = vec![1usize; words.len()];
            lay_out(words, &weights, total_duration)
        }
        SegmentationMode::Timed => {
            let chunks = chunk_words(text, WORDS_PER_CHUNK);
            let weights = vec![1usize; chunks.len()];
            lay_out(chunks, &weights, total_duration)
        }
        SegmentationMode::Sentence => {
            let sentences = split_sentences(text);
            let weights: Vec<usize> = sentences.iter().map(|s| s.chars().count()).collect();
            lay_out(sentences, &weights, total_duration)
        }
    }
}

/// Sentences in order, trimmed, punctuation kept.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for boundary in SENTENCE_BREAK.find_iter(text) {
        // The punctuation mark is a single ASCII byte.
        sentences.push(&text[last..boundary.start() + 1]);
        last = boundary.end();
    }
    sentences.push(&text[last..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn chunk_words(text: &str, words_per_chunk: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(words_per_chunk.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}

// Boundaries are computed from the running weight so that each segment's end
// is bit-identical to the next segment's start, and the last end is exactly
// `total_duration`.
fn lay_out(pieces: Vec<String>, weights: &[usize], total_duration: f64) -> Vec<CaptionSegment> {
    let total_weight: usize = weights.iter().sum();
    if total_weight == 0 {
        return Vec::new();
    }

    let boundary = |cumulative: usize| {
        if cumulative >= total_weight {
            total_duration
        } else {
            total_duration * cumulative as f64 / total_weight as f64
        }
    };

    let mut cumulative = 0;
    pieces
        .into_iter()
        .zip(weights)
        .enumerate()
        .map(|(index, (text, weight))| {
            let start_time = boundary(cumulative);
            cumulative += weight;
            CaptionSegment {
                index,
                text,
                start_time,
                end_time: boundary(cumulative),
            }
        })
        .collect()
}
