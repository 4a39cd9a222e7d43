//! Sentence segmentation for paragraph and list-item text.
//!
//! Rule-driven boundary detection: sentence terminators followed by
//! whitespace and a capital/digit opener, guarded by an abbreviation
//! exception list, decimal numbers, and single-letter initials. Output spans
//! are non-overlapping and cover the entire input — trailing whitespace
//! attaches to the preceding sentence. When segmentation is disabled the
//! whole block degrades to a single sentence.

/// A contiguous sentence span within a block's concatenated text.
///
/// Offsets are byte positions; `start < end <= text.len()` always holds for
/// spans produced by [`SentenceSegmenter::segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl Sentence {
    /// The span's text within its source.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Abbreviations that end in a period without ending a sentence.
/// Lowercase, stored with the trailing period.
const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "dr.", "mr.", "mrs.", "ms.", "prof.", "sr.", "jr.", "st.", "fig.", "figs.", "eq.", "eqs.",
    "sec.", "ch.", "vol.", "no.", "pp.", "p.", "e.g.", "i.e.", "etc.", "vs.", "cf.", "al.",
    "inc.", "ltd.", "co.", "corp.", "dept.", "univ.", "approx.", "jan.", "feb.", "mar.", "apr.",
    "jun.", "jul.", "aug.", "sep.", "sept.", "oct.", "nov.", "dec.",
];

/// Characters that may close a sentence between the terminator and the
/// following whitespace (quotes, brackets).
const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201D}', '\u{2019}'];

/// Characters that may open the next sentence before its capital.
const OPENERS: &[char] = &['"', '\'', '(', '[', '\u{201C}', '\u{2018}'];

/// Splits block text into sentence spans.
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    abbreviations: Vec<&'static str>,
    enabled: bool,
}

impl SentenceSegmenter {
    /// Segmenter with the default abbreviation list.
    pub fn new() -> Self {
        Self {
            abbreviations: DEFAULT_ABBREVIATIONS.to_vec(),
            enabled: true,
        }
    }

    /// Degraded segmenter: every block becomes a single sentence.
    pub fn disabled() -> Self {
        Self {
            abbreviations: Vec::new(),
            enabled: false,
        }
    }

    /// Whether boundary detection is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Split `text` into ordered, non-overlapping spans covering every
    /// character. Empty input yields no spans.
    pub fn segment(&self, text: &str) -> Vec<Sentence> {
        if text.is_empty() {
            return Vec::new();
        }
        if !self.enabled {
            return vec![Sentence {
                start: 0,
                end: text.len(),
            }];
        }

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut starts = vec![0usize];

        let mut i = 0;
        while i < chars.len() {
            let (_, c) = chars[i];
            if c != '.' && c != '!' && c != '?' {
                i += 1;
                continue;
            }

            if c == '.' && !self.period_ends_sentence(text, &chars, i) {
                i += 1;
                continue;
            }

            // Absorb closing quotes/brackets after the terminator.
            let mut j = i + 1;
            while j < chars.len() && CLOSERS.contains(&chars[j].1) {
                j += 1;
            }

            // A boundary requires trailing whitespace; it attaches left.
            let ws_start = j;
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            if j == ws_start {
                i += 1;
                continue;
            }

            if j >= chars.len() {
                break; // trailing whitespace joins the final sentence
            }

            // Periods additionally require a capital/digit opener; bare
            // lowercase continuations stay in the same sentence.
            if c == '.' && !opens_sentence(&chars, j) {
                i = j;
                continue;
            }

            starts.push(chars[j].0);
            i = j;
        }

        let mut sentences = Vec::with_capacity(starts.len());
        for (idx, &start) in starts.iter().enumerate() {
            let end = starts.get(idx + 1).copied().unwrap_or(text.len());
            if start < end {
                sentences.push(Sentence { start, end });
            }
        }
        sentences
    }

    /// Split and return owned, trimmed sentence strings (rendering form).
    pub fn segment_strings(&self, text: &str) -> Vec<String> {
        self.segment(text)
            .into_iter()
            .map(|s| s.text(text).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Decide whether the period at `chars[i]` terminates a sentence.
    fn period_ends_sentence(&self, text: &str, chars: &[(usize, char)], i: usize) -> bool {
        // Decimal number: digit on both sides.
        let prev = if i > 0 { Some(chars[i - 1].1) } else { None };
        let next = chars.get(i + 1).map(|(_, c)| *c);
        if prev.map(|c| c.is_ascii_digit()).unwrap_or(false)
            && next.map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            return false;
        }

        // Word ending at this period, including any interior periods
        // ("e.g." scans back as one token).
        let byte_pos = chars[i].0;
        let word_start = text[..byte_pos]
            .rfind(char::is_whitespace)
            .map(|p| p + 1)
            .unwrap_or(0);
        let word = &text[word_start..byte_pos];
        let token = format!("{}.", word.trim_start_matches(|c: char| !c.is_alphanumeric()));
        let token = token.to_lowercase();

        if self.abbreviations.contains(&token.as_str()) {
            return false;
        }

        // Single-letter initial: "J. Smith".
        let mut word_chars = word.chars();
        if let (Some(first), None) = (word_chars.next(), word_chars.next()) {
            if first.is_uppercase() {
                return false;
            }
        }

        true
    }
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the character at `chars[j]` (after optional openers) can begin a
/// sentence: uppercase letter or digit.
fn opens_sentence(chars: &[(usize, char)], mut j: usize) -> bool {
    while j < chars.len() && OPENERS.contains(&chars[j].1) {
        j += 1;
    }
    chars
        .get(j)
        .map(|(_, c)| c.is_uppercase() || c.is_ascii_digit())
        .unwrap_or(false)
}
