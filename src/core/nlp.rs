//! Language capabilities consumed by the generator (tokenizing, tagging,
//! stopwords, bigram association scoring) plus small reference
//! implementations used by the tools.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::schema::pos::PosTag;

/// Failure reported by a tokenizer or tagger. Passed through to callers
/// unchanged.
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Splits raw text into word tokens.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, CapabilityError>;
}

/// Assigns one tag to each token of a sequence.
pub trait PosTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<PosTag>, CapabilityError>;

    /// Tag a single word out of context.
    fn tag_word(&self, word: &str) -> Result<PosTag, CapabilityError> {
        let tags = self.tag(&[word.to_string()])?;
        tags.into_iter()
            .next()
            .ok_or_else(|| format!("tagger returned no tag for '{}'", word).into())
    }
}

/// Contingency counts for one adjacent word pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigramCounts {
    /// Occurrences of the pair itself.
    pub pair: u64,
    /// Occurrences of the first word anywhere.
    pub first: u64,
    /// Occurrences of the second word anywhere.
    pub second: u64,
    /// Total number of words in the corpus.
    pub total: u64,
}

/// Scores how strongly two words are associated; higher is stronger.
pub trait AssociationScorer {
    fn score(&self, counts: &BigramCounts) -> f64;
}

/// A set of words excluded from collocations. Matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: FxHashSet<String>,
}

const ENGLISH_STOPWORDS: &str = include_str!("../../lexicon/stopwords.txt");

impl Stopwords {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// The embedded English list, one word per line.
    pub fn english() -> Self {
        Self::from_words(ENGLISH_STOPWORDS.lines())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reference implementations
// ---------------------------------------------------------------------------

/// Splits on whitespace, separates punctuation, and keeps only the words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, CapabilityError> {
        let mut tokens = Vec::new();
        for chunk in text.split_whitespace() {
            for piece in chunk.split(|c: char| !(c.is_alphanumeric() || c == '\'')) {
                let word = piece.trim_matches('\'');
                if !word.is_empty() {
                    tokens.push(word.to_string());
                }
            }
        }
        Ok(tokens)
    }
}

/// Dunning's log-likelihood ratio over the 2x2 contingency table of a pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLikelihood;

impl AssociationScorer for LogLikelihood {
    fn score(&self, counts: &BigramCounts) -> f64 {
        let n = counts.total as f64;
        if n == 0.0 {
            return 0.0;
        }
        let n_ii = counts.pair as f64;
        let n_io = counts.first.saturating_sub(counts.pair) as f64;
        let n_oi = counts.second.saturating_sub(counts.pair) as f64;
        let n_oo = (counts.total + counts.pair)
            .saturating_sub(counts.first + counts.second) as f64;

        let row_i = n_ii + n_io;
        let row_o = n_oi + n_oo;
        let col_i = n_ii + n_oi;
        let col_o = n_io + n_oo;

        let cells = [
            (n_ii, row_i * col_i / n),
            (n_io, row_i * col_o / n),
            (n_oi, row_o * col_i / n),
            (n_oo, row_o * col_o / n),
        ];

        2.0 * cells
            .iter()
            .filter(|(observed, expected)| *observed > 0.0 && *expected > 0.0)
            .map(|(observed, expected)| observed * (observed / expected).ln())
            .sum::<f64>()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Lexicon")]
struct RonLexicon {
    fallback: PosTag,
    #[serde(default)]
    capitalized: Option<PosTag>,
    #[serde(default)]
    suffixes: Vec<(String, PosTag)>,
    words: FxHashMap<String, PosTag>,
}

const ENGLISH_LEXICON: &str = include_str!("../../lexicon/english.ron");

/// Dictionary tagger: exact lookup, then capitalisation, then suffix rules,
/// then a fallback tag. Each word is tagged independently of its neighbours.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    words: FxHashMap<String, PosTag>,
    suffixes: Vec<(String, PosTag)>,
    capitalized: Option<PosTag>,
    fallback: PosTag,
}

/// Suffix rules only apply when this much of the word remains.
const MIN_STEM_LEN: usize = 2;

impl LexiconTagger {
    /// The embedded English lexicon.
    pub fn english() -> Result<Self, NlpError> {
        Self::parse_ron(ENGLISH_LEXICON)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, NlpError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Self, NlpError> {
        let raw: RonLexicon = ron::from_str(input)?;
        Ok(Self {
            words: raw
                .words
                .into_iter()
                .map(|(w, t)| (w.to_lowercase(), t))
                .collect(),
            suffixes: raw.suffixes,
            capitalized: raw.capitalized,
            fallback: raw.fallback,
        })
    }

    /// Tag one word.
    pub fn lookup(&self, word: &str) -> PosTag {
        let lower = word.to_lowercase();
        if let Some(tag) = self.words.get(&lower) {
            return *tag;
        }
        if let Some(tag) = self.capitalized {
            if word.chars().next().is_some_and(char::is_uppercase) {
                return tag;
            }
        }
        for (suffix, tag) in &self.suffixes {
            if lower.ends_with(suffix.as_str())
                && lower.chars().count() >= suffix.chars().count() + MIN_STEM_LEN
            {
                return *tag;
            }
        }
        self.fallback
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<PosTag>, CapabilityError> {
        Ok(tokens.iter().map(|t| self.lookup(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_punctuation() {
        let tokens = WordTokenizer.tokenize("The cat sat. The cat ran fast.").unwrap();
        assert_eq!(tokens, vec!["The", "cat", "sat", "The", "cat", "ran", "fast"]);
    }

    #[test]
    fn tokenize_keeps_inner_apostrophes() {
        let tokens = WordTokenizer
            .tokenize("\"'Tis some visitor,\" I muttered—don't")
            .unwrap();
        assert_eq!(tokens, vec!["Tis", "some", "visitor", "I", "muttered", "don't"]);
    }

    #[test]
    fn stopwords_match_case_insensitively() {
        let stop = Stopwords::from_words(["The", "and"]);
        assert!(stop.contains("the"));
        assert!(stop.contains("AND"));
        assert!(!stop.contains("raven"));
    }

    #[test]
    fn english_stopwords_cover_function_words() {
        let stop = Stopwords::english();
        for word in ["the", "and", "of", "more", "was"] {
            assert!(stop.contains(word), "missing stopword {}", word);
        }
        assert!(!stop.contains("chamber"));
    }

    #[test]
    fn log_likelihood_prefers_exclusive_pairs() {
        // "chamber door" always co-occurs; "the door" only sometimes.
        let exclusive = BigramCounts { pair: 5, first: 5, second: 6, total: 200 };
        let loose = BigramCounts { pair: 1, first: 30, second: 6, total: 200 };
        assert!(LogLikelihood.score(&exclusive) > LogLikelihood.score(&loose));
    }

    #[test]
    fn log_likelihood_of_independent_words_is_near_zero() {
        // Expected pair count equals observed: 10 * 10 / 100 = 1.
        let counts = BigramCounts { pair: 1, first: 10, second: 10, total: 100 };
        assert!(LogLikelihood.score(&counts).abs() < 1e-9);
    }

    #[test]
    fn lexicon_lookup_order() {
        let tagger = LexiconTagger::parse_ron(
            r#"Lexicon(
                fallback: "NN",
                capitalized: Some("NNP"),
                suffixes: [("ing", "VBG"), ("s", "NNS")],
                words: { "the": "DT", "nothing": "NN" },
            )"#,
        )
        .unwrap();
        assert_eq!(tagger.lookup("The"), PosTag::DT);
        assert_eq!(tagger.lookup("Lenore"), PosTag::NNP);
        assert_eq!(tagger.lookup("tapping"), PosTag::VBG);
        assert_eq!(tagger.lookup("nothing"), PosTag::NN);
        assert_eq!(tagger.lookup("doors"), PosTag::NNS);
        // Too short for the suffix rule to fire.
        assert_eq!(tagger.lookup("is"), PosTag::NN);
        assert_eq!(tagger.lookup("ember"), PosTag::NN);
    }

    #[test]
    fn tag_word_uses_sequence_tagging() {
        let tagger = LexiconTagger::english().unwrap();
        assert_eq!(tagger.tag_word("the").unwrap(), PosTag::DT);
    }

    #[test]
    fn english_lexicon_loads() {
        let tagger = LexiconTagger::english().unwrap();
        assert_eq!(tagger.lookup("chamber"), PosTag::NN);
        assert_eq!(tagger.lookup("there"), PosTag::EX);
        assert_eq!(tagger.lookup("could"), PosTag::MD);
    }
}
