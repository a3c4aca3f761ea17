//! Corpus statistics: part-of-speech buckets, neighbour context, and
//! ranked collocations.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::nlp::{AssociationScorer, BigramCounts, Stopwords};
use crate::schema::pos::{PosTag, TagInventory};

/// Collocations kept after ranking.
pub const MAX_COLLOCATIONS: usize = 40;
/// Minimum occurrences of a pair to count as a collocation.
pub const MIN_COLLOCATION_COUNT: u64 = 3;
/// Minimum characters in each word of a collocation.
pub const MIN_COLLOCATION_WORD_LEN: usize = 3;
/// A distinctive word has more characters than this.
pub const DISTINCTIVE_MIN_LEN: usize = 6;
/// A distinctive word occurs more times than this.
pub const DISTINCTIVE_MIN_COUNT: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("tagger returned {tags} tags for {tokens} tokens")]
pub struct TagCountMismatch {
    pub tokens: usize,
    pub tags: usize,
}

/// An adjacent word pair that occurs together more than chance predicts.
#[derive(Debug, Clone, PartialEq)]
pub struct Collocation {
    pub first: String,
    pub second: String,
    pub score: f64,
}

/// Everything the filler needs to know about a source corpus.
///
/// Words are lowercased; tags come from tagging the original tokens.
#[derive(Debug, Clone, Default)]
pub struct CorpusProfile {
    words: Vec<String>,
    buckets: BTreeMap<PosTag, Vec<String>>,
    before: FxHashMap<String, Vec<String>>,
    after: FxHashMap<String, Vec<String>>,
    frequencies: FxHashMap<String, usize>,
    collocations: Vec<Collocation>,
}

impl CorpusProfile {
    /// Build a profile from tokens and their tags.
    ///
    /// Every inventory tag gets a bucket, even an empty one, and every
    /// distinct word gets a context entry.
    pub fn analyze(
        tokens: &[String],
        tags: &[PosTag],
        inventory: &TagInventory,
        stopwords: &Stopwords,
        scorer: &dyn AssociationScorer,
    ) -> Result<CorpusProfile, TagCountMismatch> {
        if tokens.len() != tags.len() {
            return Err(TagCountMismatch {
                tokens: tokens.len(),
                tags: tags.len(),
            });
        }

        let words: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        let mut buckets: BTreeMap<PosTag, Vec<String>> =
            inventory.iter().map(|tag| (tag, Vec::new())).collect();
        for (word, tag) in words.iter().zip(tags) {
            buckets.entry(*tag).or_default().push(word.clone());
        }

        let mut before: FxHashMap<String, Vec<String>> = FxHashMap::default();
        let mut after: FxHashMap<String, Vec<String>> = FxHashMap::default();
        let mut frequencies: FxHashMap<String, usize> = FxHashMap::default();
        for (i, word) in words.iter().enumerate() {
            *frequencies.entry(word.clone()).or_default() += 1;
            let preceding = before.entry(word.clone()).or_default();
            if i > 0 {
                preceding.push(words[i - 1].clone());
            }
            let following = after.entry(word.clone()).or_default();
            if let Some(next) = words.get(i + 1) {
                following.push(next.clone());
            }
        }

        let collocations = rank_collocations(&words, &frequencies, stopwords, scorer);

        Ok(CorpusProfile {
            words,
            buckets,
            before,
            after,
            frequencies,
            collocations,
        })
    }

    /// All lowercased corpus words in order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Words tagged `tag`, one entry per occurrence.
    pub fn bucket(&self, tag: PosTag) -> &[String] {
        self.buckets.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Buckets in tag order.
    pub fn buckets(&self) -> impl Iterator<Item = (PosTag, &[String])> {
        self.buckets.iter().map(|(tag, words)| (*tag, words.as_slice()))
    }

    /// Words seen immediately before `word`.
    pub fn before(&self, word: &str) -> &[String] {
        self.before
            .get(&word.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Words seen immediately after `word`.
    pub fn after(&self, word: &str) -> &[String] {
        self.after
            .get(&word.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `word` occurs in the corpus.
    pub fn contains_word(&self, word: &str) -> bool {
        self.before.contains_key(&word.to_lowercase())
    }

    pub fn frequency(&self, word: &str) -> usize {
        self.frequencies
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Ranked collocations, strongest first.
    pub fn collocations(&self) -> &[Collocation] {
        &self.collocations
    }

    /// Distinct long words that recur, sorted.
    pub fn distinctive_words(&self) -> Vec<String> {
        let mut words: Vec<String> = self
            .frequencies
            .iter()
            .filter(|(word, count)| {
                word.chars().count() > DISTINCTIVE_MIN_LEN && **count > DISTINCTIVE_MIN_COUNT
            })
            .map(|(word, _)| word.clone())
            .collect();
        words.sort();
        words
    }
}

fn rank_collocations(
    words: &[String],
    frequencies: &FxHashMap<String, usize>,
    stopwords: &Stopwords,
    scorer: &dyn AssociationScorer,
) -> Vec<Collocation> {
    let mut pair_counts: FxHashMap<(&str, &str), u64> = FxHashMap::default();
    for pair in words.windows(2) {
        *pair_counts
            .entry((pair[0].as_str(), pair[1].as_str()))
            .or_default() += 1;
    }

    let eligible = |word: &str| {
        word.chars().count() >= MIN_COLLOCATION_WORD_LEN && !stopwords.contains(word)
    };
    let total = words.len() as u64;
    let count_of = |word: &str| frequencies.get(word).copied().unwrap_or(0) as u64;

    let mut ranked: Vec<Collocation> = pair_counts
        .into_iter()
        .filter(|((first, second), count)| {
            *count >= MIN_COLLOCATION_COUNT && eligible(first) && eligible(second)
        })
        .map(|((first, second), count)| {
            let counts = BigramCounts {
                pair: count,
                first: count_of(first),
                second: count_of(second),
                total,
            };
            Collocation {
                first: first.to_string(),
                second: second.to_string(),
                score: scorer.score(&counts),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| (&a.first, &a.second).cmp(&(&b.first, &b.second)))
    });
    ranked.truncate(MAX_COLLOCATIONS);
    ranked
}
