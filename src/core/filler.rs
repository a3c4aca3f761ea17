//! Multi-pass slot filling.
//!
//! Passes run in a fixed order and never overwrite a filled slot:
//!
//! 1. one ranked collocation on a matching adjacent pair
//! 2. distinctive corpus words, each used once
//! 3. repeat the first line's noun on the other lines
//! 4. context propagation, three times
//! 5. one random word for the first open slot
//! 6. noun repetition and context propagation again
//! 7. random words for everything left

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::core::corpus::CorpusProfile;
use crate::core::frame::{Frame, Slot};
use crate::core::nlp::{CapabilityError, PosTagger};
use crate::schema::pos::PosTag;

/// Context propagation rounds before the first random fill.
const CONTEXT_ROUNDS: usize = 3;

#[derive(Debug, Error)]
pub enum FillError {
    #[error("no corpus words tagged {tag} for line {line}, slot {slot}")]
    EmptyBucket { tag: PosTag, line: usize, slot: usize },
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Fills a frame from one corpus profile.
///
/// Words are tagged out of context through the consumed tagger; results are
/// cached for the lifetime of the filler.
pub struct FrameFiller<'a> {
    profile: &'a CorpusProfile,
    tagger: &'a dyn PosTagger,
    tag_cache: FxHashMap<String, PosTag>,
}

impl<'a> FrameFiller<'a> {
    pub fn new(profile: &'a CorpusProfile, tagger: &'a dyn PosTagger) -> Self {
        Self {
            profile,
            tagger,
            tag_cache: FxHashMap::default(),
        }
    }

    /// Run every pass. On success the frame has no open slots.
    pub fn fill(&mut self, frame: &mut Frame, rng: &mut StdRng) -> Result<(), FillError> {
        let placed = self.place_collocation(frame)?;
        debug!(placed, "collocation pass");

        let distinctive = self.place_distinctive_words(frame, rng)?;
        debug!(filled = distinctive, "distinctive word pass");

        let repeated = repeat_nouns(frame);
        debug!(filled = repeated, "noun repetition pass");

        for round in 0..CONTEXT_ROUNDS {
            let filled = self.propagate_context(frame)?;
            debug!(round, filled, "context pass");
        }

        let seeded = self.fill_first_unfilled(frame, rng)?;
        debug!(filled = seeded, "first unfilled pass");

        let repeated = repeat_nouns(frame);
        let filled = self.propagate_context(frame)?;
        debug!(repeated, filled, "second noun and context pass");

        let remaining = self.fill_remaining(frame, rng)?;
        debug!(filled = remaining, "random fill pass");

        Ok(())
    }

    /// Place the best-ranked collocation that fits two adjacent open slots.
    ///
    /// Collocations are tried in rank order and lines top to bottom; at most
    /// one pair is placed.
    pub fn place_collocation(&mut self, frame: &mut Frame) -> Result<bool, FillError> {
        for colloc in self.profile.collocations() {
            let pair = [colloc.first.clone(), colloc.second.clone()];
            let tags = self.tagger.tag(&pair)?;
            let (Some(&first_tag), Some(&second_tag)) = (tags.first(), tags.get(1)) else {
                continue;
            };

            for line in &mut frame.lines {
                let fit = line.slots.windows(2).position(|w| {
                    w[0].open_tag() == Some(first_tag) && w[1].open_tag() == Some(second_tag)
                });
                if let Some(i) = fit {
                    line.slots[i].fill(&colloc.first);
                    line.slots[i + 1].fill(&colloc.second);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Fill open slots with distinctive words of the matching tag, each word
    /// used at most once.
    pub fn place_distinctive_words(
        &mut self,
        frame: &mut Frame,
        rng: &mut StdRng,
    ) -> Result<usize, FillError> {
        let profile = self.profile;
        let mut by_tag: FxHashMap<PosTag, Vec<String>> = FxHashMap::default();
        for word in profile.distinctive_words() {
            let tag = self.tag_of(&word)?;
            by_tag.entry(tag).or_default().push(word);
        }

        let mut filled = 0;
        for slot in frame.lines.iter_mut().flat_map(|line| line.slots.iter_mut()) {
            let Some(tag) = slot.open_tag() else {
                continue;
            };
            let Some(words) = by_tag.get_mut(&tag) else {
                continue;
            };
            if words.is_empty() {
                continue;
            }
            let word = words.swap_remove(rng.gen_range(0..words.len()));
            slot.fill(&word);
            filled += 1;
        }
        Ok(filled)
    }

    /// Fill open neighbours of every filled placeholder from the corpus
    /// context of its word.
    pub fn propagate_context(&mut self, frame: &mut Frame) -> Result<usize, FillError> {
        let profile = self.profile;
        let mut filled = 0;
        for line in &mut frame.lines {
            for j in 0..line.slots.len() {
                let word = match &line.slots[j] {
                    Slot::Placeholder {
                        fill: Some(word), ..
                    } => word.clone(),
                    _ => continue,
                };

                if j > 0 {
                    if let Some(tag) = line.slots[j - 1].open_tag() {
                        if let Some(w) = self.first_tagged(profile.before(&word), tag)? {
                            line.slots[j - 1].fill(&w);
                            filled += 1;
                        }
                    }
                }

                if let Some(tag) = line.slots.get(j + 1).and_then(Slot::open_tag) {
                    if let Some(w) = self.first_tagged(profile.after(&word), tag)? {
                        line.slots[j + 1].fill(&w);
                        filled += 1;
                    }
                }
            }
        }
        Ok(filled)
    }

    /// Give the first open slot a random word from its bucket.
    pub fn fill_first_unfilled(
        &self,
        frame: &mut Frame,
        rng: &mut StdRng,
    ) -> Result<bool, FillError> {
        for (line_idx, line) in frame.lines.iter_mut().enumerate() {
            for (slot_idx, slot) in line.slots.iter_mut().enumerate() {
                if let Some(tag) = slot.open_tag() {
                    let word = self.random_word(tag, line_idx, slot_idx, rng)?;
                    slot.fill(&word);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Give every open slot a random word from its bucket.
    ///
    /// Buckets are checked up front; on `EmptyBucket` the frame is untouched.
    pub fn fill_remaining(&self, frame: &mut Frame, rng: &mut StdRng) -> Result<usize, FillError> {
        for (line_idx, line) in frame.lines.iter().enumerate() {
            for (slot_idx, slot) in line.slots.iter().enumerate() {
                if let Some(tag) = slot.open_tag() {
                    if self.profile.bucket(tag).is_empty() {
                        return Err(FillError::EmptyBucket {
                            tag,
                            line: line_idx,
                            slot: slot_idx,
                        });
                    }
                }
            }
        }

        let mut filled = 0;
        for (line_idx, line) in frame.lines.iter_mut().enumerate() {
            for (slot_idx, slot) in line.slots.iter_mut().enumerate() {
                if let Some(tag) = slot.open_tag() {
                    let word = self.random_word(tag, line_idx, slot_idx, rng)?;
                    slot.fill(&word);
                    filled += 1;
                }
            }
        }
        Ok(filled)
    }

    fn random_word(
        &self,
        tag: PosTag,
        line: usize,
        slot: usize,
        rng: &mut StdRng,
    ) -> Result<String, FillError> {
        self.profile
            .bucket(tag)
            .choose(rng)
            .cloned()
            .ok_or(FillError::EmptyBucket { tag, line, slot })
    }

    fn first_tagged(
        &mut self,
        candidates: &[String],
        tag: PosTag,
    ) -> Result<Option<String>, FillError> {
        for candidate in candidates {
            if self.tag_of(candidate)? == tag {
                return Ok(Some(candidate.clone()));
            }
        }
        Ok(None)
    }

    fn tag_of(&mut self, word: &str) -> Result<PosTag, FillError> {
        if let Some(tag) = self.tag_cache.get(word) {
            return Ok(*tag);
        }
        let tag = self.tagger.tag_word(word)?;
        self.tag_cache.insert(word.to_string(), tag);
        Ok(tag)
    }
}

/// Copy the first filled noun of line 0 into the first open noun slot of
/// every other line.
pub fn repeat_nouns(frame: &mut Frame) -> usize {
    let anchor = frame.lines.first().and_then(|line| {
        line.slots.iter().find_map(|slot| match slot {
            Slot::Placeholder {
                tag: PosTag::NN,
                fill: Some(word),
            } => Some(word.clone()),
            _ => None,
        })
    });
    let Some(anchor) = anchor else {
        return 0;
    };

    let mut repeated = 0;
    for line in frame.lines.iter_mut().skip(1) {
        if let Some(slot) = line
            .slots
            .iter_mut()
            .find(|slot| slot.open_tag() == Some(PosTag::NN))
        {
            slot.fill(&anchor);
            repeated += 1;
        }
    }
    repeated
}
