//! Poem frames, made of lines of fixed words and open part-of-speech
//! slots, and the rendered poem.

use rand::rngs::StdRng;
use rand::Rng;
use std::fmt;

use crate::core::grammar::{Grammar, GrammarError};
use crate::schema::poem::PoemKind;
use crate::schema::pos::{PosTag, TagInventory};

/// Pronouns that refrain lines reopen as noun slots.
const REFRAIN_PRONOUNS: [&str; 4] = ["he", "she", "it", "I"];

/// Haiku refrain positions: the first and last lines.
const HAIKU_REFRAIN: (usize, usize) = (0, 2);

/// One position in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A fixed word from the grammar.
    Preset(String),
    /// An open position that needs a word with this tag.
    Placeholder { tag: PosTag, fill: Option<String> },
}

impl Slot {
    pub fn open(tag: PosTag) -> Self {
        Slot::Placeholder { tag, fill: None }
    }

    pub fn is_preset(&self) -> bool {
        matches!(self, Slot::Preset(_))
    }

    pub fn is_filled(&self) -> bool {
        self.word().is_some()
    }

    /// The required tag of a placeholder.
    pub fn tag(&self) -> Option<PosTag> {
        match self {
            Slot::Preset(_) => None,
            Slot::Placeholder { tag, .. } => Some(*tag),
        }
    }

    pub fn word(&self) -> Option<&str> {
        match self {
            Slot::Preset(word) => Some(word),
            Slot::Placeholder { fill, .. } => fill.as_deref(),
        }
    }

    /// The tag still waiting for a word, if this is an unfilled placeholder.
    pub fn open_tag(&self) -> Option<PosTag> {
        match self {
            Slot::Placeholder { tag, fill: None } => Some(*tag),
            _ => None,
        }
    }

    /// Fill an open placeholder. Returns false, leaving the slot untouched,
    /// for presets and already-filled placeholders.
    pub fn fill(&mut self, word: &str) -> bool {
        match self {
            Slot::Placeholder { fill: fill @ None, .. } => {
                *fill = Some(word.to_string());
                true
            }
            _ => false,
        }
    }
}

/// One line of slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub slots: Vec<Slot>,
}

impl Line {
    /// Classify template tokens into slots.
    ///
    /// Tokens naming an inventory tag become placeholders. With
    /// `reopen_pronouns`, the pronouns he/she/it/I become noun placeholders.
    pub fn from_tokens(tokens: &[String], inventory: &TagInventory, reopen_pronouns: bool) -> Self {
        let slots = tokens
            .iter()
            .map(|token| match inventory.lookup(token) {
                Some(tag) => Slot::open(tag),
                None if reopen_pronouns && REFRAIN_PRONOUNS.contains(&token.as_str()) => {
                    Slot::open(PosTag::NN)
                }
                None => Slot::Preset(token.clone()),
            })
            .collect();
        Line { slots }
    }

    /// Words joined by spaces; an unfilled slot shows its tag label.
    pub fn render(&self) -> String {
        self.slots
            .iter()
            .map(|slot| match (slot.word(), slot.tag()) {
                (Some(word), _) => word.to_string(),
                (None, Some(tag)) => tag.label().to_string(),
                (None, None) => String::new(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The skeleton of a poem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<Line>,
    refrain: (usize, usize),
}

impl Frame {
    /// Build an unfilled frame of `line_count` lines.
    ///
    /// The start symbol is expanded once for the refrain template; the two
    /// refrain lines are built from it and every other line from a fresh
    /// expansion.
    pub fn build(
        grammar: &Grammar,
        inventory: &TagInventory,
        line_count: usize,
        kind: PoemKind,
        rng: &mut StdRng,
    ) -> Result<Frame, GrammarError> {
        if line_count == 0 {
            return Ok(Frame::from_lines(Vec::new(), (0, 0)));
        }
        let refrain_tokens = grammar.expand_start(rng)?;
        let refrain = if kind.is_haiku() {
            HAIKU_REFRAIN
        } else {
            (rng.gen_range(0..line_count), rng.gen_range(0..line_count))
        };

        let mut lines = Vec::with_capacity(line_count);
        for i in 0..line_count {
            let line = if i == refrain.0 || i == refrain.1 {
                Line::from_tokens(&refrain_tokens, inventory, true)
            } else {
                Line::from_tokens(&grammar.expand_start(rng)?, inventory, false)
            };
            lines.push(line);
        }

        Ok(Frame { lines, refrain })
    }

    /// Assemble a frame directly; refrain indices are for bookkeeping only.
    pub fn from_lines(lines: Vec<Line>, refrain: (usize, usize)) -> Self {
        Frame { lines, refrain }
    }

    /// The two refrain line indices (they may coincide).
    pub fn refrain_lines(&self) -> (usize, usize) {
        self.refrain
    }

    pub fn is_complete(&self) -> bool {
        self.unfilled_count() == 0
    }

    pub fn unfilled_count(&self) -> usize {
        self.slots().filter(|slot| !slot.is_filled()).count()
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.lines.iter().flat_map(|line| line.slots.iter())
    }

    pub fn render(&self) -> Poem {
        Poem {
            lines: self.lines.iter().map(Line::render).collect(),
        }
    }
}

/// A finished poem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poem {
    pub lines: Vec<String>,
}

impl Poem {
    /// All lines on one line, for a speech synthesizer.
    pub fn spoken(&self) -> String {
        self.lines.join(" ")
    }
}

/// Each line followed by a newline, then one blank separator line.
impl fmt::Display for Poem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}
