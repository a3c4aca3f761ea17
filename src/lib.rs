//! Poetry Engine: grammar-driven poem generation from a source corpus.
//!
//! A hand-written context-free grammar lays out lines of part-of-speech
//! slots; a multi-pass filler then chooses words for them from corpus
//! statistics (collocations, recurring long words, neighbour context) before
//! falling back to random words of the right tag.

pub mod core;
pub mod schema;
