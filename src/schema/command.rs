//! Spoken commands. Maps a transcribed utterance to an action.

use crate::schema::poem::{PoemConfig, PoemLength};

/// The wake word stripped from utterances before matching.
pub const WAKE_WORD: &str = "edgar";

/// Corpus used when a generate command names no source.
pub const DEFAULT_SOURCE: &str = "poe";

/// An action requested by voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record a new source text from the microphone.
    Listen,
    /// Read the most recent poem aloud.
    Read,
    /// Append the most recent poem to the archive.
    Save,
    /// Read a random poem from the archive.
    Retrieve,
    /// Compose a new poem.
    Generate(PoemConfig),
    /// Nothing recognised; holds the cleaned utterance.
    Unknown(String),
}

impl Command {
    /// Match keywords in a transcribed utterance.
    ///
    /// The first action keyword found wins, checked in the order listen,
    /// read, save, retrieve, generate. For generate, the source defaults to
    /// Poe and the length to a medium free-form poem.
    pub fn parse(utterance: &str) -> Command {
        let text = utterance.to_lowercase().replace(WAKE_WORD, "");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let has = |word: &str| text.contains(word);

        if has("listen") {
            Command::Listen
        } else if has("read") {
            Command::Read
        } else if has("save") {
            Command::Save
        } else if has("retrieve") {
            Command::Retrieve
        } else if has("generate") {
            let source = if has("shakespeare") {
                "shakespeare"
            } else if has("bible") {
                "bible"
            } else if has("recorded") {
                "recording"
            } else {
                DEFAULT_SOURCE
            };

            let config = if has("haiku") {
                PoemConfig::haiku(source)
            } else if has("short") {
                PoemConfig::free_form(PoemLength::Short.lines(), source)
            } else if has("long") {
                PoemConfig::free_form(PoemLength::Long.lines(), source)
            } else {
                PoemConfig::free_form(PoemLength::Medium.lines(), source)
            };
            Command::Generate(config)
        } else {
            Command::Unknown(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::poem::PoemKind;

    #[test]
    fn generate_defaults_to_medium_poe() {
        let cmd = Command::parse("Edgar generate a poem");
        assert_eq!(cmd, Command::Generate(PoemConfig::free_form(8, "poe")));
    }

    #[test]
    fn generate_haiku_from_bible() {
        match Command::parse("generate a haiku from the bible") {
            Command::Generate(config) => {
                assert_eq!(config.kind, PoemKind::Haiku);
                assert_eq!(config.source, "bible");
                assert_eq!(config.line_count(), Ok(3));
            }
            other => panic!("expected generate, got {:?}", other),
        }
    }

    #[test]
    fn generate_lengths() {
        assert_eq!(
            Command::parse("generate something short from shakespeare"),
            Command::Generate(PoemConfig::free_form(4, "shakespeare"))
        );
        assert_eq!(
            Command::parse("generate a long one from what you recorded"),
            Command::Generate(PoemConfig::free_form(12, "recording"))
        );
    }

    #[test]
    fn simple_actions() {
        assert_eq!(Command::parse("edgar listen"), Command::Listen);
        assert_eq!(Command::parse("read it back"), Command::Read);
        assert_eq!(Command::parse("Save that"), Command::Save);
        assert_eq!(Command::parse("retrieve a poem"), Command::Retrieve);
    }

    #[test]
    fn unknown_keeps_cleaned_text() {
        assert_eq!(
            Command::parse("Edgar   dance  please"),
            Command::Unknown("dance please".to_string())
        );
    }
}
