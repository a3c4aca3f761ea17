//! Poem request types: kind, length, and source corpus.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A haiku always has this many lines, whatever length was requested.
pub const HAIKU_LINES: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a free-form poem needs at least one line")]
    EmptyFreeForm,
    #[error("unknown poem kind '{0}' (expected haiku or free-form)")]
    UnknownKind(String),
    #[error("unknown poem length '{0}' (expected short, medium, long, or a line count)")]
    UnknownLength(String),
}

/// Which grammar drives the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoemKind {
    Haiku,
    FreeForm,
}

impl PoemKind {
    pub fn is_haiku(self) -> bool {
        matches!(self, PoemKind::Haiku)
    }
}

impl fmt::Display for PoemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoemKind::Haiku => f.write_str("haiku"),
            PoemKind::FreeForm => f.write_str("free-form"),
        }
    }
}

impl FromStr for PoemKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "haiku" => Ok(PoemKind::Haiku),
            "free-form" | "free_form" | "freeform" | "free" => Ok(PoemKind::FreeForm),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}

/// Named free-form lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoemLength {
    Short,
    Medium,
    Long,
}

impl PoemLength {
    pub fn lines(self) -> usize {
        match self {
            PoemLength::Short => 4,
            PoemLength::Medium => 8,
            PoemLength::Long => 12,
        }
    }
}

impl FromStr for PoemLength {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(PoemLength::Short),
            "medium" => Ok(PoemLength::Medium),
            "long" => Ok(PoemLength::Long),
            other => Err(ConfigError::UnknownLength(other.to_string())),
        }
    }
}

/// Parse a length given either as a preset name or a plain line count.
pub fn parse_line_count(s: &str) -> Result<usize, ConfigError> {
    if let Ok(n) = s.trim().parse::<usize>() {
        return Ok(n);
    }
    s.trim().parse::<PoemLength>().map(PoemLength::lines)
}

/// A request for one poem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemConfig {
    pub kind: PoemKind,
    /// Requested line count; ignored for haiku.
    pub length: usize,
    /// Identifier of the corpus to draw words from.
    pub source: String,
}

impl PoemConfig {
    pub fn haiku(source: &str) -> Self {
        Self {
            kind: PoemKind::Haiku,
            length: HAIKU_LINES,
            source: source.to_string(),
        }
    }

    pub fn free_form(length: usize, source: &str) -> Self {
        Self {
            kind: PoemKind::FreeForm,
            length,
            source: source.to_string(),
        }
    }

    /// The number of lines the frame will have.
    pub fn line_count(&self) -> Result<usize, ConfigError> {
        match self.kind {
            PoemKind::Haiku => Ok(HAIKU_LINES),
            PoemKind::FreeForm if self.length == 0 => Err(ConfigError::EmptyFreeForm),
            PoemKind::FreeForm => Ok(self.length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haiku_ignores_requested_length() {
        let mut config = PoemConfig::haiku("poe");
        config.length = 12;
        assert_eq!(config.line_count(), Ok(3));
    }

    #[test]
    fn free_form_zero_lines_is_rejected() {
        let config = PoemConfig::free_form(0, "poe");
        assert_eq!(config.line_count(), Err(ConfigError::EmptyFreeForm));
    }

    #[test]
    fn free_form_uses_length() {
        assert_eq!(PoemConfig::free_form(8, "bible").line_count(), Ok(8));
    }

    #[test]
    fn presets_map_to_line_counts() {
        assert_eq!(parse_line_count("short"), Ok(4));
        assert_eq!(parse_line_count("Medium"), Ok(8));
        assert_eq!(parse_line_count("long"), Ok(12));
        assert_eq!(parse_line_count("5"), Ok(5));
        assert!(parse_line_count("epic").is_err());
    }

    #[test]
    fn kind_parses_common_spellings() {
        assert_eq!("haiku".parse::<PoemKind>(), Ok(PoemKind::Haiku));
        assert_eq!("free-form".parse::<PoemKind>(), Ok(PoemKind::FreeForm));
        assert_eq!("FreeForm".parse::<PoemKind>(), Ok(PoemKind::FreeForm));
        assert!("sonnet".parse::<PoemKind>().is_err());
    }
}
