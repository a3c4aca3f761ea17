//! Tool settings loaded from a RON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schema::command::DEFAULT_SOURCE;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Paths and defaults shared by the command-line tools.
///
/// Every field has a default, so a settings file only needs the entries
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory of `<source>.txt` corpora.
    pub corpora_dir: PathBuf,
    /// Lexicon for the tagger; the embedded English lexicon when unset.
    pub lexicon: Option<PathBuf>,
    /// File holding the most recently generated poem.
    pub last_poem: PathBuf,
    /// Append-only poem archive.
    pub archive: PathBuf,
    /// Fixed seed; a random seed when unset.
    pub seed: Option<u64>,
    pub max_attempts: u32,
    pub default_source: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corpora_dir: PathBuf::from("corpora"),
            lexicon: None,
            last_poem: PathBuf::from("poems_last.txt"),
            archive: PathBuf::from("poems_all.txt"),
            seed: None,
            max_attempts: 3,
            default_source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl Settings {
    pub fn load_from_ron(path: &Path) -> Result<Settings, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Settings, SettingsError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = Settings::parse_ron("(seed: Some(7), corpora_dir: \"texts\")").unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.corpora_dir, PathBuf::from("texts"));
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.default_source, "poe");
    }

    #[test]
    fn empty_struct_is_default() {
        assert_eq!(Settings::parse_ron("()").unwrap(), Settings::default());
    }

    #[test]
    fn malformed_settings_error() {
        assert!(matches!(
            Settings::parse_ron("(seed: \"nope\")"),
            Err(SettingsError::Ron(_))
        ));
    }

    #[test]
    fn repository_settings_file_loads() {
        let settings = Settings::load_from_ron(Path::new("edgar.ron")).unwrap();
        assert_eq!(settings.corpora_dir, PathBuf::from("corpora"));
    }
}
