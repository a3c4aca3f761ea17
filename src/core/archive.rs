//! Poem storage: the last composed poem and an append-only archive of saved
//! poems separated by `**#**` markers.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::frame::Poem;

/// Marks the start of each archived poem.
pub const RECORD_DELIMITER: &str = "**#**";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive {} holds no poems", .0.display())]
    Empty(PathBuf),
}

/// An append-only poem archive file.
#[derive(Debug, Clone)]
pub struct PoemArchive {
    path: PathBuf,
}

impl PoemArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one poem, creating the file if needed.
    pub fn append(&self, poem: &str) -> Result<(), ArchiveError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", RECORD_DELIMITER)?;
        file.write_all(poem.as_bytes())?;
        if !poem.ends_with('\n') {
            writeln!(file)?;
        }
        Ok(())
    }

    /// Every stored poem, oldest first. A missing file is an empty archive.
    pub fn records(&self) -> Result<Vec<String>, ArchiveError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(contents
            .split(RECORD_DELIMITER)
            .map(str::trim)
            .filter(|record| !record.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// A uniformly random stored poem.
    pub fn random(&self, rng: &mut StdRng) -> Result<String, ArchiveError> {
        self.records()?
            .choose(rng)
            .cloned()
            .ok_or_else(|| ArchiveError::Empty(self.path.clone()))
    }
}

/// Overwrite the last-poem file.
pub fn save_last(path: &Path, poem: &Poem) -> Result<(), ArchiveError> {
    std::fs::write(path, poem.to_string())?;
    Ok(())
}

/// Read the last-poem file back, dropping blank lines.
pub fn load_last(path: &Path) -> Result<Poem, ArchiveError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(Poem {
        lines: contents
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn poem(lines: &[&str]) -> Poem {
        Poem {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn missing_archive_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let archive = PoemArchive::new(dir.path().join("poems_all.txt"));
        assert!(archive.records().unwrap().is_empty());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(archive.random(&mut rng), Err(ArchiveError::Empty(_))));
    }

    #[test]
    fn append_then_read_records() {
        let dir = tempfile::tempdir().unwrap();
        let archive = PoemArchive::new(dir.path().join("poems_all.txt"));
        archive.append(&poem(&["the raven sat", "nevermore"]).to_string()).unwrap();
        archive.append("a lone line").unwrap();

        let records = archive.records().unwrap();
        assert_eq!(records, vec!["the raven sat\nnevermore", "a lone line"]);

        let raw = std::fs::read_to_string(archive.path()).unwrap();
        assert!(raw.starts_with("**#**\nthe raven sat\n"));
    }

    #[test]
    fn random_picks_a_stored_poem() {
        let dir = tempfile::tempdir().unwrap();
        let archive = PoemArchive::new(dir.path().join("poems_all.txt"));
        for text in ["one", "two", "three"] {
            archive.append(text).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let picked = archive.random(&mut rng).unwrap();
            assert!(["one", "two", "three"].contains(&picked.as_str()));
        }
    }

    #[test]
    fn last_poem_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poems_last.txt");
        let original = poem(&["deep into that darkness", "peering"]);
        save_last(&path, &original).unwrap();
        assert_eq!(load_last(&path).unwrap(), original);
    }
}
