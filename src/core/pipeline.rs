/// The poem pipeline: corpus text → profile → frame → filled poem.
///
/// `generate_poem` runs one generation against explicit capabilities and a
/// random handle. `PoetryEngine` owns corpora, grammars and the reference
/// capabilities, and retries failed generations with fresh seeds.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::cleaner::clean_source_text;
use crate::core::corpus::{CorpusProfile, TagCountMismatch};
use crate::core::filler::{FillError, FrameFiller};
use crate::core::frame::{Frame, Poem};
use crate::core::grammar::{Grammar, GrammarError};
use crate::core::nlp::{
    AssociationScorer, CapabilityError, LexiconTagger, LogLikelihood, NlpError, PosTagger,
    Stopwords, Tokenizer, WordTokenizer,
};
use crate::schema::poem::{ConfigError, PoemConfig, PoemKind};
use crate::schema::pos::{PosTag, TagInventory};

/// Default number of attempts per composed poem.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Seed offset between attempts of one composition.
const ATTEMPT_SEED_STRIDE: u64 = 7919;

#[derive(Debug, Error)]
pub enum PoemError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("no corpus words tagged {tag} to fill line {line}, slot {slot}")]
    EmptyBucket { tag: PosTag, line: usize, slot: usize },
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    TagCountMismatch(#[from] TagCountMismatch),
    #[error("unknown source corpus: {0}")]
    UnknownSource(String),
    #[error("lexicon error: {0}")]
    Lexicon(#[from] NlpError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("generation failed after {attempts} attempts: {last}")]
    GenerationFailed {
        attempts: u32,
        #[source]
        last: Box<PoemError>,
    },
}

impl PoemError {
    /// Whether a fresh seed might succeed where this attempt failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PoemError::EmptyBucket { .. } | PoemError::Grammar(_))
    }
}

impl From<FillError> for PoemError {
    fn from(err: FillError) -> Self {
        match err {
            FillError::EmptyBucket { tag, line, slot } => PoemError::EmptyBucket { tag, line, slot },
            FillError::Capability(e) => PoemError::Capability(e),
        }
    }
}

/// Everything one generation reads, passed explicitly.
pub struct GenerationContext<'a> {
    pub rng: &'a mut StdRng,
    pub inventory: &'a TagInventory,
    pub tokenizer: &'a dyn Tokenizer,
    pub tagger: &'a dyn PosTagger,
    pub scorer: &'a dyn AssociationScorer,
    pub stopwords: &'a Stopwords,
}

impl GenerationContext<'_> {
    /// Tokenize, tag, and profile a corpus.
    pub fn analyze(&self, corpus_text: &str) -> Result<CorpusProfile, PoemError> {
        let tokens = self.tokenizer.tokenize(corpus_text)?;
        let tags = self.tagger.tag(&tokens)?;
        let profile =
            CorpusProfile::analyze(&tokens, &tags, self.inventory, self.stopwords, self.scorer)?;
        debug!(
            tokens = tokens.len(),
            collocations = profile.collocations().len(),
            "analyzed corpus"
        );
        Ok(profile)
    }
}

/// Generate one poem. Either a complete poem comes back or an error; no pass
/// retries on its own.
pub fn generate_poem(
    corpus_text: &str,
    config: &PoemConfig,
    grammar: &Grammar,
    ctx: &mut GenerationContext<'_>,
) -> Result<Poem, PoemError> {
    let line_count = config.line_count()?;
    let profile = ctx.analyze(corpus_text)?;
    let mut frame = Frame::build(grammar, ctx.inventory, line_count, config.kind, ctx.rng)?;
    FrameFiller::new(&profile, ctx.tagger).fill(&mut frame, ctx.rng)?;
    Ok(frame.render())
}

/// The top-level poetry engine. Built via `PoetryEngine::builder()`.
pub struct PoetryEngine {
    corpora: BTreeMap<String, String>,
    free_form: Grammar,
    haiku: Grammar,
    inventory: TagInventory,
    tokenizer: Box<dyn Tokenizer>,
    tagger: Box<dyn PosTagger>,
    scorer: Box<dyn AssociationScorer>,
    stopwords: Stopwords,
    seed: u64,
    max_attempts: u32,
    generation_count: u64,
}

/// Builder for constructing a `PoetryEngine`.
pub struct PoetryEngineBuilder {
    corpora_dir: Option<PathBuf>,
    lexicon: Option<PathBuf>,
    seed: u64,
    max_attempts: u32,
    /// Directly provided corpora, already cleaned.
    corpora: BTreeMap<String, String>,
    free_form: Option<Grammar>,
    haiku: Option<Grammar>,
    inventory: Option<TagInventory>,
    tokenizer: Option<Box<dyn Tokenizer>>,
    tagger: Option<Box<dyn PosTagger>>,
    scorer: Option<Box<dyn AssociationScorer>>,
    stopwords: Option<Stopwords>,
}

impl PoetryEngine {
    pub fn builder() -> PoetryEngineBuilder {
        PoetryEngineBuilder {
            corpora_dir: None,
            lexicon: None,
            seed: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            corpora: BTreeMap::new(),
            free_form: None,
            haiku: None,
            inventory: None,
            tokenizer: None,
            tagger: None,
            scorer: None,
            stopwords: None,
        }
    }

    /// Compose a poem, retrying grammar and empty-bucket failures with a
    /// fresh seed up to the attempt budget.
    pub fn compose(&mut self, config: &PoemConfig) -> Result<Poem, PoemError> {
        let corpus = self
            .corpora
            .get(&config.source)
            .ok_or_else(|| PoemError::UnknownSource(config.source.clone()))?;
        let grammar = match config.kind {
            PoemKind::Haiku => &self.haiku,
            PoemKind::FreeForm => &self.free_form,
        };
        let attempts = self.max_attempts.max(1);

        let mut attempt = 0u32;
        loop {
            let mut rng = StdRng::seed_from_u64(
                self.seed
                    .wrapping_add(self.generation_count)
                    .wrapping_add(attempt as u64 * ATTEMPT_SEED_STRIDE),
            );
            let mut ctx = GenerationContext {
                rng: &mut rng,
                inventory: &self.inventory,
                tokenizer: &*self.tokenizer,
                tagger: &*self.tagger,
                scorer: &*self.scorer,
                stopwords: &self.stopwords,
            };

            match generate_poem(corpus, config, grammar, &mut ctx) {
                Ok(poem) => {
                    self.generation_count += 1;
                    info!(
                        source = %config.source,
                        kind = %config.kind,
                        lines = poem.lines.len(),
                        attempt,
                        "composed poem"
                    );
                    return Ok(poem);
                }
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    warn!(attempt, error = %e, "generation attempt failed, retrying");
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    self.generation_count += 1;
                    return Err(PoemError::GenerationFailed {
                        attempts,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Compose several poems from one request.
    pub fn compose_variants(
        &mut self,
        config: &PoemConfig,
        count: usize,
    ) -> Result<Vec<Poem>, PoemError> {
        (0..count).map(|_| self.compose(config)).collect()
    }

    /// Registered corpus ids, sorted.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.corpora.keys().map(String::as_str)
    }

    pub fn corpus(&self, source: &str) -> Option<&str> {
        self.corpora.get(source).map(String::as_str)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the seed sequence.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.generation_count = 0;
    }
}

impl PoetryEngineBuilder {
    /// Load every `.txt` file in `path` as a corpus named by its file stem.
    pub fn corpora_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpora_dir = Some(path.into());
        self
    }

    /// Lexicon for the reference tagger, replacing the embedded English one.
    pub fn lexicon(mut self, path: impl Into<PathBuf>) -> Self {
        self.lexicon = Some(path.into());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Register a corpus directly. The text is used as given.
    pub fn with_corpus(mut self, source: &str, text: &str) -> Self {
        self.corpora.insert(source.to_string(), text.to_string());
        self
    }

    /// Replace the built-in grammar for one poem kind.
    pub fn with_grammar(mut self, kind: PoemKind, grammar: Grammar) -> Self {
        match kind {
            PoemKind::Haiku => self.haiku = Some(grammar),
            PoemKind::FreeForm => self.free_form = Some(grammar),
        }
        self
    }

    pub fn with_inventory(mut self, inventory: TagInventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Some(Box::new(tokenizer));
        self
    }

    pub fn with_tagger(mut self, tagger: impl PosTagger + 'static) -> Self {
        self.tagger = Some(Box::new(tagger));
        self
    }

    pub fn with_scorer(mut self, scorer: impl AssociationScorer + 'static) -> Self {
        self.scorer = Some(Box::new(scorer));
        self
    }

    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = Some(stopwords);
        self
    }

    pub fn build(self) -> Result<PoetryEngine, PoemError> {
        let mut corpora = BTreeMap::new();

        if let Some(ref dir) = self.corpora_dir {
            if dir.exists() {
                load_text_files_from_dir(dir, |path, text| {
                    let name = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unknown")
                        .to_string();
                    debug!(source = %name, bytes = text.len(), "loaded corpus");
                    corpora.insert(name, clean_source_text(text));
                })?;
            } else {
                warn!(dir = %dir.display(), "corpora directory not found");
            }
        }

        // Directly registered corpora win over files of the same name.
        corpora.extend(self.corpora);

        let tagger: Box<dyn PosTagger> = match (self.tagger, self.lexicon) {
            (Some(tagger), _) => tagger,
            (None, Some(path)) => Box::new(LexiconTagger::load_from_ron(&path)?),
            (None, None) => Box::new(LexiconTagger::english()?),
        };

        let free_form = match self.free_form {
            Some(g) => g,
            None => Grammar::free_form()?,
        };
        let haiku = match self.haiku {
            Some(g) => g,
            None => Grammar::haiku()?,
        };

        Ok(PoetryEngine {
            corpora,
            free_form,
            haiku,
            inventory: self.inventory.unwrap_or_default(),
            tokenizer: self.tokenizer.unwrap_or_else(|| Box::new(WordTokenizer)),
            tagger,
            scorer: self.scorer.unwrap_or_else(|| Box::new(LogLikelihood)),
            stopwords: self.stopwords.unwrap_or_else(Stopwords::english),
            seed: self.seed,
            max_attempts: self.max_attempts,
            generation_count: 0,
        })
    }
}

/// Read all .txt files from a directory, calling `loader` for each.
fn load_text_files_from_dir<F>(dir: &Path, mut loader: F) -> Result<(), PoemError>
where
    F: FnMut(&Path, &str),
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("txt") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in paths {
        let text = std::fs::read_to_string(&path)?;
        loader(&path, &text);
    }
    Ok(())
}
