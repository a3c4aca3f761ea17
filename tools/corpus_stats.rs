/// Corpus Stats: shows what the filler will see in a source corpus.
///
/// Usage: corpus_stats --input <file.txt> [--lexicon <lexicon.ron>] [--top <n>] [--word <w>...]
use clap::Parser;
use poetry_engine::core::cleaner::clean_source_text;
use poetry_engine::core::nlp::{LexiconTagger, LogLikelihood, Stopwords, WordTokenizer};
use poetry_engine::core::pipeline::GenerationContext;
use poetry_engine::schema::pos::TagInventory;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "corpus_stats", about = "Summarise a source corpus")]
struct Args {
    /// Raw corpus text file.
    #[arg(long)]
    input: PathBuf,
    /// Tagger lexicon; the embedded English lexicon by default.
    #[arg(long)]
    lexicon: Option<PathBuf>,
    /// How many collocations to list.
    #[arg(long, default_value_t = 10)]
    top: usize,
    /// Words to look up: frequency and neighbours.
    #[arg(long = "word")]
    words: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.input).unwrap_or_else(|e| {
        eprintln!("Error reading input file '{}': {}", args.input.display(), e);
        process::exit(1);
    });

    let tagger = match &args.lexicon {
        Some(path) => LexiconTagger::load_from_ron(path),
        None => LexiconTagger::english(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Error loading lexicon: {}", e);
        process::exit(1);
    });

    let mut rng = StdRng::seed_from_u64(0);
    let ctx = GenerationContext {
        rng: &mut rng,
        inventory: &TagInventory::penn(),
        tokenizer: &WordTokenizer,
        tagger: &tagger,
        scorer: &LogLikelihood,
        stopwords: &Stopwords::english(),
    };

    let profile = ctx
        .analyze(&clean_source_text(&raw))
        .unwrap_or_else(|e| {
            eprintln!("Error analyzing corpus: {}", e);
            process::exit(1);
        });

    println!("Corpus '{}': {} tokens", args.input.display(), profile.words().len());

    println!("\n=== Buckets ===\n");
    for (tag, words) in profile.buckets() {
        if !words.is_empty() {
            println!("{:>5}  {}", tag.label(), words.len());
        }
    }

    println!("\n=== Collocations ===\n");
    for colloc in profile.collocations().iter().take(args.top) {
        println!("{:>8.2}  {} {}", colloc.score, colloc.first, colloc.second);
    }

    let distinctive = profile.distinctive_words();
    println!("\n=== Distinctive words ({}) ===\n", distinctive.len());
    for word in &distinctive {
        println!("{:>5}  {}", profile.frequency(word), word);
    }

    if !args.words.is_empty() {
        println!("\n=== Lookups ===\n");
    }
    for word in &args.words {
        if !profile.contains_word(word) {
            println!("{}: not in corpus", word);
            continue;
        }
        println!(
            "{}: {} occurrences, {} before, {} after",
            word,
            profile.frequency(word),
            profile.before(word).len(),
            profile.after(word).len()
        );
    }
}
