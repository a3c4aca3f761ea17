/// Edgar: compose, store, and recall poems from the command line.
///
/// Usage:
///   edgar generate [--kind haiku|free-form] [--length short|medium|long|<n>] [--source <id>]
///   edgar save
///   edgar retrieve
///   edgar read
///   edgar say "<spoken command>"
use clap::{Parser, Subcommand};
use poetry_engine::core::archive::{self, PoemArchive};
use poetry_engine::core::pipeline::PoetryEngine;
use poetry_engine::schema::command::Command;
use poetry_engine::schema::poem::{parse_line_count, PoemConfig, PoemKind};
use poetry_engine::schema::settings::Settings;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edgar", about = "A poetry robot for the terminal")]
struct Cli {
    /// Settings file; skipped when missing.
    #[arg(long, default_value = "edgar.ron")]
    config: PathBuf,
    /// Override the corpora directory.
    #[arg(long)]
    corpora_dir: Option<PathBuf>,
    /// Fixed random seed.
    #[arg(long)]
    seed: Option<u64>,
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compose a poem and keep it as the last poem.
    Generate {
        #[arg(long, default_value = "free-form")]
        kind: PoemKind,
        /// short, medium, long, or a line count.
        #[arg(long, default_value = "medium")]
        length: String,
        /// Corpus id; the settings default when omitted.
        #[arg(long)]
        source: Option<String>,
    },
    /// Append the last poem to the archive.
    Save,
    /// Print a random archived poem.
    Retrieve,
    /// Print the last poem on one line, as it would be spoken.
    Read,
    /// Run a transcribed spoken command such as "edgar generate a haiku".
    Say { utterance: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = if cli.config.exists() {
        Settings::load_from_ron(&cli.config).unwrap_or_else(|e| {
            eprintln!("Error loading settings '{}': {}", cli.config.display(), e);
            process::exit(1);
        })
    } else {
        debug!(path = %cli.config.display(), "no settings file, using defaults");
        Settings::default()
    };
    if let Some(dir) = cli.corpora_dir {
        settings.corpora_dir = dir;
    }
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }

    let result = match cli.action {
        Action::Generate {
            kind,
            length,
            source,
        } => {
            let source = source.unwrap_or_else(|| settings.default_source.clone());
            match kind {
                PoemKind::Haiku => Ok(PoemConfig::haiku(&source)),
                PoemKind::FreeForm => parse_line_count(&length)
                    .map(|n| PoemConfig::free_form(n, &source))
                    .map_err(|e| e.to_string()),
            }
            .and_then(|config| generate(&settings, &config))
        }
        Action::Save => save(&settings),
        Action::Retrieve => retrieve(&settings),
        Action::Read => read(&settings.last_poem),
        Action::Say { utterance } => dispatch(&settings, Command::parse(&utterance)),
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn dispatch(settings: &Settings, command: Command) -> Result<(), String> {
    info!(?command, "heard command");
    match command {
        Command::Generate(config) => generate(settings, &config),
        Command::Save => save(settings),
        Command::Retrieve => retrieve(settings),
        Command::Read => read(&settings.last_poem),
        Command::Listen => {
            Err("recording is not available here; place the text in the corpora directory as recording.txt".to_string())
        }
        Command::Unknown(text) => Err(format!("no command recognised in '{}'", text)),
    }
}

fn generate(settings: &Settings, config: &PoemConfig) -> Result<(), String> {
    let mut builder = PoetryEngine::builder()
        .corpora_dir(&settings.corpora_dir)
        .seed(settings.seed.unwrap_or_else(rand::random))
        .max_attempts(settings.max_attempts);
    if let Some(ref lexicon) = settings.lexicon {
        builder = builder.lexicon(lexicon);
    }
    let mut engine = builder.build().map_err(|e| e.to_string())?;

    let poem = engine.compose(config).map_err(|e| e.to_string())?;
    archive::save_last(&settings.last_poem, &poem).map_err(|e| e.to_string())?;
    print!("{}", poem);
    Ok(())
}

fn save(settings: &Settings) -> Result<(), String> {
    let poem = archive::load_last(&settings.last_poem).map_err(|e| e.to_string())?;
    PoemArchive::new(&settings.archive)
        .append(&poem.to_string())
        .map_err(|e| e.to_string())?;
    println!("Poem stored!");
    Ok(())
}

fn retrieve(settings: &Settings) -> Result<(), String> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let poem = PoemArchive::new(&settings.archive)
        .random(&mut rng)
        .map_err(|e| e.to_string())?;
    println!("{}", poem);
    Ok(())
}

fn read(last_poem: &Path) -> Result<(), String> {
    let poem = archive::load_last(last_poem).map_err(|e| e.to_string())?;
    println!("{}", poem.spoken());
    Ok(())
}
