use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use latex_speech::document::read_source;
use latex_speech::{CommandDictionary, LatexTransformer, PdfTextRecognizer, SpeechConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert LaTeX into speakable plain text")]
struct Cli {
    /// Path to configuration JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Command dictionary location (overrides the config file)
    #[arg(long, global = true)]
    dictionary: Option<PathBuf>,

    /// Convert with the built-in rules only
    #[arg(long, global = true)]
    no_dictionary: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a .tex/.pdf file (or stdin) to plain text
    Convert(ConvertArgs),
    /// List the rewrite stages in execution order
    Stages,
    /// Manage the command dictionary
    #[command(subcommand)]
    Dict(DictCommand),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input file; reads LaTeX from stdin when omitted
    input: Option<PathBuf>,

    /// Write the plain text here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum DictCommand {
    /// Print the phrase for a command
    Lookup { command: String },
    /// Add or replace a command
    Add { command: String, phrase: String },
    /// Remove a command
    Remove { command: String },
    /// Find commands or phrases containing a string (case-insensitive)
    Search { query: String },
    /// Print every entry
    List,
    /// Write `command -> phrase` lines to a file
    Export { path: PathBuf },
    /// Read `command -> phrase` lines from a file
    Import { path: PathBuf },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            SpeechConfig::load(path)?
        }
        None => SpeechConfig::default(),
    };
    if let Some(path) = &cli.dictionary {
        config.dictionary.path = path.clone();
    }
    if cli.no_dictionary {
        config.dictionary.enabled = false;
    }

    match cli.command {
        Commands::Convert(args) => convert_command(&config, args),
        Commands::Stages => stages_command(&config),
        Commands::Dict(command) => dict_command(&config, command),
    }
}

fn build_transformer(config: &SpeechConfig) -> Result<LatexTransformer> {
    if !config.dictionary.enabled {
        return Ok(LatexTransformer::new()?);
    }

    let dictionary = CommandDictionary::open(config.dictionary.path.clone())
        .with_context(|| "Failed to load command dictionary")?;
    Ok(LatexTransformer::with_dictionary(&dictionary)?)
}

fn convert_command(config: &SpeechConfig, args: ConvertArgs) -> Result<()> {
    let transformer = build_transformer(config)?;

    let source = match &args.input {
        Some(path) => {
            let recognizer = PdfTextRecognizer::new();
            read_source(path, &config.input, &recognizer)?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .with_context(|| "Failed to read LaTeX from stdin")?;
            config.input.check_size(buf.len())?;
            buf
        }
    };

    if source.trim().is_empty() {
        warn!("Input is empty; nothing to convert");
    }

    let text = transformer.transform(&source);

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", text))
                .with_context(|| format!("Failed to write output: {:?}", path))?;
            info!("Plain text written to: {:?}", path);
        }
        None => println!("{}", text),
    }

    Ok(())
}

fn stages_command(config: &SpeechConfig) -> Result<()> {
    let transformer = build_transformer(config)?;
    for (idx, name) in transformer.stage_names().iter().enumerate() {
        println!("{:>2}. {}", idx + 1, name);
    }
    Ok(())
}

fn dict_command(config: &SpeechConfig, command: DictCommand) -> Result<()> {
    let mut dictionary = CommandDictionary::open(config.dictionary.path.clone())
        .with_context(|| "Failed to load command dictionary")?;

    match command {
        DictCommand::Lookup { command } => match dictionary.lookup(&command) {
            Some(phrase) => println!("{}", phrase),
            None => println!("{} is not in the dictionary", command),
        },
        DictCommand::Add { command, phrase } => {
            dictionary.add(command.clone(), phrase.clone())?;
            println!("{} -> {}", command, phrase);
        }
        DictCommand::Remove { command } => {
            if dictionary.remove(&command)? {
                println!("Removed {}", command);
            } else {
                println!("{} is not in the dictionary", command);
            }
        }
        DictCommand::Search { query } => {
            for (command, phrase) in dictionary.search(&query) {
                println!("{} -> {}", command, phrase);
            }
        }
        DictCommand::List => {
            for (command, phrase) in dictionary.entries() {
                println!("{} -> {}", command, phrase);
            }
        }
        DictCommand::Export { path } => dictionary.export_flat(&path)?,
        DictCommand::Import { path } => {
            let report = dictionary.import_flat(&path)?;
            println!(
                "Imported {} commands ({} lines skipped)",
                report.imported, report.skipped
            );
        }
    }

    Ok(())
}
