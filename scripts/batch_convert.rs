use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use latex_speech::document::{read_source, SourceKind};
use latex_speech::{CommandDictionary, LatexTransformer, PdfTextRecognizer, Recognizer, SpeechConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert a directory of LaTeX/PDF documents to plain text")]
struct Args {
    /// Input directory containing .tex/.pdf files
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for converted .txt files
    #[arg(short, long)]
    output: PathBuf,

    /// Path to configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Convert with the built-in rules only
    #[arg(long, default_value = "false")]
    no_dictionary: bool,
}

#[derive(Debug, Serialize)]
struct DocumentSummary {
    /// Input path relative to the input directory
    filename: String,
    /// Output path relative to the output directory
    output: String,
    file_type: String,
    input_bytes: u64,
    output_characters: usize,
}

/// Maps each input file to `<output>/<relative dir>/<stem>.txt` and refuses to
/// hand out the same output twice (`notes.tex` next to `notes.pdf`)
struct OutputLayout<'a> {
    input_root: &'a Path,
    output_root: &'a Path,
    claimed: HashSet<PathBuf>,
}

impl<'a> OutputLayout<'a> {
    fn new(input_root: &'a Path, output_root: &'a Path) -> Self {
        Self {
            input_root,
            output_root,
            claimed: HashSet::new(),
        }
    }

    fn claim(&mut self, path: &Path) -> Result<PathBuf> {
        let relative = path.strip_prefix(self.input_root).with_context(|| {
            format!("{:?} is not inside {:?}", path, self.input_root)
        })?;
        let out_path = self.output_root.join(relative).with_extension("txt");

        if !self.claimed.insert(out_path.clone()) {
            anyhow::bail!(
                "Output {:?} is already taken by another input with the same name",
                out_path
            );
        }
        Ok(out_path)
    }
}

#[derive(Debug, Serialize)]
struct Manifest {
    total_documents: usize,
    failed_documents: usize,
    total_output_characters: usize,
    documents: Vec<DocumentSummary>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SpeechConfig::load(path)?,
        None => SpeechConfig::default(),
    };

    info!("Input directory: {:?}", args.input);
    info!("Output directory: {:?}", args.output);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {:?}", args.output))?;

    let transformer = if config.dictionary.enabled && !args.no_dictionary {
        let dictionary = CommandDictionary::open(config.dictionary.path.clone())
            .with_context(|| "Failed to load command dictionary")?;
        LatexTransformer::with_dictionary(&dictionary)?
    } else {
        LatexTransformer::new()?
    };

    let documents: Vec<PathBuf> = WalkDir::new(&args.input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| config.input.allows(path))
        .collect();

    info!("Found {} documents", documents.len());

    if documents.is_empty() {
        anyhow::bail!("No convertible documents found in {:?}", args.input);
    }

    // One recognizer for the whole run
    let recognizer = PdfTextRecognizer::new();

    let mut layout = OutputLayout::new(&args.input, &args.output);
    let mut summaries = Vec::new();
    let mut failed = 0;

    for (idx, path) in documents.iter().enumerate() {
        info!("Converting {}/{}: {:?}", idx + 1, documents.len(), path);

        match convert_one(path, &mut layout, &config, &transformer, &recognizer) {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                warn!("Failed to convert {:?}: {:#}", path, e);
                failed += 1;
            }
        }
    }

    let manifest = Manifest {
        total_documents: summaries.len(),
        failed_documents: failed,
        total_output_characters: summaries.iter().map(|d| d.output_characters).sum(),
        documents: summaries,
    };

    let manifest_path = args.output.join("manifest.json");
    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    fs::write(&manifest_path, manifest_json)
        .with_context(|| format!("Failed to write manifest: {:?}", manifest_path))?;

    info!("Conversion complete!");
    info!("  - Converted: {}", manifest.total_documents);
    info!("  - Failed: {}", manifest.failed_documents);
    info!("  - Characters: {}", manifest.total_output_characters);

    Ok(())
}

fn convert_one(
    path: &Path,
    layout: &mut OutputLayout<'_>,
    config: &SpeechConfig,
    transformer: &LatexTransformer,
    recognizer: &dyn Recognizer,
) -> Result<DocumentSummary> {
    let out_path = layout.claim(path)?;
    let input_bytes = fs::metadata(path)
        .with_context(|| format!("Failed to stat document: {:?}", path))?
        .len();

    let source = read_source(path, &config.input, recognizer)?;
    let text = transformer.transform(&source);

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    fs::write(&out_path, format!("{}\n", text))
        .with_context(|| format!("Failed to write document: {:?}", out_path))?;

    let file_type = match SourceKind::from_path(path) {
        SourceKind::Latex => "tex",
        SourceKind::Pdf => "pdf",
    };

    Ok(DocumentSummary {
        filename: relative_display(path, layout.input_root),
        output: relative_display(&out_path, layout.output_root),
        file_type: file_type.to_string(),
        input_bytes,
        output_characters: text.chars().count(),
    })
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
