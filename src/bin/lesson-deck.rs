use std::path::{Path, PathBuf};
use std::process::ExitCode;

use base64::Engine;
use clap::{Parser, Subcommand};
use lesson_deck::composer::{GenerateRequest, GeneratedDeck, Level, PresentationGenerator};
use lesson_deck::config::GeneratorConfig;
use lesson_deck::templates::list_templates;
use lesson_deck::{Error, Result};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lesson-deck", version, about = "Compose lesson presentations (.pptx)")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a deck from a JSON request.
    Generate(GenerateArgs),
    /// List the available style templates.
    Templates(TemplatesArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Request JSON file (`-` reads standard input).
    #[arg(long)]
    request: PathBuf,

    /// Copy the generated deck here instead of leaving it in the output directory.
    #[arg(long, conflicts_with = "base64")]
    out: Option<PathBuf>,

    /// Print the deck base64-encoded in a JSON body and delete the artifact.
    #[arg(long)]
    base64: bool,

    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct BufferResponse {
    buffer: String,
    filename: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Templates(args) => cmd_templates(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_not_found() => {
            error!("{}", e);
            ExitCode::from(2)
        },
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        },
    }
}

fn read_request(path: &Path) -> Result<GenerateRequest> {
    if path == Path::new("-") {
        return GenerateRequest::from_reader(std::io::stdin().lock());
    }
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    GenerateRequest::from_reader(std::io::BufReader::new(std::fs::File::open(path)?))
}

fn log_summary(deck: &GeneratedDeck) {
    let warnings = deck.warnings().count();
    let infos = deck.diagnostics.iter().filter(|d| d.level == Level::Info).count();
    if warnings > 0 {
        warn!(warnings, infos, "deck generated with warnings");
    } else {
        info!(infos, "deck generated");
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let config = GeneratorConfig::load(args.config.as_deref())?;
    let request = read_request(&args.request)?;
    let deck = PresentationGenerator::new(config).generate(&request)?;
    log_summary(&deck);

    if args.base64 {
        let bytes = std::fs::read(&deck.path)?;
        std::fs::remove_file(&deck.path)?;
        let response = BufferResponse {
            buffer: base64::engine::general_purpose::STANDARD.encode(bytes),
            filename: request.filename(),
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    let path = match args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| Error::OutputUnwritable {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::copy(&deck.path, &out).map_err(|source| Error::OutputUnwritable {
                path: out.clone(),
                source,
            })?;
            std::fs::remove_file(&deck.path)?;
            out
        },
        None => deck.path,
    };
    println!("{}", path.display());
    Ok(())
}

fn cmd_templates(args: TemplatesArgs) -> Result<()> {
    let config = GeneratorConfig::load(args.config.as_deref())?;
    let templates = list_templates(&config.templates_dir)?;
    println!("{}", serde_json::to_string_pretty(&templates)?);
    Ok(())
}
