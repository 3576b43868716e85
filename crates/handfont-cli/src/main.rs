//! `handfont`: build a font from handwriting on the command line.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use handfont::core::{init_from_env, init_with_level};
use handfont::{FontOutput, GlyphOutline, PipelineConfig, PipelineError};
use log::LevelFilter;

#[derive(Parser)]
#[command(
    name = "handfont",
    version,
    about = "Turn handwriting images into TrueType and WOFF2 fonts"
)]
struct Cli {
    /// Pipeline settings as JSON; missing sections use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Font family name (overrides the config file)
    #[arg(long, global = true)]
    family: Option<String>,

    /// Log pipeline progress to stderr (otherwise `HANDFONT_LOG` picks the level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Build a font from a photo of a handwritten phrase
    Phrase {
        /// Photo of the written phrase
        #[arg(long)]
        image: PathBuf,
        /// The phrase exactly as it was copied
        #[arg(long)]
        phrase: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Build a font from one drawing per character
    Draw {
        /// `<letter>=<image>`, repeatable
        #[arg(long = "glyph", value_name = "CHAR=PATH", required = true)]
        glyphs: Vec<String>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Vectorize one drawn character and print its outline as JSON
    Glyph {
        #[arg(long)]
        image: PathBuf,
        /// The letter that was drawn
        #[arg(long = "char", value_name = "CHAR")]
        character: String,
    },
    /// Build a font from outline JSON (an object of character to outline)
    Build {
        #[arg(long)]
        glyphs: PathBuf,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("failed to load config")]
    Config(#[from] handfont::IoError),
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid outline JSON")]
    Json(#[from] serde_json::Error),
    #[error("expected CHAR=PATH, got {0:?}")]
    GlyphArg(String),
    #[error("character must be a single letter, got {0:?}")]
    Character(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _ = if cli.verbose {
        init_with_level(LevelFilter::Debug)
    } else {
        init_from_env(LevelFilter::Warn)
    };
    #[cfg(feature = "tracing")]
    handfont::core::init_tracing(false);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &dyn Error) {
    eprintln!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_json(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(family) = cli.family {
        config.font.family_name = family;
    }

    match cli.command {
        Cmd::Phrase {
            image,
            phrase,
            out_dir,
        } => {
            let bytes = read(&image)?;
            let font = handfont::process_phrase_with_config(&bytes, &phrase, &config)?;
            write_font(&font, &config, &out_dir)
        }
        Cmd::Draw { glyphs, out_dir } => {
            let mut images = BTreeMap::new();
            for arg in &glyphs {
                let (key, path) = arg
                    .split_once('=')
                    .ok_or_else(|| CliError::GlyphArg(arg.clone()))?;
                images.insert(key.to_string(), read(Path::new(path))?);
            }
            let font = handfont::process_multi_glyph_with_config(&images, &config)?;
            write_font(&font, &config, &out_dir)
        }
        Cmd::Glyph { image, character } => {
            let ch = single_letter(&character)?;
            let bytes = read(&image)?;
            let outline = handfont::process_single_glyph_with_config(&bytes, ch, &config)?;
            println!("{}", serde_json::to_string_pretty(&outline)?);
            Ok(())
        }
        Cmd::Build { glyphs, out_dir } => {
            let raw = fs::read_to_string(&glyphs).map_err(|source| CliError::Read {
                path: glyphs.clone(),
                source,
            })?;
            let keyed: BTreeMap<String, GlyphOutline> = serde_json::from_str(&raw)?;
            let mut outlines = BTreeMap::new();
            for (key, outline) in keyed {
                outlines.insert(single_char(&key)?, outline);
            }
            let font = handfont::build_font_with_config(&outlines, &config)?;
            write_font(&font, &config, &out_dir)
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: PathBuf, data: &[u8]) -> Result<PathBuf, CliError> {
    match fs::write(&path, data) {
        Ok(()) => Ok(path),
        Err(source) => Err(CliError::Write { path, source }),
    }
}

fn write_font(
    font: &FontOutput,
    config: &PipelineConfig,
    out_dir: &Path,
) -> Result<(), CliError> {
    fs::create_dir_all(out_dir).map_err(|source| CliError::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let stem = config.font.file_stem();
    let ttf = write(out_dir.join(format!("{stem}.ttf")), &font.ttf)?;
    let woff2 = write(out_dir.join(format!("{stem}.woff2")), &font.woff2)?;

    let found: String = font.characters_found.iter().collect();
    println!("characters: {found} ({})", font.characters_found.len());
    println!("wrote {}", ttf.display());
    println!("wrote {}", woff2.display());
    Ok(())
}

fn single_char(raw: &str) -> Result<char, CliError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(CliError::Character(raw.to_string())),
    }
}

fn single_letter(raw: &str) -> Result<char, CliError> {
    let ch = single_char(raw)?;
    if !ch.is_alphabetic() {
        return Err(CliError::Character(raw.to_string()));
    }
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => Ok(l),
        _ => Ok(ch),
    }
}
