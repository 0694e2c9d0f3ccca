//! image-grid CLI
//!
//! Usage:
//!   image-grid [OPTIONS] <FILES>...
//!
//! Options:
//!   -f, --format <FORMAT>  Output format: html or latex
//!   -s, --srcdir <DIR>     Source directory document names are relative to
//!   -c, --config <FILE>    Project configuration file (TOML format)
//!   --embed-images         Inline images as data URIs (HTML only)
//!   -j, --jobs <N>         Read documents with N worker threads
//!   -l, --list-maps        List registered grid maps instead of rendering
//!   -d, --debug            Print build diagnostics to stderr
//!   -h, --help             Print help

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use image_grid::{debug_registry, Build, OutputFormat, ProjectConfig, RenderConfig, SourceTree};

#[derive(Parser)]
#[command(name = "image-grid")]
#[command(about = "Render grid maps, image grids and math blocks from reStructuredText sources")]
struct Cli {
    /// Source documents
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Source directory; document names and image paths are relative to it
    #[arg(short, long, default_value = ".")]
    srcdir: PathBuf,

    /// Project configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inline images as base64 data URIs (HTML only)
    #[arg(long)]
    embed_images: bool,

    /// Read documents with this many worker threads
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// List the registered grid maps instead of rendering
    #[arg(short, long)]
    list_maps: bool,

    /// Debug mode: print build diagnostics to stderr
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Latex,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => OutputFormat::Html,
            Format::Latex => OutputFormat::Latex,
        }
    }
}

/// Document name of `path`: relative to `srcdir`, `/`-separated, no extension
fn docname_for(path: &Path, srcdir: &Path) -> String {
    let relative = path.strip_prefix(srcdir).unwrap_or(path);
    relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let mut config = RenderConfig::new()
        .with_format(cli.format.into())
        .with_debug(cli.debug);
    if let Some(path) = &cli.config {
        match ProjectConfig::from_file(path) {
            Ok(project) => config = project.apply(config, &cli.srcdir),
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::from(1);
            }
        }
    }
    if cli.embed_images {
        config.html = config.html.with_embedded_images(&cli.srcdir);
    }

    // Read sources
    let mut documents = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        match fs::read_to_string(path) {
            Ok(content) => documents.push((docname_for(path, &cli.srcdir), content)),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::from(1);
            }
        }
    }
    let docnames: Vec<String> = documents.iter().map(|(name, _)| name.clone()).collect();

    let mut build = Build::new(SourceTree::new(&cli.srcdir));
    let read = if cli.jobs > 1 {
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(cli.jobs).build() {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("Error starting worker threads: {}", e);
                return ExitCode::from(1);
            }
        };
        pool.install(|| build.read_parallel(documents))
    } else {
        documents
            .into_iter()
            .try_for_each(|(docname, source)| build.read(&docname, source))
    };
    if let Err(e) = read {
        eprintln!("Error: {}", e);
        return ExitCode::from(2);
    }

    if cli.debug {
        debug_registry(build.registry());
    }

    if cli.list_maps {
        for map in build.registry().iter() {
            let entries: String = map.entries.keys().collect();
            println!("{}\t{}\t{}", map.name, map.source_document, entries);
        }
        return ExitCode::SUCCESS;
    }

    // Write documents in the order given
    let writer = config.writer();
    let mut failed = false;
    for (docname, path) in docnames.iter().zip(&cli.files) {
        let output = match build.write(docname) {
            Ok(output) => output,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
        };

        if cli.debug {
            eprintln!(
                "{}: {} blocks, {} errors",
                docname,
                output.blocks.len(),
                output.errors.len()
            );
            if !output.skipped.is_empty() {
                eprintln!("{}: skipped {}", docname, output.skipped.join(", "));
            }
        }

        let source = build.source(docname).unwrap_or_default();
        let filename = path.display().to_string();
        for err in &output.errors {
            eprint!("{}", err.format(source, &filename));
            failed = true;
        }

        match writer.write_blocks(&output.blocks) {
            Ok(text) if text.is_empty() => {}
            Ok(text) => {
                if cli.files.len() > 1 {
                    match config.format {
                        OutputFormat::Html => println!("<!-- {} -->", docname),
                        OutputFormat::Latex => println!("% {}", docname),
                    }
                }
                println!("{}", text);
            }
            Err(e) => {
                eprintln!("Error writing '{}': {}", docname, e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
