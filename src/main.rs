//! Braai CLI
//!
//! Usage:
//!   braai [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>         Parse configuration (TOML format)
//!   -b, --block-tag <NAME>      Treat NAME as a block tag (repeatable)
//!   -n, --name <NAME>           Source name shown in diagnostics
//!   -t, --tags                  List every tag instead of a summary
//!   -h, --help                  Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use braai::{BlockTag, CompositeVisitor, EngineConfig, Tag, TagCollector, Visitor};

#[derive(Parser)]
#[command(name = "braai")]
#[command(about = "Check Braai documents and list their tags")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Parse configuration (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat NAME as a block tag
    #[arg(short, long = "block-tag", value_name = "NAME")]
    block_tags: Vec<String>,

    /// Source name shown in diagnostics
    #[arg(short, long)]
    name: Option<String>,

    /// List every tag in traversal order instead of a summary
    #[arg(short, long)]
    tags: bool,
}

/// Prints one line per tag and per closed block
struct TagLister;

impl Visitor for TagLister {
    fn visit_tag(&mut self, tag: &Tag) {
        let mut line = tag.name.clone();
        for command in &tag.dot_commands {
            line.push('.');
            line.push_str(&command.name);
        }
        for argument in &tag.arguments {
            line.push_str(&format!(" {:?}", argument));
        }
        for (key, value) in &tag.attributes {
            line.push_str(&format!(" {}={}", key, value));
        }
        println!("{}", line);
    }

    fn visit_block_tag(&mut self, block: &BlockTag) {
        println!("/{}", block.name);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };
    config = config.with_block_tags(cli.block_tags);
    if let Some(name) = cli.name {
        config = config.with_source_name(name);
    }
    debug!(?config, "configuration loaded");

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let doc = match config.parse(&source) {
        Ok(doc) => doc,
        Err(e) => {
            eprint!("{}", e.format(&source));
            std::process::exit(1);
        }
    };

    let mut collector = TagCollector::new();
    if cli.tags {
        let mut lister = TagLister;
        let mut visitors = CompositeVisitor::new(vec![&mut collector as &mut dyn Visitor]);
        visitors.push(&mut lister);
        doc.visit(&mut visitors);
        drop(visitors);
        debug!(
            tags = collector.tags.len(),
            blocks = collector.blocks.len(),
            "listed tags"
        );
    } else {
        doc.visit(&mut collector);
        println!(
            "{}: {} tag(s), {} block tag(s)",
            config.source_name,
            collector.tags.len(),
            collector.blocks.len()
        );
    }
}
