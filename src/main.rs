//! Sequence Illustrator CLI
//!
//! Usage:
//!   sequence-illustrator [OPTIONS] [FILE]
//!
//! Options:
//!   -t, --theme <FILE>  Theme file merged over the default theme (TOML format)
//!   -d, --debug         Draw agent guides and log layout decisions
//!   -w, --char-width <FACTOR>  Glyph width as a fraction of the font size
//!   -h, --help          Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use sequence_illustrator::{render_with_config, MonospaceMeasurer, RenderConfig, Theme};

#[derive(Parser)]
#[command(name = "sequence-illustrator")]
#[command(about = "Lay out sequence diagrams and render them to SVG")]
struct Cli {
    /// Input document (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Theme file merged over the default theme (TOML format)
    #[arg(short, long)]
    theme: Option<PathBuf>,

    /// Debug mode: draw agent guides and log layout decisions
    #[arg(short, long)]
    debug: bool,

    /// Glyph width as a fraction of the font size, used to size labels
    #[arg(short = 'w', long, value_name = "FACTOR")]
    char_width: Option<f64>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .init();

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let theme = match &cli.theme {
        Some(path) => match Theme::from_file(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error loading theme '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Theme::default(),
    };

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

    let mut config = RenderConfig::new().with_theme(theme).with_debug(cli.debug);
    if let Some(factor) = cli.char_width {
        config = config.with_measurer(MonospaceMeasurer::new().with_char_width_factor(factor));
    }
    match render_with_config(&source, &config) {
        Ok(svg) => {
            println!("{}", svg);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"Sequence Illustrator - sequence diagrams from TOML

USAGE:
    sequence-illustrator [OPTIONS] [FILE]
    cat diagram.toml | sequence-illustrator

OPTIONS:
    -t, --theme    Theme overrides (TOML file)
    -d, --debug    Draw agent guides and log layout decisions
    -w, --char-width    Glyph width as a fraction of the font size
    -h, --help     Print help

QUICK START:
    [[stages]]
    type = "agent-begin"
    agents = ["A", "B"]

    [[stages]]
    type = "connect"
    agents = ["A", "B"]
    label = "hello"

Stage types: agent-begin, agent-end, agent-highlight, connect, note-over,
note-side, note-between, block-begin, block-split, block-end,
mark, async, label-pattern, parallel."#
    );
}
