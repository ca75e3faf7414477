use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dova::{emit, load_source, render_catalog, AsmReport};
use mips_rs::output::{render_listing, render_program};
use mips_rs::{disassemble, Assembler, Catalog, MipsDecoder, OutputMode};

#[derive(Parser, Debug)]
#[command(author, version, about = "MIPS subset assembler and disassembler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a source file into 32-bit machine words
    Asm {
        /// Assembly source path
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Write output to file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Emit words as 0x-prefixed hexadecimal
        #[arg(short = 'x', long)]
        hex: bool,
        /// Emit words as 32-character bitstrings (default if --hex is not given)
        #[arg(short, long)]
        binary: bool,
        /// Prefix each word with its address
        #[arg(short, long)]
        pc: bool,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Disassemble a file of 32-character binary words
    Disasm {
        /// Bitstring input path
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Write output to file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Prefix each instruction with its address
        #[arg(short, long)]
        pc: bool,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the supported instructions
    Catalog {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn output_mode(hex: bool, binary: bool, pc: bool) -> OutputMode {
    let mut mode = OutputMode::empty();
    mode.set(OutputMode::HEX, hex);
    mode.set(OutputMode::BINARY, binary);
    mode.set(OutputMode::PC, pc);
    mode.effective()
}

/// Runs one command and returns the text it produces.
fn run(cmd: Command) -> Result<(Option<PathBuf>, String)> {
    match cmd {
        Command::Asm { input, out, hex, binary, pc, format } => {
            let src = load_source(&input)?;
            let prog = Assembler::new(Catalog::mips())
                .assemble(&src)
                .with_context(|| format!("assembling {}", input.display()))?;
            info!(words = prog.words.len(), labels = prog.symbols.len(), "assembled {}", input.display());
            let text = match format {
                OutputFormat::Text => render_program(&prog.words, output_mode(hex, binary, pc)),
                OutputFormat::Json => serde_json::to_string_pretty(&AsmReport::new(&prog))? + "\n",
            };
            Ok((out, text))
        }
        Command::Disasm { input, out, pc, format } => {
            let src = load_source(&input)?;
            let lines = disassemble(&MipsDecoder::new(), &src)
                .with_context(|| format!("disassembling {}", input.display()))?;
            info!(words = lines.len(), "disassembled {}", input.display());
            let text = match format {
                OutputFormat::Text => render_listing(&lines, pc),
                OutputFormat::Json => serde_json::to_string_pretty(&lines)? + "\n",
            };
            Ok((out, text))
        }
        Command::Catalog { format } => {
            let catalog = Catalog::mips();
            let text = match format {
                OutputFormat::Text => render_catalog(&catalog),
                OutputFormat::Json => serde_json::to_string_pretty(catalog.entries())? + "\n",
            };
            Ok((None, text))
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (out, text) = run(cli.cmd)?;
    emit(out.as_deref(), &text)
}
