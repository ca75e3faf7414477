use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use mips_rs::fields::to_bitstring;
use mips_rs::{Assembled, Catalog, Format, ImmRole, Label, Program};

pub fn load_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to open input file: {}", path.display()))
}

/// Writes `text` to `out`, or to stdout when no path is given.
pub fn emit(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("failed to open output file: {}", path.display()))
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WordRow {
    pub line: usize,
    pub address: u32,
    pub word: u32,
    pub hex: String,
    pub bits: String,
}

impl From<&Assembled> for WordRow {
    fn from(a: &Assembled) -> Self {
        Self {
            line: a.line,
            address: a.address,
            word: a.word,
            hex: format!("{:#010x}", a.word),
            bits: to_bitstring(a.word),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AsmReport {
    pub words: Vec<WordRow>,
    pub labels: Vec<Label>,
}

impl AsmReport {
    pub fn new(prog: &Program) -> Self {
        Self {
            words: prog.words.iter().map(WordRow::from).collect(),
            labels: prog.symbols.labels().to_vec(),
        }
    }
}

pub fn render_catalog(catalog: &Catalog) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "{:<6} {:<3} {:<6} {:<6} {:<13} {}", "name", "fmt", "opcode", "funct", "immediate", "syntax");
    for d in catalog.entries() {
        let fmt = match d.format {
            Format::R => "R",
            Format::I => "I",
            Format::J => "J",
        };
        let role = match d.role {
            ImmRole::None => "-",
            ImmRole::BranchOffset => "branch",
            ImmRole::MemoryOffset => "memory",
        };
        let _ = writeln!(
            buf,
            "{:<6} {:<3} {:<#6x} {:<#6x} {:<13} {}",
            d.mnemonic, fmt, d.opcode, d.funct, role, d.syntax
        );
    }
    buf
}
