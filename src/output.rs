use std::fmt::Write as _;

use bitflags::bitflags;
use serde::Serialize;

use crate::asm::Assembled;
use crate::disasm::Disassembled;
use crate::fields::to_bitstring;

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputMode: u8 {
const HEX = 1 << 0; // 0x%08x word
const BINARY = 1 << 1; // 32-character bitstring
const PC = 1 << 2; // address prefix
}
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::BINARY
    }
}

impl OutputMode {
    /// Binary is implied when neither word format was asked for.
    pub fn effective(self) -> Self {
        if self.intersects(OutputMode::HEX | OutputMode::BINARY) {
            self
        } else {
            self | OutputMode::BINARY
        }
    }
}

/// One output line (no newline) for an assembled word.
pub fn render_word(a: &Assembled, mode: OutputMode) -> String {
    let mode = mode.effective();
    let mut s = String::new();
    if mode.contains(OutputMode::PC) {
        let _ = write!(s, "{:#010x}\t", a.address);
    }
    if mode.contains(OutputMode::HEX) {
        let _ = write!(s, "{:#010x}", a.word);
        if mode.contains(OutputMode::BINARY) {
            s.push('\t');
        }
    }
    if mode.contains(OutputMode::BINARY) {
        s.push_str(&to_bitstring(a.word));
    }
    s
}

pub fn render_program(words: &[Assembled], mode: OutputMode) -> String {
    let mut buf = String::new();
    for a in words {
        let _ = writeln!(buf, "{}", render_word(a, mode));
    }
    buf
}

/// Disassembly listing, one instruction per line, optionally address-prefixed.
pub fn render_listing(lines: &[Disassembled], with_pc: bool) -> String {
    let mut buf = String::new();
    for d in lines {
        if with_pc {
            let _ = write!(buf, "{:#010x}\t", d.address);
        }
        let _ = writeln!(buf, "{}", d.text);
    }
    buf
}
