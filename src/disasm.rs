use serde::Serialize;
use tracing::{debug, trace};

use crate::catalog::{Format, ImmRole, Slot};
use crate::decoder::{Decoded, Decoder};
use crate::error::DisasmError;
use crate::fields::{self, WORD_BITS};
use crate::registers;
use crate::BASE_ADDRESS;

fn reg(n: u8) -> &'static str {
    registers::name_of(n).unwrap_or("$?")
}

/// Renders a decoded word back into source syntax, e.g. `lw $t0, -8($sp)`.
///
/// Branch offsets are shown in bytes (word offset × 4), jump targets as the
/// byte address (target × 4), both in decimal.
pub fn fmt_decoded(d: &Decoded) -> String {
    let desc = d.desc;
    let mut ops: Vec<String> = Vec::with_capacity(4);
    match desc.format {
        Format::R => {
            ops.extend(desc.operands.iter().map(|&s| reg(d.register(s)).to_string()));
            if d.shamt > 0 {
                ops.push(d.shamt.to_string());
            }
        }
        Format::I => {
            for &slot in desc.operands {
                if slot == Slot::Rs && desc.role == ImmRole::MemoryOffset {
                    ops.push(format!("{}({})", d.signed_imm(), reg(d.rs)));
                } else {
                    ops.push(reg(d.register(slot)).to_string());
                }
            }
            match desc.role {
                ImmRole::BranchOffset => ops.push((d.signed_imm() * 4).to_string()),
                ImmRole::None => ops.push(d.signed_imm().to_string()),
                ImmRole::MemoryOffset => {}
            }
        }
        Format::J => ops.push((d.target * 4).to_string()),
    }
    format!("{} {}", desc.mnemonic, ops.join(", "))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disassembled {
    pub index: usize,
    pub address: u32,
    pub word: u32,
    pub text: String,
}

pub fn disassemble_word<D: Decoder>(dec: &D, index: usize, word: u32) -> Result<Disassembled, DisasmError> {
    let d = dec.decode(word).ok_or(DisasmError::Unsupported { index, word })?;
    let text = fmt_decoded(&d);
    trace!(index, word = format_args!("{word:#010x}"), "{text}");
    Ok(Disassembled {
        index,
        address: BASE_ADDRESS.wrapping_add((index as u32).wrapping_mul(4)),
        word,
        text,
    })
}

/// Disassembles a text of `0`/`1` characters, 32 per word. Line breaks are
/// ignored; a trailing partial word is dropped.
pub fn disassemble<D: Decoder>(dec: &D, input: &str) -> Result<Vec<Disassembled>, DisasmError> {
    let bits: Vec<char> = input.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
    let mut chunks = bits.chunks_exact(WORD_BITS);
    let mut out = Vec::with_capacity(bits.len() / WORD_BITS);
    for (index, chunk) in chunks.by_ref().enumerate() {
        let chunk: String = chunk.iter().collect();
        let word = fields::parse_bitstring(&chunk).ok_or_else(|| DisasmError::Malformed { index, chunk: chunk.clone() })?;
        out.push(disassemble_word(dec, index, word)?);
    }
    let rest = chunks.remainder().len();
    if rest > 0 {
        debug!(dropped = rest, "ignoring trailing partial word");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::MipsDecoder;
    use pretty_assertions::assert_eq;

    fn text(word: u32) -> String {
        fmt_decoded(&MipsDecoder::new().decode(word).unwrap())
    }

    #[test]
    fn formats_each_shape() {
        assert_eq!(text(0x0232_4020), "add $t0, $s1, $s2");
        assert_eq!(text(0x0009_4100), "sll $t0, $t1, 4");
        assert_eq!(text(0x03E0_0008), "jr $ra");
        assert_eq!(text(0x2109_FFFC), "addi $t1, $t0, -4");
        assert_eq!(text(0x8FA8_0008), "lw $t0, 8($sp)");
        assert_eq!(text(0xAFBF_FFFC), "sw $ra, -4($sp)");
        assert_eq!(text(0x0810_0000), "j 4194304");
    }

    #[test]
    fn branch_offset_is_scaled_to_bytes() {
        // beq $t0, $t1, -3 words
        let word = fields::pack_i(0x04, 8, 9, (-3i32) as u32);
        assert_eq!(text(word), "beq $t0, $t1, -12");
    }

    #[test]
    fn sixteen_bit_boundaries() {
        assert_eq!(text(fields::pack_i(0x08, 0, 8, 0x7FFF)), "addi $t0, $zero, 32767");
        assert_eq!(text(fields::pack_i(0x08, 0, 8, 0x8000)), "addi $t0, $zero, -32768");
        assert_eq!(text(fields::pack_i(0x08, 0, 8, 0xFFFF)), "addi $t0, $zero, -1");
    }

    #[test]
    fn splits_input_into_words() {
        let input = "00000010001100100100000000100000\n0000001111100000\n0000000000001000\n0101";
        let out = disassemble(&MipsDecoder::new(), input).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "add $t0, $s1, $s2");
        assert_eq!(out[1].text, "jr $ra");
        assert_eq!(out[1].address, BASE_ADDRESS + 4);
    }

    #[test]
    fn rejects_bad_words() {
        let dec = MipsDecoder::new();
        let err = disassemble(&dec, "0000001000110010010000000010000x").unwrap_err();
        assert!(matches!(err, DisasmError::Malformed { index: 0, .. }));
        let err = disassemble(&dec, &format!("{}{}", fields::to_bitstring(0x0232_4020), "1".repeat(32))).unwrap_err();
        assert_eq!(err, DisasmError::Unsupported { index: 1, word: 0xFFFF_FFFF });
    }
}
