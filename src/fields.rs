//! Bit layout of the three instruction formats.
//!
//! Field ranges are bit indices counted from the most significant bit, so
//! they read the same way as the layout table:
//!
//! ```text
//! R: opcode(6) rs(5) rt(5) rd(5) shamt(5) funct(6)
//! I: opcode(6) rs(5) rt(5) immediate(16)
//! J: opcode(6) target(26)
//! ```

use std::ops::Range;

use bitvec::prelude::*;
use serde::Serialize;

pub const OPCODE: Range<usize> = 0..6;
pub const RS: Range<usize> = 6..11;
pub const RT: Range<usize> = 11..16;
pub const RD: Range<usize> = 16..21;
pub const SHAMT: Range<usize> = 21..26;
pub const FUNCT: Range<usize> = 26..32;
pub const IMMEDIATE: Range<usize> = 16..32;
pub const TARGET: Range<usize> = 6..32;

pub const WORD_BITS: usize = 32;

pub fn extract(word: u32, field: Range<usize>) -> u32 {
    word.view_bits::<Msb0>()[field].load_be::<u32>()
}

/// Stores `value` into `field`, keeping only as many low bits as the field holds.
pub fn insert(word: &mut u32, field: Range<usize>, value: u32) {
    word.view_bits_mut::<Msb0>()[field].store_be::<u32>(value);
}

/// True when `value` is representable in `width` bits, read either as
/// two's complement or as unsigned.
pub fn fits(value: i64, width: usize) -> bool {
    let min = -(1i64 << (width - 1));
    let max = (1i64 << width) - 1;
    (min..=max).contains(&value)
}

/// Reinterprets an unsigned `width`-bit field value as two's complement.
pub fn to_signed(value: u32, width: u32) -> i32 {
    let v = value as i64;
    let half = (1i64 << (width - 1)) - 1;
    if v > half {
        (v - (1i64 << width)) as i32
    } else {
        v as i32
    }
}

/// Every field of a word, regardless of which format it actually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawFields {
    pub opcode: u8,
    pub rs: u8,
    pub rt: u8,
    pub rd: u8,
    pub shamt: u8,
    pub funct: u8,
    pub immediate: u16,
    pub target: u32,
}

impl RawFields {
    pub fn unpack(word: u32) -> Self {
        Self {
            opcode: extract(word, OPCODE) as u8,
            rs: extract(word, RS) as u8,
            rt: extract(word, RT) as u8,
            rd: extract(word, RD) as u8,
            shamt: extract(word, SHAMT) as u8,
            funct: extract(word, FUNCT) as u8,
            immediate: extract(word, IMMEDIATE) as u16,
            target: extract(word, TARGET),
        }
    }
}

pub fn pack_r(opcode: u8, rs: u8, rt: u8, rd: u8, shamt: u32, funct: u8) -> u32 {
    let mut word = 0u32;
    insert(&mut word, OPCODE, opcode as u32);
    insert(&mut word, RS, rs as u32);
    insert(&mut word, RT, rt as u32);
    insert(&mut word, RD, rd as u32);
    insert(&mut word, SHAMT, shamt);
    insert(&mut word, FUNCT, funct as u32);
    word
}

pub fn pack_i(opcode: u8, rs: u8, rt: u8, immediate: u32) -> u32 {
    let mut word = 0u32;
    insert(&mut word, OPCODE, opcode as u32);
    insert(&mut word, RS, rs as u32);
    insert(&mut word, RT, rt as u32);
    insert(&mut word, IMMEDIATE, immediate);
    word
}

pub fn pack_j(opcode: u8, target: u32) -> u32 {
    let mut word = 0u32;
    insert(&mut word, OPCODE, opcode as u32);
    insert(&mut word, TARGET, target);
    word
}

/// Parses one 32-character chunk of `0`/`1` characters, MSB first.
/// Returns `None` on a wrong length or any other character.
pub fn parse_bitstring(chunk: &str) -> Option<u32> {
    if chunk.len() != WORD_BITS {
        return None;
    }
    let mut word = 0u32;
    let bits = word.view_bits_mut::<Msb0>();
    for (i, c) in chunk.chars().enumerate() {
        match c {
            '0' => bits.set(i, false),
            '1' => bits.set(i, true),
            _ => return None,
        }
    }
    Some(word)
}

pub fn to_bitstring(word: u32) -> String {
    format!("{word:032b}")
}
