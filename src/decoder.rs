use serde::Serialize;

use crate::catalog::{Catalog, InstrDesc, Slot};
use crate::fields::{self, RawFields};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Decoded {
    pub desc: &'static InstrDesc,
    pub rs: u8,
    pub rt: u8,
    pub rd: u8,
    pub shamt: u8,
    /// Raw 16-bit immediate field (I format).
    pub imm: u16,
    /// Raw 26-bit target field (J format).
    pub target: u32,
}

impl Decoded {
    pub fn mnemonic(&self) -> &'static str {
        self.desc.mnemonic
    }

    pub fn register(&self, slot: Slot) -> u8 {
        match slot {
            Slot::Rs => self.rs,
            Slot::Rt => self.rt,
            Slot::Rd => self.rd,
        }
    }

    pub fn signed_imm(&self) -> i32 {
        fields::to_signed(self.imm as u32, fields::IMMEDIATE.len() as u32)
    }
}

pub trait Decoder {
    fn decode(&self, raw32: u32) -> Option<Decoded>;
}

/// Decoder for the catalog's R/I/J instructions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MipsDecoder {
    catalog: Catalog,
}

impl MipsDecoder {
    pub fn new() -> Self {
        Self { catalog: Catalog::mips() }
    }
}

impl Decoder for MipsDecoder {
    fn decode(&self, raw32: u32) -> Option<Decoded> {
        let f = RawFields::unpack(raw32);
        // funct only discriminates when the opcode is zero
        let funct = if f.opcode == 0 { f.funct } else { 0 };
        let desc = self.catalog.by_code(f.opcode, funct)?;
        Some(Decoded {
            desc,
            rs: f.rs,
            rt: f.rt,
            rd: f.rd,
            shamt: f.shamt,
            imm: f.immediate,
            target: f.target,
        })
    }
}
